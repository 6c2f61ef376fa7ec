//! The set of prompts a running service renders from.
//!
//! Built-in definitions are loaded first; any `<id>.yml` in the workspace
//! prompts directory with a built-in id replaces that definition.

use crate::builder::build_prompt;
use crate::loader::{builtin_ids, builtin_prompt, list_prompts, load_prompt};
use crate::types::{BuiltPrompt, PromptDefinition};
use lectern_core::{AppError, AppResult};
use std::collections::HashMap;
use std::path::Path;

/// Resolved prompt definitions plus variables injected into every render.
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    prompts: HashMap<String, PromptDefinition>,
    defaults: HashMap<String, String>,
}

impl PromptLibrary {
    /// Library holding only the built-in prompts.
    pub fn builtin() -> AppResult<Self> {
        let mut prompts = HashMap::new();
        for id in builtin_ids() {
            prompts.insert(id.to_string(), builtin_prompt(id)?);
        }
        Ok(Self {
            prompts,
            defaults: HashMap::new(),
        })
    }

    /// Built-in prompts with workspace overrides applied.
    pub fn load(prompts_dir: &Path) -> AppResult<Self> {
        let mut library = Self::builtin()?;

        for id in list_prompts(prompts_dir)? {
            if !library.prompts.contains_key(&id) {
                tracing::warn!(prompt = %id, "Ignoring prompt override with unknown id");
                continue;
            }
            let definition = load_prompt(prompts_dir, &id)?;
            tracing::info!(prompt = %id, "Using workspace prompt override");
            library.prompts.insert(id, definition);
        }

        Ok(library)
    }

    /// Set `assistantName` and `language` for every render.
    pub fn with_persona(self, assistant_name: &str, language: &str) -> Self {
        self.with_default("assistantName", assistant_name)
            .with_default("language", language)
    }

    pub fn with_default(mut self, key: &str, value: &str) -> Self {
        self.defaults.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, prompt_id: &str) -> Option<&PromptDefinition> {
        self.prompts.get(prompt_id)
    }

    /// Render a prompt. Caller variables win over library defaults.
    pub fn render(&self, prompt_id: &str, variables: &[(&str, String)]) -> AppResult<BuiltPrompt> {
        let definition = self
            .get(prompt_id)
            .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", prompt_id)))?;

        let mut merged = self.defaults.clone();
        for (key, value) in variables {
            merged.insert((*key).to_string(), value.clone());
        }

        build_prompt(definition, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ids;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_library_renders_persona() {
        let library = PromptLibrary::builtin()
            .unwrap()
            .with_persona("TA Tohtoh", "Thai");

        let built = library
            .render(
                ids::ANSWER_SINGLE_FALLBACK,
                &[("question", "What is recursion?".to_string())],
            )
            .unwrap();

        assert!(built.user.contains("TA Tohtoh"));
        assert!(built.user.contains("\"What is recursion?\""));
        assert!(built.user.contains("Answer in Thai."));
    }

    #[test]
    fn test_caller_variables_override_defaults() {
        let library = PromptLibrary::builtin()
            .unwrap()
            .with_persona("TA", "English");

        let built = library
            .render(
                ids::ANSWER_SINGLE_FALLBACK,
                &[
                    ("question", "q".to_string()),
                    ("language", "Japanese".to_string()),
                ],
            )
            .unwrap();

        assert!(built.user.contains("Answer in Japanese."));
    }

    #[test]
    fn test_tot_prompts_request_parseable_formats() {
        let library = PromptLibrary::builtin().unwrap();

        let generate = library
            .render(ids::TOT_GENERATE, &[("branchingFactor", "3".to_string())])
            .unwrap();
        assert!(generate.user.contains("1. Approach 1:"));

        let evaluate = library.render(ids::TOT_EVALUATE, &[]).unwrap();
        assert!(evaluate.user.contains("Score: X/30 - Reason:"));
    }

    #[test]
    fn test_workspace_override_replaces_builtin() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("tot.final.yml"),
            "id: tot.final\ntitle: Custom\napiVersion: \"1.1\"\ntemplate: \"FINAL {{problem}}\"\n",
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("unrelated.yml"),
            "id: unrelated\ntitle: X\napiVersion: \"1.0\"\ntemplate: x\n",
        )
        .unwrap();

        let library = PromptLibrary::load(temp_dir.path()).unwrap();
        let built = library
            .render(ids::TOT_FINAL, &[("problem", "sorting".to_string())])
            .unwrap();

        assert_eq!(built.user, "FINAL sorting");
        assert!(library.get("unrelated").is_none());
        assert_eq!(library.get(ids::TOT_GENERATE).unwrap().api_version, "1.0");
    }

    #[test]
    fn test_unknown_prompt_is_error() {
        let library = PromptLibrary::builtin().unwrap();
        assert!(matches!(
            library.render("missing", &[]),
            Err(AppError::Prompt(_))
        ));
    }
}
