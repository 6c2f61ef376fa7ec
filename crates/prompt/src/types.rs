//! Prompt definitions and rendered prompts.

use serde::{Deserialize, Serialize};

/// Identifiers of the prompts the services render.
pub mod ids {
    pub const ANSWER_SINGLE: &str = "answer.single";
    pub const ANSWER_SINGLE_FALLBACK: &str = "answer.single.fallback";
    pub const ANSWER_EXTRACT: &str = "answer.extract";
    pub const ANSWER_SYNTHESIZE: &str = "answer.synthesize";
    pub const TOT_GENERATE: &str = "tot.generate";
    pub const TOT_EVALUATE: &str = "tot.evaluate";
    pub const TOT_FINAL: &str = "tot.final";

    /// Every prompt a complete library must define.
    pub const ALL: [&str; 7] = [
        ANSWER_SINGLE,
        ANSWER_SINGLE_FALLBACK,
        ANSWER_EXTRACT,
        ANSWER_SYNTHESIZE,
        TOT_GENERATE,
        TOT_EVALUATE,
        TOT_FINAL,
    ];
}

/// A prompt as stored in `<id>.yml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptDefinition {
    pub id: String,
    pub title: String,
    /// `major.minor`
    pub api_version: String,
    #[serde(default)]
    pub created_by: String,
    /// Rendered with the same variables as `template` and sent as the system message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Handlebars source of the user message
    pub template: String,
}

/// Output of rendering a [`PromptDefinition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPrompt {
    pub prompt_id: String,
    pub system: Option<String>,
    pub user: String,
}

impl BuiltPrompt {
    /// Characters sent to the model, system message included.
    pub fn char_count(&self) -> usize {
        self.user.chars().count() + self.system.as_deref().map_or(0, |s| s.chars().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_defaults() {
        let yaml = "id: tot.final\ntitle: Final\napiVersion: \"1.0\"\ntemplate: \"{{problem}}\"\n";

        let def: PromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.id, "tot.final");
        assert_eq!(def.created_by, "");
        assert!(def.system.is_none());
    }

    #[test]
    fn test_char_count_counts_characters() {
        let built = BuiltPrompt {
            prompt_id: ids::ANSWER_SINGLE.to_string(),
            system: Some("ตอบ".to_string()),
            user: "abc".to_string(),
        };
        assert_eq!(built.char_count(), 6);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut all = ids::ALL.to_vec();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), ids::ALL.len());
    }
}
