//! Prompt loader for built-in and workspace YAML prompt definitions.

use crate::types::{ids, PromptDefinition};
use lectern_core::{AppError, AppResult};
use std::path::Path;

/// Built-in prompt sources compiled into the binary.
const BUILTIN_PROMPTS: [(&str, &str); 7] = [
    (
        ids::ANSWER_SINGLE,
        include_str!("../prompts/answer.single.yml"),
    ),
    (
        ids::ANSWER_SINGLE_FALLBACK,
        include_str!("../prompts/answer.single.fallback.yml"),
    ),
    (
        ids::ANSWER_EXTRACT,
        include_str!("../prompts/answer.extract.yml"),
    ),
    (
        ids::ANSWER_SYNTHESIZE,
        include_str!("../prompts/answer.synthesize.yml"),
    ),
    (ids::TOT_GENERATE, include_str!("../prompts/tot.generate.yml")),
    (ids::TOT_EVALUATE, include_str!("../prompts/tot.evaluate.yml")),
    (ids::TOT_FINAL, include_str!("../prompts/tot.final.yml")),
];

/// IDs of every built-in prompt.
pub fn builtin_ids() -> impl Iterator<Item = &'static str> {
    BUILTIN_PROMPTS.iter().map(|(id, _)| *id)
}

/// Parse a built-in prompt definition.
pub fn builtin_prompt(prompt_id: &str) -> AppResult<PromptDefinition> {
    let source = BUILTIN_PROMPTS
        .iter()
        .find(|(id, _)| *id == prompt_id)
        .map(|(_, source)| *source)
        .ok_or_else(|| AppError::Prompt(format!("Unknown built-in prompt: {}", prompt_id)))?;

    let definition: PromptDefinition = serde_yaml::from_str(source).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse built-in prompt {}: {}",
            prompt_id, e
        ))
    })?;

    validate_prompt(&definition)?;
    Ok(definition)
}

/// Load a prompt definition by ID from a prompts directory.
///
/// This function reads `<prompts_dir>/<id>.yml`.
///
/// # Example
/// ```no_run
/// use lectern_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new(".lectern/prompts"), "answer.single")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(prompts_dir: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir.join(format!("{}.yml", prompt_id));

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition)?;

    if definition.id != prompt_id {
        return Err(AppError::Prompt(format!(
            "Prompt file {:?} declares id '{}'",
            prompt_file, definition.id
        )));
    }

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// List all prompt IDs present in a prompts directory.
pub fn list_prompts(prompts_dir: &Path) -> AppResult<Vec<String>> {
    if !prompts_dir.exists() {
        return Ok(Vec::new());
    }

    let mut prompt_ids = Vec::new();

    for entry in walkdir::WalkDir::new(prompts_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                prompt_ids.push(stem.to_string());
            }
        }
    }

    prompt_ids.sort();
    Ok(prompt_ids)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.api_version.is_empty() {
        return Err(AppError::Prompt(
            "Prompt apiVersion cannot be empty".to_string(),
        ));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}
