//! Handlebars rendering of prompt definitions.

use crate::types::{BuiltPrompt, PromptDefinition};
use handlebars::Handlebars;
use lectern_core::{AppError, AppResult};
use std::collections::HashMap;

const USER: &str = "user";
const SYSTEM: &str = "system";

/// Render the user message and, if defined, the system message.
///
/// Missing variables render as empty strings. Output is not HTML-escaped.
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: &HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    let mut registry = Handlebars::new();
    registry.register_escape_fn(handlebars::no_escape);

    register(&mut registry, &definition.id, USER, &definition.template)?;
    if let Some(ref system) = definition.system {
        register(&mut registry, &definition.id, SYSTEM, system)?;
    }

    let render = |name: &str| {
        registry.render(name, variables).map_err(|e| {
            AppError::Prompt(format!("Failed to render '{}': {}", definition.id, e))
        })
    };

    let user = render(USER)?;
    let system = match definition.system {
        Some(_) => Some(render(SYSTEM)?),
        None => None,
    };

    tracing::trace!(prompt = %definition.id, chars = user.len(), "Prompt rendered");

    Ok(BuiltPrompt {
        prompt_id: definition.id.clone(),
        system,
        user,
    })
}

fn register(registry: &mut Handlebars<'_>, id: &str, name: &str, source: &str) -> AppResult<()> {
    registry
        .register_template_string(name, source)
        .map_err(|e| AppError::Prompt(format!("Invalid {} template in '{}': {}", name, id, e)))
}
