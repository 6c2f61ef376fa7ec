//! Prompt system for Lectern.
//!
//! This crate provides structured prompt management with:
//! - YAML-based prompt definitions compiled into the binary
//! - Per-workspace overrides in `.lectern/prompts/<id>.yml`
//! - Handlebars template rendering

pub mod builder;
pub mod library;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use library::PromptLibrary;
pub use loader::{builtin_prompt, list_prompts, load_prompt};
pub use types::{ids, BuiltPrompt, PromptDefinition};
