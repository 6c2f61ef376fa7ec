//! Command handlers for the Lectern CLI.
//!
//! Each command validates its input through the same request types the
//! HTTP server uses, so both surfaces share one set of rules.

pub mod answer;
pub mod classify;
pub mod health;
pub mod search;
pub mod serve;
pub mod smart;
pub mod think;

pub use answer::AnswerCommand;
pub use classify::ClassifyCommand;
pub use health::HealthCommand;
pub use search::SearchCommand;
pub use serve::ServeCommand;
pub use smart::SmartCommand;
pub use think::ThinkCommand;

use lectern_core::{config::AppConfig, AppResult};
use lectern_engine::{AppContext, Orchestrator};
use lectern_retrieval::RankedImage;
use serde::Serialize;

/// Load the index and providers for a one-shot command.
pub(crate) fn orchestrator(config: &AppConfig) -> AppResult<Orchestrator> {
    let ctx = AppContext::from_config(config.clone())?;
    Ok(Orchestrator::new(ctx))
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn print_ranked(results: &[RankedImage]) {
    for (i, result) in results.iter().enumerate() {
        println!(
            "{:>2}. {} (relevance {}%)",
            i + 1,
            result.image_path,
            result.relevance_percent()
        );
    }
}
