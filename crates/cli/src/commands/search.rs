//! Search command handler.

use super::{orchestrator, print_json, print_ranked};
use clap::Args;
use lectern_core::{config::AppConfig, AppResult};
use lectern_engine::SearchRequest;

/// Rank document pages by similarity to a question
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// The question to search for
    pub question: String,

    /// Number of results (1-10)
    #[arg(short = 'k', long, default_value_t = 4)]
    pub top_k: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::debug!("Search options: {:?}", self);

        let orchestrator = orchestrator(config)?;
        let result = orchestrator
            .search(SearchRequest {
                question: self.question.clone(),
                top_k: self.top_k,
            })
            .await?;

        if self.json {
            return print_json(result.as_ref());
        }

        println!("Results for: {}", result.question);
        print_ranked(&result.results);
        println!();
        println!("Search time: {} ms", result.processing_time_ms);
        Ok(())
    }
}
