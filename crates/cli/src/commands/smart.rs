//! Smart search command handler.

use super::{orchestrator, print_json, print_ranked};
use clap::Args;
use lectern_core::{config::AppConfig, AppResult};
use lectern_engine::SmartSearchRequest;

/// Classify the question and answer with the best-suited strategy
#[derive(Args, Debug)]
pub struct SmartCommand {
    /// The question to answer
    pub question: String,

    /// Force a strategy (auto, simple, comprehensive, tree_of_thoughts, enhanced_multi)
    #[arg(long, default_value = "auto")]
    pub method: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SmartCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::debug!("Smart options: {:?}", self);

        let orchestrator = orchestrator(config)?;
        let response = orchestrator
            .smart_search(SmartSearchRequest {
                question: self.question.clone(),
                force_method: self.method.clone(),
            })
            .await?;

        if self.json {
            return print_json(&response);
        }

        println!("{}", response.answer.text());
        println!();
        println!(
            "Method: {}{}",
            response.method,
            if response.metadata.ai_selected { " (auto)" } else { "" }
        );
        println!("Sources:");
        print_ranked(&response.search.top_results);
        println!(
            "Total {} ms (search {} ms, analysis {} ms)",
            response.performance.total_processing_time_ms,
            response.performance.search_time_ms,
            response.performance.analysis_time_ms
        );
        Ok(())
    }
}
