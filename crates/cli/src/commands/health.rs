//! Health command handler.

use super::{orchestrator, print_json};
use clap::Args;
use lectern_core::{config::AppConfig, AppError, AppResult};

/// Load the index and report readiness
#[derive(Args, Debug)]
pub struct HealthCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl HealthCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let report = orchestrator(config)?.health();

        if self.json {
            print_json(&report)?;
        } else {
            println!("Status: {}", report.status);
            println!(
                "  Documents: {} ({} dropped, dimension {})",
                report.image_count, report.dropped_missing, report.dimension
            );
            println!("  Embedding provider: {}", report.embedding_provider);
            println!("  Generation provider: {}", report.generation_provider);
        }

        if report.ready {
            Ok(())
        } else {
            Err(AppError::NotReady("index is empty".to_string()))
        }
    }
}
