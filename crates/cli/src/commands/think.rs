//! Think command handler.
//!
//! Runs Tree of Thoughts reasoning, optionally grounded in retrieved pages.

use super::{orchestrator, print_json};
use clap::Args;
use lectern_core::{config::AppConfig, AppResult};
use lectern_engine::{Thought, TotWithImagesRequest, TreeOfThoughtsRequest};

/// Reason about a problem with Tree of Thoughts
#[derive(Args, Debug)]
pub struct ThinkCommand {
    /// The problem to solve
    pub problem: String,

    /// Extra context for the model
    #[arg(long, default_value = "")]
    pub context: String,

    /// Tree depth
    #[arg(long, default_value_t = 3)]
    pub max_depth: usize,

    /// Thoughts generated per expansion
    #[arg(long, default_value_t = 3)]
    pub branching_factor: usize,

    /// Retrieve pages for the problem and add them to the context
    #[arg(long)]
    pub with_images: bool,

    /// Pages to retrieve with --with-images (1-12)
    #[arg(short = 'k', long, default_value_t = 4)]
    pub top_k: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ThinkCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::debug!("Think options: {:?}", self);
        let orchestrator = orchestrator(config)?;

        if self.with_images {
            let response = orchestrator
                .tot_with_images(TotWithImagesRequest {
                    problem: self.problem.clone(),
                    context: self.context.clone(),
                    top_k: self.top_k,
                    max_depth: self.max_depth,
                    branching_factor: self.branching_factor,
                })
                .await?;

            if self.json {
                return print_json(&response);
            }
            print_path(&response.report.best_path);
            println!("{}", response.report.final_answer);
            return Ok(());
        }

        let report = orchestrator
            .tree_of_thoughts(TreeOfThoughtsRequest {
                problem: self.problem.clone(),
                context: self.context.clone(),
                max_depth: self.max_depth,
                branching_factor: self.branching_factor,
            })
            .await?;

        if self.json {
            return print_json(&report);
        }
        print_path(&report.best_path);
        println!("{}", report.final_answer);
        Ok(())
    }
}

fn print_path(path: &[Thought]) {
    println!("Best path:");
    for thought in path {
        println!("  [{}] ({}/30) {}", thought.id, thought.score, thought.content);
    }
    println!();
}
