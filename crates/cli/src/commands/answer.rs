//! Answer command handler.
//!
//! With `--image` the question is answered from that page alone; otherwise
//! the best pages are retrieved and their analyses synthesised.

use super::{orchestrator, print_json, print_ranked};
use clap::Args;
use lectern_core::{config::AppConfig, AppResult};
use lectern_engine::{AnswerRequest, MultiAnswerRequest};

/// Answer a question from the document pages
#[derive(Args, Debug)]
pub struct AnswerCommand {
    /// The question to answer
    pub question: String,

    /// Answer from this image only (relative to the images root)
    #[arg(short, long)]
    pub image: Option<String>,

    /// Pages to retrieve when no image is given (1-15)
    #[arg(short = 'k', long, default_value_t = 4)]
    pub top_k: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AnswerCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::debug!("Answer options: {:?}", self);
        let orchestrator = orchestrator(config)?;

        if let Some(ref image) = self.image {
            let result = orchestrator
                .answer(AnswerRequest {
                    question: self.question.clone(),
                    image_path: image.clone(),
                })
                .await?;

            if self.json {
                return print_json(&result);
            }
            println!("{}", result.answer);
            println!();
            println!("Source: {} ({} ms)", result.image_path, result.processing_time_ms);
            return Ok(());
        }

        let response = orchestrator
            .search_and_answer(MultiAnswerRequest {
                question: self.question.clone(),
                top_k: self.top_k,
            })
            .await?;

        if self.json {
            return print_json(&response);
        }

        println!("{}", response.answer.answer);
        println!();
        println!("Sources:");
        print_ranked(&response.search.top_results);
        println!(
            "Analysed {} page(s), {} failed, {} ms total",
            response.answer.images_analyzed,
            response.answer.failed_analyses,
            response.performance.total_processing_time_ms
        );
        Ok(())
    }
}
