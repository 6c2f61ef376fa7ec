//! Classify command handler.
//!
//! Pure keyword analysis; does not load the index.

use super::print_json;
use clap::Args;
use lectern_core::AppResult;
use lectern_engine::{ClassifyRequest, Validate};
use lectern_retrieval::classify;

/// Show how a question would be routed by smart search
#[derive(Args, Debug)]
pub struct ClassifyCommand {
    /// The question to classify
    pub question: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ClassifyCommand {
    pub fn execute(&self) -> AppResult<()> {
        let request = ClassifyRequest {
            question: self.question.clone(),
        }
        .validated()?;
        let analysis = classify(&request.question);

        if self.json {
            return print_json(&analysis);
        }

        println!("Complexity: {:?}", analysis.complexity);
        println!("Recommended method: {}", analysis.recommended_method);
        println!("Estimated documents: {}", analysis.estimated_docs);
        println!("Words: {}", analysis.word_count);
        Ok(())
    }
}
