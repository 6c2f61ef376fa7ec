//! Question answering over the indexed document images.
//!
//! Builds on the retrieval crate: single and multi-image answering,
//! Tree of Thoughts reasoning and the strategy-selecting smart search.

pub mod answer;
pub mod context;
pub mod generator;
pub mod orchestrator;
pub mod requests;
pub mod tot;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use answer::{AggregateAnswer, AnalysisResult, AnswerResult, AnswerService};
pub use context::{AppContext, HealthReport};
pub use generator::Generator;
pub use orchestrator::{
    Efficiency, MultiAnswerResponse, Orchestrator, Performance, SearchSummary, SmartAnswer,
    SmartSearchResponse, ThoughtAnswer, TotWithImagesResponse,
};
pub use requests::{
    AnswerRequest, ClassifyRequest, ComprehensiveSearchRequest, MultiAnswerRequest, SearchRequest,
    SmartSearchRequest, TotWithImagesRequest, TreeOfThoughtsRequest, Validate,
};
pub use tot::{Thought, ThoughtTree, ThoughtTreeReport, TreeOfThoughts};
