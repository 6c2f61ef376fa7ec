//! Entry points for every operation, shared by the CLI and the HTTP server.
//!
//! Each call runs inside a `request` span carrying a fresh request id.

use crate::answer::{AggregateAnswer, AnswerResult};
use crate::context::{AppContext, HealthReport};
use crate::requests::{
    AnswerRequest, ClassifyRequest, ComprehensiveSearchRequest, MultiAnswerRequest, SearchRequest,
    SmartSearchRequest, TotWithImagesRequest, TreeOfThoughtsRequest, Validate,
};
use crate::tot::{Thought, ThoughtTreeReport, TreeOfThoughts};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use lectern_core::{preview, AppError, AppResult};
use lectern_retrieval::{
    classify, expand_query, merge_results, QuestionAnalysis, RankedImage, SearchResult, Strategy,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

const SIMPLE_TOP_K: usize = 3;
const COMPREHENSIVE_MAX_TOP_K: usize = 15;
const TOT_MAX_TOP_K: usize = 10;
const SMART_TOT_DEPTH: usize = 3;
const SMART_TOT_BRANCHING: usize = 3;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSummary {
    pub question: String,
    pub top_results: Vec<RankedImage>,
    pub search_time_ms: u64,
    pub top_k: usize,
}

impl SearchSummary {
    fn from_result(result: &SearchResult, top_k: usize) -> Self {
        Self {
            question: result.question.clone(),
            top_results: result.results.clone(),
            search_time_ms: result.processing_time_ms,
            top_k,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Efficiency {
    Excellent,
    Good,
    NeedsOptimization,
}

impl Efficiency {
    pub fn from_millis(total_ms: u64) -> Self {
        match total_ms {
            0..=29_999 => Efficiency::Excellent,
            30_000..=59_999 => Efficiency::Good,
            _ => Efficiency::NeedsOptimization,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    pub total_processing_time_ms: u64,
    pub search_time_ms: u64,
    pub analysis_time_ms: u64,
    pub efficiency: Efficiency,
}

impl Performance {
    fn measure(start: Instant, search_time_ms: u64, analysis_time_ms: u64) -> Self {
        let total = start.elapsed().as_millis() as u64;
        Self {
            total_processing_time_ms: total,
            search_time_ms,
            analysis_time_ms,
            efficiency: Efficiency::from_millis(total),
        }
    }
}

/// Answer produced by the tree-of-thoughts strategy of a smart search.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThoughtAnswer {
    pub question: String,
    pub answer: String,
    pub thought_process: Vec<Thought>,
    pub images_used: usize,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SmartAnswer {
    Single(AnswerResult),
    Multi(AggregateAnswer),
    Thoughts(ThoughtAnswer),
}

impl SmartAnswer {
    pub fn text(&self) -> &str {
        match self {
            SmartAnswer::Single(a) => &a.answer,
            SmartAnswer::Multi(a) => &a.answer,
            SmartAnswer::Thoughts(a) => &a.answer,
        }
    }

    fn processing_time_ms(&self) -> u64 {
        match self {
            SmartAnswer::Single(a) => a.processing_time_ms,
            SmartAnswer::Multi(a) => a.processing_time_ms,
            SmartAnswer::Thoughts(a) => a.processing_time_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartSearchMetadata {
    pub request_id: String,
    pub ai_selected: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartSearchResponse {
    pub method: Strategy,
    pub question_analysis: QuestionAnalysis,
    pub search: SearchSummary,
    pub answer: SmartAnswer,
    pub performance: Performance,
    pub metadata: SmartSearchMetadata,
}

/// Search followed by a multi-image answer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiAnswerResponse {
    pub search: SearchSummary,
    pub answer: AggregateAnswer,
    pub performance: Performance,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotWithImagesResponse {
    pub search: SearchSummary,
    pub average_similarity: f32,
    #[serde(flatten)]
    pub report: ThoughtTreeReport,
    pub performance: Performance,
}

#[derive(Clone)]
pub struct Orchestrator {
    ctx: AppContext,
}

impl Orchestrator {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn health(&self) -> HealthReport {
        self.ctx.health()
    }

    pub async fn search(&self, request: SearchRequest) -> AppResult<Arc<SearchResult>> {
        let request = request.validated()?;
        self.ctx
            .search
            .search(&request.question, request.top_k)
            .instrument(request_span("search"))
            .await
    }

    pub fn classify(&self, request: ClassifyRequest) -> AppResult<QuestionAnalysis> {
        let request = request.validated()?;
        Ok(classify(&request.question))
    }

    /// Answer from a caller-named image.
    pub async fn answer(&self, request: AnswerRequest) -> AppResult<AnswerResult> {
        let request = request.validated()?;
        let path = self.ctx.config.resolve_image_path(&request.image_path);
        if !path.exists() {
            return Err(AppError::validation(
                "imagePath",
                format!("image not found: {}", request.image_path),
            ));
        }

        Ok(self
            .ctx
            .answers
            .answer_single(&request.question, &path)
            .instrument(request_span("answer"))
            .await)
    }

    pub async fn answer_multiple(&self, request: MultiAnswerRequest) -> AppResult<MultiAnswerResponse> {
        self.search_then_answer(request.validated()?.into_parts(), "answer_multiple")
            .await
    }

    pub async fn search_and_answer(
        &self,
        request: MultiAnswerRequest,
    ) -> AppResult<MultiAnswerResponse> {
        self.search_then_answer(request.validated()?.into_parts(), "search_and_answer")
            .await
    }

    pub async fn comprehensive_search(
        &self,
        request: ComprehensiveSearchRequest,
    ) -> AppResult<MultiAnswerResponse> {
        let request = request.validated()?;
        self.search_then_answer((request.question, request.top_k), "comprehensive_search")
            .await
    }

    async fn search_then_answer(
        &self,
        (question, top_k): (String, usize),
        method: &'static str,
    ) -> AppResult<MultiAnswerResponse> {
        async {
            let start = Instant::now();
            let result = self.ctx.search.search(&question, top_k).await?;
            let answer = self.ctx.answers.answer_multiple(&question, &result.results).await;
            let performance =
                Performance::measure(start, result.processing_time_ms, answer.processing_time_ms);

            Ok::<_, AppError>(MultiAnswerResponse {
                search: SearchSummary::from_result(&result, top_k),
                answer,
                performance,
            })
        }
        .instrument(request_span(method))
        .await
    }

    pub async fn tree_of_thoughts(&self, request: TreeOfThoughtsRequest) -> AppResult<ThoughtTreeReport> {
        let request = request.validated()?;
        let tot = TreeOfThoughts::new(
            self.ctx.generator.clone(),
            request.max_depth,
            request.branching_factor,
        )?;
        Ok(tot
            .run(&request.problem, &request.context)
            .instrument(request_span("tree_of_thoughts"))
            .await)
    }

    /// Search on the problem and reason with the found documents as context.
    pub async fn tot_with_images(&self, request: TotWithImagesRequest) -> AppResult<TotWithImagesResponse> {
        let request = request.validated()?;
        let tot = TreeOfThoughts::new(
            self.ctx.generator.clone(),
            request.max_depth,
            request.branching_factor,
        )?;

        async {
            let start = Instant::now();
            let result = self.ctx.search.search(&request.problem, request.top_k).await?;

            let mut context = request.context.clone();
            if !context.is_empty() {
                context.push_str("\n\n");
            }
            context.push_str("Reference documents:\n");
            context.push_str(&document_list(&result.results, true));

            let report = tot.run(&request.problem, &context).await;
            let average_similarity = average_similarity(&result.results);
            let performance =
                Performance::measure(start, result.processing_time_ms, report.processing_time_ms);

            Ok::<_, AppError>(TotWithImagesResponse {
                search: SearchSummary::from_result(&result, request.top_k),
                average_similarity,
                report,
                performance,
            })
        }
        .instrument(request_span("tot_with_images"))
        .await
    }

    /// Classify the question, then run the chosen (or forced) strategy.
    pub async fn smart_search(&self, request: SmartSearchRequest) -> AppResult<SmartSearchResponse> {
        let request = request.validated()?;
        let forced = request.forced_strategy()?;
        let analysis = classify(&request.question);
        let method = forced.unwrap_or(analysis.recommended_method);
        let request_id = Uuid::new_v4().to_string();

        let span = info_span!("request", id = %request_id, method = method.as_str());
        async {
            let start = Instant::now();
            let question = request.question.as_str();
            info!(
                question = %preview(question, 50),
                auto = forced.is_none(),
                estimated_docs = analysis.estimated_docs,
                "Smart search"
            );

            let (search, answer) = match method {
                Strategy::Simple => self.run_simple(question).await?,
                Strategy::Comprehensive => {
                    let top_k = (analysis.estimated_docs * 2).min(COMPREHENSIVE_MAX_TOP_K);
                    self.run_multi(question, top_k).await?
                }
                Strategy::TreeOfThoughts => {
                    let top_k = analysis.estimated_docs.min(TOT_MAX_TOP_K);
                    self.run_thoughts(question, top_k).await?
                }
                Strategy::EnhancedMulti => {
                    self.run_expanded(question, analysis.estimated_docs).await?
                }
            };

            let performance = Performance::measure(
                start,
                search.search_time_ms,
                answer.processing_time_ms(),
            );
            info!(
                method = method.as_str(),
                total_ms = performance.total_processing_time_ms,
                "Smart search complete"
            );

            Ok::<_, AppError>(SmartSearchResponse {
                method,
                question_analysis: analysis.clone(),
                search,
                answer,
                performance,
                metadata: SmartSearchMetadata {
                    request_id: request_id.clone(),
                    ai_selected: forced.is_none(),
                    timestamp: Utc::now(),
                },
            })
        }
        .instrument(span)
        .await
    }

    async fn run_simple(&self, question: &str) -> AppResult<(SearchSummary, SmartAnswer)> {
        let result = self.ctx.search.search(question, SIMPLE_TOP_K).await?;
        let top = result
            .top()
            .ok_or_else(|| AppError::NotReady("Search returned no documents".to_string()))?;
        let answer = self
            .ctx
            .answers
            .answer_single(question, std::path::Path::new(&top.image_path))
            .await;
        Ok((
            SearchSummary::from_result(&result, SIMPLE_TOP_K),
            SmartAnswer::Single(answer),
        ))
    }

    async fn run_multi(&self, question: &str, top_k: usize) -> AppResult<(SearchSummary, SmartAnswer)> {
        let result = self.ctx.search.search(question, top_k).await?;
        let answer = self.ctx.answers.answer_multiple(question, &result.results).await;
        Ok((
            SearchSummary::from_result(&result, top_k),
            SmartAnswer::Multi(answer),
        ))
    }

    async fn run_thoughts(&self, question: &str, top_k: usize) -> AppResult<(SearchSummary, SmartAnswer)> {
        let result = self.ctx.search.search(question, top_k).await?;
        let context = format!(
            "Reference material:\n{}",
            document_list(&result.results, false)
        );

        let tot = TreeOfThoughts::new(self.ctx.generator.clone(), SMART_TOT_DEPTH, SMART_TOT_BRANCHING)?;
        let report = tot.run(question, &context).await;

        Ok((
            SearchSummary::from_result(&result, top_k),
            SmartAnswer::Thoughts(ThoughtAnswer {
                question: question.to_string(),
                answer: report.final_answer,
                thought_process: report.best_path,
                images_used: result.results.len(),
                processing_time_ms: report.processing_time_ms,
            }),
        ))
    }

    /// Search every expansion of the question and answer from the merged list.
    async fn run_expanded(&self, question: &str, top_k: usize) -> AppResult<(SearchSummary, SmartAnswer)> {
        let variants = expand_query(question);
        let per_variant = top_k.div_ceil(variants.len());

        let results = try_join_all(
            variants
                .iter()
                .map(|variant| self.ctx.search.search(variant, per_variant)),
        )
        .await?;

        let merged = merge_results(results.iter().map(|r| r.as_ref()), top_k);
        let search_time_ms = results.iter().map(|r| r.processing_time_ms).sum();
        info!(
            variants = variants.len(),
            merged = merged.len(),
            "Expanded search merged"
        );

        let answer = self.ctx.answers.answer_multiple(question, &merged).await;
        Ok((
            SearchSummary {
                question: question.to_string(),
                top_results: merged,
                search_time_ms,
                top_k,
            },
            SmartAnswer::Multi(answer),
        ))
    }
}

impl MultiAnswerRequest {
    fn into_parts(self) -> (String, usize) {
        (self.question, self.top_k)
    }
}

fn request_span(method: &'static str) -> tracing::Span {
    info_span!("request", id = %Uuid::new_v4(), method)
}

/// One line per document: `Document N: file` with optional relevance.
fn document_list(results: &[RankedImage], with_relevance: bool) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            if with_relevance {
                format!(
                    "Document {}: {} (relevance {}%)",
                    i + 1,
                    r.file_name(),
                    r.relevance_percent()
                )
            } else {
                format!("Document {}: {}", i + 1, r.file_name())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn average_similarity(results: &[RankedImage]) -> f32 {
    if results.is_empty() {
        return 0.0;
    }
    results.iter().map(|r| r.similarity).sum::<f32>() / results.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(path: &str, similarity: f32) -> RankedImage {
        RankedImage {
            index: 0,
            similarity,
            image_path: path.to_string(),
        }
    }

    #[test]
    fn test_efficiency_bands() {
        assert_eq!(Efficiency::from_millis(0), Efficiency::Excellent);
        assert_eq!(Efficiency::from_millis(29_999), Efficiency::Excellent);
        assert_eq!(Efficiency::from_millis(30_000), Efficiency::Good);
        assert_eq!(Efficiency::from_millis(60_000), Efficiency::NeedsOptimization);
    }

    #[test]
    fn test_document_list() {
        let results = vec![ranked("/img/a.png", 0.912), ranked("b.jpg", 0.5)];
        assert_eq!(
            document_list(&results, true),
            "Document 1: a.png (relevance 91.2%)\nDocument 2: b.jpg (relevance 50.0%)"
        );
        assert_eq!(
            document_list(&results, false),
            "Document 1: a.png\nDocument 2: b.jpg"
        );
    }

    #[test]
    fn test_average_similarity() {
        assert_eq!(average_similarity(&[]), 0.0);
        let results = vec![ranked("a", 0.5), ranked("b", 0.7)];
        assert!((average_similarity(&results) - 0.6).abs() < 1e-6);
    }
}
