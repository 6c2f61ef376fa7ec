//! Answers built from one or several document images.
//!
//! Single-image answers retry once with a shorter prompt. Multi-image
//! answers extract each page concurrently, then synthesise one answer from
//! the pages that succeeded.

use crate::generator::Generator;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use lectern_core::{preview, AppError, AppResult};
use lectern_llm::ImagePart;
use lectern_prompt::ids;
use lectern_retrieval::RankedImage;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, warn};

/// Images analysed per multi-image answer.
pub const MAX_IMAGES: usize = 4;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResult {
    pub question: String,
    pub image_path: String,
    pub answer: String,
    pub processing_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_size_bytes: Option<u64>,
    pub error: bool,
    pub timestamp: DateTime<Utc>,
}

/// Extraction outcome for one page of a multi-image answer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub image_path: String,
    pub similarity: f32,
    /// Extracted content, or the failure message
    pub analysis: String,
    pub succeeded: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateAnswer {
    pub question: String,
    pub images_analyzed: usize,
    pub image_paths: Vec<String>,
    pub answer: String,
    pub processing_time_ms: u64,
    pub analyses: Vec<AnalysisResult>,
    pub average_similarity: f32,
    pub failed_analyses: usize,
    pub error: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AnswerService {
    generator: Generator,
}

impl AnswerService {
    pub fn new(generator: Generator) -> Self {
        Self { generator }
    }

    /// Answer `question` from a single page image.
    ///
    /// Never fails: problems are reported in the answer text with
    /// `error` set.
    pub async fn answer_single(&self, question: &str, image_path: &Path) -> AnswerResult {
        let start = Instant::now();
        let display_path = image_path.to_string_lossy().into_owned();

        info!(
            question = %preview(question, 50),
            image = %display_path,
            "Answering from single image"
        );

        match self.try_answer_single(question, image_path).await {
            Ok((answer, size)) => {
                let processing_time_ms = start.elapsed().as_millis() as u64;
                info!(processing_time_ms, answer_len = answer.len(), "Answer generated");
                AnswerResult {
                    question: question.to_string(),
                    image_path: display_path,
                    answer,
                    processing_time_ms,
                    image_size_bytes: Some(size),
                    error: false,
                    timestamp: Utc::now(),
                }
            }
            Err(e) => {
                error!(image = %display_path, error = %e, "Single-image answer failed");
                AnswerResult {
                    question: question.to_string(),
                    image_path: display_path,
                    answer: format!(
                        "Sorry, the page could not be analysed: {}\n\nPlease check that the image file is accessible and readable, then try again.",
                        e
                    ),
                    processing_time_ms: start.elapsed().as_millis() as u64,
                    image_size_bytes: None,
                    error: true,
                    timestamp: Utc::now(),
                }
            }
        }
    }

    async fn try_answer_single(&self, question: &str, image_path: &Path) -> AppResult<(String, u64)> {
        if !tokio::fs::try_exists(image_path).await.unwrap_or(false) {
            return Err(AppError::Other(format!(
                "Image file not found: {}",
                image_path.display()
            )));
        }

        let image = ImagePart::from_path(image_path).await?;
        let size = image.data.len() as u64;
        let vars = [("question", question.to_string())];

        match self
            .generator
            .generate(ids::ANSWER_SINGLE, &vars, vec![image.clone()])
            .await
        {
            Ok(answer) => Ok((answer, size)),
            Err(e) => {
                warn!(error = %e, "Answer generation failed, retrying with simplified prompt");
                let answer = self
                    .generator
                    .generate(ids::ANSWER_SINGLE_FALLBACK, &vars, vec![image])
                    .await?;
                Ok((answer, size))
            }
        }
    }

    /// Answer from up to [`MAX_IMAGES`] ranked pages.
    ///
    /// Never fails: if every extraction or the synthesis fails the result is
    /// a degraded aggregate with `error` set and `images_analyzed == 0`.
    pub async fn answer_multiple(&self, question: &str, ranked: &[RankedImage]) -> AggregateAnswer {
        let start = Instant::now();
        let analyses = self.analyze_all(question, ranked).await;

        match self.synthesize(question, analyses.clone(), start).await {
            Ok(aggregate) => aggregate,
            Err(e) => {
                error!(question = %preview(question, 50), error = %e, "Multi-image answer failed");
                let failed_analyses = analyses.iter().filter(|a| !a.succeeded).count();
                AggregateAnswer {
                    question: question.to_string(),
                    images_analyzed: 0,
                    image_paths: Vec::new(),
                    answer: format!(
                        "Sorry, the documents could not be analysed: {}\n\nPlease try again or simplify the question.",
                        e
                    ),
                    processing_time_ms: start.elapsed().as_millis() as u64,
                    analyses,
                    average_similarity: 0.0,
                    failed_analyses,
                    error: true,
                    timestamp: Utc::now(),
                }
            }
        }
    }

    /// Like [`answer_multiple`](Self::answer_multiple) but surfaces failures
    /// as errors, `AllAnalysesFailed` when no page could be extracted.
    pub async fn try_answer_multiple(
        &self,
        question: &str,
        ranked: &[RankedImage],
    ) -> AppResult<AggregateAnswer> {
        let start = Instant::now();
        let analyses = self.analyze_all(question, ranked).await;
        self.synthesize(question, analyses, start).await
    }

    async fn analyze_all(&self, question: &str, ranked: &[RankedImage]) -> Vec<AnalysisResult> {
        let selected = &ranked[..ranked.len().min(MAX_IMAGES)];
        info!(
            question = %preview(question, 50),
            images = selected.len(),
            "Starting multi-image analysis"
        );

        join_all(
            selected
                .iter()
                .enumerate()
                .map(|(i, item)| self.analyze_image(i + 1, item)),
        )
        .await
    }

    async fn analyze_image(&self, order: usize, item: &RankedImage) -> AnalysisResult {
        let outcome: AppResult<String> = async {
            let image = ImagePart::from_path(Path::new(&item.image_path)).await?;
            self.generator
                .generate(ids::ANSWER_EXTRACT, &[], vec![image])
                .await
        }
        .await;

        match outcome {
            Ok(analysis) => {
                info!(
                    order,
                    image = item.file_name(),
                    similarity = item.similarity,
                    content_len = analysis.len(),
                    "Image analysed"
                );
                AnalysisResult {
                    image_path: item.image_path.clone(),
                    similarity: item.similarity,
                    analysis,
                    succeeded: true,
                }
            }
            Err(e) => {
                warn!(order, image = %item.image_path, error = %e, "Image analysis failed");
                AnalysisResult {
                    image_path: item.image_path.clone(),
                    similarity: item.similarity,
                    analysis: format!("Could not analyse this page: {}", e),
                    succeeded: false,
                }
            }
        }
    }

    async fn synthesize(
        &self,
        question: &str,
        analyses: Vec<AnalysisResult>,
        start: Instant,
    ) -> AppResult<AggregateAnswer> {
        let mut succeeded: Vec<&AnalysisResult> = analyses.iter().filter(|a| a.succeeded).collect();
        if succeeded.is_empty() {
            return Err(AppError::AllAnalysesFailed {
                attempted: analyses.len(),
            });
        }
        succeeded.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));

        let combined = combine_analyses(&succeeded);
        let answer = self
            .generator
            .generate(
                ids::ANSWER_SYNTHESIZE,
                &[
                    ("question", question.to_string()),
                    ("documentCount", succeeded.len().to_string()),
                    ("combinedAnalysis", combined),
                ],
                Vec::new(),
            )
            .await?;

        let images_analyzed = succeeded.len();
        let average_similarity =
            succeeded.iter().map(|a| a.similarity).sum::<f32>() / images_analyzed as f32;
        let image_paths = succeeded.iter().map(|a| a.image_path.clone()).collect();
        let failed_analyses = analyses.len() - images_analyzed;
        let processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            images_analyzed,
            failed_analyses,
            processing_time_ms,
            "Multi-image analysis completed"
        );

        Ok(AggregateAnswer {
            question: question.to_string(),
            images_analyzed,
            image_paths,
            answer,
            processing_time_ms,
            analyses,
            average_similarity,
            failed_analyses,
            error: false,
            timestamp: Utc::now(),
        })
    }
}

/// Join page extractions into one context block with provenance headers.
pub fn combine_analyses(analyses: &[&AnalysisResult]) -> String {
    let separator = format!("\n\n{}\n\n", "=".repeat(80));
    analyses
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let file_name = Path::new(&a.image_path)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(&a.image_path);
            format!(
                "Document {} - {} (relevance: {:.1}%)\n{}\n{}",
                i + 1,
                file_name,
                a.similarity * 100.0,
                "=".repeat(50),
                a.analysis
            )
        })
        .collect::<Vec<_>>()
        .join(&separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{prompts, ScriptedClient};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn service(client: Arc<ScriptedClient>) -> AnswerService {
        AnswerService::new(Generator::new(client, "test-model", prompts()))
    }

    fn write_images(dir: &TempDir, names: &[&str]) -> Vec<RankedImage> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let path = dir.path().join(name);
                std::fs::write(&path, format!("image-{}", i)).unwrap();
                RankedImage {
                    index: i,
                    similarity: 0.9 - i as f32 * 0.1,
                    image_path: path.to_string_lossy().into_owned(),
                }
            })
            .collect()
    }

    #[test]
    fn test_combine_analyses_format() {
        let a = AnalysisResult {
            image_path: "/x/page1.png".to_string(),
            similarity: 0.873,
            analysis: "alpha".to_string(),
            succeeded: true,
        };
        let b = AnalysisResult {
            image_path: "page2.jpg".to_string(),
            similarity: 0.5,
            analysis: "beta".to_string(),
            succeeded: true,
        };

        let combined = combine_analyses(&[&a, &b]);
        let expected = format!(
            "Document 1 - page1.png (relevance: 87.3%)\n{}\nalpha\n\n{}\n\nDocument 2 - page2.jpg (relevance: 50.0%)\n{}\nbeta",
            "=".repeat(50),
            "=".repeat(80),
            "=".repeat(50)
        );
        assert_eq!(combined, expected);
    }

    #[tokio::test]
    async fn test_answer_single_success() {
        let dir = TempDir::new().unwrap();
        let images = write_images(&dir, &["page.png"]);
        let client = Arc::new(ScriptedClient::new(|_| Ok("The answer".to_string())));

        let result = service(client.clone())
            .answer_single("What is shown?", Path::new(&images[0].image_path))
            .await;

        assert!(!result.error);
        assert_eq!(result.answer, "The answer");
        assert_eq!(result.image_size_bytes, Some(7));
        assert_eq!(client.calls(), 1);
        assert_eq!(client.requests()[0].images.len(), 1);
    }

    #[tokio::test]
    async fn test_answer_single_retries_with_fallback_prompt() {
        let dir = TempDir::new().unwrap();
        let images = write_images(&dir, &["page.png"]);
        let client = Arc::new(ScriptedClient::new(|n| {
            if n == 0 {
                Err(AppError::Llm("overloaded".to_string()))
            } else {
                Ok("Short answer".to_string())
            }
        }));

        let result = service(client.clone())
            .answer_single("What is shown?", Path::new(&images[0].image_path))
            .await;

        assert!(!result.error);
        assert_eq!(result.answer, "Short answer");
        assert_eq!(client.calls(), 2);
        assert_ne!(client.requests()[0].prompt, client.requests()[1].prompt);
    }

    #[tokio::test]
    async fn test_answer_single_missing_file() {
        let client = Arc::new(ScriptedClient::new(|_| Ok("unused".to_string())));
        let result = service(client.clone())
            .answer_single("q", Path::new("/definitely/not/here.png"))
            .await;

        assert!(result.error);
        assert!(result.answer.contains("not found"));
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_answer_single_both_attempts_fail() {
        let dir = TempDir::new().unwrap();
        let images = write_images(&dir, &["page.png"]);
        let client = Arc::new(ScriptedClient::new(|_| Err(AppError::Llm("down".to_string()))));

        let result = service(client.clone())
            .answer_single("q", Path::new(&images[0].image_path))
            .await;

        assert!(result.error);
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_answer_multiple_all_fail() {
        let dir = TempDir::new().unwrap();
        let images = write_images(&dir, &["a.png", "b.png", "c.png", "d.png"]);
        let client = Arc::new(ScriptedClient::new(|_| Err(AppError::Llm("down".to_string()))));
        let service = service(client);

        let aggregate = service.answer_multiple("q", &images).await;
        assert!(aggregate.error);
        assert_eq!(aggregate.images_analyzed, 0);
        assert_eq!(aggregate.failed_analyses, 4);

        let err = service.try_answer_multiple("q", &images).await.unwrap_err();
        assert!(matches!(err, AppError::AllAnalysesFailed { attempted: 4 }));
    }

    #[tokio::test]
    async fn test_answer_multiple_one_of_four_succeeds() {
        let dir = TempDir::new().unwrap();
        let images = write_images(&dir, &["a.png", "b.png", "c.png", "d.png"]);
        let client = Arc::new(ScriptedClient::from_requests(|request| {
            if request.images.is_empty() {
                // Synthesis call
                return Ok(format!("synthesised:{}", request.prompt.contains("c.png")));
            }
            if request.images[0].data == b"image-2" {
                Ok("content of c".to_string())
            } else {
                Err(AppError::Llm("unreadable".to_string()))
            }
        }));

        let aggregate = service(client).answer_multiple("q", &images).await;
        assert!(!aggregate.error);
        assert_eq!(aggregate.images_analyzed, 1);
        assert_eq!(aggregate.failed_analyses, 3);
        assert_eq!(aggregate.analyses.len(), 4);
        assert!(aggregate.image_paths[0].ends_with("c.png"));
        assert_eq!(aggregate.answer, "synthesised:true");
        assert!((aggregate.average_similarity - 0.7).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_answer_multiple_caps_images() {
        let dir = TempDir::new().unwrap();
        let images = write_images(&dir, &["a.png", "b.png", "c.png", "d.png", "e.png", "f.png"]);
        let client = Arc::new(ScriptedClient::new(|_| Ok("ok".to_string())));

        let aggregate = service(client.clone()).answer_multiple("q", &images).await;
        assert_eq!(aggregate.images_analyzed, MAX_IMAGES);
        // Four extractions and one synthesis
        assert_eq!(client.calls(), MAX_IMAGES + 1);
    }
}
