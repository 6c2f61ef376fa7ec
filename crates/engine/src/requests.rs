//! Request bodies for every operation, validated before any work starts.
//!
//! Strings are trimmed and must be non-empty; numeric parameters are
//! checked against per-operation bounds.

use lectern_core::{AppError, AppResult};
use lectern_retrieval::Strategy;
use serde::Deserialize;

pub trait Validate: Sized {
    /// Normalise fields in place and check bounds.
    fn validate(&mut self) -> AppResult<()>;

    fn validated(mut self) -> AppResult<Self> {
        self.validate()?;
        Ok(self)
    }
}

fn required(field: &str, value: &mut String) -> AppResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(field, "is required and must not be empty"));
    }
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
    Ok(())
}

fn bounded(field: &str, value: usize, max: usize) -> AppResult<()> {
    if value == 0 || value > max {
        return Err(AppError::validation(
            field,
            format!("must be between 1 and {}, got {}", max, value),
        ));
    }
    Ok(())
}

fn default_top_k() -> usize {
    4
}

fn default_comprehensive_top_k() -> usize {
    12
}

fn default_depth() -> usize {
    3
}

fn default_branching() -> usize {
    3
}

fn default_method() -> String {
    "auto".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub question: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Validate for SearchRequest {
    fn validate(&mut self) -> AppResult<()> {
        required("question", &mut self.question)?;
        bounded("topK", self.top_k, 10)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub question: String,
    pub image_path: String,
}

impl Validate for AnswerRequest {
    fn validate(&mut self) -> AppResult<()> {
        required("question", &mut self.question)?;
        required("imagePath", &mut self.image_path)
    }
}

/// Shared by `answerMultiple` and `searchAndAnswer`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiAnswerRequest {
    pub question: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Validate for MultiAnswerRequest {
    fn validate(&mut self) -> AppResult<()> {
        required("question", &mut self.question)?;
        bounded("topK", self.top_k, 15)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComprehensiveSearchRequest {
    pub question: String,
    #[serde(default = "default_comprehensive_top_k")]
    pub top_k: usize,
}

impl Validate for ComprehensiveSearchRequest {
    fn validate(&mut self) -> AppResult<()> {
        required("question", &mut self.question)?;
        bounded("topK", self.top_k, 20)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyRequest {
    pub question: String,
}

impl Validate for ClassifyRequest {
    fn validate(&mut self) -> AppResult<()> {
        required("question", &mut self.question)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeOfThoughtsRequest {
    pub problem: String,
    #[serde(default)]
    pub context: String,
    #[serde(default = "default_depth")]
    pub max_depth: usize,
    #[serde(default = "default_branching")]
    pub branching_factor: usize,
}

impl Validate for TreeOfThoughtsRequest {
    fn validate(&mut self) -> AppResult<()> {
        required("problem", &mut self.problem)?;
        bounded("maxDepth", self.max_depth, 5)?;
        bounded("branchingFactor", self.branching_factor, 5)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotWithImagesRequest {
    pub problem: String,
    #[serde(default)]
    pub context: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_depth")]
    pub max_depth: usize,
    #[serde(default = "default_branching")]
    pub branching_factor: usize,
}

impl Validate for TotWithImagesRequest {
    fn validate(&mut self) -> AppResult<()> {
        required("problem", &mut self.problem)?;
        bounded("topK", self.top_k, 12)?;
        bounded("maxDepth", self.max_depth, 4)?;
        bounded("branchingFactor", self.branching_factor, 5)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartSearchRequest {
    pub question: String,
    #[serde(default = "default_method")]
    pub force_method: String,
}

impl SmartSearchRequest {
    /// The forced strategy, or `None` for automatic selection.
    pub fn forced_strategy(&self) -> AppResult<Option<Strategy>> {
        if self.force_method.trim().eq_ignore_ascii_case("auto") {
            Ok(None)
        } else {
            Strategy::parse(&self.force_method).map(Some)
        }
    }
}

impl Validate for SmartSearchRequest {
    fn validate(&mut self) -> AppResult<()> {
        required("question", &mut self.question)?;
        self.forced_strategy().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse<T: for<'de> Deserialize<'de>>(value: serde_json::Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_search_defaults_and_trim() {
        let request: SearchRequest = parse(json!({ "question": "  what is osmosis?  " }));
        let request = request.validated().unwrap();
        assert_eq!(request.question, "what is osmosis?");
        assert_eq!(request.top_k, 4);
    }

    #[test]
    fn test_empty_question_rejected() {
        let request: SearchRequest = parse(json!({ "question": "   " }));
        let err = request.validated().unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("question"));
    }

    #[test]
    fn test_top_k_bounds() {
        let request: SearchRequest = parse(json!({ "question": "q", "topK": 11 }));
        let err = request.validated().unwrap_err();
        assert!(err.to_string().contains("topK"));

        let request: SearchRequest = parse(json!({ "question": "q", "topK": 0 }));
        assert!(request.validated().is_err());

        let request: ComprehensiveSearchRequest = parse(json!({ "question": "q" }));
        assert_eq!(request.validated().unwrap().top_k, 12);

        let request: ComprehensiveSearchRequest = parse(json!({ "question": "q", "topK": 20 }));
        assert!(request.validated().is_ok());
    }

    #[test]
    fn test_tree_of_thoughts_bounds() {
        let request: TreeOfThoughtsRequest = parse(json!({ "problem": "p", "maxDepth": 5 }));
        let request = request.validated().unwrap();
        assert_eq!(request.branching_factor, 3);
        assert_eq!(request.context, "");

        let request: TreeOfThoughtsRequest = parse(json!({ "problem": "p", "branchingFactor": 6 }));
        assert!(request.validated().is_err());

        let request: TotWithImagesRequest = parse(json!({ "problem": "p", "maxDepth": 5 }));
        let err = request.validated().unwrap_err();
        assert!(err.to_string().contains("maxDepth"));

        let request: TotWithImagesRequest = parse(json!({ "problem": "p", "topK": 13 }));
        assert!(request.validated().is_err());
    }

    #[test]
    fn test_smart_search_method() {
        let request: SmartSearchRequest = parse(json!({ "question": "q" }));
        let request = request.validated().unwrap();
        assert_eq!(request.forced_strategy().unwrap(), None);

        let request: SmartSearchRequest =
            parse(json!({ "question": "q", "forceMethod": "comprehensive" }));
        assert_eq!(
            request.validated().unwrap().forced_strategy().unwrap(),
            Some(Strategy::Comprehensive)
        );

        let request: SmartSearchRequest = parse(json!({ "question": "q", "forceMethod": "guess" }));
        assert!(request.validated().unwrap_err().is_client_error());
    }

    #[test]
    fn test_answer_requires_image_path() {
        let request: AnswerRequest = parse(json!({ "question": "q", "imagePath": "" }));
        assert!(request.validated().is_err());
    }
}
