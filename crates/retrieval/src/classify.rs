//! Keyword heuristics that route a question to a processing strategy.

use lectern_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

const QUESTION_MARKERS: &[&str] = &["อะไร", "ไง", "คือ", "what", "how", "why", "explain"];
const SUMMARY_MARKERS: &[&str] = &["สรุป", "ทั้งหมด", "รวม", "ทุก", "summary", "all", "entire"];
const COMPLEX_MARKERS: &[&str] = &[
    "เปรียบเทียบ",
    "วิเคราะห์",
    "อธิบาย",
    "ยกตัวอย่าง",
    "compare",
    "analyze",
    "detail",
];
const MULTI_DOC_MARKERS: &[&str] = &["activity", "กิจกรรม", "หลาย", "ต่าง", "แต่ละ", "multiple"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Comprehensive,
    Analytical,
    MultiDocument,
}

/// How a question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Simple,
    Comprehensive,
    TreeOfThoughts,
    EnhancedMulti,
}

impl Strategy {
    pub fn parse(s: &str) -> AppResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Ok(Strategy::Simple),
            "comprehensive" => Ok(Strategy::Comprehensive),
            "tree_of_thoughts" => Ok(Strategy::TreeOfThoughts),
            "enhanced_multi" => Ok(Strategy::EnhancedMulti),
            other => Err(AppError::validation(
                "forceMethod",
                format!(
                    "unknown method '{}' (expected auto, simple, comprehensive, tree_of_thoughts or enhanced_multi)",
                    other
                ),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Simple => "simple",
            Strategy::Comprehensive => "comprehensive",
            Strategy::TreeOfThoughts => "tree_of_thoughts",
            Strategy::EnhancedMulti => "enhanced_multi",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnalysis {
    pub complexity: Complexity,
    pub estimated_docs: usize,
    pub recommended_method: Strategy,
    pub has_question: bool,
    pub has_summary: bool,
    pub has_complex: bool,
    pub has_multi_doc: bool,
    pub word_count: usize,
}

/// Classify a question by keyword presence.
///
/// Rules, first match wins:
/// 1. summary and multi-document markers → comprehensive, 8 documents
/// 2. complex markers → tree of thoughts, 6 documents
/// 3. multi-document markers → enhanced multi, 5 documents
/// 4. otherwise → simple, 3 documents
///
/// Thai is written without spaces, so a Thai marker matches any token that
/// contains it. Latin markers must equal a whole token.
pub fn classify(question: &str) -> QuestionAnalysis {
    let lower = question.to_lowercase();
    let tokens: Vec<&str> = lower.split_whitespace().collect();

    let has = |markers: &[&str]| {
        tokens
            .iter()
            .any(|token| markers.iter().any(|m| marker_matches(token, m)))
    };

    let has_question = has(QUESTION_MARKERS);
    let has_summary = has(SUMMARY_MARKERS);
    let has_complex = has(COMPLEX_MARKERS);
    let has_multi_doc = has(MULTI_DOC_MARKERS);

    let (complexity, estimated_docs, recommended_method) = if has_summary && has_multi_doc {
        (Complexity::Comprehensive, 8, Strategy::Comprehensive)
    } else if has_complex {
        (Complexity::Analytical, 6, Strategy::TreeOfThoughts)
    } else if has_multi_doc {
        (Complexity::MultiDocument, 5, Strategy::EnhancedMulti)
    } else {
        (Complexity::Simple, 3, Strategy::Simple)
    };

    QuestionAnalysis {
        complexity,
        estimated_docs,
        recommended_method,
        has_question,
        has_summary,
        has_complex,
        has_multi_doc,
        word_count: tokens.len(),
    }
}

fn marker_matches(token: &str, marker: &str) -> bool {
    if marker.is_ascii() {
        token.trim_matches(|c: char| !c.is_alphanumeric()) == marker
    } else {
        token.contains(marker)
    }
}
