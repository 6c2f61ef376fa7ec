//! Best-effort parsing of model output into thoughts and scores.
//!
//! Parsing never fails: unparseable text falls back to a typed default.

use regex::Regex;
use std::sync::LazyLock;

/// Score used when none can be read from an evaluation.
pub const DEFAULT_SCORE: u8 = 15;
pub const MAX_SCORE: u8 = 30;

static THOUGHT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\d+\.\s*(?i:approach|แนวทางที่)\s*\d+\s*:\s*(.+)$").expect("valid regex")
});

static SCORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i:score|คะแนน)\s*:\s*(\d+)\s*/\s*30").expect("valid regex")
});

static REASON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)(?:reason|เหตุผล)\s*:\s*(.+)$").expect("valid regex"));

/// Extract numbered approaches, keeping at most `limit`.
///
/// When no line matches, the whole response is a single thought.
pub fn parse_thoughts(response: &str, limit: usize) -> Vec<String> {
    let mut thoughts: Vec<String> = response
        .lines()
        .filter_map(|line| THOUGHT_LINE.captures(line))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty())
        .take(limit.max(1))
        .collect();

    if thoughts.is_empty() {
        thoughts.push(response.trim().to_string());
    }
    thoughts
}

/// Read `Score: X/30`, clamped to 0..=30. `None` when absent.
pub fn parse_score(response: &str) -> Option<u8> {
    let caps = SCORE.captures(response)?;
    // The capture is all digits, so a parse failure means overflow
    let value: u64 = caps.get(1)?.as_str().parse().unwrap_or(u64::MAX);
    Some(value.min(MAX_SCORE as u64) as u8)
}

/// Text after `Reason:`, or the whole response.
pub fn parse_rationale(response: &str) -> String {
    REASON
        .captures(response)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| response.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbered_approaches() {
        let response = "Here are some ideas:\n\
                        1. Approach 1: Start from the definitions\n\
                        2. Approach 2: Work through the example\n\
                        3. approach 3: Compare with last week\n\
                        Good luck!";
        assert_eq!(
            parse_thoughts(response, 3),
            vec![
                "Start from the definitions",
                "Work through the example",
                "Compare with last week"
            ]
        );
    }

    #[test]
    fn test_parse_thai_approaches() {
        let response = "1. แนวทางที่ 1: อ่านโจทย์\n2. แนวทางที่ 2: วาดภาพ";
        assert_eq!(parse_thoughts(response, 5), vec!["อ่านโจทย์", "วาดภาพ"]);
    }

    #[test]
    fn test_parse_limits_count() {
        let response = "1. Approach 1: a\n2. Approach 2: b\n3. Approach 3: c";
        assert_eq!(parse_thoughts(response, 2), vec!["a", "b"]);
    }

    #[test]
    fn test_unstructured_response_is_one_thought() {
        let response = "  Just think about it carefully.  ";
        assert_eq!(parse_thoughts(response, 3), vec!["Just think about it carefully."]);
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score("Score: 24/30 - Reason: clear"), Some(24));
        assert_eq!(parse_score("score : 7 / 30"), Some(7));
        assert_eq!(parse_score("คะแนน: 12/30 - เหตุผล: ดี"), Some(12));
        assert_eq!(parse_score("Score: 45/30"), Some(30));
        assert_eq!(parse_score("Score: 99999999999999999999999/30"), Some(30));
        assert_eq!(parse_score("I would give it a good mark"), None);
    }

    #[test]
    fn test_parse_rationale() {
        assert_eq!(parse_rationale("Score: 20/30 - Reason: well argued"), "well argued");
        assert_eq!(parse_rationale("no structure"), "no structure");
    }
}
