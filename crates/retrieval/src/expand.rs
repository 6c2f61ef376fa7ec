//! Query expansion and merging of ranked result lists.

use crate::types::{RankedImage, SearchResult};
use std::collections::HashSet;

/// Maximum number of variants, including the original question.
pub const MAX_VARIANTS: usize = 3;

/// Literal substitutions: each matched term yields one variant per synonym.
const SUBSTITUTIONS: &[(&str, &[&str])] = &[
    ("activity", &["กิจกรรม", "แบบฝึกหัด"]),
    ("สอง", &["2", "two"]),
];

/// Generate lexical variants of `question`.
///
/// The original question always comes first. Only the first occurrence of a
/// matched term is replaced.
pub fn expand_query(question: &str) -> Vec<String> {
    let mut variants = vec![question.to_string()];

    for (term, replacements) in SUBSTITUTIONS {
        if !question.contains(term) {
            continue;
        }
        for replacement in *replacements {
            let variant = question.replacen(term, replacement, 1);
            if !variants.contains(&variant) {
                variants.push(variant);
            }
        }
    }

    variants.truncate(MAX_VARIANTS);
    variants
}

/// Merge ranked lists from several searches.
///
/// Duplicates are removed by image path (first occurrence wins), the rest is
/// re-sorted by descending similarity and truncated to `max_results`.
pub fn merge_results<'a, I>(results: I, max_results: usize) -> Vec<RankedImage>
where
    I: IntoIterator<Item = &'a SearchResult>,
{
    let mut seen = HashSet::new();
    let mut merged: Vec<RankedImage> = results
        .into_iter()
        .flat_map(|r| r.results.iter())
        .filter(|r| seen.insert(r.image_path.clone()))
        .cloned()
        .collect();

    merged.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    merged.truncate(max_results);
    merged
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

    fn result(items: Vec<RankedImage>) -> SearchResult {
        SearchResult {
            question: "q".to_string(),
            results: items,
            processing_time_ms: 0,
        }
    }

    #[test]
    fn test_no_match_yields_original_only() {
        assert_eq!(expand_query("What is photosynthesis?"), vec!["What is photosynthesis?"]);
    }

    #[test]
    fn test_activity_variants() {
        let variants = expand_query("activity 2 steps");
        assert_eq!(
            variants,
            vec!["activity 2 steps", "กิจกรรม 2 steps", "แบบฝึกหัด 2 steps"]
        );
    }

    #[test]
    fn test_capped_at_three() {
        let variants = expand_query("activity ที่สอง");
        assert_eq!(variants.len(), MAX_VARIANTS);
        assert_eq!(variants[0], "activity ที่สอง");
    }

    #[test]
    fn test_only_first_occurrence_replaced() {
        let variants = expand_query("สอง และ สอง");
        assert_eq!(variants[1], "2 และ สอง");
        assert_eq!(variants[2], "two และ สอง");
    }

    #[test]
    fn test_merge_dedups_and_sorts() {
        let a = result(vec![ranked("p1.png", 0.9), ranked("p2.png", 0.4)]);
        let b = result(vec![ranked("p2.png", 0.8), ranked("p3.png", 0.6)]);

        let merged = merge_results([&a, &b], 10);
        let paths: Vec<&str> = merged.iter().map(|r| r.image_path.as_str()).collect();
        assert_eq!(paths, vec!["p1.png", "p3.png", "p2.png"]);
        // First occurrence of p2 wins
        assert_eq!(merged[2].similarity, 0.4);
    }

    #[test]
    fn test_merge_truncates() {
        let a = result(vec![ranked("p1.png", 0.9), ranked("p2.png", 0.5), ranked("p3.png", 0.3)]);
        assert_eq!(merge_results([&a], 2).len(), 2);
    }
}
