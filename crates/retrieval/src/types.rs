use serde::{Deserialize, Serialize};

/// One document in a ranked result list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedImage {
    /// Position of the document in the loaded index
    pub index: usize,
    /// Cosine similarity in [-1, 1]
    pub similarity: f32,
    pub image_path: String,
}

impl RankedImage {
    /// File name component of the image path, for display.
    pub fn file_name(&self) -> &str {
        std::path::Path::new(&self.image_path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.image_path)
    }

    /// Similarity as a percentage with one decimal, e.g. `"87.3"`.
    pub fn relevance_percent(&self) -> String {
        format!("{:.1}", self.similarity * 100.0)
    }
}

/// Outcome of a similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub question: String,
    pub results: Vec<RankedImage>,
    pub processing_time_ms: u64,
}

impl SearchResult {
    pub fn top(&self) -> Option<&RankedImage> {
        self.results.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranked_image_display_helpers() {
        let ranked = RankedImage {
            index: 0,
            similarity: 0.8734,
            image_path: "/data/images/page_12.png".to_string(),
        };
        assert_eq!(ranked.file_name(), "page_12.png");
        assert_eq!(ranked.relevance_percent(), "87.3");
    }

    #[test]
    fn test_search_result_serializes_camel_case() {
        let result = SearchResult {
            question: "q".to_string(),
            results: vec![RankedImage {
                index: 2,
                similarity: 0.5,
                image_path: "a.png".to_string(),
            }],
            processing_time_ms: 3,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["processingTimeMs"], 3);
        assert_eq!(json["results"][0]["imagePath"], "a.png");
        assert_eq!(result.top().unwrap().index, 2);
    }
}
