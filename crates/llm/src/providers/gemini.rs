//! Google Gemini provider implementation.
//!
//! Uses the `generateContent` REST endpoint. Images travel as `inline_data`
//! parts after the text part, in request order.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use base64::Engine as _;
use lectern_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

/// Gemini generateContent client.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_GEMINI_ENDPOINT, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Apply a per-request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> AppResult<Self> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(self)
    }

    fn to_gemini_request(&self, request: &LlmRequest) -> GeminiRequest {
        let mut parts = Vec::with_capacity(1 + request.images.len());
        parts.push(GeminiPart::Text {
            text: request.prompt.clone(),
        });
        for image in &request.images {
            parts.push(GeminiPart::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type.clone(),
                    data: base64::engine::general_purpose::STANDARD.encode(&image.data),
                },
            });
        }

        let generation_config = if request.temperature.is_some() || request.max_tokens.is_some() {
            Some(GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            })
        } else {
            None
        };

        GeminiRequest {
            contents: vec![GeminiContent { parts }],
            system_instruction: request.system.as_ref().map(|system| GeminiContent {
                parts: vec![GeminiPart::Text {
                    text: system.clone(),
                }],
            }),
            generation_config,
        }
    }

    fn convert_response(&self, model: &str, response: GeminiResponse) -> AppResult<LlmResponse> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Llm("Gemini returned no candidates".to_string()))?;

        let content = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let usage = response
            .usage_metadata
            .map(|u| LlmUsage::new(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            model: model.to_string(),
            usage,
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for GeminiClient {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!(
            model = %request.model,
            images = request.images.len(),
            "Sending completion request to Gemini"
        );

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, request.model
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&self.to_gemini_request(request))
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Gemini: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Gemini response: {}", e)))?;

        let converted = self.convert_response(&request.model, gemini_response)?;
        tracing::debug!(chars = converted.content.len(), "Received completion from Gemini");
        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ImagePart;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_request_puts_text_before_images() {
        let client = GeminiClient::new("key");
        let request = LlmRequest::new("Summarise", "gemini-2.5-pro")
            .with_image(ImagePart::new(b"img".to_vec(), "image/jpeg"));

        let body = serde_json::to_value(client.to_gemini_request(&request)).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Summarise");
        assert_eq!(
            body["contents"][0]["parts"][1]["inline_data"]["mime_type"],
            "image/jpeg"
        );
        assert_eq!(body["contents"][0]["parts"][1]["inline_data"]["data"], "aW1n");
        assert!(body.get("generationConfig").is_none());
    }

    #[tokio::test]
    async fn test_complete_joins_candidate_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"parts": [{"text": "Question?"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {"parts": [{"text": "Part one. "}, {"text": "Part two."}]}
                }],
                "usageMetadata": {"promptTokenCount": 8, "candidatesTokenCount": 4}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(server.uri(), "test-key");
        let response = client
            .complete(&LlmRequest::new("Question?", "gemini-2.5-pro"))
            .await
            .unwrap();

        assert_eq!(response.content, "Part one. Part two.");
        assert_eq!(response.usage.total_tokens, 12);
    }

    #[tokio::test]
    async fn test_empty_candidates_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(server.uri(), "k");
        let err = client
            .complete(&LlmRequest::new("q", "gemini-2.5-pro"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }

    #[tokio::test]
    async fn test_http_error_is_llm_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(server.uri(), "k");
        let err = client
            .complete(&LlmRequest::new("q", "gemini-2.5-pro"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }
}
