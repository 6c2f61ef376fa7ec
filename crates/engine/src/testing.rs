//! Test doubles shared by the unit tests of this crate.

use async_trait::async_trait;
use lectern_core::AppResult;
use lectern_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use lectern_prompt::PromptLibrary;
use parking_lot::Mutex;
use std::sync::Arc;

type Responder = Box<dyn Fn(usize, &LlmRequest) -> AppResult<String> + Send + Sync>;

/// LLM client whose answers come from a closure; every request is recorded.
pub struct ScriptedClient {
    responder: Responder,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedClient {
    /// Respond by call number (0-based).
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(usize) -> AppResult<String> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(move |n, _| respond(n)),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Respond by inspecting the request.
    pub fn from_requests<F>(respond: F) -> Self
    where
        F: Fn(&LlmRequest) -> AppResult<String> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(move |_, request| respond(request)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let n = {
            let mut requests = self.requests.lock();
            requests.push(request.clone());
            requests.len() - 1
        };
        let content = (self.responder)(n, request)?;
        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }
}

pub fn prompts() -> Arc<PromptLibrary> {
    Arc::new(
        PromptLibrary::builtin()
            .unwrap()
            .with_persona("Test Assistant", "English"),
    )
}
