//! Renders a named prompt and sends it, with any images, to the model.

use lectern_core::AppResult;
use lectern_llm::{ImagePart, LlmClient, LlmRequest};
use lectern_prompt::PromptLibrary;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct Generator {
    client: Arc<dyn LlmClient>,
    model: String,
    prompts: Arc<PromptLibrary>,
}

impl Generator {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, prompts: Arc<PromptLibrary>) -> Self {
        Self {
            client,
            model: model.into(),
            prompts,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Render `prompt_id` with `variables` and return the generated text.
    pub async fn generate(
        &self,
        prompt_id: &str,
        variables: &[(&str, String)],
        images: Vec<ImagePart>,
    ) -> AppResult<String> {
        let built = self.prompts.render(prompt_id, variables)?;
        let prompt_chars = built.char_count();

        let mut request = LlmRequest::new(built.user, self.model.clone());
        if let Some(system) = built.system {
            request = request.with_system(system);
        }
        for image in images {
            request = request.with_image(image);
        }

        debug!(
            prompt = prompt_id,
            provider = self.client.provider_name(),
            images = request.images.len(),
            prompt_chars,
            "Sending generation request"
        );

        let response = self.client.complete(&request).await?;
        Ok(response.content)
    }
}
