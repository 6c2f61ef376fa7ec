//! Generation provider crate for Lectern.
//!
//! This crate provides a provider-agnostic abstraction for multimodal
//! generation: a prompt plus optional images in, text out.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime (default)
//! - **Gemini**: Google generateContent API
//!
//! # Example
//! ```no_run
//! use lectern_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Hello, world!", "llava");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{ImagePart, LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{GeminiClient, OllamaClient};
pub use types::ProviderType;
