//! Error types for the Lectern question-answering service.
//!
//! This module defines a unified error enum covering every failure category
//! in the workspace: configuration, artifact loading, input validation,
//! readiness, provider calls, prompt rendering and serialization.

use thiserror::Error;

/// Unified error type for Lectern.
///
/// All fallible functions return `Result<T, AppError>`. Provider failures that
/// the services absorb into degraded responses are still represented here
/// before they are converted.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing request input (client's fault, never retried)
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// The document index is not loaded or holds no documents
    #[error("Index not ready: {0}")]
    NotReady(String),

    /// Startup artifacts are missing or malformed
    #[error("Failed to load index: {0}")]
    Load(String),

    /// Embedding provider errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vectors of different lengths were compared
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Generative model provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Every image analysis in a batch failed
    #[error("All {attempted} image analyses failed")]
    AllAnalysesFailed { attempted: usize },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Build a validation error for a named request field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// True when the caller supplied bad input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::Validation { .. })
    }

    /// True when the service cannot answer yet.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, AppError::NotReady(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
