//! Error types for docqa.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! validation, external backends (embedding and generation), knowledge,
//! prompt, voice task, and authentication errors.

use thiserror::Error;

/// Unified error type for docqa.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// We never panic, errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad input shape (mismatched counts, wrong dimensions, undecodable uploads)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Embedding or generation backend unreachable or returned garbage
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Knowledge base and RAG errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Voice task list errors
    #[error("Task error: {0}")]
    Task(String),

    /// Credential and token errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Re-tag a provider failure as an external service failure.
    ///
    /// Other variants pass through untouched.
    pub fn into_external(self) -> Self {
        match self {
            AppError::Llm(msg) => AppError::ExternalService(msg),
            other => other,
        }
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
