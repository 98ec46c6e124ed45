//! Prompt rendering for docqa.
//!
//! This crate turns a question and its retrieved context into the text sent
//! to the generator:
//! - Handlebars template rendering (no HTML escaping)
//! - A built-in answer template, overridable from configuration

pub mod builder;
pub mod types;

// Re-export main types
pub use builder::PromptBuilder;
pub use types::{BuiltPrompt, BuiltPromptMetadata, DEFAULT_ANSWER_TEMPLATE};
