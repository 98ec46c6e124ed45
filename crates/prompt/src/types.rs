//! Prompt types for docqa.

use serde::{Deserialize, Serialize};

/// Identifier of the built-in answer template.
pub const DEFAULT_TEMPLATE_ID: &str = "rag.answer.default";

/// Instructional prefix, retrieved context, then the question.
///
/// Variables: `context` (chunk texts joined by newlines, nearest first) and
/// `question`.
pub const DEFAULT_ANSWER_TEMPLATE: &str = "Answer the question based only on the context below.\n\nContext:\n{{context}}\n\nQuestion: {{question}}\nAnswer:";

/// A rendered prompt ready for the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// Prompt text
    pub user: String,

    /// How the prompt was assembled
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about how a prompt was built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    /// Template the prompt was rendered from
    pub source_prompt_id: String,

    /// Number of retrieved chunks placed in the context block
    pub context_chunks: usize,
}

impl BuiltPrompt {
    /// Create a new built prompt.
    pub fn new(user: String, source_prompt_id: String, context_chunks: usize) -> Self {
        Self {
            user,
            metadata: BuiltPromptMetadata {
                source_prompt_id,
                context_chunks,
            },
        }
    }
}
