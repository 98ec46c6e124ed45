//! Prompt builder for rendering templates and injecting retrieved context.

use crate::types::{BuiltPrompt, DEFAULT_ANSWER_TEMPLATE, DEFAULT_TEMPLATE_ID};
use docqa_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

const TEMPLATE_NAME: &str = "answer";

/// Renders the answer prompt from a pre-compiled Handlebars template.
///
/// The template is compiled once at construction so a malformed template
/// from configuration fails at startup rather than on the first question.
///
/// # Example
/// ```
/// use docqa_prompt::PromptBuilder;
///
/// let builder = PromptBuilder::answer_default().unwrap();
/// let built = builder.build("What sat?", &["A cat sat.".to_string()]).unwrap();
/// assert!(built.user.contains("Question: What sat?"));
/// ```
pub struct PromptBuilder {
    id: String,
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for PromptBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptBuilder").field("id", &self.id).finish()
    }
}

impl PromptBuilder {
    /// Compile `template` under the identifier `id`.
    pub fn new(id: impl Into<String>, template: &str) -> AppResult<Self> {
        let mut registry = Handlebars::new();

        // Disable HTML escaping for plain text
        registry.register_escape_fn(handlebars::no_escape);

        registry
            .register_template_string(TEMPLATE_NAME, template)
            .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

        Ok(Self {
            id: id.into(),
            registry,
        })
    }

    /// Builder for the built-in answer template.
    pub fn answer_default() -> AppResult<Self> {
        Self::new(DEFAULT_TEMPLATE_ID, DEFAULT_ANSWER_TEMPLATE)
    }

    /// Builder for an optional configured template, falling back to the default.
    pub fn from_config(template: Option<&str>) -> AppResult<Self> {
        match template {
            Some(template) => Self::new("rag.answer.custom", template),
            None => Self::answer_default(),
        }
    }

    /// Render the prompt for `question` over `context` (nearest chunk first).
    ///
    /// An empty `context` renders an empty context block.
    pub fn build(&self, question: &str, context: &[String]) -> AppResult<BuiltPrompt> {
        tracing::debug!(
            "Building prompt '{}' with {} context chunks",
            self.id,
            context.len()
        );

        let mut variables = HashMap::new();
        variables.insert("question", question.to_string());
        variables.insert("context", context.join("\n"));

        let rendered = self
            .registry
            .render(TEMPLATE_NAME, &variables)
            .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

        Ok(BuiltPrompt::new(rendered, self.id.clone(), context.len()))
    }
}
