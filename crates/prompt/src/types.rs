//! Prompt types for Ragline.

use serde::{Deserialize, Serialize};

/// System prompt used when search context is available.
pub const DEFAULT_GROUNDED_TEMPLATE: &str = "You are a helpful AI assistant that answers questions based on the provided context.

Context information:
{{context}}

Please provide accurate and helpful answers based on this context. If the context doesn't contain enough information to answer the question, acknowledge this and provide the best answer you can based on your general knowledge.";

/// System prompt used without context.
pub const DEFAULT_PLAIN_TEMPLATE: &str =
    "You are a helpful AI assistant. Provide accurate and helpful responses to user questions.";

/// The pair of system prompt templates.
///
/// `grounded` may reference `{{context}}` and `{{query}}`; `plain` may
/// reference `{{query}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplates {
    /// Template used when search produced context
    #[serde(default = "default_grounded")]
    pub grounded: String,

    /// Template used when there is no context
    #[serde(default = "default_plain")]
    pub plain: String,
}

fn default_grounded() -> String {
    DEFAULT_GROUNDED_TEMPLATE.to_string()
}

fn default_plain() -> String {
    DEFAULT_PLAIN_TEMPLATE.to_string()
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            grounded: default_grounded(),
            plain: default_plain(),
        }
    }
}

/// A rendered prompt ready for the generation provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// System message
    pub system: String,

    /// User message
    pub user: String,

    /// Whether retrieved context was injected
    pub context_included: bool,
}
