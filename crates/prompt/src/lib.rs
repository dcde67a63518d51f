//! Prompt system for Ragline.
//!
//! This crate turns a user query and optional retrieved context into the
//! system and user messages sent to the generation provider:
//! - Built-in templates, overridable from a YAML file
//! - Handlebars template rendering
//! - Cleanup of Unicode punctuation that trips up provider encoders

pub mod builder;
pub mod clean;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::PromptRenderer;
pub use clean::clean_unicode_text;
pub use loader::load_templates;
pub use types::{BuiltPrompt, PromptTemplates};
