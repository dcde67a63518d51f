//! Prompt builder for rendering templates and injecting context.

use crate::clean::clean_unicode_text;
use crate::types::{BuiltPrompt, PromptTemplates};
use handlebars::Handlebars;
use ragline_core::{AppError, AppResult};
use std::collections::HashMap;

const GROUNDED: &str = "grounded";
const PLAIN: &str = "plain";

/// Compiled prompt templates.
///
/// Templates are compiled once so that a broken override fails at startup
/// rather than on the first request.
pub struct PromptRenderer {
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for PromptRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptRenderer").finish_non_exhaustive()
    }
}

impl PromptRenderer {
    /// Compile both templates.
    pub fn new(templates: &PromptTemplates) -> AppResult<Self> {
        let mut registry = Handlebars::new();

        // Disable HTML escaping for plain text
        registry.register_escape_fn(handlebars::no_escape);

        registry
            .register_template_string(GROUNDED, &templates.grounded)
            .map_err(|e| AppError::Prompt(format!("Failed to register grounded template: {}", e)))?;
        registry
            .register_template_string(PLAIN, &templates.plain)
            .map_err(|e| AppError::Prompt(format!("Failed to register plain template: {}", e)))?;

        Ok(Self { registry })
    }

    /// Render the system and user messages for a query.
    ///
    /// With context the grounded template is used; without it the plain one.
    pub fn render(&self, query: &str, context: Option<&str>) -> AppResult<BuiltPrompt> {
        let clean_query = clean_unicode_text(query);

        let mut variables = HashMap::new();
        variables.insert("query", clean_query.clone());

        let template = match context {
            Some(ctx) => {
                variables.insert("context", clean_unicode_text(ctx));
                GROUNDED
            }
            None => PLAIN,
        };

        let rendered = self
            .registry
            .render(template, &variables)
            .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

        tracing::debug!(
            "Built {} prompt ({} chars of system text)",
            template,
            rendered.len()
        );

        Ok(BuiltPrompt {
            system: clean_unicode_text(&rendered),
            user: clean_query,
            context_included: context.is_some(),
        })
    }
}
