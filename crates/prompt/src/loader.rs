//! Prompt template loader.

use crate::types::PromptTemplates;
use ragline_core::{AppError, AppResult};
use std::path::Path;

/// Load prompt templates, falling back to the built-in defaults.
///
/// With no path the defaults are returned. A given path must exist and
/// parse; keys it omits keep their defaults.
pub fn load_templates(path: Option<&Path>) -> AppResult<PromptTemplates> {
    let Some(path) = path else {
        return Ok(PromptTemplates::default());
    };

    tracing::debug!("Loading prompt templates from {:?}", path);

    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Prompt(format!("Failed to read prompt file {:?}: {}", path, e))
    })?;

    let templates: PromptTemplates = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!("Failed to parse prompt file {:?}: {}", path, e))
    })?;

    tracing::info!("Loaded prompt templates from {:?}", path);
    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_no_path_returns_defaults() {
        assert_eq!(load_templates(None).unwrap(), PromptTemplates::default());
    }

    #[test]
    fn test_load_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "grounded: |\n  Sources:\n  {{{{context}}}}\nplain: Answer briefly.").unwrap();

        let templates = load_templates(Some(file.path())).unwrap();
        assert_eq!(templates.grounded, "Sources:\n{{context}}\n");
        assert_eq!(templates.plain, "Answer briefly.");
    }

    #[test]
    fn test_missing_file() {
        let result = load_templates(Some(Path::new("/nonexistent/prompts.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "grounded: [unclosed").unwrap();
        assert!(load_templates(Some(file.path())).is_err());
    }
}
