//! Ragline Core Library
//!
//! This crate provides the foundational utilities shared by every Ragline crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management
//! - Credential sanitization and masking

pub mod config;
pub mod error;
pub mod logging;
pub mod secret;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use secret::{mask_secret, sanitize_secret};
