//! LLM integration crate for Ragline.
//!
//! This crate provides a provider-agnostic abstraction for generating text
//! with Large Language Models, either as one complete response or as a
//! stream of fragments.
//!
//! # Providers
//! - **Groq**: hosted OpenAI-compatible chat completions (default)
//! - **Mock**: scripted fragments for tests and offline runs
//!
//! # Example
//! ```no_run
//! use ragline_llm::{ClientSettings, GroqClient, LlmClient, LlmRequest, GROQ_BASE_URL};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GroqClient::new(ClientSettings::new(GROQ_BASE_URL, Some("gsk_...".to_string())))?;
//! let request = LlmRequest::new("Hello, world!", "llama-3.1-8b-instant");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage};
pub use factory::create_client;
pub use providers::{GroqClient, MockClient};
pub use types::{ClientSettings, ProviderType, GROQ_BASE_URL};
