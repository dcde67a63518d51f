//! Generation provider implementations.

pub mod groq;
pub mod mock;
pub mod sse;

pub use groq::GroqClient;
pub use mock::MockClient;
