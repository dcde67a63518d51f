//! Search provider implementations.

pub mod fixed;
pub mod tavily;

pub use fixed::StaticSearch;
pub use tavily::TavilyClient;
