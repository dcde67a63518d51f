//! Retrieval-augmented generation for Ragline.
//!
//! `RagChain` decides whether to search, turns search results into context,
//! and asks the generation provider for an answer. It exposes three entry
//! points over the same pipeline:
//! - `run`: the answer text only
//! - `run_with_metadata`: the answer plus what search contributed
//! - `stream`: a lazy sequence of `ResponseEvent`s ending in exactly one
//!   `complete` or `error` event

pub mod chain;
pub mod event;
pub mod query;
pub mod result;
mod stream;

pub use chain::{RagChain, RagSettings};
pub use event::{EventKind, EventStream, ResponseEvent};
pub use query::Query;
pub use result::RagResult;
