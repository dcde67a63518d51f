//! Scripted generation provider for tests and offline runs.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage};
use futures::StreamExt;
use ragline_core::{AppError, AppResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Mock provider replaying a fixed list of fragments.
///
/// Can be told to fail before streaming, or after a number of fragments,
/// and to pause before each fragment so callers can exercise timeouts.
#[derive(Debug)]
pub struct MockClient {
    fragments: Vec<String>,
    fail_after: Option<usize>,
    fail_on_open: bool,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_request: Mutex<Option<LlmRequest>>,
}

impl MockClient {
    /// Create a mock that streams the given fragments.
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
            fail_after: None,
            fail_on_open: false,
            delay: None,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Fail after `count` fragments have been streamed.
    ///
    /// Non-streaming completions fail outright.
    pub fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    /// Fail every call before any output is produced.
    pub fn failing(mut self) -> Self {
        self.fail_on_open = true;
        self
    }

    /// Sleep before every fragment (and before a full completion).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `complete` + `stream` calls received.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request received.
    pub fn last_request(&self) -> Option<LlmRequest> {
        self.last_request.lock().ok().and_then(|guard| guard.clone())
    }

    fn record(&self, request: &LlmRequest) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some(request.clone());
        }
    }

    fn failure(&self) -> AppError {
        AppError::Llm("mock provider failure".to_string())
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new([
            "This ", "is ", "a ", "mock ", "response ", "from ", "Ragline.",
        ])
    }
}

#[async_trait::async_trait]
impl LlmClient for MockClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.record(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_on_open || self.fail_after.is_some() {
            return Err(self.failure());
        }

        let content = self.fragments.concat();
        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::new(0, self.fragments.len() as u32),
            finish_reason: Some("stop".to_string()),
        })
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        self.record(request);

        if self.fail_on_open {
            return Err(self.failure());
        }

        let limit = self.fail_after.unwrap_or(self.fragments.len());
        let mut items: Vec<AppResult<LlmStreamChunk>> = self
            .fragments
            .iter()
            .take(limit)
            .map(|f| Ok(LlmStreamChunk::text(f.clone())))
            .collect();

        if self.fail_after.is_some() {
            items.push(Err(self.failure()));
        } else {
            items.push(Ok(LlmStreamChunk::finished(Some(LlmUsage::new(
                0,
                self.fragments.len() as u32,
            )))));
        }

        let delay = self.delay;
        let stream = futures::stream::iter(items).then(move |item| async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            item
        });

        Ok(Box::pin(stream))
    }
}
