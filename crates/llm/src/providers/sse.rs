//! Server-Sent Events decoding for streaming completions.
//!
//! OpenAI-compatible servers stream `data: {json}` lines separated by blank
//! lines and finish with `data: [DONE]`. Network chunks do not respect line
//! boundaries, so bytes are buffered until a full line is available.

use futures::{Stream, StreamExt};
use std::collections::VecDeque;
use std::fmt::Display;

use crate::client::{LlmStream, LlmStreamChunk};
use ragline_core::{AppError, AppResult};

/// Incremental SSE parser yielding the `data` payload of each event.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning the payloads of every completed event.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw).into_owned();
            if let Some(payload) = self.process_line(line.trim_end_matches(['\n', '\r'])) {
                events.push(payload);
            }
        }
        events
    }

    /// Flush a trailing event that was not terminated by a blank line.
    pub fn finish(&mut self) -> Option<String> {
        if !self.buffer.is_empty() {
            let raw = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&raw).into_owned();
            if let Some(payload) = self.process_line(line.trim_end_matches('\r')) {
                return Some(payload);
            }
        }
        self.dispatch()
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.dispatch();
        }

        // Comment / keep-alive
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        if field == "data" {
            self.data.push(value.to_string());
        }
        None
    }

    fn dispatch(&mut self) -> Option<String> {
        if self.data.is_empty() {
            return None;
        }
        let payload = self.data.join("\n");
        self.data.clear();
        Some(payload)
    }
}

struct DecodeState<S> {
    body: std::pin::Pin<Box<S>>,
    decoder: SseDecoder,
    pending: VecDeque<AppResult<LlmStreamChunk>>,
    finished: bool,
}

impl<S> DecodeState<S> {
    fn enqueue<P>(&mut self, payload: &str, parse: &P)
    where
        P: Fn(&str) -> AppResult<LlmStreamChunk>,
    {
        if self.finished {
            return;
        }
        let item = parse(payload);
        // [DONE] and errors both end the stream
        if matches!(&item, Ok(chunk) if chunk.done) || item.is_err() {
            self.finished = true;
        }
        self.pending.push_back(item);
    }
}

/// Turn a raw byte stream into an `LlmStream` using `parse` for each payload.
///
/// The resulting stream ends after the first chunk marked `done`, after the
/// first error, or when the body ends.
pub fn decode_sse_stream<S, B, E, P>(body: S, parse: P) -> LlmStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
    P: Fn(&str) -> AppResult<LlmStreamChunk> + Send + Sync + 'static,
{
    let state = DecodeState {
        body: Box::pin(body),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    let stream = futures::stream::unfold((state, parse), |(mut state, parse)| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, (state, parse)));
            }
            if state.finished {
                return None;
            }

            match state.body.next().await {
                Some(Ok(bytes)) => {
                    for payload in state.decoder.push(bytes.as_ref()) {
                        state.enqueue(&payload, &parse);
                    }
                }
                Some(Err(e)) => {
                    state.pending.push_back(Err(AppError::Llm(format!("Stream error: {}", e))));
                    state.finished = true;
                }
                None => {
                    if let Some(payload) = state.decoder.finish() {
                        state.enqueue(&payload, &parse);
                    }
                    state.finished = true;
                }
            }
        }
    });

    Box::pin(stream)
}
