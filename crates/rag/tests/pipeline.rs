//! End-to-end tests of the RAG pipeline against scripted providers.

use futures::StreamExt;
use ragline_core::AppResult;
use ragline_llm::{LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, MockClient};
use ragline_prompt::{PromptRenderer, PromptTemplates};
use ragline_rag::{EventKind, Query, RagChain, RagSettings, ResponseEvent};
use ragline_search::{SearchHandle, SearchProvider, SearchRecord, SearchResult, StaticSearch};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const STOCK_QUERY: &str = "What is the current stock price of Acme Corp?";

fn settings(timeout: Duration) -> RagSettings {
    RagSettings {
        model: "test-model".to_string(),
        max_tokens: 128,
        temperature: 0.0,
        timeout,
    }
}

fn build_chain(llm: Arc<MockClient>, search: SearchHandle) -> RagChain {
    let renderer = PromptRenderer::new(&PromptTemplates::default()).unwrap();
    RagChain::new(llm, search, renderer, settings(Duration::from_secs(5)))
}

fn acme_results() -> Vec<SearchResult> {
    vec![
        SearchRecord::new(
            "Acme Corp shares",
            "Acme closed at $42.10",
            "https://markets.test/acme",
        )
        .into(),
        SearchRecord::new("Acme Q3 report", "Revenue grew 8%", "https://acme.test/q3").into(),
    ]
}

async fn collect(chain: &RagChain, query: &str, use_search: bool) -> Vec<ResponseEvent> {
    chain
        .stream(Query::parse(query).unwrap(), use_search)
        .collect()
        .await
}

fn kinds(events: &[ResponseEvent]) -> Vec<EventKind> {
    events.iter().map(|e| e.kind).collect()
}

fn assert_single_terminal(events: &[ResponseEvent]) {
    let terminals = events.iter().filter(|e| e.is_terminal()).count();
    assert_eq!(terminals, 1, "events: {:?}", events);
    assert!(events.last().unwrap().is_terminal());
}

/// Search provider that never answers in time.
struct StalledSearch;

#[async_trait::async_trait]
impl SearchProvider for StalledSearch {
    fn provider_name(&self) -> &str {
        "stalled"
    }

    async fn search(&self, _query: &str) -> Vec<SearchResult> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Vec::new()
    }
}

/// Sets a flag when the provider stream it lives in is dropped.
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Generation provider whose stream never ends on its own.
struct EndlessClient {
    dropped: Arc<AtomicBool>,
}

#[async_trait::async_trait]
impl LlmClient for EndlessClient {
    fn provider_name(&self) -> &str {
        "endless"
    }

    async fn complete(&self, _request: &LlmRequest) -> AppResult<LlmResponse> {
        Err(ragline_core::AppError::Llm("streaming only".to_string()))
    }

    async fn stream(&self, _request: &LlmRequest) -> AppResult<LlmStream> {
        let flag = DropFlag(Arc::clone(&self.dropped));
        let stream = futures::stream::repeat(()).map(move |_| {
            let _held = &flag;
            Ok(LlmStreamChunk::text("more "))
        });
        Ok(Box::pin(stream))
    }
}

#[tokio::test]
async fn test_search_complete_reports_source_count() {
    let search = Arc::new(StaticSearch::new(acme_results()));
    let chain = build_chain(
        Arc::new(MockClient::new(["Acme ", "is ", "at ", "$42.10."])),
        SearchHandle::available(search.clone()),
    );

    let events = collect(&chain, STOCK_QUERY, true).await;

    assert_eq!(
        events[..4].to_vec(),
        vec![
            ResponseEvent::status("Processing your request..."),
            ResponseEvent::status("Searching for relevant information..."),
            ResponseEvent::new(EventKind::SearchComplete, "Found 2 relevant sources"),
            ResponseEvent::status("Generating response..."),
        ]
    );
    let text: String = events
        .iter()
        .filter(|e| e.kind == EventKind::Token)
        .map(|e| e.data.as_str())
        .collect();
    assert_eq!(text, "Acme is at $42.10.");
    assert_eq!(events.last().unwrap(), &ResponseEvent::complete());
    assert_eq!(search.call_count(), 1);
}

#[tokio::test]
async fn test_search_context_reaches_the_model() {
    let llm = Arc::new(MockClient::default());
    let chain = build_chain(
        llm.clone(),
        SearchHandle::available(Arc::new(StaticSearch::new(acme_results()))),
    );

    collect(&chain, STOCK_QUERY, true).await;

    let request = llm.last_request().unwrap();
    let system = request.system.unwrap();
    assert!(system.contains("1. Acme Corp shares"));
    assert!(system.contains("Source: https://acme.test/q3"));
    assert_eq!(request.prompt, STOCK_QUERY);
}

#[tokio::test]
async fn test_generation_failure_after_three_tokens() {
    let chain = build_chain(
        Arc::new(MockClient::new(["one ", "two ", "three ", "four"]).failing_after(3)),
        SearchHandle::available(Arc::new(StaticSearch::new(acme_results()))),
    );

    let events = collect(&chain, STOCK_QUERY, false).await;

    assert_eq!(
        kinds(&events),
        vec![
            EventKind::Status,
            EventKind::Status,
            EventKind::Token,
            EventKind::Token,
            EventKind::Token,
            EventKind::Error,
        ]
    );
    assert!(events[5].data.starts_with("Error processing request: "));
}

#[tokio::test]
async fn test_search_disabled_never_reports_search() {
    let search = Arc::new(StaticSearch::new(acme_results()));
    let chain = build_chain(
        Arc::new(MockClient::default()),
        SearchHandle::available(search.clone()),
    );

    let events = collect(&chain, STOCK_QUERY, false).await;

    assert!(!kinds(&events).contains(&EventKind::SearchComplete));
    assert_eq!(search.call_count(), 0);
    assert_single_terminal(&events);
}

#[tokio::test]
async fn test_gate_negative_query_skips_search() {
    let search = Arc::new(StaticSearch::new(acme_results()));
    let chain = build_chain(
        Arc::new(MockClient::default()),
        SearchHandle::available(search.clone()),
    );

    let events = collect(&chain, "Explain recursion", true).await;

    assert_eq!(events[1], ResponseEvent::status("Using existing knowledge..."));
    assert!(!kinds(&events).contains(&EventKind::SearchComplete));
    assert_eq!(search.call_count(), 0);
}

#[tokio::test]
async fn test_unavailable_search_is_announced() {
    let chain = build_chain(
        Arc::new(MockClient::default()),
        SearchHandle::unavailable("Missing required API key: TAVILY_API_KEY"),
    );

    let events = collect(&chain, STOCK_QUERY, true).await;

    assert_eq!(
        events[1],
        ResponseEvent::status("Search unavailable, using existing knowledge...")
    );
    assert_eq!(events.last().unwrap(), &ResponseEvent::complete());
}

#[tokio::test]
async fn test_empty_search_still_generates() {
    let chain = build_chain(
        Arc::new(MockClient::default()),
        SearchHandle::available(Arc::new(StaticSearch::new(Vec::new()))),
    );

    let events = collect(&chain, "latest news", true).await;

    assert!(events.contains(&ResponseEvent::new(
        EventKind::SearchComplete,
        "Found 0 relevant sources"
    )));
    assert_eq!(events.last().unwrap(), &ResponseEvent::complete());
}

#[tokio::test]
async fn test_open_failure_emits_single_error() {
    let chain = build_chain(
        Arc::new(MockClient::default().failing()),
        SearchHandle::unavailable("none"),
    );

    let events = collect(&chain, "Explain recursion", true).await;

    assert_eq!(events.len(), 4);
    assert_eq!(events[3].kind, EventKind::Error);
    assert_single_terminal(&events);
}

#[tokio::test]
async fn test_stalled_generation_times_out() {
    let renderer = PromptRenderer::new(&PromptTemplates::default()).unwrap();
    let chain = RagChain::new(
        Arc::new(MockClient::default().with_delay(Duration::from_millis(500))),
        SearchHandle::unavailable("none"),
        renderer,
        settings(Duration::from_millis(50)),
    );

    let events = collect(&chain, "Explain recursion", false).await;

    assert_eq!(
        events.last().unwrap().data,
        "Error processing request: the language model did not respond in time"
    );
    assert_single_terminal(&events);
}

#[tokio::test]
async fn test_stalled_search_degrades_to_empty() {
    let renderer = PromptRenderer::new(&PromptTemplates::default()).unwrap();
    let chain = RagChain::new(
        Arc::new(MockClient::default()),
        SearchHandle::available(Arc::new(StalledSearch)),
        renderer,
        settings(Duration::from_millis(50)),
    );

    let events = collect(&chain, "breaking news", true).await;

    assert!(events.contains(&ResponseEvent::new(
        EventKind::SearchComplete,
        "Found 0 relevant sources"
    )));
    assert_eq!(events.last().unwrap(), &ResponseEvent::complete());
}

#[tokio::test]
async fn test_stream_is_lazy() {
    let llm = Arc::new(MockClient::default());
    let search = Arc::new(StaticSearch::new(acme_results()));
    let chain = build_chain(llm.clone(), SearchHandle::available(search.clone()));

    let stream = chain.stream(Query::parse(STOCK_QUERY).unwrap(), true);
    assert_eq!(llm.call_count(), 0);
    assert_eq!(search.call_count(), 0);

    let first: Vec<_> = stream.take(2).collect().await;
    assert_eq!(first.len(), 2);
    assert_eq!(search.call_count(), 0);
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_dropping_stream_abandons_generation() {
    let dropped = Arc::new(AtomicBool::new(false));
    let llm = Arc::new(EndlessClient {
        dropped: Arc::clone(&dropped),
    });
    let renderer = PromptRenderer::new(&PromptTemplates::default()).unwrap();
    let chain = RagChain::new(
        llm,
        SearchHandle::unavailable("none"),
        renderer,
        settings(Duration::from_secs(5)),
    );

    let mut events = chain.stream(Query::parse("Explain recursion").unwrap(), false);
    let mut tokens = 0;
    while tokens < 3 {
        let event = events.next().await.unwrap();
        assert!(!event.is_terminal());
        if event.kind == EventKind::Token {
            tokens += 1;
        }
    }
    assert!(!dropped.load(Ordering::SeqCst));

    drop(events);
    assert!(dropped.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_metadata_without_search() {
    let search = Arc::new(StaticSearch::new(acme_results()));
    let chain = build_chain(
        Arc::new(MockClient::new(["Hello"])),
        SearchHandle::available(search.clone()),
    );
    let query = Query::parse(STOCK_QUERY).unwrap();

    let result = chain.run_with_metadata(&query, false).await;

    assert_eq!(result.response, "Hello");
    assert!(!result.search_used);
    assert_eq!(result.context_length, 0);
    assert!(result.search_results.is_empty());
    assert_eq!(search.call_count(), 0);
}

#[tokio::test]
async fn test_metadata_failure_shape() {
    let chain = build_chain(
        Arc::new(MockClient::default().failing()),
        SearchHandle::available(Arc::new(StaticSearch::new(acme_results()))),
    );
    let query = Query::parse(STOCK_QUERY).unwrap();

    let result = chain.run_with_metadata(&query, true).await;

    assert!(!result.search_used);
    assert_eq!(result.context_length, 0);
    assert!(result.search_results.is_empty());
    let message = result.error.unwrap();
    assert_eq!(
        result.response,
        format!("Error processing request: {}", message)
    );
}
