//! Router tests driven by scripted providers.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use ragline_core::AppConfig;
use ragline_llm::MockClient;
use ragline_prompt::{PromptRenderer, PromptTemplates};
use ragline_rag::{RagChain, RagSettings};
use ragline_search::{SearchHandle, SearchRecord, StaticSearch};
use ragline_server::{create_router, AppState};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn app_with(llm: MockClient, search: SearchHandle) -> Router {
    let renderer = PromptRenderer::new(&PromptTemplates::default()).unwrap();
    let settings = RagSettings {
        model: "test-model".to_string(),
        max_tokens: 64,
        temperature: 0.0,
        timeout: Duration::from_secs(5),
    };
    let chain = RagChain::new(Arc::new(llm), search, renderer, settings);
    create_router(AppState::new(AppConfig::default(), chain))
}

fn app() -> Router {
    let results = vec![
        SearchRecord::new("Acme shares", "Closed at $42", "https://markets.test/acme").into(),
        SearchRecord::new("Acme Q3", "Revenue up", "https://acme.test/q3").into(),
    ];
    app_with(
        MockClient::new(["Acme ", "is ", "up."]),
        SearchHandle::available(Arc::new(StaticSearch::new(results))),
    )
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

/// Split an SSE body into `(event, data)` pairs.
fn parse_sse(body: &str) -> Vec<(String, String)> {
    body.split("\n\n")
        .filter(|frame| !frame.trim().is_empty())
        .filter_map(|frame| {
            let mut event = None;
            let mut data = Vec::new();
            for line in frame.lines() {
                if let Some(value) = line.strip_prefix("event: ") {
                    event = Some(value.to_string());
                } else if let Some(value) = line.strip_prefix("data: ") {
                    data.push(value.to_string());
                } else if let Some(value) = line.strip_prefix("data:") {
                    data.push(value.to_string());
                }
            }
            event.map(|e| (e, data.join("\n")))
        })
        .collect()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_root_and_health() {
    let response = app().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "running");

    let response = app().oneshot(get("/api/v1/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["endpoints"]["simple_chat"], "/api/v1/chat/simple");
}

#[tokio::test]
async fn test_chat_streams_events() {
    let uri = "/api/v1/chat?query=What%20is%20the%20current%20stock%20price%20of%20Acme%20Corp%3F";
    let response = app().oneshot(get(uri)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/event-stream"));

    let events = parse_sse(&body_text(response).await);
    let names: Vec<&str> = events.iter().map(|(e, _)| e.as_str()).collect();

    assert_eq!(
        names,
        vec![
            "status",
            "status",
            "search_complete",
            "status",
            "token",
            "token",
            "token",
            "complete"
        ]
    );
    assert_eq!(events[2].1, "Found 2 relevant sources");
    assert_eq!(events[7].1, "Response complete");
}

#[tokio::test]
async fn test_chat_post_without_search() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"query": "What is the latest news?", "use_search": false}"#,
        ))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let events = parse_sse(&body_text(response).await);
    assert!(events.iter().all(|(e, _)| e != "search_complete"));
    assert_eq!(events.last().unwrap().0, "complete");
}

#[tokio::test]
async fn test_chat_failure_ends_with_error_event() {
    let app = app_with(
        MockClient::new(["a", "b", "c", "d"]).failing_after(3),
        SearchHandle::unavailable("none"),
    );

    let response = app
        .oneshot(get("/api/v1/chat?query=Explain%20recursion&use_search=false"))
        .await
        .unwrap();
    let events = parse_sse(&body_text(response).await);
    let names: Vec<&str> = events.iter().map(|(e, _)| e.as_str()).collect();

    assert_eq!(
        names,
        vec!["status", "status", "token", "token", "token", "error"]
    );
    assert!(events[5].1.starts_with("Error processing request: "));
}

#[tokio::test]
async fn test_blank_query_is_rejected() {
    for uri in [
        "/api/v1/chat?query=%20%20",
        "/api/v1/chat",
        "/api/v1/chat/simple?query=",
    ] {
        let response = app().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Query is required and cannot be empty");
    }
}

#[tokio::test]
async fn test_malformed_post_body_is_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_simple_chat_returns_metadata() {
    let uri = "/api/v1/chat/simple?query=latest%20Acme%20news";
    let response = app().oneshot(get(uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Response generated successfully");
    assert_eq!(json["data"]["query"], "latest Acme news");
    assert_eq!(json["data"]["response"], "Acme is up.");
    assert_eq!(json["data"]["search_used"], true);
    assert_eq!(json["data"]["search_results"].as_array().unwrap().len(), 2);
    assert!(json["data"]["error"].is_null());
}

#[tokio::test]
async fn test_simple_chat_reports_generation_failure() {
    let app = app_with(MockClient::default().failing(), SearchHandle::unavailable("none"));

    let response = app
        .oneshot(get("/api/v1/chat/simple?query=Explain%20recursion"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["search_used"], false);
    assert_eq!(json["data"]["context_length"], 0);
    assert!(json["data"]["error"].is_string());
}

#[tokio::test]
async fn test_crlf_token_keeps_single_line_break() {
    let app = app_with(
        MockClient::new(["line one\r\nline two"]),
        SearchHandle::unavailable("none"),
    );

    let response = app
        .oneshot(get("/api/v1/chat?query=Explain%20recursion&use_search=false"))
        .await
        .unwrap();
    let events = parse_sse(&body_text(response).await);

    let token = events.iter().find(|(e, _)| e == "token").unwrap();
    assert_eq!(token.1, "line one\nline two");
}
