//! Tavily search provider.
//!
//! API reference: https://docs.tavily.com/documentation/api-reference/endpoint/search

use crate::provider::SearchProvider;
use crate::types::SearchResult;
use ragline_core::{mask_secret, AppError, AppResult};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: u32,
    search_depth: &'static str,
    include_answer: bool,
    include_raw_content: bool,
}

/// Tavily web search client.
pub struct TavilyClient {
    api_key: String,
    max_results: u32,
    timeout: Duration,
    endpoint: String,
    client: reqwest::Client,
}

impl TavilyClient {
    /// Create a client from a sanitized API key.
    pub fn new(api_key: String, max_results: u32, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        tracing::info!(
            "Search service initialized with Tavily (key {})",
            mask_secret(&api_key)
        );

        Ok(Self {
            api_key,
            max_results,
            timeout,
            endpoint: TAVILY_SEARCH_URL.to_string(),
            client,
        })
    }

    /// Point the client at a different endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn try_search(&self, query: &str) -> AppResult<Vec<SearchResult>> {
        let body = TavilyRequest {
            query,
            max_results: self.max_results,
            search_depth: "basic",
            include_answer: false,
            include_raw_content: false,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout {
                        operation: "search".to_string(),
                        seconds: self.timeout.as_secs(),
                    }
                } else {
                    AppError::Search(format!("Failed to send request to Tavily: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Search(format!(
                "Tavily API error ({}): {}",
                status, error_text
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Failed to parse Tavily response: {}", e)))?;

        Ok(parse_results(payload, self.max_results as usize))
    }
}

/// Extract results from a Tavily payload.
///
/// Accepts either `{"results": [...]}` or a bare array; anything else
/// yields no results.
fn parse_results(payload: Value, limit: usize) -> Vec<SearchResult> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => items,
            _ => {
                tracing::warn!("Tavily response has no results array");
                Vec::new()
            }
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .take(limit)
        .map(SearchResult::from)
        .collect()
}

#[async_trait::async_trait]
impl SearchProvider for TavilyClient {
    fn provider_name(&self) -> &str {
        "tavily"
    }

    async fn search(&self, query: &str) -> Vec<SearchResult> {
        tracing::info!("Performing search for query: {}", query);

        match self.try_search(query).await {
            Ok(results) => {
                tracing::info!("Search returned {} results", results.len());
                results
            }
            Err(e) => {
                tracing::error!("Error in search operation for query {:?}: {}", query, e);
                Vec::new()
            }
        }
    }
}
