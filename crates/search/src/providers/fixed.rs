//! Static search provider for tests and offline runs.

use crate::provider::SearchProvider;
use crate::types::SearchResult;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Provider returning the same results for every query.
#[derive(Debug)]
pub struct StaticSearch {
    results: Vec<SearchResult>,
    calls: AtomicUsize,
}

impl StaticSearch {
    pub fn new(results: Vec<SearchResult>) -> Self {
        Self {
            results,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of searches performed.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SearchProvider for StaticSearch {
    fn provider_name(&self) -> &str {
        "static"
    }

    async fn search(&self, query: &str) -> Vec<SearchResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("Static search for query: {}", query);
        self.results.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SearchRecord;

    #[tokio::test]
    async fn test_static_search_counts_calls() {
        let provider = StaticSearch::new(vec![SearchRecord::new("t", "c", "u").into()]);
        assert_eq!(provider.call_count(), 0);

        let results = provider.search("anything").await;
        assert_eq!(results.len(), 1);
        provider.search("again").await;
        assert_eq!(provider.call_count(), 2);
    }
}
