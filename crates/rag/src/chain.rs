//! RAG orchestration.

use crate::event::EventStream;
use crate::query::Query;
use crate::result::RagResult;
use ragline_core::{AppConfig, AppError, AppResult};
use ragline_llm::{LlmClient, LlmRequest};
use ragline_prompt::{load_templates, PromptRenderer};
use ragline_search::{format_results, needs_search, SearchHandle, SearchProvider, SearchResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Characters of the query kept in log lines.
pub(crate) const LOG_QUERY_CHARS: usize = 100;

/// Generation parameters and limits applied to every request.
#[derive(Debug, Clone)]
pub struct RagSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,

    /// Upper bound on each provider call
    pub timeout: Duration,
}

impl RagSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: config.request_timeout(),
        }
    }
}

/// How a request gets (or does not get) its context.
pub(crate) enum SearchPlan {
    /// The caller turned search off
    Disabled,
    /// No search provider is configured
    Unavailable,
    /// The gate found nothing time-sensitive in the query
    NotNeeded,
    Search(Arc<dyn SearchProvider>),
}

/// Context produced by an executed search.
pub(crate) struct Retrieved {
    pub results: Vec<SearchResult>,
    pub context: String,
}

struct Answer {
    response: String,
    retrieved: Option<Retrieved>,
}

/// The retrieval-augmented generation pipeline.
///
/// Holds the providers built at startup; cheap to clone and safe to share
/// between concurrent requests.
#[derive(Clone)]
pub struct RagChain {
    llm: Arc<dyn LlmClient>,
    search: SearchHandle,
    renderer: Arc<PromptRenderer>,
    settings: RagSettings,
}

impl std::fmt::Debug for RagChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagChain")
            .field("llm", &self.llm.provider_name())
            .field("search", &self.search)
            .field("settings", &self.settings)
            .finish()
    }
}

impl RagChain {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        search: SearchHandle,
        renderer: PromptRenderer,
        settings: RagSettings,
    ) -> Self {
        Self {
            llm,
            search,
            renderer: Arc::new(renderer),
            settings,
        }
    }

    /// Build a chain from configuration and ready providers.
    ///
    /// Fails if the configured prompt file cannot be loaded or compiled.
    pub fn from_config(
        config: &AppConfig,
        llm: Arc<dyn LlmClient>,
        search: SearchHandle,
    ) -> AppResult<Self> {
        let templates = load_templates(config.prompts_file.as_deref())?;
        let renderer = PromptRenderer::new(&templates)?;

        tracing::info!(
            "RAG chain ready (llm: {}, model: {}, search: {:?})",
            llm.provider_name(),
            config.model,
            search
        );

        Ok(Self::new(llm, search, renderer, RagSettings::from_config(config)))
    }

    /// Answer a query, returning only the response text.
    ///
    /// Failures become an apology carrying the caller-safe message.
    pub async fn run(&self, query: &Query, use_search: bool) -> String {
        let span = request_span(query, use_search);
        async {
            match self.answer(query, use_search).await {
                Ok(answer) => answer.response,
                Err(e) => {
                    tracing::error!(
                        "Error in RAG chain for query {:?}: {}",
                        query.preview(LOG_QUERY_CHARS),
                        e
                    );
                    format!(
                        "Sorry, I encountered an error while processing your request: {}",
                        e.user_message()
                    )
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Answer a query and report what search contributed.
    pub async fn run_with_metadata(&self, query: &Query, use_search: bool) -> RagResult {
        let span = request_span(query, use_search);
        async {
            match self.answer(query, use_search).await {
                Ok(answer) => {
                    let (search_used, search_results, context_length) = match answer.retrieved {
                        Some(retrieved) => (
                            true,
                            retrieved.results,
                            retrieved.context.chars().count(),
                        ),
                        None => (false, Vec::new(), 0),
                    };

                    RagResult {
                        query: query.as_str().to_string(),
                        response: answer.response,
                        search_used,
                        search_results,
                        context_length,
                        error: None,
                    }
                }
                Err(e) => {
                    tracing::error!(
                        "Error in RAG chain with metadata for query {:?}: {}",
                        query.preview(LOG_QUERY_CHARS),
                        e
                    );
                    RagResult::failed(query.as_str(), &e)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Answer a query as a lazy stream of events.
    ///
    /// Nothing runs until the stream is polled. The stream always ends with
    /// exactly one `complete` or `error` event.
    pub fn stream(&self, query: Query, use_search: bool) -> EventStream {
        let span = request_span(&query, use_search);
        crate::stream::event_stream(self.clone(), query, use_search, span)
    }

    async fn answer(&self, query: &Query, use_search: bool) -> AppResult<Answer> {
        let retrieved = match self.plan(query, use_search) {
            SearchPlan::Search(provider) => Some(self.retrieve(provider.as_ref(), query).await),
            _ => None,
        };

        let request = self.build_request(query, retrieved.as_ref().map(|r| r.context.as_str()))?;
        let response = self
            .with_timeout("the language model", self.llm.complete(&request))
            .await??;

        tracing::info!(
            "Generated response ({} chars, {} completion tokens)",
            response.content.chars().count(),
            response.usage.completion_tokens
        );

        Ok(Answer {
            response: response.content,
            retrieved,
        })
    }

    /// Decide whether this request searches.
    pub(crate) fn plan(&self, query: &Query, use_search: bool) -> SearchPlan {
        if !use_search {
            tracing::debug!("Search disabled by caller");
            return SearchPlan::Disabled;
        }

        let provider = match &self.search {
            SearchHandle::Available(provider) => provider,
            SearchHandle::Unavailable(reason) => {
                tracing::info!("Search unavailable ({}), using existing knowledge", reason);
                return SearchPlan::Unavailable;
            }
        };

        if !needs_search(query.as_str()) {
            tracing::info!("Query does not need search, using existing knowledge");
            return SearchPlan::NotNeeded;
        }

        tracing::info!("Query needs search, searching for relevant information");
        SearchPlan::Search(Arc::clone(provider))
    }

    /// Run the search and format its results.
    ///
    /// A search that times out counts as one that found nothing.
    pub(crate) async fn retrieve(&self, provider: &dyn SearchProvider, query: &Query) -> Retrieved {
        let results = match self
            .with_timeout("the search provider", provider.search(query.as_str()))
            .await
        {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!("{}; continuing without search results", e);
                Vec::new()
            }
        };

        let context = format_results(&results);
        tracing::info!(
            "Search found {} results ({} chars of context)",
            results.len(),
            context.chars().count()
        );

        Retrieved { results, context }
    }

    pub(crate) fn build_request(&self, query: &Query, context: Option<&str>) -> AppResult<LlmRequest> {
        let prompt = self.renderer.render(query.as_str(), context)?;

        Ok(LlmRequest::new(prompt.user, self.settings.model.clone())
            .with_system(prompt.system)
            .with_max_tokens(self.settings.max_tokens)
            .with_temperature(self.settings.temperature))
    }

    pub(crate) fn llm(&self) -> &Arc<dyn LlmClient> {
        &self.llm
    }

    /// Bound a provider call by the configured timeout.
    pub(crate) async fn with_timeout<F: Future>(
        &self,
        operation: &str,
        fut: F,
    ) -> AppResult<F::Output> {
        tokio::time::timeout(self.settings.timeout, fut)
            .await
            .map_err(|_| AppError::Timeout {
                operation: operation.to_string(),
                seconds: self.settings.timeout.as_secs(),
            })
    }
}

fn request_span(query: &Query, use_search: bool) -> tracing::Span {
    tracing::info_span!(
        "rag_request",
        request_id = %uuid::Uuid::new_v4(),
        query = %query.preview(LOG_QUERY_CHARS),
        use_search
    )
}
