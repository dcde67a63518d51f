//! Event stream state machine.

use crate::chain::{RagChain, SearchPlan, LOG_QUERY_CHARS};
use crate::event::{
    EventStream, ResponseEvent, STATUS_GENERATING, STATUS_NO_SEARCH_NEEDED, STATUS_PROCESSING,
    STATUS_SEARCHING, STATUS_SEARCH_UNAVAILABLE,
};
use crate::query::Query;
use futures::StreamExt;
use ragline_core::{AppError, AppResult};
use ragline_llm::LlmStream;
use ragline_search::SearchProvider;
use std::sync::Arc;
use tracing::Instrument;

/// Where a streaming request is.
///
/// Each call to `Pipeline::advance` yields at most one event and the next
/// stage. `Done` is reached only after a terminal event.
enum Stage {
    Start,
    Decide,
    Search(Arc<dyn SearchProvider>),
    Announce(Option<String>),
    Open(Option<String>),
    Generate(LlmStream),
    Finish,
    Done,
}

struct Pipeline {
    chain: RagChain,
    query: Query,
    use_search: bool,
    span: tracing::Span,
}

pub(crate) fn event_stream(
    chain: RagChain,
    query: Query,
    use_search: bool,
    span: tracing::Span,
) -> EventStream {
    let pipeline = Pipeline {
        chain,
        query,
        use_search,
        span,
    };

    let stream = futures::stream::unfold((pipeline, Stage::Start), |(pipeline, stage)| async move {
        let span = pipeline.span.clone();
        let step = pipeline.advance(stage).instrument(span).await;
        step.map(|(event, next)| (event, (pipeline, next)))
    });

    Box::pin(stream)
}

impl Pipeline {
    async fn advance(&self, mut stage: Stage) -> Option<(ResponseEvent, Stage)> {
        loop {
            stage = match stage {
                Stage::Start => {
                    let next = if self.use_search {
                        Stage::Decide
                    } else {
                        Stage::Announce(None)
                    };
                    return Some((ResponseEvent::status(STATUS_PROCESSING), next));
                }

                Stage::Decide => {
                    return Some(match self.chain.plan(&self.query, self.use_search) {
                        SearchPlan::Search(provider) => (
                            ResponseEvent::status(STATUS_SEARCHING),
                            Stage::Search(provider),
                        ),
                        SearchPlan::Unavailable => (
                            ResponseEvent::status(STATUS_SEARCH_UNAVAILABLE),
                            Stage::Announce(None),
                        ),
                        SearchPlan::NotNeeded | SearchPlan::Disabled => (
                            ResponseEvent::status(STATUS_NO_SEARCH_NEEDED),
                            Stage::Announce(None),
                        ),
                    });
                }

                Stage::Search(provider) => {
                    let retrieved = self.chain.retrieve(provider.as_ref(), &self.query).await;
                    return Some((
                        ResponseEvent::search_complete(retrieved.results.len()),
                        Stage::Announce(Some(retrieved.context)),
                    ));
                }

                Stage::Announce(context) => {
                    return Some((ResponseEvent::status(STATUS_GENERATING), Stage::Open(context)));
                }

                Stage::Open(context) => match self.open(context.as_deref()).await {
                    Ok(stream) => Stage::Generate(stream),
                    Err(e) => return Some(self.fail(e)),
                },

                Stage::Generate(mut stream) => {
                    let next = self
                        .chain
                        .with_timeout("the language model", stream.next())
                        .await;

                    match next {
                        Ok(Some(Ok(chunk))) => {
                            if chunk.done {
                                if let Some(usage) = &chunk.usage {
                                    tracing::debug!(
                                        "Generation finished ({} completion tokens)",
                                        usage.completion_tokens
                                    );
                                }
                                if chunk.content.is_empty() {
                                    Stage::Finish
                                } else {
                                    return Some((ResponseEvent::token(chunk.content), Stage::Finish));
                                }
                            } else if chunk.content.is_empty() {
                                Stage::Generate(stream)
                            } else {
                                return Some((
                                    ResponseEvent::token(chunk.content),
                                    Stage::Generate(stream),
                                ));
                            }
                        }
                        Ok(None) => Stage::Finish,
                        Ok(Some(Err(e))) | Err(e) => return Some(self.fail(e)),
                    }
                }

                Stage::Finish => {
                    tracing::info!("Streaming response complete");
                    return Some((ResponseEvent::complete(), Stage::Done));
                }

                Stage::Done => return None,
            };
        }
    }

    async fn open(&self, context: Option<&str>) -> AppResult<LlmStream> {
        let request = self.chain.build_request(&self.query, context)?;
        self.chain
            .with_timeout("the language model", self.chain.llm().stream(&request))
            .await?
    }

    fn fail(&self, error: AppError) -> (ResponseEvent, Stage) {
        tracing::error!(
            "Error in streaming RAG chain for query {:?}: {}",
            self.query.preview(LOG_QUERY_CHARS),
            error
        );
        (ResponseEvent::error(&error.user_message()), Stage::Done)
    }
}
