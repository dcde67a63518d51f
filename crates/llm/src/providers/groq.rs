//! Groq LLM provider implementation.
//!
//! Groq exposes the OpenAI chat completions API, so this client also works
//! against any OpenAI-compatible server when given a different base URL.
//! API reference: https://console.groq.com/docs/api-reference#chat

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage};
use crate::providers::sse::decode_sse_stream;
use crate::types::ClientSettings;
use ragline_core::{mask_secret, AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Chat completions request body.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Non-streaming response body.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<LlmUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// One `data:` payload of a streaming response.
#[derive(Debug, Deserialize)]
struct ChatStreamEvent {
    #[serde(default)]
    choices: Vec<ChatStreamChoice>,
    #[serde(default)]
    usage: Option<LlmUsage>,
    /// Groq reports usage in an extension object on the last chunk
    #[serde(default)]
    x_groq: Option<GroqExtension>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChatStreamChoice {
    #[serde(default)]
    delta: ChatDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChatDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GroqExtension {
    #[serde(default)]
    usage: Option<LlmUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Groq chat completions client.
pub struct GroqClient {
    settings: ClientSettings,

    /// HTTP client
    client: reqwest::Client,
}

impl GroqClient {
    /// Create a client from resolved settings.
    pub fn new(settings: ClientSettings) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        if let Some(ref key) = settings.api_key {
            tracing::info!(
                "Groq client configured for {} with key {}",
                settings.base_url,
                mask_secret(key)
            );
        }

        Ok(Self { settings, client })
    }

    /// Convert LlmRequest to the chat completions format.
    fn to_chat_request(&self, request: &LlmRequest, stream: bool) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(ref system) = request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        ChatRequest {
            model: request.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url)
    }

    async fn send(&self, body: &ChatRequest) -> AppResult<reqwest::Response> {
        let mut builder = self.client.post(self.completions_url()).json(body);
        if let Some(ref key) = self.settings.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Groq: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Groq API error ({}): {}",
                status, error_text
            )));
        }

        Ok(response)
    }
}

/// Parse one streamed payload into a chunk.
fn parse_stream_payload(payload: &str) -> AppResult<LlmStreamChunk> {
    if payload.trim() == "[DONE]" {
        return Ok(LlmStreamChunk::finished(None));
    }

    let event: ChatStreamEvent = serde_json::from_str(payload)
        .map_err(|e| AppError::Llm(format!("Failed to parse chunk: {}", e)))?;

    if let Some(error) = event.error {
        return Err(AppError::Llm(format!("Groq stream error: {}", error.message)));
    }

    let content = event
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .unwrap_or_default();

    Ok(LlmStreamChunk {
        content,
        done: false,
        usage: event.usage.or(event.x_groq.and_then(|x| x.usage)),
    })
}

#[async_trait::async_trait]
impl LlmClient for GroqClient {
    fn provider_name(&self) -> &str {
        "groq"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!("Sending completion request to Groq");
        tracing::debug!("Request model: {}", request.model);

        let body = self.to_chat_request(request, false);
        let response = self.send(&body).await?;

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Groq response: {}", e)))?;

        let choice = chat
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Llm("Groq response contained no choices".to_string()))?;

        tracing::info!("Received completion from Groq");

        Ok(LlmResponse {
            content: choice.message.content,
            model: chat.model,
            usage: chat.usage.unwrap_or_default(),
            finish_reason: choice.finish_reason,
        })
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        tracing::info!("Starting streaming request to Groq");
        tracing::debug!("Request model: {}", request.model);

        let body = self.to_chat_request(request, true);
        let response = self.send(&body).await?;

        Ok(decode_sse_stream(
            response.bytes_stream(),
            parse_stream_payload,
        ))
    }
}
