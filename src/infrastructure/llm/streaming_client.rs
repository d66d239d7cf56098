use std::time::Duration;

use async_trait::async_trait;
use futures::stream::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::sse_decoder::{SseData, SseLineDecoder};
use crate::application::ports::{LlmClient, LlmClientError, LlmTokenStream};
use crate::domain::Message;
use crate::presentation::config::LlmSettings;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com/v1";

/// Streaming chat completions against an OpenAI-compatible API.
pub struct StreamingLlmClient {
    client: Client,
    provider: String,
    completions_url: String,
    api_key: String,
    model: String,
    max_tokens: Option<usize>,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Deserialize, Default)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

impl StreamingLlmClient {
    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.provider == "azure" {
            request.header("api-key", &self.api_key)
        } else {
            request.bearer_auth(&self.api_key)
        }
    }
}

/// Text content of one `data:` payload, if any.
pub fn parse_completion_chunk(payload: &str) -> Result<Option<String>, LlmClientError> {
    let chunk: ChatCompletionChunk = serde_json::from_str(payload)
        .map_err(|e| LlmClientError::InvalidResponse(e.to_string()))?;
    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty()))
}

#[async_trait]
impl LlmClient for StreamingLlmClient {
    async fn complete_stream(
        &self,
        messages: &[Message],
        temperature: f32,
    ) -> Result<LlmTokenStream, LlmClientError> {
        let request_body = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature,
            max_tokens: self.max_tokens,
            stream: true,
        };

        let request = self.client.post(&self.completions_url).json(&request_body);
        let response = self
            .apply_auth(request)
            .send()
            .await
            .map_err(|e| LlmClientError::ApiRequestFailed(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmClientError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmClientError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let mut bytes = response.bytes_stream();
        let token_stream = async_stream::stream! {
            let mut decoder = SseLineDecoder::new();
            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(LlmClientError::StreamInterrupted(e.to_string()));
                        return;
                    }
                };
                for data in decoder.push(&chunk) {
                    match data {
                        SseData::Done => return,
                        SseData::Payload(payload) => match parse_completion_chunk(&payload) {
                            Ok(Some(token)) => yield Ok(token),
                            Ok(None) => {}
                            Err(e) => {
                                yield Err(e);
                                return;
                            }
                        },
                    }
                }
            }
            if let Some(SseData::Payload(payload)) = decoder.finish() {
                match parse_completion_chunk(&payload) {
                    Ok(Some(token)) => yield Ok(token),
                    Ok(None) => {}
                    Err(e) => yield Err(e),
                }
            }
        };

        Ok(Box::pin(token_stream))
    }
}

pub fn create_streaming_llm_client(
    settings: &LlmSettings,
) -> Result<StreamingLlmClient, LlmClientError> {
    let completions_url = match settings.provider.as_str() {
        "openai" => format!(
            "{}/chat/completions",
            settings.base_url.as_deref().unwrap_or(OPENAI_BASE_URL).trim_end_matches('/')
        ),
        "deepseek" => format!(
            "{}/chat/completions",
            settings.base_url.as_deref().unwrap_or(DEEPSEEK_BASE_URL).trim_end_matches('/')
        ),
        "lmstudio" => {
            let base_url = settings.base_url.as_deref().ok_or_else(|| {
                LlmClientError::Configuration("base_url required for lmstudio provider".to_string())
            })?;
            format!("{}/chat/completions", base_url.trim_end_matches('/'))
        }
        "azure" => {
            let endpoint = settings.azure_endpoint.as_ref().ok_or_else(|| {
                LlmClientError::Configuration(
                    "azure_endpoint required for azure provider".to_string(),
                )
            })?;
            format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                endpoint.trim_end_matches('/'),
                settings.chat_model,
                settings.azure_api_version
            )
        }
        other => {
            return Err(LlmClientError::Configuration(format!(
                "unknown provider: {}",
                other
            )));
        }
    };

    let client = Client::builder()
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .build()
        .map_err(|e| LlmClientError::Configuration(e.to_string()))?;

    Ok(StreamingLlmClient {
        client,
        provider: settings.provider.clone(),
        completions_url,
        api_key: settings.api_key.clone(),
        model: settings.chat_model.clone(),
        max_tokens: settings.max_tokens,
    })
}
