use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::CompletionService;
use crate::domain::{CompletionRequest, CompletionResponse, DomainError, ModelTier, Turn};

pub const DEFAULT_BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v4";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const COMPLETIONS_PATH: &str = "/chat/completions";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Upstream error bodies are cut to this many chars before they are logged.
const MAX_ERROR_BODY: usize = 500;

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: ModelTier,
    messages: &'a [Turn],
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiChoiceMessage,
}

#[derive(Deserialize)]
struct ApiChoiceMessage {
    content: Option<String>,
}

impl TryFrom<ApiResponse> for CompletionResponse {
    type Error = DomainError;

    /// Choices keep their service order. The first choice is the reply, so
    /// it must carry text; a later choice without text becomes empty.
    fn try_from(response: ApiResponse) -> Result<Self, Self::Error> {
        let mut choices = Vec::with_capacity(response.choices.len());
        for (index, choice) in response.choices.into_iter().enumerate() {
            match choice.message.content {
                Some(text) => choices.push(text),
                None if index == 0 => {
                    return Err(DomainError::malformed(
                        "ZhipuClient: first choice has no message content",
                    ))
                }
                None => choices.push(String::new()),
            }
        }
        Ok(CompletionResponse::new(choices))
    }
}

/// HTTP client for the GLM chat-completions API (OpenAI-compatible wire
/// format, bearer-token auth).
///
/// The credential travels with each [`CompletionRequest`], so one client can
/// serve sessions with different keys. Every request is bounded by the
/// timeout given at construction; nothing is retried.
///
/// ```text
/// ZHIPUAI_BASE_URL=https://open.bigmodel.cn/api/paas/v4
/// ```
pub struct ZhipuClient {
    client: reqwest::Client,
    /// Full endpoint URL (base + COMPLETIONS_PATH).
    url: String,
    timeout: Duration,
}

impl ZhipuClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        let base: String = base_url.into();
        let url = format!("{}{}", base.trim_end_matches('/'), COMPLETIONS_PATH);
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DomainError::transport(format!("ZhipuClient: failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            url,
            timeout,
        })
    }

    /// Construct with the base URL from `ZHIPUAI_BASE_URL`, falling back to
    /// the public endpoint.
    pub fn from_env(timeout: Duration) -> Result<Self, DomainError> {
        Self::new(Self::configured_base_url(), timeout)
    }

    pub fn configured_base_url() -> String {
        std::env::var("ZHIPUAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn classify_failure(status: StatusCode, body: &str) -> DomainError {
        let body: String = body.chars().take(MAX_ERROR_BODY).collect();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                DomainError::unauthorized(format!("{status}: {body}"))
            }
            StatusCode::TOO_MANY_REQUESTS => DomainError::rate_limited(format!("{status}: {body}")),
            _ => DomainError::Upstream {
                status: status.as_u16(),
                body,
            },
        }
    }
}

#[async_trait]
impl CompletionService for ZhipuClient {
    async fn create(&self, request: &CompletionRequest) -> Result<CompletionResponse, DomainError> {
        let payload = ApiRequest {
            model: request.model(),
            messages: request.messages(),
            temperature: request.temperature(),
            top_p: request.top_p(),
            max_tokens: request.max_tokens(),
            stream: false,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(request.credential())
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DomainError::transport(format!(
                        "ZhipuClient: request timed out after {}s",
                        self.timeout.as_secs_f64()
                    ))
                } else {
                    DomainError::transport(format!("ZhipuClient: request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("ZhipuClient: API returned {status}");
            return Err(Self::classify_failure(status, &body));
        }

        let body = response.text().await.map_err(|e| {
            DomainError::transport(format!("ZhipuClient: failed to read response: {e}"))
        })?;
        let api_response: ApiResponse = serde_json::from_str(&body).map_err(|e| {
            DomainError::malformed(format!("ZhipuClient: failed to parse response: {e}"))
        })?;

        debug!("ZhipuClient: {} choices returned", api_response.choices.len());
        api_response.try_into()
    }

    fn name(&self) -> &str {
        "zhipu"
    }
}
