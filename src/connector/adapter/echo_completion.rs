use async_trait::async_trait;
use tracing::debug;

use crate::application::CompletionService;
use crate::domain::{CompletionRequest, CompletionResponse, DomainError};

/// Offline stand-in for the completion endpoint. Replies deterministically
/// by echoing the newest user turn, so the whole loop can be exercised
/// without a network or an API key that works.
pub struct EchoCompletionService;

impl EchoCompletionService {
    pub fn new() -> Self {
        Self
    }

    fn reply_for(request: &CompletionRequest) -> String {
        let last = request
            .messages()
            .last()
            .map(|t| t.content().trim())
            .unwrap_or_default();

        if last.is_empty() {
            format!("[{}] (empty message)", request.model())
        } else {
            format!(
                "[{}] You said: {} ({} messages so far)",
                request.model(),
                last,
                request.messages().len()
            )
        }
    }
}

impl Default for EchoCompletionService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionService for EchoCompletionService {
    async fn create(&self, request: &CompletionRequest) -> Result<CompletionResponse, DomainError> {
        let reply = Self::reply_for(request);
        debug!("Echo completion for {} messages", request.messages().len());
        Ok(CompletionResponse::single(reply))
    }

    fn name(&self) -> &str {
        "echo"
    }
}
