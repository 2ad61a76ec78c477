use async_trait::async_trait;

use crate::domain::{CompletionRequest, CompletionResponse, DomainError};

/// Transport to a hosted chat-completion endpoint.
///
/// Implementors own the HTTP client, serialization and vendor-specific
/// status handling. They report failures with the detailed adapter variants
/// of [`DomainError`]; collapsing those into a user-facing error is the
/// caller's job.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Issue exactly one non-streaming request.
    async fn create(&self, request: &CompletionRequest) -> Result<CompletionResponse, DomainError>;

    /// Short name used in log lines.
    fn name(&self) -> &str;
}
