use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error};

use crate::application::CompletionService;
use crate::domain::{CompletionRequest, DomainError, Settings, Turn};

/// Turns the current settings and history into one completion call and one
/// assistant [`Turn`].
///
/// Holds no conversation state of its own. Every failure coming back from
/// the service is logged here with enough context to diagnose it and then
/// replaced by [`DomainError::Service`], so callers never see transport
/// details.
pub struct CompletionClient {
    service: Arc<dyn CompletionService>,
}

impl CompletionClient {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self { service }
    }

    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    /// Ask the service for the reply to `user_text`.
    ///
    /// Blank text is rejected unless `force` is set. Settings are checked
    /// before anything is sent; validation failures come back unchanged.
    pub async fn complete(
        &self,
        settings: &Settings,
        history: &[Turn],
        user_text: &str,
        force: bool,
    ) -> Result<Turn, DomainError> {
        if user_text.trim().is_empty() && !force {
            return Err(DomainError::validation(
                "message",
                "please enter some text, or use /send to submit it anyway",
            ));
        }
        settings.require_credential()?;
        settings.validate()?;

        let request = CompletionRequest::build(settings, history, user_text);
        debug!(
            "Sending {} messages to {} (model={}, temperature={}, top_p={}, max_tokens={})",
            request.messages().len(),
            self.service.name(),
            request.model(),
            request.temperature(),
            request.top_p(),
            request.max_tokens()
        );

        let start_time = Instant::now();
        let outcome = self.service.create(&request).await;
        let elapsed = start_time.elapsed().as_secs_f64();

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                error!(
                    "Completion request failed after {:.2}s (service={}, model={}, \
                     input_chars={}, history_turns={}): {}",
                    elapsed,
                    self.service.name(),
                    request.model(),
                    request.input_chars(),
                    history.len(),
                    e
                );
                return Err(DomainError::Service);
            }
        };

        match response.into_first_choice() {
            Some(text) => {
                debug!("Received {} chars in {:.2}s", text.chars().count(), elapsed);
                Ok(Turn::assistant(text))
            }
            None => {
                error!(
                    "Completion response had no choices (service={}, model={}, \
                     input_chars={}, history_turns={})",
                    self.service.name(),
                    request.model(),
                    request.input_chars(),
                    history.len()
                );
                Err(DomainError::Service)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::{CompletionResponse, SettingsStore, SettingsUpdate};

    struct FakeService {
        reply: Result<CompletionResponse, fn() -> DomainError>,
        calls: AtomicUsize,
        last_messages: Mutex<Vec<Turn>>,
    }

    impl FakeService {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(CompletionResponse::single(text)),
                calls: AtomicUsize::new(0),
                last_messages: Mutex::new(Vec::new()),
            }
        }

        fn failing(err: fn() -> DomainError) -> Self {
            Self {
                reply: Err(err),
                calls: AtomicUsize::new(0),
                last_messages: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionService for FakeService {
        async fn create(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_messages.lock().unwrap() = request.messages().to_vec();
            match &self.reply {
                Ok(response) => Ok(response.clone()),
                Err(make) => Err(make()),
            }
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn settings_with_key() -> Settings {
        let mut store = SettingsStore::new();
        store
            .set(SettingsUpdate::new().with_credential("test-key"))
            .unwrap();
        store.get().clone()
    }

    #[tokio::test]
    async fn test_complete_returns_assistant_turn() {
        let service = Arc::new(FakeService::replying("Hi there"));
        let client = CompletionClient::new(service.clone());

        let turn = client
            .complete(&settings_with_key(), &[], "Hello", false)
            .await
            .unwrap();

        assert_eq!(turn, Turn::assistant("Hi there"));
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_complete_sends_full_history() {
        let service = Arc::new(FakeService::replying("D"));
        let client = CompletionClient::new(service.clone());
        let history = vec![Turn::user("A"), Turn::assistant("B")];

        client
            .complete(&settings_with_key(), &history, "C", false)
            .await
            .unwrap();

        assert_eq!(
            *service.last_messages.lock().unwrap(),
            vec![Turn::user("A"), Turn::assistant("B"), Turn::user("C")]
        );
    }

    #[tokio::test]
    async fn test_blank_text_rejected_unless_forced() {
        let service = Arc::new(FakeService::replying("ok"));
        let client = CompletionClient::new(service.clone());

        let err = client
            .complete(&settings_with_key(), &[], "   ", false)
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("message"));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);

        assert!(client
            .complete(&settings_with_key(), &[], "   ", true)
            .await
            .is_ok());
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_credential_never_calls_service() {
        let service = Arc::new(FakeService::replying("ok"));
        let client = CompletionClient::new(service.clone());

        let err = client
            .complete(&Settings::default(), &[], "Hello", false)
            .await
            .unwrap_err();

        assert_eq!(err.field(), Some("credential"));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_service_failures_collapse_to_generic_error() {
        let failures: [fn() -> DomainError; 4] = [
            || DomainError::transport("operation timed out"),
            || DomainError::unauthorized("invalid api key"),
            || DomainError::rate_limited("slow down"),
            || DomainError::malformed("expected value at line 1"),
        ];

        for failure in failures {
            let client = CompletionClient::new(Arc::new(FakeService::failing(failure)));
            let err = client
                .complete(&settings_with_key(), &[], "Hello", false)
                .await
                .unwrap_err();
            assert!(err.is_service(), "expected generic error, got {err:?}");
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_a_service_error() {
        let service = Arc::new(FakeService {
            reply: Ok(CompletionResponse::default()),
            calls: AtomicUsize::new(0),
            last_messages: Mutex::new(Vec::new()),
        });
        let client = CompletionClient::new(service);

        let err = client
            .complete(&settings_with_key(), &[], "Hello", false)
            .await
            .unwrap_err();
        assert!(err.is_service());
    }
}
