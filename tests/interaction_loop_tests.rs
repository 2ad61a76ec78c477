//! Interaction loop tests.
//!
//! These drive whole submissions through a scripted completion service and a
//! recording render surface.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use glmchat::{
    CompletionClient, CompletionRequest, CompletionResponse, CompletionService, DomainError,
    InteractionLoop, LoopState, ModelTier, RenderSurface, Role, Session, SettingsUpdate,
    SubmitOutcome, Turn,
};

/// Answers from a queue and remembers every request it saw.
#[derive(Default)]
struct ScriptedService {
    replies: Mutex<VecDeque<Result<CompletionResponse, DomainError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedService {
    fn reply(self: &Arc<Self>, text: &str) -> Arc<Self> {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(CompletionResponse::single(text)));
        self.clone()
    }

    fn fail(self: &Arc<Self>, err: DomainError) -> Arc<Self> {
        self.replies.lock().unwrap().push_back(Err(err));
        self.clone()
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn last_request(&self) -> CompletionRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait]
impl CompletionService for ScriptedService {
    async fn create(&self, request: &CompletionRequest) -> Result<CompletionResponse, DomainError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(CompletionResponse::single("default reply")))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Hangs on its first call, answers immediately afterwards.
#[derive(Default)]
struct StallsOnceService {
    calls: AtomicUsize,
}

#[async_trait]
impl CompletionService for StallsOnceService {
    async fn create(&self, _: &CompletionRequest) -> Result<CompletionResponse, DomainError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        Ok(CompletionResponse::single("answered"))
    }

    fn name(&self) -> &str {
        "stalls-once"
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Pending(ModelTier),
    Cleared,
    Log(usize),
    Error(String),
}

#[derive(Default)]
struct RecordingSurface {
    events: Mutex<Vec<Event>>,
}

impl RecordingSurface {
    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Error(msg) => Some(msg),
                _ => None,
            })
            .collect()
    }
}

impl RenderSurface for RecordingSurface {
    fn show_pending(&self, model: ModelTier) {
        self.events.lock().unwrap().push(Event::Pending(model));
    }

    fn clear_pending(&self) {
        self.events.lock().unwrap().push(Event::Cleared);
    }

    fn render_log(&self, turns: &[Turn]) {
        self.events.lock().unwrap().push(Event::Log(turns.len()));
    }

    fn show_error(&self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Error(message.to_string()));
    }
}

fn setup(service: Arc<ScriptedService>) -> InteractionLoop {
    InteractionLoop::new(Arc::new(CompletionClient::new(service)))
}

fn session_with_key() -> Session {
    let mut session = Session::new();
    session
        .update_settings(SettingsUpdate::new().with_credential("test-key"))
        .expect("valid credential");
    session
}

#[tokio::test]
async fn hello_scenario_appends_both_turns() {
    let service = Arc::new(ScriptedService::default()).reply("Hi there");
    let interaction = setup(service.clone());
    let surface = RecordingSurface::default();
    let mut session = session_with_key();

    let outcome = interaction
        .submit(&mut session, "Hello", false, &surface)
        .await
        .expect("submission succeeds");

    assert_eq!(outcome, SubmitOutcome::Replied(Turn::assistant("Hi there")));
    assert_eq!(
        session.log().all(),
        &[Turn::user("Hello"), Turn::assistant("Hi there")]
    );
    assert_eq!(session.state(), LoopState::Idle);
    assert_eq!(
        surface.events(),
        vec![
            Event::Pending(ModelTier::Flash),
            Event::Cleared,
            Event::Log(2)
        ]
    );
}

#[tokio::test]
async fn successful_submissions_alternate_roles() {
    let service = Arc::new(ScriptedService::default());
    let interaction = setup(service.clone());
    let surface = RecordingSurface::default();
    let mut session = session_with_key();

    for i in 0..5 {
        interaction
            .submit(&mut session, &format!("question {i}"), false, &surface)
            .await
            .expect("submission succeeds");
    }

    let turns = session.log().all();
    assert_eq!(turns.len(), 10);
    for (i, turn) in turns.iter().enumerate() {
        let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
        assert_eq!(turn.role(), expected, "turn {i}");
    }
    assert_eq!(service.calls(), 5);
}

#[tokio::test]
async fn outbound_request_carries_full_history_in_order() {
    let service = Arc::new(ScriptedService::default()).reply("B").reply("D");
    let interaction = setup(service.clone());
    let surface = RecordingSurface::default();
    let mut session = session_with_key();

    interaction
        .submit(&mut session, "A", false, &surface)
        .await
        .expect("first submission");
    interaction
        .submit(&mut session, "C", false, &surface)
        .await
        .expect("second submission");

    let request = service.last_request();
    assert_eq!(
        request.messages(),
        &[Turn::user("A"), Turn::assistant("B"), Turn::user("C")]
    );
}

#[tokio::test]
async fn failed_submission_keeps_only_user_turn() {
    let service = Arc::new(ScriptedService::default())
        .reply("B")
        .fail(DomainError::transport("ZhipuClient: request timed out after 60s"));
    let interaction = setup(service.clone());
    let surface = RecordingSurface::default();
    let mut session = session_with_key();

    interaction
        .submit(&mut session, "A", false, &surface)
        .await
        .expect("first submission");

    let err = interaction
        .submit(&mut session, "C", false, &surface)
        .await
        .expect_err("service failure");

    assert!(err.is_service());
    assert_eq!(
        session.log().all(),
        &[Turn::user("A"), Turn::assistant("B"), Turn::user("C")]
    );
    assert_eq!(session.state(), LoopState::Idle);

    let errors = surface.errors();
    assert_eq!(errors.len(), 1);
    assert!(!errors[0].contains("timed out"), "raw error leaked: {}", errors[0]);
}

#[tokio::test]
async fn every_failure_grows_log_by_one() {
    let service = Arc::new(ScriptedService::default())
        .fail(DomainError::unauthorized("401 Unauthorized: bad key"))
        .fail(DomainError::rate_limited("429 Too Many Requests"))
        .fail(DomainError::malformed("missing field `choices`"));
    let interaction = setup(service);
    let surface = RecordingSurface::default();
    let mut session = session_with_key();

    for expected_len in 1..=3 {
        let err = interaction
            .submit(&mut session, "again", false, &surface)
            .await
            .expect_err("service failure");
        assert!(err.is_service());
        assert_eq!(session.log().len(), expected_len);
        assert_eq!(session.state(), LoopState::Idle);
    }
    assert!(session.log().all().iter().all(|t| t.is_user()));
}

#[tokio::test]
async fn empty_credential_never_reaches_service() {
    let service = Arc::new(ScriptedService::default());
    let interaction = setup(service.clone());
    let surface = RecordingSurface::default();
    let mut session = Session::new();

    let err = interaction
        .submit(&mut session, "Hello", true, &surface)
        .await
        .expect_err("missing credential");

    assert_eq!(err.field(), Some("credential"));
    assert_eq!(service.calls(), 0);
    assert!(session.log().is_empty());
    assert!(!surface
        .events()
        .iter()
        .any(|e| matches!(e, Event::Pending(_))));
}

#[tokio::test]
async fn blank_input_needs_explicit_submit() {
    let service = Arc::new(ScriptedService::default()).reply("ok");
    let interaction = setup(service.clone());
    let surface = RecordingSurface::default();
    let mut session = session_with_key();

    let err = interaction
        .submit(&mut session, "  ", false, &surface)
        .await
        .expect_err("blank rejected");
    assert_eq!(err.field(), Some("message"));
    assert_eq!(service.calls(), 0);
    assert!(session.log().is_empty());

    interaction
        .submit(&mut session, "  ", true, &surface)
        .await
        .expect("explicit blank allowed");
    assert_eq!(service.calls(), 1);
    assert_eq!(session.log().len(), 2);
}

#[tokio::test]
async fn settings_changes_apply_to_next_request() {
    let service = Arc::new(ScriptedService::default());
    let interaction = setup(service.clone());
    let surface = RecordingSurface::default();
    let mut session = session_with_key();

    interaction
        .submit(&mut session, "first", false, &surface)
        .await
        .expect("first submission");
    assert_eq!(service.last_request().model(), ModelTier::Flash);

    session
        .update_settings(
            SettingsUpdate::new()
                .with_model(ModelTier::Long)
                .with_temperature(0.1)
                .with_top_p(0.9)
                .with_max_tokens(256),
        )
        .expect("valid update");
    let rejected = session.update_settings(SettingsUpdate::new().with_temperature(1.5));
    assert_eq!(rejected.unwrap_err().field(), Some("temperature"));

    interaction
        .submit(&mut session, "second", false, &surface)
        .await
        .expect("second submission");

    let request = service.last_request();
    assert_eq!(request.model(), ModelTier::Long);
    assert_eq!(request.temperature(), 0.1);
    assert_eq!(request.top_p(), 0.9);
    assert_eq!(request.max_tokens(), 256);
    assert_eq!(request.credential(), "test-key");
}

#[tokio::test]
async fn sessions_do_not_share_history() {
    let service = Arc::new(ScriptedService::default());
    let interaction = setup(service.clone());
    let surface = RecordingSurface::default();
    let mut alice = session_with_key();
    let mut bob = session_with_key();

    interaction
        .submit(&mut alice, "from alice", false, &surface)
        .await
        .expect("alice submits");
    interaction
        .submit(&mut bob, "from bob", false, &surface)
        .await
        .expect("bob submits");

    assert_eq!(alice.log().len(), 2);
    assert_eq!(bob.log().len(), 2);
    assert_eq!(service.last_request().messages(), &[Turn::user("from bob")]);
}

#[tokio::test]
async fn reset_starts_a_fresh_history() {
    let service = Arc::new(ScriptedService::default());
    let interaction = setup(service.clone());
    let surface = RecordingSurface::default();
    let mut session = session_with_key();

    interaction
        .submit(&mut session, "before", false, &surface)
        .await
        .expect("first submission");
    session.reset();
    interaction
        .submit(&mut session, "after", false, &surface)
        .await
        .expect("second submission");

    assert_eq!(service.last_request().messages(), &[Turn::user("after")]);
    assert_eq!(session.log().len(), 2);
}

#[tokio::test]
async fn abandoned_submission_returns_session_to_idle() {
    let interaction = InteractionLoop::new(Arc::new(CompletionClient::new(Arc::new(
        StallsOnceService::default(),
    ))));
    let surface = RecordingSurface::default();
    let mut session = session_with_key();

    let abandoned = tokio::time::timeout(
        Duration::from_millis(50),
        interaction.submit(&mut session, "a", false, &surface),
    )
    .await;
    assert!(abandoned.is_err(), "first call should still be waiting");

    assert_eq!(session.state(), LoopState::Idle);
    assert!(session.log().is_empty());
    assert_eq!(
        surface.events(),
        vec![Event::Pending(ModelTier::Flash), Event::Cleared]
    );

    let outcome = interaction
        .submit(&mut session, "b", false, &surface)
        .await
        .expect("next submission goes through");
    assert_eq!(outcome, SubmitOutcome::Replied(Turn::assistant("answered")));
    assert_eq!(
        session.log().all(),
        &[Turn::user("b"), Turn::assistant("answered")]
    );
}
