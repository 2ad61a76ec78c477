use std::sync::Arc;

use tracing::{info, warn};

use crate::application::{CompletionClient, RenderSurface};
use crate::domain::{DomainError, LoopState, Session, Turn, SERVICE_ERROR_NOTICE};

/// What happened to a submission that was not rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The service answered; both turns are now in the log.
    Replied(Turn),
    /// A request was already in flight for this session.
    Ignored,
}

/// Drives one submission through Idle → Pending → Idle.
///
/// All session state lives in the [`Session`] passed in; the loop itself only
/// holds the completion client, so one loop can serve any number of sessions.
pub struct InteractionLoop {
    client: Arc<CompletionClient>,
}

impl InteractionLoop {
    pub fn new(client: Arc<CompletionClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &CompletionClient {
        &self.client
    }

    /// Submit `input` for `session`.
    ///
    /// `explicit` marks a deliberate send action; only then is blank input
    /// allowed through. Rejections and failures are shown on `surface` and
    /// returned as errors: [`DomainError::Validation`] leaves the log
    /// untouched, [`DomainError::Service`] leaves it one user turn longer.
    pub async fn submit(
        &self,
        session: &mut Session,
        input: &str,
        explicit: bool,
        surface: &dyn RenderSurface,
    ) -> Result<SubmitOutcome, DomainError> {
        if session.is_pending() {
            warn!(
                "Session {}: submission ignored, a request is already in flight",
                session.id()
            );
            return Ok(SubmitOutcome::Ignored);
        }

        if let Err(e) = Self::check_ready(session, input, explicit) {
            warn!("Session {}: submission rejected: {}", session.id(), e);
            surface.show_error(&e.to_string());
            return Err(e);
        }

        let settings = session.settings().clone();
        let pending = PendingGuard::enter(session, surface);
        let result = self
            .client
            .complete(&settings, pending.session.log().all(), input, explicit)
            .await;
        drop(pending);

        match result {
            Ok(reply) => {
                let log = session.log_mut();
                log.append(Turn::user(input));
                log.append(reply.clone());
                info!(
                    "Session {}: exchange complete, {} turns",
                    session.id(),
                    session.log().len()
                );
                surface.render_log(session.log().all());
                Ok(SubmitOutcome::Replied(reply))
            }
            Err(e) if e.is_validation() => {
                surface.show_error(&e.to_string());
                Err(e)
            }
            Err(_) => {
                session.log_mut().append(Turn::user(input));
                surface.render_log(session.log().all());
                surface.show_error(SERVICE_ERROR_NOTICE);
                Err(DomainError::Service)
            }
        }
    }

    fn check_ready(session: &Session, input: &str, explicit: bool) -> Result<(), DomainError> {
        let settings = session.settings();
        settings.require_credential()?;
        if input.trim().is_empty() && !explicit {
            return Err(DomainError::validation(
                "message",
                "please enter some text, or use /send to submit it anyway",
            ));
        }
        if !session.has_room() {
            return Err(DomainError::validation(
                "conversation",
                format!(
                    "the conversation has reached {} turns; use /reset to start over",
                    session.max_turns()
                ),
            ));
        }
        settings.validate()
    }
}

/// Keeps a session Pending for as long as it lives. Dropping it, including
/// when the submission future itself is dropped mid-request, puts the
/// session back to Idle and clears the pending indicator.
struct PendingGuard<'a> {
    session: &'a mut Session,
    surface: &'a dyn RenderSurface,
}

impl<'a> PendingGuard<'a> {
    fn enter(session: &'a mut Session, surface: &'a dyn RenderSurface) -> Self {
        session.set_state(LoopState::Pending);
        surface.show_pending(session.settings().model());
        Self { session, surface }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.session.set_state(LoopState::Idle);
        self.surface.clear_pending();
    }
}
