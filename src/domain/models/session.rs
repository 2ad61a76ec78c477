use uuid::Uuid;

use super::{ConversationLog, Settings, SettingsStore, SettingsUpdate};
use crate::domain::DomainError;

/// Default cap on the number of turns a session may hold.
pub const DEFAULT_MAX_TURNS: usize = 200;

/// Where the interaction loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Idle,
    /// A request is in flight; further submissions are ignored.
    Pending,
}

/// One user's isolated settings and history.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    settings: SettingsStore,
    log: ConversationLog,
    state: LoopState,
    max_turns: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            settings: SettingsStore::new(),
            log: ConversationLog::new(),
            state: LoopState::Idle,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    /// Cap the conversation length. Values below 2 would make every
    /// submission impossible and are raised to 2.
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns.max(2);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn settings(&self) -> &Settings {
        self.settings.get()
    }

    pub fn update_settings(&mut self, update: SettingsUpdate) -> Result<(), DomainError> {
        self.settings.set(update)
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub(crate) fn log_mut(&mut self) -> &mut ConversationLog {
        &mut self.log
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == LoopState::Pending
    }

    pub(crate) fn set_state(&mut self, state: LoopState) {
        self.state = state;
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Whether another user/assistant exchange still fits under the cap.
    pub fn has_room(&self) -> bool {
        self.log.len() + 2 <= self.max_turns
    }

    /// Drop the history and return to idle. Settings are kept.
    pub fn reset(&mut self) {
        self.log.clear();
        self.state = LoopState::Idle;
    }
}
