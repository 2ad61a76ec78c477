pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{
    CompletionClient, CompletionService, InteractionLoop, RenderSurface, SubmitOutcome,
};

pub use cli::Commands;

pub use connector::{
    Container, ContainerConfig, EchoCompletionService, Router, TerminalSurface, ZhipuClient,
};

pub use domain::{
    CompletionRequest, CompletionResponse, ConversationLog, DomainError, LoopState, ModelTier,
    Role, Session, Settings, SettingsStore, SettingsUpdate, Turn,
};
