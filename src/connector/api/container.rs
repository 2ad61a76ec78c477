use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::debug;

use crate::application::{CompletionClient, CompletionService, InteractionLoop};
use crate::connector::adapter::{EchoCompletionService, ZhipuClient};
use crate::domain::{DomainError, Session, SettingsUpdate};

pub const API_KEY_ENV: &str = "ZHIPUAI_API_KEY";
/// Credential used with `--mock` when none is configured.
const MOCK_CREDENTIAL: &str = "offline";

pub struct ContainerConfig {
    /// Explicit API key; falls back to `ZHIPUAI_API_KEY`.
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Endpoint base URL; falls back to `ZHIPUAI_BASE_URL`.
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_turns: usize,
    /// Answer locally instead of calling the endpoint.
    pub mock: bool,
}

pub struct Container {
    interaction_loop: InteractionLoop,
    config: ContainerConfig,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));

        let service: Arc<dyn CompletionService> = if config.mock {
            debug!("Using echo completion service");
            Arc::new(EchoCompletionService::new())
        } else {
            let base_url = config
                .base_url
                .clone()
                .unwrap_or_else(ZhipuClient::configured_base_url);
            let client = ZhipuClient::new(base_url, timeout)?;
            debug!("Using completion endpoint {} (timeout {:?})", client.url(), timeout);
            Arc::new(client)
        };

        let client = Arc::new(CompletionClient::new(service));
        Ok(Self {
            interaction_loop: InteractionLoop::new(client),
            config,
        })
    }

    pub fn interaction_loop(&self) -> &InteractionLoop {
        &self.interaction_loop
    }

    /// A fresh session carrying the startup settings. Every startup value
    /// goes through the settings store, so a bad flag is reported by field.
    pub fn new_session(&self) -> Result<Session, DomainError> {
        let mut session = Session::new().with_max_turns(self.config.max_turns);
        session.update_settings(self.startup_settings()?)?;
        debug!("Created session {} ({:?})", session.id(), session.settings());
        Ok(session)
    }

    fn startup_settings(&self) -> Result<SettingsUpdate, DomainError> {
        let mut update = SettingsUpdate::new();

        let credential = self
            .config
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty());
        match credential {
            Some(key) => update = update.with_credential(key),
            None if self.config.mock => update = update.with_credential(MOCK_CREDENTIAL),
            None => {}
        }

        if let Some(model) = self.config.model.as_deref() {
            update = update.with_model(model.parse()?);
        }
        if let Some(temperature) = self.config.temperature {
            update = update.with_temperature(temperature);
        }
        if let Some(top_p) = self.config.top_p {
            update = update.with_top_p(top_p);
        }
        if let Some(max_tokens) = self.config.max_tokens {
            update = update.with_max_tokens(max_tokens);
        }
        Ok(update)
    }

    pub fn is_mock(&self) -> bool {
        self.config.mock
    }

    pub fn timeout_secs(&self) -> u64 {
        self.config.timeout_secs
    }
}
