use std::ops::RangeInclusive;

use super::ModelTier;
use crate::domain::DomainError;

pub const DEFAULT_TEMPERATURE: f32 = 0.95;
pub const DEFAULT_TOP_P: f32 = 0.70;
pub const DEFAULT_MAX_TOKENS: u32 = 4095;

pub const TEMPERATURE_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const TOP_P_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const MAX_TOKENS_RANGE: RangeInclusive<u32> = 1..=4095;

/// Credential, model and sampling parameters for one session.
///
/// Values only change through [`SettingsStore::set`], which validates every
/// field, so a `Settings` handed out by the store is always in range.
/// [`Settings::validate`] re-checks the ranges right before a request is built.
#[derive(Clone, PartialEq)]
pub struct Settings {
    credential: String,
    model: ModelTier,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            credential: String::new(),
            model: ModelTier::default(),
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl Settings {
    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn has_credential(&self) -> bool {
        !self.credential.trim().is_empty()
    }

    pub fn model(&self) -> ModelTier {
        self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn top_p(&self) -> f32 {
        self.top_p
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Check every numeric field against its closed range.
    pub fn validate(&self) -> Result<(), DomainError> {
        check_unit("temperature", self.temperature, &TEMPERATURE_RANGE)?;
        check_unit("top_p", self.top_p, &TOP_P_RANGE)?;
        check_tokens(self.max_tokens)?;
        Ok(())
    }

    pub fn require_credential(&self) -> Result<(), DomainError> {
        if self.has_credential() {
            Ok(())
        } else {
            Err(DomainError::validation(
                "credential",
                "an API key is required before sending messages",
            ))
        }
    }

    /// Credential reduced to its last four characters, for display.
    pub fn masked_credential(&self) -> String {
        if !self.has_credential() {
            return "(not set)".to_string();
        }
        let chars: Vec<char> = self.credential.chars().collect();
        if chars.len() <= 8 {
            return "****".to_string();
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("****{tail}")
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("credential", &self.masked_credential())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

fn check_unit(
    field: &'static str,
    value: f32,
    range: &RangeInclusive<f32>,
) -> Result<(), DomainError> {
    // NaN fails `contains`, which is what we want.
    if range.contains(&value) {
        Ok(())
    } else {
        Err(DomainError::validation(
            field,
            format!(
                "must be within [{}, {}], got {}",
                range.start(),
                range.end(),
                value
            ),
        ))
    }
}

fn not_a_number(field: &'static str, value: &str, expected: &str) -> DomainError {
    DomainError::validation(field, format!("'{value}' is not {expected}"))
}

fn check_tokens(value: u32) -> Result<(), DomainError> {
    if MAX_TOKENS_RANGE.contains(&value) {
        Ok(())
    } else {
        Err(DomainError::validation(
            "max_tokens",
            format!(
                "must be within [{}, {}], got {}",
                MAX_TOKENS_RANGE.start(),
                MAX_TOKENS_RANGE.end(),
                value
            ),
        ))
    }
}

/// A partial settings change. Fields left as `None` are not touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsUpdate {
    credential: Option<String>,
    model: Option<ModelTier>,
    temperature: Option<f32>,
    top_p: Option<f32>,
    max_tokens: Option<u32>,
}

impl SettingsUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    pub fn with_model(mut self, model: ModelTier) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Build an update from a `field value` pair as typed in the settings
    /// panel. Parse failures are reported against the field.
    pub fn parse_field(field: &str, value: &str) -> Result<Self, DomainError> {
        let value = value.trim();
        match field.trim().to_lowercase().replace('-', "_").as_str() {
            "model" => Ok(Self::new().with_model(value.parse()?)),
            "temperature" | "temp" => value
                .parse::<f32>()
                .map(|v| Self::new().with_temperature(v))
                .map_err(|_| not_a_number("temperature", value, "a number")),
            "top_p" => value
                .parse::<f32>()
                .map(|v| Self::new().with_top_p(v))
                .map_err(|_| not_a_number("top_p", value, "a number")),
            "max_tokens" => value
                .parse::<u32>()
                .map(|v| Self::new().with_max_tokens(v))
                .map_err(|_| not_a_number("max_tokens", value, "a whole number")),
            "credential" | "api_key" | "key" => Ok(Self::new().with_credential(value)),
            other => Err(DomainError::validation(
                "setting",
                format!("unknown setting '{other}'"),
            )),
        }
    }
}

/// Session-scoped holder of the current [`Settings`].
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    current: Settings,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> &Settings {
        &self.current
    }

    /// Apply a partial update.
    ///
    /// Every supplied field is validated before anything is written, so a
    /// rejected update leaves the store exactly as it was.
    pub fn set(&mut self, update: SettingsUpdate) -> Result<(), DomainError> {
        if let Some(temperature) = update.temperature {
            check_unit("temperature", temperature, &TEMPERATURE_RANGE)?;
        }
        if let Some(top_p) = update.top_p {
            check_unit("top_p", top_p, &TOP_P_RANGE)?;
        }
        if let Some(max_tokens) = update.max_tokens {
            check_tokens(max_tokens)?;
        }

        let next = &mut self.current;
        if let Some(credential) = update.credential {
            next.credential = credential.trim().to_string();
        }
        if let Some(model) = update.model {
            next.model = model;
        }
        if let Some(temperature) = update.temperature {
            next.temperature = temperature;
        }
        if let Some(top_p) = update.top_p {
            next.top_p = top_p;
        }
        if let Some(max_tokens) = update.max_tokens {
            next.max_tokens = max_tokens;
        }
        Ok(())
    }
}
