use std::str::FromStr;

use serde::Serialize;

use crate::domain::DomainError;

/// The model families the completion endpoint offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum ModelTier {
    #[default]
    #[serde(rename = "glm-4-flash")]
    Flash,
    #[serde(rename = "glm-4-long")]
    Long,
}

impl ModelTier {
    pub const ALL: [ModelTier; 2] = [ModelTier::Flash, ModelTier::Long];

    /// Identifier sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTier::Flash => "glm-4-flash",
            ModelTier::Long => "glm-4-long",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ModelTier::Flash => "fast tier, low latency",
            ModelTier::Long => "long-context tier",
        }
    }
}

impl FromStr for ModelTier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "glm-4-flash" | "flash" | "fast" => Ok(ModelTier::Flash),
            "glm-4-long" | "long" => Ok(ModelTier::Long),
            unknown => Err(DomainError::validation(
                "model",
                format!("unknown model '{unknown}', expected glm-4-flash or glm-4-long"),
            )),
        }
    }
}

impl std::fmt::Display for ModelTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
