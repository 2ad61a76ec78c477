use anyhow::Result;

use crate::ModelTier;

pub struct ModelsController;

impl ModelsController {
    pub fn new() -> Self {
        Self
    }

    pub fn list(&self) -> Result<String> {
        let default = ModelTier::default();
        let lines: Vec<String> = ModelTier::ALL
            .iter()
            .map(|m| {
                let marker = if *m == default { " (default)" } else { "" };
                format!("  {:<12} {}{}", m.as_str(), m.description(), marker)
            })
            .collect();
        Ok(format!("Available models:\n\n{}", lines.join("\n")))
    }
}

impl Default for ModelsController {
    fn default() -> Self {
        Self::new()
    }
}
