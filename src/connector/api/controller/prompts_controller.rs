use anyhow::Result;

use crate::cli::{default_preset, PRESET_PROMPTS};

pub struct PromptsController;

impl PromptsController {
    pub fn new() -> Self {
        Self
    }

    pub fn list(&self) -> Result<String> {
        Ok(format_presets())
    }
}

impl Default for PromptsController {
    fn default() -> Self {
        Self::new()
    }
}

/// Numbered preset list, shared with the interactive `/prompts` command.
pub fn format_presets() -> String {
    let mut output = String::from("Preset prompts:\n");
    for (i, prompt) in PRESET_PROMPTS.iter().enumerate() {
        let marker = if *prompt == default_preset() { " (default)" } else { "" };
        output.push_str(&format!("\n  {}. {}{}", i + 1, prompt, marker));
    }
    output
}
