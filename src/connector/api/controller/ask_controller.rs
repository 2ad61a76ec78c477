use anyhow::{bail, Result};

use crate::cli::{default_preset, preset};
use crate::connector::adapter::TerminalSurface;
use crate::SubmitOutcome;

use super::super::Container;

pub struct AskController<'a> {
    container: &'a Container,
}

impl<'a> AskController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Send one message in a fresh session and return the reply text.
    ///
    /// With neither a prompt nor a preset number the default preset is
    /// sent. A blank prompt needs `--force`.
    pub async fn ask(
        &self,
        prompt: Option<String>,
        preset_number: Option<usize>,
        force: bool,
    ) -> Result<String> {
        let text = match (prompt, preset_number) {
            (Some(text), _) => text,
            (None, Some(n)) => match preset(n) {
                Some(text) => text.to_string(),
                None => bail!("no preset prompt #{n}, see `glmchat prompts`"),
            },
            (None, None) => default_preset().to_string(),
        };
        if text.trim().is_empty() && !force {
            bail!("the prompt is blank; pass --force to send it anyway");
        }

        let mut session = self.container.new_session()?;
        let surface = TerminalSurface::spinner_only();

        match self
            .container
            .interaction_loop()
            .submit(&mut session, &text, force, &surface)
            .await?
        {
            SubmitOutcome::Replied(turn) => Ok(turn.content().to_string()),
            SubmitOutcome::Ignored => bail!("a request is already in flight"),
        }
    }
}
