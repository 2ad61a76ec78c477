use anyhow::Result;

use crate::Commands;

use super::container::Container;
use super::controller::{AskController, ModelsController, PromptsController};

pub struct Router<'a> {
    ask_controller: AskController<'a>,
    models_controller: ModelsController,
    prompts_controller: PromptsController,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            ask_controller: AskController::new(container),
            models_controller: ModelsController::new(),
            prompts_controller: PromptsController::new(),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Ask {
                prompt,
                preset,
                force,
            } => self.ask_controller.ask(prompt, preset, force).await,
            Commands::Models => self.models_controller.list(),
            Commands::Prompts => self.prompts_controller.list(),
            Commands::Chat => {
                anyhow::bail!("chat runs as an interactive session, not a routed command")
            }
        }
    }
}
