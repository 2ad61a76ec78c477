pub mod ask_controller;
pub mod models_controller;
pub mod prompts_controller;

pub use ask_controller::AskController;
pub use models_controller::ModelsController;
pub use prompts_controller::{format_presets, PromptsController};
