mod presets;
mod repl;
mod repl_command;

pub use presets::*;
pub use repl::run_chat;
pub use repl_command::*;

use clap::Subcommand;

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Start an interactive chat session (the default)
    Chat,

    /// Send one message and print the reply
    Ask {
        /// Message to send (defaults to the first preset prompt)
        prompt: Option<String>,

        /// Send preset prompt N instead (see `prompts`)
        #[arg(short, long, conflicts_with = "prompt")]
        preset: Option<usize>,

        /// Send even if the message is blank
        #[arg(short, long)]
        force: bool,
    },

    /// List the available models
    Models,

    /// List the preset prompts
    Prompts,
}
