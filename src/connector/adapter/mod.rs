mod echo_completion;
mod terminal_surface;
mod zhipu_client;

pub use echo_completion::*;
pub use terminal_surface::*;
pub use zhipu_client::*;
