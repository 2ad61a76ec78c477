mod completion_client;
mod interaction_loop;

pub use completion_client::*;
pub use interaction_loop::*;
