mod completion;
mod conversation;
mod model_tier;
mod session;
mod settings;

pub use completion::*;
pub use conversation::*;
pub use model_tier::*;
pub use session::*;
pub use settings::*;
