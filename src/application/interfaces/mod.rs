mod completion_service;
mod render_surface;

pub use completion_service::*;
pub use render_surface::*;
