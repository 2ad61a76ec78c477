use crate::domain::{ModelTier, Turn};

/// Whatever shows the conversation to the user.
///
/// The interaction loop drives it: a pending signal before the request goes
/// out, a cleared signal once it resolves, the full log after every change,
/// and notices for rejected or failed submissions.
pub trait RenderSurface: Send + Sync {
    fn show_pending(&self, model: ModelTier);

    fn clear_pending(&self);

    fn render_log(&self, turns: &[Turn]);

    fn show_error(&self, message: &str);
}
