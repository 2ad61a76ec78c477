use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::application::RenderSurface;
use crate::domain::{ModelTier, Role, Turn};

pub const USER_LABEL: &str = "You";
pub const ASSISTANT_LABEL: &str = "Bot";

/// Renders the conversation on stdout and notices on stderr.
///
/// The terminal keeps what it already printed, so `render_log` only writes
/// the turns added since the previous call. A snapshot shorter than what was
/// printed means the log was reset, and printing starts over.
pub struct TerminalSurface {
    spinner: Mutex<Option<ProgressBar>>,
    rendered: AtomicUsize,
    /// When false only the spinner is drawn; used for one-shot commands that
    /// print the reply and report errors themselves.
    echo: bool,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
            rendered: AtomicUsize::new(0),
            echo: true,
        }
    }

    pub fn spinner_only() -> Self {
        Self {
            echo: false,
            ..Self::new()
        }
    }

    pub fn format_turn(turn: &Turn) -> String {
        let label = match turn.role() {
            Role::User => USER_LABEL,
            Role::Assistant => ASSISTANT_LABEL,
        };
        format!("{label}: {}", turn.content())
    }

    /// Print every turn regardless of what was shown before.
    pub fn render_full(&self, turns: &[Turn]) {
        if turns.is_empty() {
            println!("(no messages yet)");
        }
        for turn in turns {
            println!("{}", Self::format_turn(turn));
        }
        self.rendered.store(turns.len(), Ordering::SeqCst);
    }

    pub fn show_notice(&self, message: &str) {
        println!("{message}");
    }

    /// Forget what was printed, after the log has been cleared.
    pub fn reset(&self) {
        self.rendered.store(0, Ordering::SeqCst);
    }

    fn pending_message(model: ModelTier) -> String {
        format!("Waiting for a reply from {model}...")
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface for TerminalSurface {
    fn show_pending(&self, model: ModelTier) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(Self::pending_message(model));
        spinner.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(previous) = slot.replace(spinner) {
                previous.finish_and_clear();
            }
        }
    }

    fn clear_pending(&self) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(spinner) = slot.take() {
                spinner.finish_and_clear();
            }
        }
    }

    fn render_log(&self, turns: &[Turn]) {
        if !self.echo {
            return;
        }
        let already = self.rendered.load(Ordering::SeqCst);
        let start = if turns.len() < already { 0 } else { already };

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for turn in &turns[start..] {
            let _ = writeln!(out, "{}", Self::format_turn(turn));
        }
        let _ = out.flush();

        self.rendered.store(turns.len(), Ordering::SeqCst);
    }

    fn show_error(&self, message: &str) {
        if !self.echo {
            return;
        }
        eprintln!("error: {message}");
    }
}
