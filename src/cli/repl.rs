use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use super::{preset, ReplCommand, HELP};
use crate::application::RenderSurface;
use crate::connector::api::controller::format_presets;
use crate::connector::{Container, TerminalSurface, API_KEY_ENV};
use crate::domain::{DomainError, Session, SettingsUpdate};

const BANNER: &str = "\
Welcome to glmchat!
Type a message and press Enter. /help lists the commands.";

const TROUBLESHOOTING: &str = "Tip: if this keeps happening, check that your API key \
                               is correct and the endpoint is reachable.";

/// What the caller should do after a line has been handled.
enum Flow {
    Continue,
    Quit,
}

/// Run the interactive session until `/quit` or end of input.
///
/// Input is read one line at a time and each submission is awaited before the
/// next line is read, so lines typed while a reply is pending wait their turn.
pub async fn run_chat(container: &Container) -> Result<()> {
    let mut session = container.new_session()?;
    let surface = TerminalSurface::new();
    info!("Session {} started", session.id());

    surface.show_notice(BANNER);
    if !session.settings().has_credential() {
        surface.show_notice(&missing_key_hint());
    }
    if container.is_mock() {
        surface.show_notice("(offline mode: replies are echoed locally)");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        let command = ReplCommand::parse(&line);
        debug!("Session {}: {} command", session.id(), command_name(&command));
        if let Flow::Quit = handle(container, &mut session, &surface, command).await {
            break;
        }
    }

    info!(
        "Session {} ended after {} turns",
        session.id(),
        session.log().len()
    );
    Ok(())
}

async fn handle(
    container: &Container,
    session: &mut Session,
    surface: &TerminalSurface,
    command: ReplCommand,
) -> Flow {
    match command {
        ReplCommand::Message(text) => submit(container, session, surface, &text, false).await,
        ReplCommand::Send(text) => submit(container, session, surface, &text, true).await,
        ReplCommand::Prompt(n) => match preset(n) {
            Some(text) => submit(container, session, surface, text, true).await,
            None => surface.show_error(&format!("no preset prompt #{n}, see /prompts")),
        },
        ReplCommand::Prompts => surface.show_notice(&format_presets()),
        ReplCommand::Set { field, value } => {
            apply(session, surface, SettingsUpdate::parse_field(&field, &value))
        }
        ReplCommand::Key(key) => apply(
            session,
            surface,
            Ok(SettingsUpdate::new().with_credential(key)),
        ),
        ReplCommand::Model(model) => apply(
            session,
            surface,
            model.parse().map(|m| SettingsUpdate::new().with_model(m)),
        ),
        ReplCommand::Settings => surface.show_notice(&format_settings(container, session)),
        ReplCommand::History => surface.render_full(session.log().all()),
        ReplCommand::Reset => {
            session.reset();
            surface.reset();
            surface.show_notice("Conversation cleared.");
        }
        ReplCommand::Help => surface.show_notice(HELP),
        ReplCommand::Quit => return Flow::Quit,
        ReplCommand::Invalid(usage) => surface.show_error(&usage),
    }
    Flow::Continue
}

async fn submit(
    container: &Container,
    session: &mut Session,
    surface: &TerminalSurface,
    text: &str,
    explicit: bool,
) {
    let result = container
        .interaction_loop()
        .submit(session, text, explicit, surface)
        .await;

    // The loop has already shown the notice; only add hints here.
    match result {
        Err(DomainError::Service) => surface.show_notice(TROUBLESHOOTING),
        Err(e) if e.field() == Some("credential") => surface.show_notice(&missing_key_hint()),
        _ => {}
    }
}

fn apply(
    session: &mut Session,
    surface: &TerminalSurface,
    update: Result<SettingsUpdate, DomainError>,
) {
    match update.and_then(|u| session.update_settings(u)) {
        Ok(()) => surface.show_notice(&format_settings_line(session)),
        Err(e) => surface.show_error(&e.to_string()),
    }
}

fn format_settings_line(session: &Session) -> String {
    let s = session.settings();
    format!(
        "model={} temperature={} top_p={} max_tokens={} key={}",
        s.model(),
        s.temperature(),
        s.top_p(),
        s.max_tokens(),
        s.masked_credential()
    )
}

fn format_settings(container: &Container, session: &Session) -> String {
    let s = session.settings();
    format!(
        "Settings\n\
         ========\n\
         Model:       {}\n\
         Temperature: {}\n\
         Top P:       {}\n\
         Max Tokens:  {}\n\
         API Key:     {}\n\
         Timeout:     {}s\n\
         Turns:       {}/{}",
        s.model(),
        s.temperature(),
        s.top_p(),
        s.max_tokens(),
        s.masked_credential(),
        container.timeout_secs(),
        session.log().len(),
        session.max_turns()
    )
}

fn missing_key_hint() -> String {
    format!("No API key set. Use /key <api-key> or set {API_KEY_ENV}.")
}

fn command_name(command: &ReplCommand) -> &'static str {
    match command {
        ReplCommand::Message(_) => "message",
        ReplCommand::Send(_) => "send",
        ReplCommand::Prompt(_) => "prompt",
        ReplCommand::Prompts => "prompts",
        ReplCommand::Set { .. } => "set",
        ReplCommand::Key(_) => "key",
        ReplCommand::Model(_) => "model",
        ReplCommand::Settings => "settings",
        ReplCommand::History => "history",
        ReplCommand::Reset => "reset",
        ReplCommand::Help => "help",
        ReplCommand::Quit => "quit",
        ReplCommand::Invalid(_) => "invalid",
    }
}
