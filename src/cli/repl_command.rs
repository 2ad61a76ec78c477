/// One line of interactive input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Plain text: a normal submission, blank input is rejected.
    Message(String),
    /// `/send [text]`: an explicit submission, blank input allowed.
    Send(String),
    /// `/prompt <n>`: submit preset `n` explicitly.
    Prompt(usize),
    Prompts,
    /// `/set <field> <value>`
    Set { field: String, value: String },
    /// `/key <credential>`
    Key(String),
    /// `/model <id>`
    Model(String),
    Settings,
    History,
    Reset,
    Help,
    Quit,
    /// A slash command that could not be understood; carries a usage hint.
    Invalid(String),
}

pub const HELP: &str = "\
Commands:
  <text>                 send a message
  /send [text]           send even if the text is blank
  /prompts               list preset prompts
  /prompt <n>            send preset prompt n
  /settings              show the current settings
  /set <field> <value>   change model, temperature, top_p or max_tokens
  /model <id>            switch model (glm-4-flash, glm-4-long)
  /key <api-key>         set the API key
  /history               print the whole conversation
  /reset                 clear the conversation
  /help                  show this help
  /quit                  leave";

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim_start();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return ReplCommand::Message(line.trim_end_matches(['\r', '\n']).to_string());
        };

        let rest = rest.trim_end();
        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };

        match name.to_lowercase().as_str() {
            "send" => ReplCommand::Send(args.to_string()),
            "prompt" => match args.parse::<usize>() {
                Ok(n) => ReplCommand::Prompt(n),
                Err(_) => ReplCommand::Invalid("usage: /prompt <n> (see /prompts)".to_string()),
            },
            "prompts" => ReplCommand::Prompts,
            "set" => match args.split_once(char::is_whitespace) {
                Some((field, value)) => ReplCommand::Set {
                    field: field.to_string(),
                    value: value.trim().to_string(),
                },
                None => ReplCommand::Invalid("usage: /set <field> <value>".to_string()),
            },
            "key" if !args.is_empty() => ReplCommand::Key(args.to_string()),
            "key" => ReplCommand::Invalid("usage: /key <api-key>".to_string()),
            "model" if !args.is_empty() => ReplCommand::Model(args.to_string()),
            "model" => ReplCommand::Invalid("usage: /model <glm-4-flash|glm-4-long>".to_string()),
            "settings" => ReplCommand::Settings,
            "history" => ReplCommand::History,
            "reset" | "clear" => ReplCommand::Reset,
            "help" | "?" => ReplCommand::Help,
            "quit" | "exit" | "q" => ReplCommand::Quit,
            other => ReplCommand::Invalid(format!("unknown command '/{other}', try /help")),
        }
    }
}
