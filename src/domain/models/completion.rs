use super::{ModelTier, Settings, Turn};

/// Everything one call to the completion service carries.
#[derive(Clone, PartialEq)]
pub struct CompletionRequest {
    credential: String,
    model: ModelTier,
    messages: Vec<Turn>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

impl CompletionRequest {
    /// Assemble the outbound request: the whole history, untouched and in
    /// order, followed by the new user turn.
    pub fn build(settings: &Settings, history: &[Turn], user_text: &str) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.extend_from_slice(history);
        messages.push(Turn::user(user_text));

        Self {
            credential: settings.credential().to_string(),
            model: settings.model(),
            messages,
            temperature: settings.temperature(),
            top_p: settings.top_p(),
            max_tokens: settings.max_tokens(),
        }
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn model(&self) -> ModelTier {
        self.model
    }

    pub fn messages(&self) -> &[Turn] {
        &self.messages
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn top_p(&self) -> f32 {
        self.top_p
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Characters in the newest user turn.
    pub fn input_chars(&self) -> usize {
        self.messages
            .last()
            .map(|t| t.content().chars().count())
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for CompletionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionRequest")
            .field("model", &self.model)
            .field("messages", &self.messages.len())
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

/// Candidate completions returned by the service, in service order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionResponse {
    choices: Vec<String>,
}

impl CompletionResponse {
    pub fn new(choices: Vec<String>) -> Self {
        Self { choices }
    }

    pub fn single(text: impl Into<String>) -> Self {
        Self::new(vec![text.into()])
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn into_first_choice(self) -> Option<String> {
        self.choices.into_iter().next()
    }
}
