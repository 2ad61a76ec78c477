/// Starter prompts offered in the prompt picker. The first one is the
/// default.
pub const PRESET_PROMPTS: [&str; 6] = [
    "Give an overview of Russian literature",
    "Introduce a work of Russian literature",
    "Explain Tolstoy's ideas about writing",
    "Discuss Dostoevsky's major works",
    "Describe how Russian literature relates to Western literature",
    "Analyse Pushkin's contribution to literature",
];

/// Look up a preset by its 1-based number as shown to the user.
pub fn preset(number: usize) -> Option<&'static str> {
    number
        .checked_sub(1)
        .and_then(|i| PRESET_PROMPTS.get(i))
        .copied()
}

pub fn default_preset() -> &'static str {
    PRESET_PROMPTS[0]
}
