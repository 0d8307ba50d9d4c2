//! Prompt construction and character-budget arithmetic for the summarizer.

use crate::core::settings::SummaryStyle;

/// Upper bound on the composed summary prompt, in characters.
///
/// A length approximation of the model's token limit, not a token count.
pub const MAX_PROMPT_CHARS: usize = 16_000;

/// Appended after a cut so the model knows the input is partial.
pub const TRUNCATION_MARKER: &str = "... [transcript truncated due to length]";

/// Default hard limit of the microblog sink.
pub const DEFAULT_SINK_CHAR_BUDGET: usize = 280;

/// Spaces between components plus a small buffer.
pub const SINK_SEPARATOR_OVERHEAD: usize = 3;

/// Below or at this many characters a sink message is not worth sending.
pub const MIN_SINK_BODY_CHARS: usize = 50;

pub const ELLIPSIS: &str = "...";

pub const SUMMARY_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that summarizes YouTube videos accurately and concisely.";

pub const SINK_SYSTEM_PROMPT: &str = "You are a social media expert who creates engaging tweets.";

/// Max length kept from titles and names embedded in prompts.
pub const MAX_CONTEXT_FIELD_LEN: usize = 300;

/// Remove control characters and hard-truncate a title or name before it is
/// embedded in a prompt.
#[must_use]
pub fn sanitize_context_field(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_control())
        .take(MAX_CONTEXT_FIELD_LEN)
        .collect()
}

#[must_use]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// First `n` characters of `s`.
#[must_use]
pub fn take_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Compose the full-summary prompt. The transcript is appended verbatim.
#[must_use]
pub fn build_summary_prompt(
    transcript: &str,
    style: SummaryStyle,
    max_length_words: u32,
    include_timestamps: bool,
    title: Option<&str>,
    source_name: Option<&str>,
) -> String {
    let timestamps_instruction = if include_timestamps {
        "Include key timestamps for important points."
    } else {
        "Do not include timestamps."
    };

    let context = match (title, source_name) {
        (Some(title), Some(source)) => format!(
            "The video is titled '{}' from the channel '{}'. ",
            sanitize_context_field(title),
            sanitize_context_field(source)
        ),
        _ => String::new(),
    };

    format!(
        "{context}Summarize the following YouTube video transcript in a {style} style with a maximum of {max_length_words} words. {timestamps_instruction}\n\nTRANSCRIPT:\n{transcript}"
    )
}

/// Cut `prompt` to [`MAX_PROMPT_CHARS`] and append [`TRUNCATION_MARKER`] when
/// it is over budget. Returns the prompt unchanged otherwise.
#[must_use]
pub fn truncate_prompt(prompt: String) -> String {
    if char_len(&prompt) <= MAX_PROMPT_CHARS {
        return prompt;
    }
    let mut cut = take_chars(&prompt, MAX_PROMPT_CHARS).to_string();
    cut.push_str(TRUNCATION_MARKER);
    cut
}

/// Characters left for the generated body once the URL and attribution are
/// reserved. `None` when the remainder is at or below the floor.
#[must_use]
pub fn sink_available_length(budget: usize, url: &str, attribution: &str) -> Option<usize> {
    let available = budget
        .saturating_sub(char_len(url))
        .saturating_sub(char_len(attribution))
        .saturating_sub(SINK_SEPARATOR_OVERHEAD);
    (available > MIN_SINK_BODY_CHARS).then_some(available)
}

#[must_use]
pub fn sink_attribution(source_name: &str) -> String {
    format!(" - {source_name}")
}

/// Hard-truncate `text` with a trailing ellipsis when it exceeds `available`.
#[must_use]
pub fn fit_to_length(text: &str, available: usize) -> String {
    if char_len(text) <= available {
        return text.to_string();
    }
    let keep = available.saturating_sub(char_len(ELLIPSIS));
    format!("{}{ELLIPSIS}", take_chars(text, keep))
}

#[must_use]
pub fn compose_sink_payload(body: &str, url: &str, attribution: &str) -> String {
    format!("{body} {url}{attribution}")
}

#[must_use]
pub fn build_sink_prompt(summary: &str, title: &str, source_name: &str, available: usize) -> String {
    format!(
        "Create a concise and engaging tweet about this YouTube video that will make people want to watch it.\n\
         Video title: {}\n\
         Channel: {}\n\
         Summary: {summary}\n\n\
         The tweet must be no longer than {available} characters as I will add the video URL and attribution separately.\n\
         Do not include hashtags, the URL, or the channel name in your response.",
        sanitize_context_field(title),
        sanitize_context_field(source_name),
    )
}
