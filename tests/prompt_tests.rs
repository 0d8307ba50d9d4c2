use daily_digest::core::models::canonical_item_url;
use daily_digest::core::settings::SummaryStyle;
use daily_digest::prompt::{
    ELLIPSIS, MAX_CONTEXT_FIELD_LEN, MAX_PROMPT_CHARS, MIN_SINK_BODY_CHARS,
    SINK_SEPARATOR_OVERHEAD, TRUNCATION_MARKER, build_sink_prompt, build_summary_prompt,
    char_len, compose_sink_payload, fit_to_length, sanitize_context_field, sink_attribution,
    sink_available_length, truncate_prompt,
};

#[test]
fn test_summary_prompt_carries_settings_and_context() {
    let prompt = build_summary_prompt(
        "hello world",
        SummaryStyle::BulletPoints,
        150,
        true,
        Some("Async Rust"),
        Some("Rust Talks"),
    );

    assert!(prompt.starts_with("The video is titled 'Async Rust' from the channel 'Rust Talks'."));
    assert!(prompt.contains("bullet_points style"));
    assert!(prompt.contains("maximum of 150 words"));
    assert!(prompt.contains("Include key timestamps"));
    assert!(prompt.ends_with("TRANSCRIPT:\nhello world"));
}

#[test]
fn test_summary_prompt_without_context() {
    let prompt = build_summary_prompt("t", SummaryStyle::Concise, 300, false, None, Some("x"));
    assert!(prompt.starts_with("Summarize the following"));
    assert!(prompt.contains("Do not include timestamps."));
}

#[test]
fn test_truncate_prompt_keeps_short_prompt() {
    let prompt = "a".repeat(MAX_PROMPT_CHARS);
    assert_eq!(truncate_prompt(prompt.clone()), prompt);
}

#[test]
fn test_truncate_prompt_cuts_to_limit_and_marks() {
    let long = "é".repeat(MAX_PROMPT_CHARS + 500);
    let truncated = truncate_prompt(long);

    assert!(truncated.ends_with(TRUNCATION_MARKER));
    assert_eq!(
        char_len(&truncated),
        MAX_PROMPT_CHARS + char_len(TRUNCATION_MARKER)
    );
}

#[test]
fn test_sanitize_context_field() {
    assert_eq!(sanitize_context_field("Title\u{0000} with\ncontrol"), "Title withcontrol");
    let long = "a".repeat(MAX_CONTEXT_FIELD_LEN + 10);
    assert_eq!(char_len(&sanitize_context_field(&long)), MAX_CONTEXT_FIELD_LEN);
}

#[test]
fn test_sink_available_length_subtracts_url_and_attribution() {
    let url = canonical_item_url("abcdefghijk");
    let attribution = sink_attribution("Rust Talks");
    let expected = 280 - char_len(&url) - char_len(&attribution) - SINK_SEPARATOR_OVERHEAD;

    assert_eq!(sink_available_length(280, &url, &attribution), Some(expected));
}

#[test]
fn test_sink_available_length_floor() {
    let url = canonical_item_url("abcdefghijk");
    let attribution = sink_attribution("Rust Talks");
    let fixed = char_len(&url) + char_len(&attribution) + SINK_SEPARATOR_OVERHEAD;

    assert_eq!(
        sink_available_length(fixed + MIN_SINK_BODY_CHARS + 1, &url, &attribution),
        Some(MIN_SINK_BODY_CHARS + 1)
    );
    assert_eq!(
        sink_available_length(fixed + MIN_SINK_BODY_CHARS, &url, &attribution),
        None
    );
    assert_eq!(sink_available_length(10, &url, &attribution), None);
}

#[test]
fn test_fit_to_length_truncates_with_ellipsis() {
    let body = "b".repeat(260);
    let fitted = fit_to_length(&body, 221);

    assert_eq!(char_len(&fitted), 221);
    assert!(fitted.ends_with(ELLIPSIS));
    assert_eq!(fit_to_length("short", 221), "short");
}

#[test]
fn test_composed_payload_fits_budget() {
    let url = canonical_item_url("abcdefghijk");
    let attribution = sink_attribution("Rust Talks");
    let available = sink_available_length(280, &url, &attribution).unwrap();

    let body = fit_to_length(&"w".repeat(400), available);
    let payload = compose_sink_payload(&body, &url, &attribution);

    assert!(char_len(&payload) <= 280);
    assert!(payload.ends_with(&format!("{url} - Rust Talks")));
}

#[test]
fn test_sink_prompt_mentions_limit() {
    let prompt = build_sink_prompt("A summary", "Title", "Channel", 180);
    assert!(prompt.contains("no longer than 180 characters"));
    assert!(prompt.contains("Summary: A summary"));
}
