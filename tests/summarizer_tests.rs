mod common;

use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;
use daily_digest::ai::{SummaryRequest, Summarizer, TextGenerator};
use daily_digest::clients::{OAuth1Credentials, XClient};
use daily_digest::core::models::{SinkKind, SinkOutcome, canonical_item_url};
use daily_digest::core::settings::{EffectiveSettings, SourceConfig, SummaryStyle};
use daily_digest::errors::DigestError;
use daily_digest::prompt::{MAX_PROMPT_CHARS, TRUNCATION_MARKER, char_len};
use daily_digest::worker::sinks::{LongformSink, MicroblogSink};
use daily_digest::worker::{Distributor, Sink};

fn settings() -> EffectiveSettings {
    EffectiveSettings {
        style: SummaryStyle::Detailed,
        max_length_words: 200,
        include_timestamps: false,
    }
}

fn x_client(server: &MockServer) -> XClient {
    let credentials = OAuth1Credentials {
        consumer_key: "key".to_string(),
        consumer_secret: "secret".to_string(),
        access_token: "token".to_string(),
        access_token_secret: "token-secret".to_string(),
    };
    XClient::new(credentials, server.uri())
}

fn summarizer(generator: &FakeGenerator) -> Summarizer {
    let boxed: Box<dyn TextGenerator> = Box::new(generator.clone());
    Summarizer::new(Some(boxed), "gpt-3.5-turbo")
}

fn request(transcript: &str) -> SummaryRequest<'_> {
    SummaryRequest {
        transcript,
        settings: settings(),
        title: Some("Async Rust"),
        source_name: Some("Rust Talks"),
        model: "gpt-4-turbo",
    }
}

fn source(microblog: bool, longform: bool) -> SourceConfig {
    SourceConfig {
        identifier: "UC123".to_string(),
        name: "Rust Talks".to_string(),
        summary_style: None,
        summary_length: None,
        include_timestamps: None,
        post_to_microblog: microblog,
        post_to_longform: longform,
    }
}

#[tokio::test]
async fn test_summarize_returns_generated_text() {
    let generator = FakeGenerator::default();
    let summary = summarizer(&generator)
        .summarize(request("the transcript"))
        .await
        .unwrap();

    assert_eq!(summary, "Summary of the transcript");
    assert_eq!(snapshot(&generator.models), vec!["gpt-4-turbo"]);
}

#[tokio::test]
async fn test_summarize_truncates_long_transcripts() {
    let generator = FakeGenerator::default();
    let transcript = "word ".repeat(10_000);
    summarizer(&generator)
        .summarize(request(&transcript))
        .await
        .unwrap();

    let prompt = &snapshot(&generator.prompts)[0];
    assert!(prompt.ends_with(TRUNCATION_MARKER));
    assert_eq!(char_len(prompt), MAX_PROMPT_CHARS + char_len(TRUNCATION_MARKER));
}

#[tokio::test]
async fn test_summarize_failures() {
    let generator = FakeGenerator::default();
    let result = summarizer(&generator).summarize(request("   ")).await;
    assert!(matches!(result, Err(DigestError::SummarizationFailed(_))));
    assert!(snapshot(&generator.prompts).is_empty());

    let without_key = Summarizer::new(None, "gpt-3.5-turbo");
    let result = without_key.summarize(request("text")).await;
    assert!(matches!(result, Err(DigestError::SummarizationFailed(_))));

    let failing = FakeGenerator::default().failing_on("TRANSCRIPT");
    let result = summarizer(&failing).summarize(request("text")).await;
    assert!(matches!(result, Err(DigestError::SummarizationFailed(_))));
}

#[tokio::test]
async fn test_sink_summary_appends_url_and_attribution() {
    let generator = FakeGenerator::default().with_sink_reply("  Async Rust, explained.  ");
    let text = summarizer(&generator)
        .summarize_for_sink("A long summary", "Async Rust", "vid1", "Rust Talks", 280)
        .await
        .unwrap();

    assert_eq!(
        text,
        format!("Async Rust, explained. {} - Rust Talks", canonical_item_url("vid1"))
    );
    assert_eq!(snapshot(&generator.models), vec!["gpt-3.5-turbo"]);
}

#[tokio::test]
async fn test_sink_summary_truncates_overlong_reply() {
    let generator = FakeGenerator::default().with_sink_reply(&"x".repeat(500));
    let text = summarizer(&generator)
        .summarize_for_sink("summary", "Title", "vid1", "Rust Talks", 280)
        .await
        .unwrap();

    assert!(char_len(&text) <= 280);
    assert!(text.contains("... https://"));
}

#[tokio::test]
async fn test_sink_budget_exhausted_before_generation() {
    let generator = FakeGenerator::default();
    let result = summarizer(&generator)
        .summarize_for_sink("summary", "Title", "vid1", "Rust Talks", 80)
        .await;

    assert!(matches!(result, Err(DigestError::SinkBudgetExhausted { .. })));
    assert!(snapshot(&generator.prompts).is_empty());
}

#[tokio::test]
async fn test_microblog_sink_posts_budgeted_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": "42"}})))
        .expect(1)
        .mount(&server)
        .await;

    let generator = FakeGenerator::default();
    let sink = MicroblogSink::new(
        Arc::new(summarizer(&generator)),
        Some(x_client(&server)),
    );

    let outcome = sink.publish("A summary", &item("vid1", "Title")).await.unwrap();
    assert_eq!(
        outcome,
        SinkOutcome::Published {
            post_id: "42".to_string()
        }
    );

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let posted = body["text"].as_str().unwrap();
    assert!(char_len(posted) <= 280);
    assert!(posted.ends_with(" - Upstream Channel"));
}

#[tokio::test]
async fn test_microblog_sink_without_credentials_fails() {
    let generator = FakeGenerator::default();
    let sink = MicroblogSink::new(Arc::new(summarizer(&generator)), None);

    let result = sink.publish("A summary", &item("vid1", "Title")).await;

    assert!(matches!(result, Err(DigestError::DistributionFailed(_))));
    assert!(snapshot(&generator.prompts).is_empty());
}

#[tokio::test]
async fn test_microblog_sink_small_budget_fails() {
    let generator = FakeGenerator::default();
    let server = MockServer::start().await;
    let sink = MicroblogSink::new(
        Arc::new(summarizer(&generator)),
        Some(x_client(&server)),
    )
    .with_char_budget(60);

    let result = sink.publish("A summary", &item("vid1", "Title")).await;

    assert!(matches!(result, Err(DigestError::SinkBudgetExhausted { .. })));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_longform_sink_is_a_placeholder() {
    let outcome = LongformSink
        .publish("A summary", &item("vid1", "Title"))
        .await
        .unwrap();
    assert!(matches!(outcome, SinkOutcome::Skipped { .. }));
}

#[tokio::test]
async fn test_distributor_isolates_sink_failures() {
    let failing = FakeSink::failing(SinkKind::Microblog);
    let working = FakeSink::new(SinkKind::Longform);
    let sinks: Vec<Box<dyn Sink>> = vec![Box::new(failing.clone()), Box::new(working.clone())];
    let distributor = Distributor::new(sinks);

    let report = distributor
        .distribute("A summary", &item("vid1", "Title"), &source(true, true))
        .await;

    assert_eq!(report.len(), 2);
    assert!(report[&SinkKind::Microblog].is_failure());
    assert!(!report[&SinkKind::Longform].is_failure());
    assert_eq!(snapshot(&working.published).len(), 1);
}

#[tokio::test]
async fn test_distributor_skips_disabled_sinks() {
    let microblog = FakeSink::new(SinkKind::Microblog);
    let sinks: Vec<Box<dyn Sink>> = vec![Box::new(microblog.clone())];
    let distributor = Distributor::new(sinks);

    let report = distributor
        .distribute("A summary", &item("vid1", "Title"), &source(false, true))
        .await;

    assert!(report.is_empty());
    assert!(snapshot(&microblog.published).is_empty());
}
