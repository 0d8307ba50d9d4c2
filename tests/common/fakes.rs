use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use daily_digest::ai::{CompletionRequest, TextGenerator};
use daily_digest::content::{TranscriptError, TranscriptProvider, TranscriptTrack};
use daily_digest::core::models::{Item, SinkKind, SinkOutcome, TranscriptSegment};
use daily_digest::core::resolver::RemoteConfigSource;
use daily_digest::discovery::ItemDiscovery;
use daily_digest::errors::DigestError;
use daily_digest::worker::Sink;

pub type Calls<T> = Arc<Mutex<Vec<T>>>;

pub fn calls<T>() -> Calls<T> {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn snapshot<T: Clone>(calls: &Calls<T>) -> Vec<T> {
    calls.lock().unwrap().clone()
}

pub fn item(id: &str, title: &str) -> Item {
    Item {
        id: id.to_string(),
        title: title.to_string(),
        source_name: "Upstream Channel".to_string(),
        published_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    }
}

/// Serves a fixed configuration document.
pub struct StaticRemote(pub String);

#[async_trait]
impl RemoteConfigSource for StaticRemote {
    fn describe(&self) -> String {
        "static://config".to_string()
    }

    async fn fetch(&self) -> Result<Option<String>, DigestError> {
        Ok(Some(self.0.clone()))
    }
}

#[derive(Clone, Default)]
pub struct FakeDiscovery {
    results: HashMap<String, Option<Vec<Item>>>,
    pub requests: Calls<(String, u32, Option<DateTime<Utc>>)>,
}

impl FakeDiscovery {
    pub fn with_items(mut self, source_id: &str, items: Vec<Item>) -> Self {
        self.results.insert(source_id.to_string(), Some(items));
        self
    }

    pub fn with_failure(mut self, source_id: &str) -> Self {
        self.results.insert(source_id.to_string(), None);
        self
    }
}

#[async_trait]
impl ItemDiscovery for FakeDiscovery {
    async fn discover(
        &self,
        source_id: &str,
        max_results: u32,
        published_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<Item>, DigestError> {
        self.requests
            .lock()
            .unwrap()
            .push((source_id.to_string(), max_results, published_after));
        match self.results.get(source_id) {
            Some(Some(items)) => Ok(items.clone()),
            Some(None) => Err(DigestError::SourceUnavailable("quota exceeded".to_string())),
            None => Ok(Vec::new()),
        }
    }
}

/// Every item has an English manual track unless listed as missing or as
/// only carrying an untranslatable German track.
#[derive(Clone, Default)]
pub struct FakeProvider {
    missing: HashSet<String>,
    untranslatable: HashSet<String>,
    pub fetched: Calls<String>,
}

impl FakeProvider {
    pub fn without_transcript(mut self, item_id: &str) -> Self {
        self.missing.insert(item_id.to_string());
        self
    }

    pub fn with_untranslatable_track(mut self, item_id: &str) -> Self {
        self.untranslatable.insert(item_id.to_string());
        self
    }
}

#[async_trait]
impl TranscriptProvider for FakeProvider {
    async fn list_tracks(&self, item_id: &str) -> Result<Vec<TranscriptTrack>, TranscriptError> {
        if self.missing.contains(item_id) {
            return Err(TranscriptError::Disabled);
        }
        if self.untranslatable.contains(item_id) {
            return Ok(vec![TranscriptTrack {
                language_code: "de".to_string(),
                name: None,
                is_generated: false,
                is_translatable: false,
                fetch_url: None,
            }]);
        }
        Ok(vec![TranscriptTrack {
            language_code: "en".to_string(),
            name: None,
            is_generated: false,
            is_translatable: true,
            fetch_url: None,
        }])
    }

    async fn fetch_segments(
        &self,
        item_id: &str,
        _track: &TranscriptTrack,
        _translate_to: Option<&str>,
    ) -> Result<Vec<TranscriptSegment>, TranscriptError> {
        self.fetched.lock().unwrap().push(item_id.to_string());
        Ok(vec![
            TranscriptSegment {
                text: "transcript of".to_string(),
                start: 0.0,
                duration: 1.5,
            },
            TranscriptSegment {
                text: item_id.to_string(),
                start: 1.5,
                duration: 2.0,
            },
        ])
    }
}

/// Answers summary prompts with a summary naming the transcript, and any
/// other prompt with `sink_reply`.
#[derive(Clone)]
pub struct FakeGenerator {
    fail_on: Option<String>,
    sink_reply: String,
    pub prompts: Calls<String>,
    pub models: Calls<String>,
}

impl Default for FakeGenerator {
    fn default() -> Self {
        Self {
            fail_on: None,
            sink_reply: "Watch this talk".to_string(),
            prompts: calls(),
            models: calls(),
        }
    }
}

impl FakeGenerator {
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }

    pub fn with_sink_reply(mut self, reply: &str) -> Self {
        self.sink_reply = reply.to_string();
        self
    }

    pub fn summary_prompts(&self) -> Vec<String> {
        snapshot(&self.prompts)
            .into_iter()
            .filter(|p| p.contains("TRANSCRIPT:"))
            .collect()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn complete(&self, request: CompletionRequest) -> Result<String, DigestError> {
        let prompt = request.user_text().unwrap_or_default().to_string();
        self.prompts.lock().unwrap().push(prompt.clone());
        self.models.lock().unwrap().push(request.model.clone());

        if self.fail_on.as_ref().is_some_and(|needle| prompt.contains(needle)) {
            return Err(DigestError::OpenAIError("rate limited".to_string()));
        }

        match prompt.split_once("TRANSCRIPT:\n") {
            Some((_, transcript)) => Ok(format!("Summary of {transcript}")),
            None => Ok(self.sink_reply.clone()),
        }
    }
}

#[derive(Clone)]
pub struct FakeSink {
    kind: SinkKind,
    fail: bool,
    pub published: Calls<(String, String)>,
}

impl FakeSink {
    pub fn new(kind: SinkKind) -> Self {
        Self {
            kind,
            fail: false,
            published: calls(),
        }
    }

    pub fn failing(kind: SinkKind) -> Self {
        Self {
            fail: true,
            ..Self::new(kind)
        }
    }
}

#[async_trait]
impl Sink for FakeSink {
    fn kind(&self) -> SinkKind {
        self.kind
    }

    async fn publish(&self, summary: &str, item: &Item) -> Result<SinkOutcome, DigestError> {
        self.published
            .lock()
            .unwrap()
            .push((item.id.clone(), summary.to_string()));
        if self.fail {
            return Err(DigestError::DistributionFailed("401 Unauthorized".to_string()));
        }
        Ok(SinkOutcome::Published {
            post_id: format!("post-{}", item.id),
        })
    }
}
