//! Source and global settings loaded from the JSON configuration document.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::errors::DigestError;

pub const DEFAULT_MAX_ITEMS_PER_SOURCE: u32 = 3;
pub const DEFAULT_DAYS_TO_LOOK_BACK: i64 = 1;
pub const DEFAULT_GENERATION_MODEL: &str = "gpt-4-turbo";

const REQUIRED_GLOBAL_SETTINGS: [&str; 3] = [
    "default_summary_style",
    "default_summary_length",
    "default_include_timestamps",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStyle {
    Concise,
    Detailed,
    BulletPoints,
}

impl fmt::Display for SummaryStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SummaryStyle::Concise => "concise",
            SummaryStyle::Detailed => "detailed",
            SummaryStyle::BulletPoints => "bullet_points",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(alias = "channel_id")]
    pub identifier: String,
    pub name: String,
    #[serde(default)]
    pub summary_style: Option<SummaryStyle>,
    #[serde(default)]
    pub summary_length: Option<u32>,
    #[serde(default)]
    pub include_timestamps: Option<bool>,
    #[serde(default, alias = "post_to_twitter")]
    pub post_to_microblog: bool,
    #[serde(default, alias = "post_to_blog")]
    pub post_to_longform: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettings {
    pub default_summary_style: SummaryStyle,
    pub default_summary_length: u32,
    pub default_include_timestamps: bool,
    #[serde(
        default = "default_max_items_per_source",
        alias = "max_videos_per_channel"
    )]
    pub max_items_per_source: u32,
    #[serde(default = "default_days_to_look_back")]
    pub days_to_look_back: i64,
    #[serde(default = "default_generation_model", alias = "openai_model")]
    pub generation_model: String,
}

fn default_max_items_per_source() -> u32 {
    DEFAULT_MAX_ITEMS_PER_SOURCE
}

fn default_days_to_look_back() -> i64 {
    DEFAULT_DAYS_TO_LOOK_BACK
}

fn default_generation_model() -> String {
    DEFAULT_GENERATION_MODEL.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    #[serde(alias = "channels")]
    pub sources: Vec<SourceConfig>,
    #[serde(rename = "global_settings")]
    pub global: GlobalSettings,
}

/// Per-source summary settings after global defaults are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveSettings {
    pub style: SummaryStyle,
    pub max_length_words: u32,
    pub include_timestamps: bool,
}

impl SourceConfig {
    #[must_use]
    pub fn effective(&self, global: &GlobalSettings) -> EffectiveSettings {
        EffectiveSettings {
            style: self.summary_style.unwrap_or(global.default_summary_style),
            max_length_words: self.summary_length.unwrap_or(global.default_summary_length),
            include_timestamps: self
                .include_timestamps
                .unwrap_or(global.default_include_timestamps),
        }
    }
}

impl ResolvedConfig {
    /// Built-in configuration used when no candidate document validates.
    #[must_use]
    pub fn builtin_default() -> Self {
        Self {
            sources: vec![SourceConfig {
                identifier: "UC_x5XG1OV2P6uZZ5FSM9Ttw".to_string(),
                name: "Example Channel".to_string(),
                summary_style: Some(SummaryStyle::Concise),
                summary_length: Some(500),
                include_timestamps: Some(true),
                post_to_microblog: false,
                post_to_longform: false,
            }],
            global: GlobalSettings {
                default_summary_style: SummaryStyle::Concise,
                default_summary_length: 500,
                default_include_timestamps: true,
                max_items_per_source: DEFAULT_MAX_ITEMS_PER_SOURCE,
                days_to_look_back: DEFAULT_DAYS_TO_LOOK_BACK,
                generation_model: DEFAULT_GENERATION_MODEL.to_string(),
            },
        }
    }

    /// Parse and validate a raw JSON document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` when the text is not JSON, fails a structural
    /// rule, or does not deserialize into the typed settings.
    pub fn from_json_str(raw: &str) -> Result<Self, DigestError> {
        let value: Value = serde_json::from_str(raw)?;
        validate_document(&value)?;
        let config: ResolvedConfig = serde_json::from_value(value)?;
        Ok(config)
    }
}

fn sources_key(doc: &serde_json::Map<String, Value>) -> Option<&Value> {
    doc.get("sources").or_else(|| doc.get("channels"))
}

fn non_empty_str(entry: &serde_json::Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter()
        .filter_map(|k| entry.get(*k))
        .any(|v| v.as_str().is_some_and(|s| !s.trim().is_empty()))
}

/// Structural checks on the untyped document.
///
/// # Errors
///
/// Returns `ConfigInvalid` naming the first rule that fails.
pub fn validate_document(value: &Value) -> Result<(), DigestError> {
    let Some(doc) = value.as_object() else {
        return Err(DigestError::ConfigInvalid(
            "configuration must be a JSON object".to_string(),
        ));
    };

    let Some(sources) = sources_key(doc) else {
        return Err(DigestError::ConfigInvalid(
            "missing required configuration key: sources".to_string(),
        ));
    };
    let Some(global) = doc.get("global_settings") else {
        return Err(DigestError::ConfigInvalid(
            "missing required configuration key: global_settings".to_string(),
        ));
    };

    let sources = match sources.as_array() {
        Some(list) if !list.is_empty() => list,
        _ => {
            return Err(DigestError::ConfigInvalid(
                "sources must be a non-empty list".to_string(),
            ));
        }
    };

    for (i, source) in sources.iter().enumerate() {
        let Some(entry) = source.as_object() else {
            return Err(DigestError::ConfigInvalid(format!(
                "source at index {i} is not an object"
            )));
        };
        if !non_empty_str(entry, &["identifier", "channel_id"]) || !non_empty_str(entry, &["name"])
        {
            return Err(DigestError::ConfigInvalid(format!(
                "source at index {i} is missing required fields (identifier, name)"
            )));
        }
    }

    let Some(global) = global.as_object() else {
        return Err(DigestError::ConfigInvalid(
            "global_settings must be an object".to_string(),
        ));
    };
    for key in REQUIRED_GLOBAL_SETTINGS {
        if !global.contains_key(key) {
            return Err(DigestError::ConfigInvalid(format!(
                "missing required global setting: {key}"
            )));
        }
    }

    Ok(())
}
