use std::env;
use std::path::PathBuf;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_CONFIG_KEY: &str = "channels.json";
pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_TABLE_NAME: &str = "daily-youtube-digest-videos";
pub const DEFAULT_SINK_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TRANSCRIPT_LANGUAGE: &str = "en";

pub const DEFAULT_YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_TIMEDTEXT_BASE: &str = "https://www.youtube.com/api/timedtext";
pub const DEFAULT_YOUTUBE_WATCH_BASE: &str = "https://www.youtube.com/watch";
pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_X_API_BASE: &str = "https://api.x.com";

/// How the record step writes to the dedup store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordMode {
    /// Unconditional put, last write wins.
    #[default]
    Upsert,
    /// Conditional put that leaves an existing record untouched.
    InsertIfAbsent,
}

impl RecordMode {
    fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "upsert" => Ok(RecordMode::Upsert),
            "insert_if_absent" => Ok(RecordMode::InsertIfAbsent),
            other => Err(format!("DIGEST_RECORD_MODE: unknown mode '{other}'")),
        }
    }
}

/// Environment-level settings consumed once at start-up.
///
/// Every credential is optional; a component whose credential is missing
/// reports a typed error at call time instead of failing construction.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub aws_region: String,
    pub config_bucket: Option<String>,
    pub config_key: String,
    pub config_path: PathBuf,
    pub table_name: String,
    pub youtube_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_org_id: Option<String>,
    pub sink_model: String,
    pub twitter_api_key: Option<String>,
    pub twitter_api_secret: Option<String>,
    pub twitter_access_token: Option<String>,
    pub twitter_access_token_secret: Option<String>,
    pub transcript_language: String,
    pub record_mode: RecordMode,
    pub http_retries: usize,
    pub youtube_api_base: String,
    pub timedtext_base: String,
    pub youtube_watch_base: String,
    pub openai_api_base: String,
    pub x_api_base: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            aws_region: DEFAULT_REGION.to_string(),
            config_bucket: None,
            config_key: DEFAULT_CONFIG_KEY.to_string(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            youtube_api_key: None,
            openai_api_key: None,
            openai_org_id: None,
            sink_model: DEFAULT_SINK_MODEL.to_string(),
            twitter_api_key: None,
            twitter_api_secret: None,
            twitter_access_token: None,
            twitter_access_token_secret: None,
            transcript_language: DEFAULT_TRANSCRIPT_LANGUAGE.to_string(),
            record_mode: RecordMode::Upsert,
            http_retries: 0,
            youtube_api_base: DEFAULT_YOUTUBE_API_BASE.to_string(),
            timedtext_base: DEFAULT_TIMEDTEXT_BASE.to_string(),
            youtube_watch_base: DEFAULT_YOUTUBE_WATCH_BASE.to_string(),
            openai_api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            x_api_base: DEFAULT_X_API_BASE.to_string(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn var_or(name: &str, default: &str) -> String {
    non_empty_var(name).unwrap_or_else(|| default.to_string())
}

/// Read a base-URL override, rejecting values that are not absolute URLs.
fn base_url_var(name: &str, default: &str) -> Result<String, String> {
    let raw = var_or(name, default);
    let parsed = url::Url::parse(&raw).map_err(|e| format!("{name}: {e}"))?;
    if parsed.cannot_be_a_base() {
        return Err(format!("{name}: {raw} cannot be used as a base URL"));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns an error when a variable is present but malformed.
    pub fn from_env() -> Result<Self, String> {
        let record_mode = match non_empty_var("DIGEST_RECORD_MODE") {
            Some(raw) => RecordMode::parse(&raw)?,
            None => RecordMode::Upsert,
        };
        let http_retries = match non_empty_var("DIGEST_HTTP_RETRIES") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|e| format!("DIGEST_HTTP_RETRIES: {e}"))?,
            None => 0,
        };

        Ok(Self {
            aws_region: var_or("AWS_REGION", DEFAULT_REGION),
            config_bucket: non_empty_var("S3_CONFIG_BUCKET"),
            config_key: var_or("S3_CONFIG_KEY", DEFAULT_CONFIG_KEY),
            config_path: PathBuf::from(var_or("CONFIG_PATH", DEFAULT_CONFIG_PATH)),
            table_name: var_or("DYNAMODB_TABLE", DEFAULT_TABLE_NAME),
            youtube_api_key: non_empty_var("YOUTUBE_API_KEY"),
            openai_api_key: non_empty_var("OPENAI_API_KEY"),
            openai_org_id: non_empty_var("OPENAI_ORG_ID"),
            sink_model: var_or("SINK_OPENAI_MODEL", DEFAULT_SINK_MODEL),
            twitter_api_key: non_empty_var("TWITTER_API_KEY"),
            twitter_api_secret: non_empty_var("TWITTER_API_SECRET"),
            twitter_access_token: non_empty_var("TWITTER_ACCESS_TOKEN"),
            twitter_access_token_secret: non_empty_var("TWITTER_ACCESS_TOKEN_SECRET"),
            transcript_language: var_or("TRANSCRIPT_LANGUAGE", DEFAULT_TRANSCRIPT_LANGUAGE),
            record_mode,
            http_retries,
            youtube_api_base: base_url_var("YOUTUBE_API_BASE", DEFAULT_YOUTUBE_API_BASE)?,
            timedtext_base: base_url_var("TIMEDTEXT_BASE", DEFAULT_TIMEDTEXT_BASE)?,
            youtube_watch_base: base_url_var("YOUTUBE_WATCH_BASE", DEFAULT_YOUTUBE_WATCH_BASE)?,
            openai_api_base: base_url_var("OPENAI_API_BASE", DEFAULT_OPENAI_API_BASE)?,
            x_api_base: base_url_var("X_API_BASE", DEFAULT_X_API_BASE)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_mode_parse() {
        assert_eq!(RecordMode::parse("upsert").unwrap(), RecordMode::Upsert);
        assert_eq!(RecordMode::parse("").unwrap(), RecordMode::Upsert);
        assert_eq!(
            RecordMode::parse("INSERT_IF_ABSENT").unwrap(),
            RecordMode::InsertIfAbsent
        );
        assert!(RecordMode::parse("append").is_err());
    }

    #[test]
    fn test_base_url_var_falls_back_to_default() {
        let base = base_url_var("DIGEST_TEST_UNSET_BASE_URL", DEFAULT_X_API_BASE).unwrap();
        assert_eq!(base, DEFAULT_X_API_BASE);
    }

    #[test]
    fn test_default_has_no_credentials() {
        let config = AppConfig::default();
        assert!(config.youtube_api_key.is_none());
        assert!(config.openai_api_key.is_none());
        assert!(config.twitter_api_key.is_none());
        assert!(config.twitter_access_token_secret.is_none());
        assert_eq!(config.table_name, DEFAULT_TABLE_NAME);
        assert_eq!(config.http_retries, 0);
    }
}
