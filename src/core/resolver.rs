//! Layered configuration lookup: remote object, local file, built-in default.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::settings::ResolvedConfig;
use crate::errors::DigestError;

/// A remote location holding the shared configuration document.
#[async_trait]
pub trait RemoteConfigSource: Send + Sync {
    /// Human-readable location, used in logs.
    fn describe(&self) -> String;

    /// Fetch the raw document. `Ok(None)` means the storage is reachable but
    /// holds no object under the configured key.
    async fn fetch(&self) -> Result<Option<String>, DigestError>;
}

/// Which layer of the chain produced the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    Remote,
    LocalFile,
    BuiltinDefault,
}

pub struct ConfigResolver {
    remote: Option<Box<dyn RemoteConfigSource>>,
    local_path: PathBuf,
}

impl ConfigResolver {
    #[must_use]
    pub fn new(remote: Option<Box<dyn RemoteConfigSource>>, local_path: impl Into<PathBuf>) -> Self {
        Self {
            remote,
            local_path: local_path.into(),
        }
    }

    pub async fn resolve(&self) -> ResolvedConfig {
        self.resolve_with_origin().await.0
    }

    pub async fn resolve_with_origin(&self) -> (ResolvedConfig, ConfigOrigin) {
        if let Some(config) = self.try_remote().await {
            return (config, ConfigOrigin::Remote);
        }

        info!("Falling back to local configuration file");
        if let Some(config) = try_local(&self.local_path).await {
            return (config, ConfigOrigin::LocalFile);
        }

        warn!("Using default configuration");
        (ResolvedConfig::builtin_default(), ConfigOrigin::BuiltinDefault)
    }

    async fn try_remote(&self) -> Option<ResolvedConfig> {
        let Some(remote) = &self.remote else {
            warn!("Remote configuration not set, skipping remote config load");
            return None;
        };

        let raw = match remote.fetch().await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                warn!("Configuration not found at {}", remote.describe());
                return None;
            }
            Err(e) => {
                warn!("Failed to load configuration from {}: {}", remote.describe(), e);
                return None;
            }
        };

        match ResolvedConfig::from_json_str(&raw) {
            Ok(config) => {
                info!("Loaded configuration from {}", remote.describe());
                Some(config)
            }
            Err(e) => {
                warn!("Rejected configuration from {}: {}", remote.describe(), e);
                None
            }
        }
    }
}

async fn try_local(path: &Path) -> Option<ResolvedConfig> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Configuration file not found: {}", path.display());
            return None;
        }
        Err(e) => {
            warn!("Error reading configuration file {}: {}", path.display(), e);
            return None;
        }
    };

    match ResolvedConfig::from_json_str(&raw) {
        Ok(config) => {
            info!("Loaded configuration from {}", path.display());
            Some(config)
        }
        Err(e) => {
            warn!("Rejected configuration file {}: {}", path.display(), e);
            None
        }
    }
}
