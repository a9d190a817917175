// Payload sources: where a player's summary document comes from.
//
// The loader only sees the `PayloadSource` trait. `HttpSource` talks to the
// summary API; `DirectorySource` reads saved documents from disk.

use async_trait::async_trait;
use hoopscope_core::payload::{parse_payload, PayloadError, PlayerPayload};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::{SourceConfig, SourceKind};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] PayloadError),

    #[error("source misconfigured: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Fetches one player's payload.
///
/// `Ok(None)` means the source has nothing for that id; it is not an error.
#[async_trait]
pub trait PayloadSource: Send + Sync {
    async fn fetch(&self, player_id: i64) -> Result<Option<PlayerPayload>, SourceError>;

    /// Short description for log lines.
    fn describe(&self) -> String;
}

/// Build the source selected by `[source]`.
pub fn from_config(config: &SourceConfig) -> Result<Box<dyn PayloadSource>, SourceError> {
    match config.kind {
        SourceKind::Http => {
            let base_url = config
                .base_url
                .as_deref()
                .ok_or_else(|| SourceError::Config("base_url is not set".into()))?;
            let source = HttpSource::new(base_url, Duration::from_secs(config.timeout_secs))?;
            Ok(Box::new(source))
        }
        SourceKind::Directory => {
            let dir = config
                .directory
                .as_deref()
                .ok_or_else(|| SourceError::Config("directory is not set".into()))?;
            Ok(Box::new(DirectorySource::new(dir)))
        }
    }
}

// ---------------------------------------------------------------------------
// HttpSource
// ---------------------------------------------------------------------------

/// GETs `{base_url}/{id}`. The body may be bare or wrapped in `apiResponse`.
pub struct HttpSource {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, player_id: i64) -> String {
        format!("{}/{}", self.base_url, player_id)
    }
}

#[async_trait]
impl PayloadSource for HttpSource {
    async fn fetch(&self, player_id: i64) -> Result<Option<PlayerPayload>, SourceError> {
        let url = self.url_for(player_id);
        debug!("GET {url}");

        let response = self.http.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!("{url} returned 404, treating as absent");
            return Ok(None);
        }
        let body = response.error_for_status()?.text().await?;
        Ok(parse_payload(&body)?)
    }

    fn describe(&self) -> String {
        format!("http {}", self.base_url)
    }
}

// ---------------------------------------------------------------------------
// DirectorySource
// ---------------------------------------------------------------------------

/// Reads `{dir}/{id}.json`. A missing file is an absent payload.
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, player_id: i64) -> PathBuf {
        self.dir.join(format!("{player_id}.json"))
    }
}

#[async_trait]
impl PayloadSource for DirectorySource {
    async fn fetch(&self, player_id: i64) -> Result<Option<PlayerPayload>, SourceError> {
        let path = self.path_for(player_id);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} not found, treating as absent", path.display());
                return Ok(None);
            }
            Err(e) => return Err(SourceError::Io { path, source: e }),
        };
        Ok(parse_payload(&text)?)
    }

    fn describe(&self) -> String {
        format!("directory {}", self.dir.display())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
