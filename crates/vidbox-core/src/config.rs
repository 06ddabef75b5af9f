//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries the
//! server, media, streaming, and transcoding sections. Every section defaults
//! sensibly so a completely empty `{}` file is valid. [`Config::apply_env`]
//! layers `VIDBOX_*` environment variables over whatever was loaded.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

/// Default streaming chunk size: 8 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Default maximum servable file size: 100 GiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024 * 1024;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub media: MediaConfig,
    pub stream: StreamConfig,
    pub transcode: TranscodeConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

/// Media library settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Directories files may be served from. Any path that does not
    /// canonicalize into one of these roots is treated as not found.
    pub roots: Vec<PathBuf>,
    /// Maximum servable file size in bytes. Larger files 404.
    pub max_file_size: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// Streaming behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Shared secret for stream token derivation. Empty means the server
    /// refuses to start (see [`Config::validate`]).
    pub secret: String,
    /// Read/write chunk size for file and encoder streaming, in bytes.
    pub chunk_size: usize,
    /// Honor `Range` request headers on the direct path.
    pub range_requests: bool,
    /// Emit long-lived `Cache-Control`/`ETag`/`Last-Modified` headers.
    pub cache_headers: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            range_requests: true,
            cache_headers: true,
        }
    }
}

/// On-the-fly transcoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscodeConfig {
    /// Whether non-native containers are transcoded. When disabled, every
    /// request is served directly.
    pub enabled: bool,
    /// Path to the ffmpeg binary.
    pub ffmpeg_path: PathBuf,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ffmpeg_path: PathBuf::from("ffmpeg"),
        }
    }
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    ///
    /// This is intentionally string-based so the caller can read the file
    /// however it sees fit (async, embedded, etc.).
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Layer `VIDBOX_*` environment variables over this config.
    ///
    /// Recognized variables:
    /// - `VIDBOX_STREAM_SECRET` — token derivation secret
    /// - `VIDBOX_CHUNK_SIZE` — streaming chunk size in bytes
    /// - `VIDBOX_MEDIA_ROOTS` — `:`-separated allowed root directories
    /// - `VIDBOX_MAX_FILE_SIZE` — maximum servable file size in bytes
    /// - `VIDBOX_ENABLE_TRANSCODING` — `true`/`false`
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_env(&mut self) {
        if let Ok(secret) = std::env::var("VIDBOX_STREAM_SECRET") {
            if !secret.is_empty() {
                self.stream.secret = secret;
            }
        }
        if let Ok(raw) = std::env::var("VIDBOX_CHUNK_SIZE") {
            match raw.parse::<usize>() {
                Ok(n) if n > 0 => self.stream.chunk_size = n,
                _ => tracing::warn!("Ignoring invalid VIDBOX_CHUNK_SIZE: {raw}"),
            }
        }
        if let Ok(raw) = std::env::var("VIDBOX_MEDIA_ROOTS") {
            let roots: Vec<PathBuf> = raw
                .split(':')
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .collect();
            if !roots.is_empty() {
                self.media.roots = roots;
            }
        }
        if let Ok(raw) = std::env::var("VIDBOX_MAX_FILE_SIZE") {
            match raw.parse::<u64>() {
                Ok(n) if n > 0 => self.media.max_file_size = n,
                _ => tracing::warn!("Ignoring invalid VIDBOX_MAX_FILE_SIZE: {raw}"),
            }
        }
        if let Ok(raw) = std::env::var("VIDBOX_ENABLE_TRANSCODING") {
            match raw.parse::<bool>() {
                Ok(b) => self.transcode.enabled = b,
                Err(_) => tracing::warn!("Ignoring invalid VIDBOX_ENABLE_TRANSCODING: {raw}"),
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }
        if self.stream.secret.is_empty() {
            warnings.push(
                "stream.secret is empty; all stream token verification will fail".into(),
            );
        }
        if self.stream.chunk_size == 0 {
            warnings.push("stream.chunk_size is 0; streaming cannot make progress".into());
        }
        if self.media.roots.is_empty() {
            warnings.push("media.roots is empty; no file will pass the path guard".into());
        }
        for root in &self.media.roots {
            if !root.is_dir() {
                warnings.push(format!("media root {} is not a directory", root.display()));
            }
        }

        warnings
    }
}
