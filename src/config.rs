use std::time::Duration;

use serde::Deserialize;

/// Inclusive end offset of the first probe chunk (128 KB).
pub const FIRST_CHUNK_END: u64 = 131_071;

/// Inclusive end offset of the retry probe chunk (64 KB), for servers
/// that reject larger ranges.
pub const RETRY_CHUNK_END: u64 = 65_535;

/// Inclusive end offset of the minimal chunk fetched after the HEAD
/// probe (16 KB).
pub const MINIMAL_CHUNK_END: u64 = 16_383;

/// Candidate MIME types offered to the playback sink during the retry
/// probe, in preference order.
pub const MIME_CANDIDATES: [&str; 5] = [
    "audio/mpeg",
    "audio/mp4",
    "audio/aac",
    "audio/ogg",
    "audio/*",
];

/// Declared type used when neither the HEAD probe nor the chunk
/// response names one.
pub const DEFAULT_AUDIO_MIME: &str = "audio/mpeg";

/// Time allowed for each individual range-request attempt. A timeout
/// counts as an ordinary strategy failure and advances the chain.
pub const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Top-level configuration for the client engine.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Base URL of the media/identity service.
    pub base_url: String,
    /// Value sent in the Origin header on every request.
    pub origin: String,
    /// Seconds allowed per range-request attempt.
    pub attempt_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".to_string(),
            origin: "http://localhost:3000".to_string(),
            attempt_timeout_secs: ATTEMPT_TIMEOUT.as_secs(),
        }
    }
}

impl EngineConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }
}
