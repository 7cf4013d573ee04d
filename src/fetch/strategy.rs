use crate::config::{FIRST_CHUNK_END, MINIMAL_CHUNK_END, RETRY_CHUNK_END};

/// One step of the retrieval chain, ordered from "let the transport
/// layer optimize" down to "narrow the request and guess the type".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Hand the canonical URL to the sink; it negotiates ranges itself.
    DirectReference,
    /// Fetch the leading 128 KB and declare it audio/mpeg.
    ChunkProbe,
    /// Fetch 64 KB and try candidate MIME types against the sink.
    ChunkProbeRetry,
    /// HEAD probe for the declared type, then a 16 KB chunk.
    MetadataProbeThenMinimalChunk,
}

impl Strategy {
    /// Fixed fallback order; each entry runs only after the previous
    /// one fails, and the chain stops at the first success.
    pub const CHAIN: [Strategy; 4] = [
        Strategy::DirectReference,
        Strategy::ChunkProbe,
        Strategy::ChunkProbeRetry,
        Strategy::MetadataProbeThenMinimalChunk,
    ];

    /// Inclusive byte range requested by this strategy, if any.
    pub fn byte_range(self) -> Option<(u64, u64)> {
        match self {
            Strategy::DirectReference => None,
            Strategy::ChunkProbe => Some((0, FIRST_CHUNK_END)),
            Strategy::ChunkProbeRetry => Some((0, RETRY_CHUNK_END)),
            Strategy::MetadataProbeThenMinimalChunk => Some((0, MINIMAL_CHUNK_END)),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Strategy::DirectReference => "direct-reference",
            Strategy::ChunkProbe => "chunk-probe",
            Strategy::ChunkProbeRetry => "chunk-probe-retry",
            Strategy::MetadataProbeThenMinimalChunk => "metadata-probe-minimal-chunk",
        }
    }
}

/// Outcome of a single strategy attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    Success {
        /// Declared type of the resulting buffer; `None` for a direct
        /// reference.
        content_type: Option<String>,
    },
    Failure {
        reason: String,
    },
}

/// Diagnostic record of one attempt. Never persisted; lives only for
/// the duration of one load.
#[derive(Debug)]
pub struct RetrievalAttempt {
    pub strategy: Strategy,
    pub byte_range: Option<(u64, u64)>,
    pub outcome: AttemptOutcome,
}
