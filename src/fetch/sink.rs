use async_trait::async_trait;
use bytes::Bytes;

/// Locally-held media bytes plus the MIME type they are declared as.
/// Dropping the last clone releases the bytes.
#[derive(Debug, Clone)]
pub struct PlayableBuffer {
    pub bytes: Bytes,
    pub content_type: String,
}

impl PlayableBuffer {
    pub fn new(bytes: Bytes, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// What a completed load hands back to the caller.
#[derive(Debug, Clone)]
pub enum PlayableHandle {
    /// The sink accepted a direct reference and negotiates byte
    /// ranges against this URL itself.
    Remote { url: String },
    /// Locally fetched bytes with a declared type.
    Buffer(PlayableBuffer),
}

impl PlayableHandle {
    /// Declared content type, known only for local buffers.
    pub fn content_type(&self) -> Option<&str> {
        match self {
            PlayableHandle::Remote { .. } => None,
            PlayableHandle::Buffer(buffer) => Some(&buffer.content_type),
        }
    }
}

/// Why a sink turned down a reference or buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The sink could not use the reference at all.
    Transport(String),
    /// The declared MIME type is not playable by this sink.
    UnsupportedType(String),
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::Transport(detail) => write!(f, "transport: {}", detail),
            RejectReason::UnsupportedType(mime) => write!(f, "unsupported type: {}", mime),
        }
    }
}

/// Capability interface for whatever consumes playable media.
///
/// Modeled after a browser audio element: it can be pointed at a URL
/// and negotiate ranges itself, or be handed an in-memory buffer with
/// a declared type.
#[async_trait]
pub trait PlaybackSink: Send + Sync {
    /// Hand over a direct reference; the sink fetches bytes itself.
    async fn accept_url(&self, url: &str) -> Result<(), RejectReason>;

    /// Offer locally fetched bytes under the buffer's declared type.
    async fn accept_buffer(&self, buffer: &PlayableBuffer) -> Result<(), RejectReason>;
}
