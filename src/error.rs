use reqwest::StatusCode;
use thiserror::Error;

/// Fallback message when the server's error body carries no `message`.
pub const GENERIC_REJECTION_MESSAGE: &str = "요청 처리 중 오류가 발생했습니다.";

/// Fallback message when the server answers with a non-JSON body.
pub const UNEXPECTED_RESPONSE_MESSAGE: &str =
    "서버에서 예상치 못한 응답을 받았습니다. 나중에 다시 시도해주세요.";

/// Errors produced by the request dispatcher. Every failure reaches
/// the caller as one of these; nothing is silently discarded.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The request could not be sent or the response never arrived.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success status with an undecodable body, or an error status
    /// with a non-JSON body. The raw text is kept for diagnostics.
    #[error("unexpected response format (HTTP {status}): {raw}")]
    UnexpectedFormat { status: StatusCode, raw: String },

    /// The server rejected the request with a decodable error body.
    /// Unauthorized responses arrive here after the CSRF token has
    /// already been cleared.
    #[error("rejected (HTTP {status}): {message}")]
    Rejected { status: StatusCode, message: String },
}

impl RequestError {
    /// User-facing message: the server's own wording when available,
    /// otherwise the generic fallback the original client showed.
    pub fn user_message(&self) -> &str {
        match self {
            RequestError::Rejected { message, .. } => message,
            RequestError::UnexpectedFormat { .. } => UNEXPECTED_RESPONSE_MESSAGE,
            RequestError::Transport(_) => GENERIC_REJECTION_MESSAGE,
        }
    }
}

/// Errors produced by the adaptive media fetcher. Intermediate
/// strategy failures never surface here; only the terminal states do.
#[derive(Debug, Error)]
pub enum MediaLoadError {
    /// Every retrieval strategy was exhausted.
    #[error("no retrieval strategy produced a playable buffer ({attempts} attempts)")]
    Unsupported { attempts: usize },

    /// A newer load superseded this one; its result was discarded.
    #[error("load superseded by a newer request")]
    Superseded,
}
