use thiserror::Error;

/// Errors that can occur when talking to the remote stats API.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The API answered but reported a non-success status in its envelope.
    #[error("API error {code} ({status}): {message}")]
    Remote {
        code: i32,
        status: String,
        message: String,
    },

    /// The API asked us to back off.
    #[error("Throttled by the API for {throttle_seconds}s")]
    Throttled { throttle_seconds: u64 },

    /// HTTP 404 for a member, character or activity.
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// The request never got an answer: DNS, TLS, reset or timeout.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The response body could not be decoded.
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// Misconfiguration or a bug on our side.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PlatformError {
    #[inline]
    pub fn remote(code: i32, status: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            code,
            status: status.into(),
            message: message.into(),
        }
    }

    #[inline]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    #[inline]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    #[inline]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    #[inline]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True for [`PlatformError::Throttled`].
    #[inline]
    pub fn is_throttled(&self) -> bool {
        matches!(self, Self::Throttled { .. })
    }
}

/// Extract a short error message suitable for display.
///
/// Takes the first line of an error message, which keeps serde's
/// line/column suffixes and multi-line API messages out of progress output.
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

/// Result type for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
