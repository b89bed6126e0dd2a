//! Error types for Bungie.net API operations.

use thiserror::Error;

use crate::platform::PlatformError;

/// Errors that can occur when interacting with the Bungie.net API.
#[derive(Debug, Error)]
pub enum BungieError {
    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-2xx response whose body was not a platform envelope.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The envelope carried a non-success error code.
    #[error("API error {error_code} ({error_status}): {message}")]
    Api {
        error_code: i32,
        error_status: String,
        message: String,
        throttle_seconds: u64,
    },

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A success envelope with no `Response` payload.
    #[error("Empty response from {endpoint}")]
    EmptyResponse { endpoint: String },

    /// Invalid configuration (bad base URL, missing clan id).
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<BungieError> for PlatformError {
    fn from(err: BungieError) -> Self {
        match err {
            BungieError::Http(message) => PlatformError::Network { message },
            BungieError::Status { status, message } => match status {
                404 => PlatformError::NotFound { resource: message },
                429 => PlatformError::Throttled {
                    throttle_seconds: 0,
                },
                _ => PlatformError::remote(i32::from(status), format!("HTTP {status}"), message),
            },
            BungieError::Api {
                throttle_seconds, ..
            } if throttle_seconds > 0 => PlatformError::Throttled { throttle_seconds },
            BungieError::Api {
                error_code,
                error_status,
                message,
                ..
            } => PlatformError::Remote {
                code: error_code,
                status: error_status,
                message,
            },
            BungieError::Json(e) => PlatformError::Decode {
                message: e.to_string(),
            },
            BungieError::EmptyResponse { endpoint } => PlatformError::Decode {
                message: format!("no Response payload from {}", endpoint),
            },
            BungieError::Config(message) => PlatformError::Internal { message },
        }
    }
}

/// Get a short error message suitable for display.
pub fn short_error_message(err: &BungieError) -> String {
    match err {
        BungieError::Http(_) => "Network error".to_string(),
        BungieError::Status { status, .. } => format!("HTTP {}", status),
        BungieError::Api {
            error_status,
            message,
            ..
        } => {
            if message.chars().count() > 50 {
                let truncated: String = message.chars().take(47).collect();
                format!("{}: {}...", error_status, truncated)
            } else {
                format!("{}: {}", error_status, message)
            }
        }
        BungieError::Json(_) => "JSON parse error".to_string(),
        BungieError::EmptyResponse { .. } => "Empty response".to_string(),
        BungieError::Config(msg) => format!("Config: {}", msg),
    }
}
