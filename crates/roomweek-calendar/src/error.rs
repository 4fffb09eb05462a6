//! Calendar-specific error types.

use roomweek_core::{AppError, CacheError, NetworkError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    /// Wrong type, empty required text, malformed date or time, missing key.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("API error: {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Cached feed is corrupt: {0}")]
    CacheCorrupt(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

impl CalendarError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Prefix an `InvalidInput` message with where in the feed it happened.
    pub(crate) fn in_context(self, context: impl std::fmt::Display) -> Self {
        match self {
            Self::InvalidInput(msg) => Self::InvalidInput(format!("{context}: {msg}")),
            other => other,
        }
    }

    /// User-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput(msg) => format!("Invalid event: {}", msg),
            Self::ApiError { status, .. } => format!("Event feed returned HTTP {}", status),
            Self::InvalidResponse(_) => "Event feed returned unreadable data".to_string(),
            Self::CacheError(_) => "Local cache error".to_string(),
            Self::CacheCorrupt(_) => "Cached feed is corrupt".to_string(),
            Self::NetworkError(_) => "Network error. Check your connection.".to_string(),
        }
    }

    /// Whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NetworkError(e) => e.is_timeout() || e.is_connect(),
            Self::ApiError { status, .. } => *status >= 500 || *status == 429 || *status == 408,
            _ => false,
        }
    }
}

impl From<rusqlite::Error> for CalendarError {
    fn from(err: rusqlite::Error) -> Self {
        Self::CacheError(err.to_string())
    }
}

fn into_network_error(err: reqwest::Error) -> NetworkError {
    if err.is_timeout() {
        NetworkError::Timeout
    } else if let Some(status) = err.status() {
        NetworkError::ServerError {
            status: status.as_u16(),
            message: err.to_string(),
        }
    } else {
        NetworkError::ConnectionFailed(err.to_string())
    }
}

impl From<CalendarError> for AppError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::InvalidInput(msg) => AppError::InvalidInput(msg),
            CalendarError::ApiError { status, message } => {
                AppError::Network(NetworkError::ServerError { status, message })
            }
            CalendarError::InvalidResponse(msg) => {
                AppError::Network(NetworkError::InvalidResponse(msg))
            }
            CalendarError::CacheError(msg) => AppError::Cache(CacheError::QueryFailed(msg)),
            CalendarError::CacheCorrupt(msg) => AppError::Cache(CacheError::Corruption(msg)),
            CalendarError::NetworkError(e) => AppError::Network(into_network_error(e)),
        }
    }
}
