//! Centralized error types for the Roomweek application.
//!
//! Each collaborator (feed fetch, feed cache, configuration) has its own
//! error enum; all of them convert into [`AppError`], which the binary
//! reports through [`AppError::user_message`].

use thiserror::Error;

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A feed record failed validation while building the weekly calendar.
    #[error("Invalid event data: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a message suitable for printing to the operator.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Cache(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::InvalidInput(_) => {
                "The event feed contains an invalid record. No schedule was produced."
            }
            AppError::Io(_) => "A file operation failed. Check the output path and try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) => 2,
            AppError::InvalidInput(_) => 3,
            _ => 1,
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to reach the event feed. Check your internet connection."
            }
            NetworkError::Timeout => "The event feed request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The event feed server is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The event feed request was rejected.",
            NetworkError::InvalidResponse(_) => "The event feed returned unreadable data.",
        }
    }
}

/// Feed cache errors (SQLite, serialized feed bodies).
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    #[error("Cache query failed: {0}")]
    QueryFailed(String),

    #[error("Cached feed is corrupt: {0}")]
    Corruption(String),

    #[error("No cached feed for key: {0}")]
    Missing(String),
}

impl CacheError {
    pub fn user_message(&self) -> &'static str {
        match self {
            CacheError::Unavailable(_) => "Unable to open the local feed cache.",
            CacheError::QueryFailed(_) => "A local cache operation failed. Please try again.",
            CacheError::Corruption(_) => {
                "The cached feed is corrupt. Run again without --offline to refresh it."
            }
            CacheError::Missing(_) => {
                "No cached feed is available. Run again without --offline to download it."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration file not found. Check the --config path.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}
