//! Error types for hourline-core

use thiserror::Error;

/// Main error type for the hourline-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error for list-valued columns
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Rating outside the 1-5 star range
    #[error("invalid rating {0}: must be between 1 and 5")]
    InvalidRating(u8),

    /// Hour outside the 0-23 range
    #[error("invalid hour {0}: must be between 0 and 23")]
    InvalidHour(u8),
}

/// Result type alias for hourline-core
pub type Result<T> = std::result::Result<T, Error>;
