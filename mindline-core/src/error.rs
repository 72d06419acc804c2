//! Error types for mindline

use thiserror::Error;

/// The main error type for mindline operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Session store errors
    #[error("Session error: {0}")]
    Session(String),

    /// Validation errors, shown to the user as-is
    #[error("{0}")]
    Validation(String),

    /// A uniqueness constraint was violated (e.g. duplicate email)
    #[error("{0}")]
    Conflict(String),

    /// No caller identity could be resolved
    #[error("Not authenticated")]
    Unauthenticated,

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for mindline operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
