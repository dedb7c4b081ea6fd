//! Object store error types.

use thiserror::Error;

/// Result type for object store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in object store operations.
///
/// SDK errors never cross the store boundary as-is; they are folded into
/// one of these variants together with the bucket/key they concern.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("missing or invalid credentials: {0}")]
    Auth(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("local file unreadable: {0}")]
    LocalIo(String),
}

impl StoreError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Returns true for errors raised before anything was sent to the store.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::Config(_) | Self::LocalIo(_))
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::LocalIo(err.to_string())
    }
}
