//! Sync error types.

use pressync_store::StoreError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while mirroring a file.
///
/// Every variant is a per-file failure: callers log it and move on to the
/// next file.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("local file unavailable: {0}")]
    LocalIo(String),

    #[error("no object key can be derived from url {0:?}")]
    InvalidKey(String),

    #[error("bucket {0} is not available")]
    BucketUnavailable(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("sync worker is not running")]
    ChannelClosed,
}

/// Coarse failure classification shared by store and engine errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Auth,
    Config,
    NotFound,
    Transport,
    LocalIo,
}

impl SyncError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Config(_) | Self::Serialization(_) => FailureKind::Config,
            Self::LocalIo(_) => FailureKind::LocalIo,
            Self::InvalidKey(_) | Self::BucketUnavailable(_) => FailureKind::NotFound,
            Self::ChannelClosed => FailureKind::Transport,
            Self::Store(err) => match err {
                StoreError::Auth(_) => FailureKind::Auth,
                StoreError::Config(_) => FailureKind::Config,
                StoreError::NotFound(_) => FailureKind::NotFound,
                StoreError::Transport(_) => FailureKind::Transport,
                StoreError::LocalIo(_) => FailureKind::LocalIo,
            },
        }
    }
}
