//! Mirrors a generated static site into an object store bucket.
//!
//! Each file the site generator writes is uploaded under the key derived from
//! its public URL, with a sniffed content type. Files the generator drops are
//! deleted from the bucket. The engine can be driven directly or through a
//! queued [`worker`].

pub mod config;
pub mod engine;
pub mod error;
pub mod keys;
pub mod mime;
pub mod worker;

pub use config::{SETTINGS_KEYS, Settings, SyncConfig};
pub use engine::{BatchReport, DeleteOutcome, Published, SyncEngine};
pub use error::{FailureKind, SyncError, SyncResult};
pub use keys::{ObjectRef, resolve_key};
pub use worker::{
    DEFAULT_QUEUE_CAPACITY, FileEvent, Outcome, SyncHandle, SyncReport, SyncWorker, WorkerStats,
    create_sync_worker,
};
