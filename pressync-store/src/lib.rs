//! Object store client for pressync.
//!
//! Provides the pieces the sync engine builds on:
//! - `ObjectStore`: put/get/delete/existence checks/bucket listing
//! - `S3ObjectStore`: the AWS SDK backed implementation
//! - `StoreHandle`: a connected store bound to one bucket at a time
//! - `MemoryStore`: an in-process store that counts every call
//! - Region table with case- and separator-insensitive lookup

pub mod error;
pub mod handle;
pub mod memory;
pub mod region;
pub mod s3;
pub mod store;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use handle::StoreHandle;
pub use memory::{MemoryConnector, MemoryStore};
pub use region::{DEFAULT_REGION, Region, list_regions, region_or_default, resolve_region};
pub use s3::{S3Connector, S3ObjectStore};
pub use store::{Connector, ObjectStore};
pub use types::*;
