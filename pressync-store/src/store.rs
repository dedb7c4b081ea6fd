//! Object store abstraction.
//!
//! The sync engine only talks to `ObjectStore`; `S3ObjectStore` is the
//! production implementation and tests plug in in-memory stores.

use crate::error::StoreResult;
use crate::region::Region;
use crate::types::{BucketInfo, Credentials, ObjectMetadata, PutRequest};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

/// Remote key/value blob operations.
///
/// Existence checks answer with a plain `bool`: any failure while checking
/// is reported as "does not exist". Every other operation reports failures
/// as `StoreError` values.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns true if `bucket` exists. When `accept_forbidden` is set, an
    /// access-denied answer also counts as existing.
    async fn bucket_exists(&self, bucket: &str, accept_forbidden: bool) -> bool;

    /// Returns true if `key` exists in `bucket`.
    async fn object_exists(&self, bucket: &str, key: &str) -> bool;

    /// Uploads the request's local source file.
    async fn put_object(&self, request: PutRequest) -> StoreResult<ObjectMetadata>;

    /// Fetches the whole body of an object.
    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<Bytes>;

    /// Deletes an object.
    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectMetadata>;

    /// Lists buckets owned by the credentials.
    async fn list_buckets(&self) -> StoreResult<Vec<BucketInfo>>;
}

/// Builds a store bound to a credential pair and a region.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        credentials: &Credentials,
        region: Region,
    ) -> StoreResult<Arc<dyn ObjectStore>>;
}
