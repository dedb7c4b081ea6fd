//! Bucket-bound client handle.
//!
//! A `StoreHandle` wraps a connected store together with the bucket that
//! operations target and the ACL/storage class applied to uploads. The bucket
//! binding only changes through [`StoreHandle::set_bucket`], which verifies
//! the bucket exists first.

use crate::error::{StoreError, StoreResult};
use crate::store::ObjectStore;
use crate::types::{BucketInfo, CannedAcl, ObjectMetadata, PutRequest, StorageClass};
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct StoreHandle {
    store: Arc<dyn ObjectStore>,
    bucket: Option<String>,
    acl: CannedAcl,
    storage_class: StorageClass,
}

impl StoreHandle {
    /// Wraps a store with no bucket bound yet.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            bucket: None,
            acl: CannedAcl::default(),
            storage_class: StorageClass::default(),
        }
    }

    /// Overrides the ACL and storage class used for subsequent uploads.
    pub fn set_defaults(&mut self, acl: CannedAcl, storage_class: StorageClass) {
        self.acl = acl;
        self.storage_class = storage_class;
    }

    pub fn acl(&self) -> CannedAcl {
        self.acl
    }

    pub fn storage_class(&self) -> StorageClass {
        self.storage_class
    }

    /// The bucket operations currently target.
    pub fn current_bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    /// Binds `name` as the current bucket if it exists (a forbidden answer
    /// counts as existing). On failure the previous binding is kept and
    /// `false` is returned.
    pub async fn set_bucket(&mut self, name: &str) -> bool {
        if name.is_empty() || !self.store.bucket_exists(name, true).await {
            warn!(
                "bucket {name:?} not available, keeping {:?}",
                self.current_bucket()
            );
            return false;
        }

        if self.current_bucket() != Some(name) {
            info!("bound bucket {name}");
        }
        self.bucket = Some(name.to_string());
        true
    }

    /// Checks the current bucket, or `name` when given.
    pub async fn bucket_exists(&self, name: Option<&str>, accept_forbidden: bool) -> bool {
        match name.or(self.current_bucket()) {
            Some(bucket) => self.store.bucket_exists(bucket, accept_forbidden).await,
            None => false,
        }
    }

    /// Returns false when no bucket is bound.
    pub async fn object_exists(&self, key: &str) -> bool {
        match self.current_bucket() {
            Some(bucket) => self.store.object_exists(bucket, key).await,
            None => false,
        }
    }

    /// Uploads `source` under `key` in the current bucket.
    pub async fn upload(
        &self,
        source: &Path,
        key: &str,
        content_type: Option<&str>,
    ) -> StoreResult<ObjectMetadata> {
        let bucket = self.require_bucket()?;
        if !source.exists() {
            return Err(StoreError::LocalIo(format!(
                "{} does not exist",
                source.display()
            )));
        }

        let request = PutRequest {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source: source.to_path_buf(),
            content_type: content_type.map(str::to_string),
            acl: self.acl,
            storage_class: self.storage_class,
        };
        let meta = self.store.put_object(request).await?;
        debug!("put result for {key}: {meta:?}");
        Ok(meta)
    }

    pub async fn download(&self, key: &str) -> StoreResult<Bytes> {
        let bucket = self.require_bucket()?;
        self.store.get_object(bucket, key).await
    }

    pub async fn delete(&self, key: &str) -> StoreResult<ObjectMetadata> {
        let bucket = self.require_bucket()?;
        let meta = self.store.delete_object(bucket, key).await?;
        debug!("delete result for {key}: {meta:?}");
        Ok(meta)
    }

    pub async fn list_buckets(&self) -> StoreResult<Vec<BucketInfo>> {
        self.store.list_buckets().await
    }

    fn require_bucket(&self) -> StoreResult<&str> {
        self.current_bucket()
            .ok_or_else(|| StoreError::Config("no bucket bound to handle".to_string()))
    }
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle")
            .field("bucket", &self.bucket)
            .field("acl", &self.acl)
            .field("storage_class", &self.storage_class)
            .finish_non_exhaustive()
    }
}
