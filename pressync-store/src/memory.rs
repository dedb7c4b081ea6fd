//! In-memory object store.
//!
//! Keeps buckets and objects in process memory and counts every call, so
//! callers can assert which remote operations were (or were not) issued.

use crate::error::{StoreError, StoreResult};
use crate::region::Region;
use crate::store::{Connector, ObjectStore};
use crate::types::{BucketInfo, CannedAcl, Credentials, ObjectMetadata, PutRequest, StorageClass};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use md5::{Digest, Md5};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// An object as the in-memory store holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: Option<String>,
    pub acl: CannedAcl,
    pub storage_class: StorageClass,
    pub etag: String,
}

/// Per-operation call counters.
#[derive(Debug, Default)]
pub struct CallCounts {
    pub bucket_exists: AtomicUsize,
    pub object_exists: AtomicUsize,
    pub put: AtomicUsize,
    pub get: AtomicUsize,
    pub delete: AtomicUsize,
    pub list_buckets: AtomicUsize,
}

impl CallCounts {
    /// Sum of all remote calls.
    pub fn total(&self) -> usize {
        [
            &self.bucket_exists,
            &self.object_exists,
            &self.put,
            &self.get,
            &self.delete,
            &self.list_buckets,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }
}

#[derive(Debug, Default)]
struct Inner {
    buckets: BTreeSet<String>,
    forbidden: BTreeSet<String>,
    objects: BTreeMap<(String, String), StoredObject>,
    next_version: u64,
    fail_puts: bool,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    calls: CallCounts,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds the given buckets.
    pub fn with_buckets<I, S>(buckets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::new();
        for bucket in buckets {
            store.create_bucket(bucket);
        }
        store
    }

    pub fn create_bucket(&self, name: impl Into<String>) {
        self.lock().buckets.insert(name.into());
    }

    /// Marks a bucket as present but denied to these credentials.
    pub fn create_forbidden_bucket(&self, name: impl Into<String>) {
        self.lock().forbidden.insert(name.into());
    }

    /// Makes every subsequent put fail with a transport error.
    pub fn fail_puts(&self, fail: bool) {
        self.lock().fail_puts = fail;
    }

    /// Returns a copy of a stored object.
    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.lock()
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Keys stored in `bucket`, sorted.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.lock()
            .objects
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    pub fn calls(&self) -> &CallCounts {
        &self.calls
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn require_bucket(inner: &Inner, bucket: &str) -> StoreResult<()> {
        if inner.buckets.contains(bucket) {
            Ok(())
        } else if inner.forbidden.contains(bucket) {
            Err(StoreError::transport(format!("access denied to bucket {bucket}")))
        } else {
            Err(StoreError::not_found(format!("bucket {bucket}")))
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn bucket_exists(&self, bucket: &str, accept_forbidden: bool) -> bool {
        self.calls.bucket_exists.fetch_add(1, Ordering::SeqCst);
        let inner = self.lock();
        inner.buckets.contains(bucket) || (accept_forbidden && inner.forbidden.contains(bucket))
    }

    async fn object_exists(&self, bucket: &str, key: &str) -> bool {
        self.calls.object_exists.fetch_add(1, Ordering::SeqCst);
        self.lock()
            .objects
            .contains_key(&(bucket.to_string(), key.to_string()))
    }

    async fn put_object(&self, request: PutRequest) -> StoreResult<ObjectMetadata> {
        self.calls.put.fetch_add(1, Ordering::SeqCst);
        let body = tokio::fs::read(&request.source)
            .await
            .map_err(|e| StoreError::LocalIo(format!("{}: {e}", request.source.display())))?;

        let mut inner = self.lock();
        if inner.fail_puts {
            return Err(StoreError::transport(format!(
                "put failed for s3://{}/{}: injected failure",
                request.bucket, request.key
            )));
        }
        Self::require_bucket(&inner, &request.bucket)?;

        inner.next_version += 1;
        let version = inner.next_version;
        let etag = format!("\"{}\"", hex::encode(Md5::digest(&body)));
        inner.objects.insert(
            (request.bucket, request.key),
            StoredObject {
                body: Bytes::from(body),
                content_type: request.content_type,
                acl: request.acl,
                storage_class: request.storage_class,
                etag: etag.clone(),
            },
        );

        Ok(ObjectMetadata {
            etag: Some(etag),
            version_id: Some(version.to_string()),
            request_id: None,
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<Bytes> {
        self.calls.get.fetch_add(1, Ordering::SeqCst);
        let inner = self.lock();
        Self::require_bucket(&inner, bucket)?;
        inner
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|obj| obj.body.clone())
            .ok_or_else(|| StoreError::not_found(format!("s3://{bucket}/{key}")))
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectMetadata> {
        self.calls.delete.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.lock();
        Self::require_bucket(&inner, bucket)?;
        inner.objects.remove(&(bucket.to_string(), key.to_string()));
        Ok(ObjectMetadata::default())
    }

    async fn list_buckets(&self) -> StoreResult<Vec<BucketInfo>> {
        self.calls.list_buckets.fetch_add(1, Ordering::SeqCst);
        let created_at = Some(Utc::now());
        Ok(self
            .lock()
            .buckets
            .iter()
            .map(|name| BucketInfo {
                name: name.clone(),
                created_at,
            })
            .collect())
    }
}

/// Hands out one shared [`MemoryStore`] and records each connection.
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    store: Arc<MemoryStore>,
    connects: Arc<AtomicUsize>,
    regions: Arc<Mutex<Vec<Region>>>,
}

impl MemoryConnector {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            connects: Arc::new(AtomicUsize::new(0)),
            regions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    /// Number of successful connections made.
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Regions passed to each successful connection, in order.
    pub fn regions(&self) -> Vec<Region> {
        self.regions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(
        &self,
        credentials: &Credentials,
        region: Region,
    ) -> StoreResult<Arc<dyn ObjectStore>> {
        if !credentials.is_complete() {
            return Err(StoreError::Auth(
                "access key and secret key are required".to_string(),
            ));
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.regions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(region);
        Ok(self.store.clone())
    }
}
