//! Per-file sync engine.
//!
//! Decides, for each file the site generator writes or drops, what happens
//! in the bucket:
//! - written files are uploaded under the key derived from their public URL
//! - removed files are deleted, skipping the delete when the object is
//!   already gone
//! - objects can be fetched back to a local path
//!
//! The engine owns a lazily connected [`StoreHandle`]. The handle is created
//! on the first operation that needs the store and reused afterwards; the
//! bucket binding only moves when an operation targets a different bucket
//! and that bucket exists.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::keys::{ObjectRef, resolve_key};
use crate::mime;
use pressync_store::{BucketInfo, Connector, ObjectMetadata, S3Connector, StoreError, StoreHandle};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Published {
    pub object: ObjectRef,
    pub metadata: ObjectMetadata,
}

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteOutcome {
    /// The object existed and was deleted.
    Deleted(ObjectMetadata),
    /// Nothing to delete; no delete call was made.
    AlreadyAbsent,
}

/// Outcome of a batch publish. Failures never stop the batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub published: Vec<Published>,
    pub failed: Vec<(String, SyncError)>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct SyncEngine {
    config: SyncConfig,
    connector: Arc<dyn Connector>,
    handle: Option<StoreHandle>,
}

impl SyncEngine {
    /// Creates an engine that connects to S3 on first use.
    pub fn new(config: SyncConfig) -> Self {
        let connector = Arc::new(S3Connector::new(config.client.clone()));
        Self::with_connector(config, connector)
    }

    /// Creates an engine that obtains its store from `connector`.
    pub fn with_connector(config: SyncConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            config,
            connector,
            handle: None,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns true once the store handle has been created.
    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    /// The bucket operations currently target, if one is bound.
    pub fn current_bucket(&self) -> Option<&str> {
        self.handle.as_ref().and_then(StoreHandle::current_bucket)
    }

    /// Called after the generator writes `local_path`, published at `url`.
    pub async fn on_file_written(&mut self, local_path: &Path, url: &str) -> SyncResult<Published> {
        self.publish(local_path, url, None).await
    }

    /// Called when the file published at `url` is no longer generated.
    pub async fn on_file_removed(&mut self, url: &str) -> SyncResult<DeleteOutcome> {
        self.remove(url, None).await
    }

    /// Moves the bucket binding to `bucket`. Fails, leaving the binding
    /// unchanged, if the bucket does not exist.
    pub async fn set_bucket(&mut self, bucket: &str) -> SyncResult<()> {
        self.bind(Some(bucket)).await.map(|_| ())
    }

    /// Uploads `local_path` under the key derived from `url`.
    ///
    /// With `target_bucket` set, the handle is rebound to that bucket first;
    /// if the rebind fails nothing is uploaded.
    pub async fn publish(
        &mut self,
        local_path: &Path,
        url: &str,
        target_bucket: Option<&str>,
    ) -> SyncResult<Published> {
        if !local_path.is_file() {
            return Err(SyncError::LocalIo(format!(
                "{} does not exist",
                local_path.display()
            )));
        }
        let key = object_key(url)?;
        let content_type = mime::content_type(local_path).await.ok_or_else(|| {
            SyncError::LocalIo(format!("{} is not readable", local_path.display()))
        })?;

        let handle = self.bind(target_bucket).await?;
        let metadata = handle.upload(local_path, &key, Some(&content_type)).await?;
        let object = ObjectRef {
            bucket: handle.current_bucket().unwrap_or_default().to_string(),
            key,
            content_type: Some(content_type),
        };

        debug!(
            "published {} to s3://{}/{} ({})",
            local_path.display(),
            object.bucket,
            object.key,
            object.content_type.as_deref().unwrap_or_default()
        );
        Ok(Published { object, metadata })
    }

    /// Deletes the object for `url` if it exists.
    pub async fn remove(
        &mut self,
        url: &str,
        target_bucket: Option<&str>,
    ) -> SyncResult<DeleteOutcome> {
        let key = object_key(url)?;
        let handle = self.bind(target_bucket).await?;

        if !handle.object_exists(&key).await {
            debug!("{key} already absent, nothing to delete");
            return Ok(DeleteOutcome::AlreadyAbsent);
        }

        let metadata = handle.delete(&key).await?;
        debug!("removed {key}");
        Ok(DeleteOutcome::Deleted(metadata))
    }

    /// Downloads the object for `url` into `dest`, creating parent
    /// directories. Returns the number of bytes written.
    pub async fn fetch(
        &mut self,
        url: &str,
        dest: &Path,
        target_bucket: Option<&str>,
    ) -> SyncResult<u64> {
        let key = object_key(url)?;
        let handle = self.bind(target_bucket).await?;

        if !handle.object_exists(&key).await {
            return Err(StoreError::not_found(key).into());
        }
        let body = handle.download(&key).await?;

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                SyncError::LocalIo(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        tokio::fs::write(dest, &body)
            .await
            .map_err(|e| SyncError::LocalIo(format!("cannot write {}: {e}", dest.display())))?;

        debug!("fetched {key} into {} ({} bytes)", dest.display(), body.len());
        Ok(body.len() as u64)
    }

    /// Publishes every `(local_path, url)` pair, continuing past failures.
    pub async fn publish_all<I>(&mut self, files: I) -> BatchReport
    where
        I: IntoIterator<Item = (PathBuf, String)>,
    {
        let mut report = BatchReport::default();
        for (local_path, url) in files {
            match self.publish(&local_path, &url, None).await {
                Ok(published) => report.published.push(published),
                Err(e) => {
                    warn!("could not publish {url}: {e}");
                    report.failed.push((url, e));
                }
            }
        }
        info!(
            "batch finished: {} published, {} failed",
            report.published.len(),
            report.failed.len()
        );
        report
    }

    /// Lists buckets visible to the configured credentials.
    pub async fn list_buckets(&mut self) -> SyncResult<Vec<BucketInfo>> {
        let handle = self.handle_mut().await?;
        Ok(handle.list_buckets().await?)
    }

    /// Returns the handle, connecting on first use. A failed connection is
    /// not cached, so the next call tries again.
    async fn handle_mut(&mut self) -> SyncResult<&mut StoreHandle> {
        let handle = match self.handle.take() {
            Some(handle) => handle,
            None => {
                let store = self
                    .connector
                    .connect(&self.config.credentials, self.config.region)
                    .await?;
                let mut handle = StoreHandle::new(store);
                handle.set_defaults(self.config.default_acl, self.config.storage_class);
                info!("connected to object store in {}", self.config.region);
                handle
            }
        };
        Ok(self.handle.insert(handle))
    }

    /// Resolves which bucket an operation targets and makes sure the handle
    /// is bound to it. The explicit target wins, then the current binding,
    /// then the configured bucket.
    async fn bind(&mut self, target_bucket: Option<&str>) -> SyncResult<&mut StoreHandle> {
        let wanted = target_bucket
            .filter(|b| !b.is_empty())
            .or(self.current_bucket())
            .or(Some(self.config.bucket.as_str()).filter(|b| !b.is_empty()))
            .map(str::to_string);

        let Some(bucket) = wanted else {
            return Err(SyncError::Config("no bucket configured".to_string()));
        };

        let handle = self.handle_mut().await?;
        if handle.current_bucket() != Some(bucket.as_str()) && !handle.set_bucket(&bucket).await {
            return Err(SyncError::BucketUnavailable(bucket));
        }
        Ok(handle)
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("config", &self.config)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

fn object_key(url: &str) -> SyncResult<String> {
    let key = resolve_key(url);
    if key.is_empty() {
        return Err(SyncError::InvalidKey(url.to_string()));
    }
    Ok(key)
}
