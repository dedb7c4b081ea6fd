//! S3 implementation of [`ObjectStore`].
//!
//! Every SDK call is wrapped here; callers only ever see `bool` answers for
//! existence checks and `StoreError` values for everything else.

use crate::error::{StoreError, StoreResult};
use crate::region::{Region, region_or_default};
use crate::store::{Connector, ObjectStore};
use crate::types::{BucketInfo, ClientOptions, Credentials, ObjectMetadata, PutRequest};
use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::RequestId;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, warn};

const CREDENTIALS_PROVIDER_NAME: &str = "pressync-static";

/// S3 client bound to one credential pair and one region.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: S3Client,
    region: Region,
}

impl S3ObjectStore {
    /// Builds a client. Fails with `StoreError::Auth` when either key is empty;
    /// nothing is sent over the network here.
    pub fn connect(
        credentials: &Credentials,
        region: Region,
        options: &ClientOptions,
    ) -> StoreResult<Self> {
        if !credentials.is_complete() {
            return Err(StoreError::Auth(
                "access key and secret key are required".to_string(),
            ));
        }

        let static_credentials = aws_credential_types::Credentials::new(
            &credentials.access_key,
            &credentials.secret_key,
            None,
            None,
            CREDENTIALS_PROVIDER_NAME,
        );

        let mut config_builder = aws_sdk_s3::Config::builder()
            .region(aws_types::region::Region::from(region))
            .credentials_provider(static_credentials)
            .retry_config(RetryConfig::standard().with_max_attempts(options.max_attempts.max(1)))
            .behavior_version_latest();

        if let Some(timeout) = options.operation_timeout {
            config_builder = config_builder
                .timeout_config(TimeoutConfig::builder().operation_timeout(timeout).build());
        }

        if let Some(ref endpoint) = options.endpoint_override {
            config_builder = config_builder
                .endpoint_url(endpoint)
                .force_path_style(true);
        }

        debug!("built S3 client for region {region}");
        Ok(Self {
            client: S3Client::from_conf(config_builder.build()),
            region,
        })
    }

    /// Builds a client for a region given by name. An unset or unrecognized
    /// name selects [`DEFAULT_REGION`](crate::region::DEFAULT_REGION).
    pub fn connect_named(
        credentials: &Credentials,
        region: Option<&str>,
        options: &ClientOptions,
    ) -> StoreResult<Self> {
        Self::connect(credentials, region_or_default(region), options)
    }

    pub fn region(&self) -> Region {
        self.region
    }
}

/// HTTP status of the raw response behind an SDK error, if one was received.
fn status_of<E>(err: &SdkError<E>) -> Option<u16> {
    err.raw_response().map(|resp| resp.status().as_u16())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn bucket_exists(&self, bucket: &str, accept_forbidden: bool) -> bool {
        if bucket.is_empty() {
            return false;
        }

        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => true,
            Err(err) => match status_of(&err) {
                Some(403) if accept_forbidden => {
                    debug!("bucket {bucket} is forbidden but present");
                    true
                }
                Some(403 | 404) => false,
                _ => {
                    warn!("head bucket failed for {bucket}: {}", DisplayErrorContext(&err));
                    false
                }
            },
        }
    }

    async fn object_exists(&self, bucket: &str, key: &str) -> bool {
        match self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => true,
            Err(err) => {
                if status_of(&err) != Some(404) {
                    warn!(
                        "head object failed for s3://{bucket}/{key}: {}",
                        DisplayErrorContext(&err)
                    );
                }
                false
            }
        }
    }

    async fn put_object(&self, request: PutRequest) -> StoreResult<ObjectMetadata> {
        let body = ByteStream::from_path(&request.source).await.map_err(|e| {
            StoreError::LocalIo(format!("{}: {e}", request.source.display()))
        })?;

        let mut put = self
            .client
            .put_object()
            .bucket(&request.bucket)
            .key(&request.key)
            .body(body)
            .acl(request.acl.into())
            .storage_class(request.storage_class.into());

        if let Some(ref content_type) = request.content_type {
            put = put.content_type(content_type);
        }

        let output = put.send().await.map_err(|e| {
            StoreError::transport(format!(
                "put failed for s3://{}/{}: {}",
                request.bucket,
                request.key,
                DisplayErrorContext(&e)
            ))
        })?;

        debug!(
            "uploaded {} to s3://{}/{}",
            request.source.display(),
            request.bucket,
            request.key
        );
        Ok(ObjectMetadata {
            etag: output.e_tag().map(str::to_string),
            version_id: output.version_id().map(str::to_string),
            request_id: output.request_id().map(str::to_string),
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<Bytes> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match status_of(&e) {
                Some(404) => StoreError::not_found(format!("s3://{bucket}/{key}")),
                _ => StoreError::transport(format!(
                    "get failed for s3://{bucket}/{key}: {}",
                    DisplayErrorContext(&e)
                )),
            })?;

        let body = resp.body.collect().await.map_err(|e| {
            StoreError::transport(format!("failed to read body for s3://{bucket}/{key}: {e}"))
        })?;

        let bytes = body.into_bytes();
        debug!("downloaded {} bytes from s3://{bucket}/{key}", bytes.len());
        Ok(bytes)
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectMetadata> {
        let output = self
            .client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                StoreError::transport(format!(
                    "delete failed for s3://{bucket}/{key}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        debug!("deleted s3://{bucket}/{key}");
        Ok(ObjectMetadata {
            etag: None,
            version_id: output.version_id().map(str::to_string),
            request_id: output.request_id().map(str::to_string),
        })
    }

    async fn list_buckets(&self) -> StoreResult<Vec<BucketInfo>> {
        let resp = self.client.list_buckets().send().await.map_err(|e| {
            StoreError::transport(format!("list buckets failed: {}", DisplayErrorContext(&e)))
        })?;

        let buckets = resp
            .buckets()
            .iter()
            .filter_map(|bucket| {
                let name = bucket.name()?.to_string();
                let created_at = bucket.creation_date().and_then(|d| {
                    chrono::DateTime::from_timestamp(d.secs(), d.subsec_nanos())
                });
                Some(BucketInfo { name, created_at })
            })
            .collect();

        Ok(buckets)
    }
}

/// Connects [`S3ObjectStore`]s with fixed transport options.
#[derive(Debug, Clone, Default)]
pub struct S3Connector {
    options: ClientOptions,
}

impl S3Connector {
    pub fn new(options: ClientOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Connector for S3Connector {
    async fn connect(
        &self,
        credentials: &Credentials,
        region: Region,
    ) -> StoreResult<Arc<dyn ObjectStore>> {
        let store = S3ObjectStore::connect(credentials, region, &self.options)?;
        Ok(Arc::new(store))
    }
}
