//! Shared test helpers for store integration tests.

#![allow(dead_code)]

use pressync_store::{ClientOptions, Credentials, Region, S3ObjectStore};
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// MinIO root credentials from docker-compose.test.yml.
pub fn minio_creds() -> Credentials {
    Credentials::new("pressync-test", "pressync-test-secret")
}

pub const MINIO_BUCKET: &str = "pressync-site";

/// Store pointing at local MinIO.
pub fn minio_store() -> S3ObjectStore {
    S3ObjectStore::connect(
        &minio_creds(),
        Region::UsEast1,
        &ClientOptions {
            endpoint_override: Some("http://localhost:9000".into()),
            ..ClientOptions::default()
        },
    )
    .expect("complete credentials must connect")
}

/// Store pointing at a wiremock server. Single attempt so that error
/// responses are observed exactly once.
pub fn mock_store(uri: &str) -> S3ObjectStore {
    S3ObjectStore::connect(
        &Credentials::new("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY"),
        Region::UsEast1,
        &ClientOptions {
            endpoint_override: Some(uri.to_string()),
            max_attempts: 1,
            operation_timeout: Some(Duration::from_secs(10)),
        },
    )
    .expect("complete credentials must connect")
}

/// Per-test unique key prefix to prevent collisions.
pub fn unique_prefix() -> String {
    format!("test-runs/{}", Uuid::new_v4())
}

/// Writes `contents` to `dir/name`, creating parent directories.
pub fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dirs");
    }
    std::fs::write(&path, contents).expect("write test file");
    path
}
