//! Shared helpers for sync engine tests.

#![allow(dead_code)]

use pressync_store::{Credentials, MemoryConnector, MemoryStore, Region};
use pressync_sync::{SyncConfig, SyncEngine};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

pub const SITE_BUCKET: &str = "static-site";
pub const STAGING_BUCKET: &str = "static-site-staging";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("pressync_sync=debug,pressync_store=debug"))
        .with_test_writer()
        .try_init();
}

pub fn full_config() -> SyncConfig {
    SyncConfig {
        credentials: Credentials::new("AKIDEXAMPLE", "secret"),
        region: Region::ApNortheast1,
        bucket: SITE_BUCKET.to_string(),
        ..SyncConfig::default()
    }
}

/// An engine over an in-memory store holding the site and staging buckets.
pub struct Harness {
    pub engine: SyncEngine,
    pub connector: MemoryConnector,
    pub site: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(full_config())
    }

    pub fn with_config(config: SyncConfig) -> Self {
        let store = Arc::new(MemoryStore::with_buckets([SITE_BUCKET, STAGING_BUCKET]));
        let connector = MemoryConnector::new(store);
        let engine = SyncEngine::with_connector(config, Arc::new(connector.clone()));
        Self {
            engine,
            connector,
            site: tempfile::tempdir().expect("create site dir"),
        }
    }

    pub fn store(&self) -> &MemoryStore {
        self.connector.store()
    }

    /// Writes a file into the generated site tree.
    pub fn write(&self, name: &str, contents: &[u8]) -> PathBuf {
        write_file(self.site.path(), name, contents)
    }

    pub fn puts(&self) -> usize {
        self.store().calls().put.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.store().calls().delete.load(Ordering::SeqCst)
    }

    pub fn remote_calls(&self) -> usize {
        self.store().calls().total()
    }
}

pub fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dirs");
    }
    std::fs::write(&path, contents).expect("write test file");
    path
}

pub const INDEX_HTML: &[u8] =
    b"<!DOCTYPE html>\n<html><head><title>Home</title></head><body>hi</body></html>\n";
pub const STYLE_CSS: &[u8] = b"body { margin: 0; color: #333; }\n";
pub const APP_JS: &[u8] = b"document.addEventListener('DOMContentLoaded', function () {});\n";
pub const LOGO_PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";
