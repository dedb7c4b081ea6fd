//! Sync configuration.
//!
//! `Settings` is the persisted record as the settings screen stores it: plain
//! strings, empty meaning unset. `SyncConfig` is the validated snapshot a sync
//! session is bound to.

use crate::error::{SyncError, SyncResult};
use pressync_store::{CannedAcl, ClientOptions, Credentials, Region, StorageClass, resolve_region};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::warn;

/// Keys understood in a settings record.
pub const SETTINGS_KEYS: [&str; 6] = [
    "access_key",
    "secret_key",
    "region",
    "bucket",
    "acl",
    "storage_class",
];

/// Persisted settings record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub bucket: String,
    pub acl: String,
    pub storage_class: String,
}

impl Settings {
    /// Builds settings from a string map. Missing keys are left empty and
    /// unknown keys are ignored.
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).map(|v| v.trim().to_string()).unwrap_or_default();
        Self {
            access_key: get("access_key"),
            secret_key: get("secret_key"),
            region: get("region"),
            bucket: get("bucket"),
            acl: get("acl"),
            storage_class: get("storage_class"),
        }
    }

    /// Every known key, present even when unset.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        SETTINGS_KEYS
            .iter()
            .zip([
                &self.access_key,
                &self.secret_key,
                &self.region,
                &self.bucket,
                &self.acl,
                &self.storage_class,
            ])
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    /// Loads settings from a JSON file. A missing file yields empty settings.
    pub fn from_json_file(path: &Path) -> SyncResult<Self> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(SyncError::Config(format!(
                "cannot read settings {}: {e}",
                path.display()
            ))),
        }
    }

    /// Writes settings as pretty JSON.
    pub fn save_json_file(&self, path: &Path) -> SyncResult<()> {
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, json).map_err(|e| {
            SyncError::Config(format!("cannot write settings {}: {e}", path.display()))
        })
    }
}

/// Configuration snapshot for one sync session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    pub credentials: Credentials,

    /// Region the client connects to.
    pub region: Region,

    /// Bucket files are published to. Empty means unset.
    pub bucket: String,

    /// ACL applied to every upload.
    pub default_acl: CannedAcl,

    /// Storage class applied to every upload.
    pub storage_class: StorageClass,

    /// Transport settings (endpoint override, retries, timeout).
    #[serde(default)]
    pub client: ClientOptions,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            region: Region::default(),
            bucket: String::new(),
            default_acl: CannedAcl::default(),
            storage_class: StorageClass::default(),
            client: ClientOptions::default(),
        }
    }
}

impl SyncConfig {
    pub fn has_bucket(&self) -> bool {
        !self.bucket.is_empty()
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_complete()
    }

    /// Points the client at an S3-compatible endpoint (MinIO in tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.client.endpoint_override = Some(endpoint.into());
        self
    }
}

impl From<Settings> for SyncConfig {
    fn from(settings: Settings) -> Self {
        let region = match settings.region.trim() {
            "" => Region::default(),
            name => resolve_region(name).unwrap_or_else(|_| {
                warn!("unknown region {name:?}, using {}", Region::default());
                Region::default()
            }),
        };

        let default_acl = parse_or_default(&settings.acl, "acl");
        let storage_class = parse_or_default(&settings.storage_class, "storage class");

        Self {
            credentials: Credentials::new(settings.access_key.trim(), settings.secret_key.trim()),
            region,
            bucket: settings.bucket.trim().to_string(),
            default_acl,
            storage_class,
            client: ClientOptions::default(),
        }
    }
}

fn parse_or_default<T>(value: &str, what: &str) -> T
where
    T: std::str::FromStr<Err = String> + Default + std::fmt::Debug,
{
    if value.trim().is_empty() {
        return T::default();
    }
    value.parse().unwrap_or_else(|e| {
        let fallback = T::default();
        warn!("{e}; using default {what} {fallback:?}");
        fallback
    })
}
