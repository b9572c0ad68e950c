//! On-disk snapshot of the location catalog.
//!
//! Lets a restarted process skip the initial reference-data fetch. A
//! snapshot older than its TTL is ignored.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::domain::{City, Country};

use super::error::CatalogError;
use super::store::LocationCatalog;

/// Default snapshot TTL: 24 hours.
const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Serialize, Deserialize)]
struct StoredCatalog {
    /// Unix timestamp when the snapshot was written.
    written_at_secs: u64,
    countries: Vec<Country>,
    cities: Vec<City>,
}

/// Configuration for the catalog snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    pub path: PathBuf,
    pub ttl: Duration,
}

impl SnapshotConfig {
    /// Snapshot at `path` with the default TTL (24 hours).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self::new("catalog_snapshot.json")
    }
}

/// Reads and writes catalog snapshots.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    config: SnapshotConfig,
}

impl CatalogSnapshot {
    pub fn new(config: SnapshotConfig) -> Self {
        Self { config }
    }

    /// Load the catalog from disk.
    ///
    /// Returns `None` if the file is missing, unreadable or expired.
    pub fn load(&self) -> Option<LocationCatalog> {
        let contents = std::fs::read_to_string(&self.config.path).ok()?;
        let stored: StoredCatalog = serde_json::from_str(&contents).ok()?;

        let age_secs = unix_now().ok()?.saturating_sub(stored.written_at_secs);
        if age_secs >= self.config.ttl.as_secs() {
            return None;
        }

        Some(LocationCatalog::new(stored.countries, stored.cities))
    }

    /// Write the catalog to disk, creating parent directories as needed.
    pub fn save(&self, catalog: &LocationCatalog) -> Result<(), CatalogError> {
        let stored = StoredCatalog {
            written_at_secs: unix_now()?,
            countries: catalog.countries().to_vec(),
            cities: catalog.cities().to_vec(),
        };

        if let Some(parent) = self.config.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| CatalogError::Snapshot {
                message: format!("failed to create snapshot directory: {e}"),
            })?;
        }

        let json = serde_json::to_string(&stored).map_err(|e| CatalogError::Snapshot {
            message: format!("failed to serialize snapshot: {e}"),
        })?;

        std::fs::write(&self.config.path, json).map_err(|e| CatalogError::Snapshot {
            message: format!("failed to write snapshot file: {e}"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }
}

fn unix_now() -> Result<u64, CatalogError> {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| CatalogError::Snapshot {
            message: "system time before unix epoch".to_string(),
        })
}
