//! Persistence adapters for the location engine.
//!
//! Both adapters implement [`PersistenceSink`] and [`SnapshotLoader`]:
//!
//! - [`JsonFileStore`] writes the Store and the cluster list as two JSON
//!   documents in a data directory, using temp file + rename writes.
//! - [`MemoryStore`] keeps the last snapshot in memory (tests, embedding).
//!
//! ## Example
//!
//! ```rust,ignore
//! use mindtrail_location::storage::JsonFileStore;
//!
//! let store = Arc::new(JsonFileStore::new("/var/lib/mindtrail"));
//! let mut engine = LocationEngine::new(config).with_sink(store.clone());
//! engine.load(&*store).await?;
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mindtrail_core::defaults::{CLUSTERS_FILE, LOCATIONS_FILE};
use mindtrail_core::{
    Error, LocationRecord, LocationSnapshot, PersistenceSink, Result, SnapshotLoader,
};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// JSON documents in a directory.
///
/// Layout: `{dir}/mindtrail_locations.json` and
/// `{dir}/mindtrail_location_clusters.json`.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn locations_path(&self) -> PathBuf {
        self.dir.join(LOCATIONS_FILE)
    }

    pub fn clusters_path(&self) -> PathBuf {
        self.dir.join(CLUSTERS_FILE)
    }

    async fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()> {
        debug!(path = %path.display(), size = data.len(), "json_store: write");

        fs::create_dir_all(&self.dir).await.map_err(|e| {
            warn!(dir = %self.dir.display(), error = %e, "json_store: create_dir_all failed");
            e
        })?;

        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            warn!(temp_path = %temp_path.display(), error = %e, "json_store: File::create failed");
            e
        })?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, path).await.map_err(|e| {
            warn!(
                from = %temp_path.display(),
                to = %path.display(),
                error = %e,
                "json_store: rename failed"
            );
            e
        })?;

        Ok(())
    }
}

#[async_trait]
impl PersistenceSink for JsonFileStore {
    async fn save(&self, snapshot: &LocationSnapshot) -> Result<()> {
        let locations = serde_json::to_vec_pretty(&snapshot.locations)?;
        let clusters = serde_json::to_vec_pretty(&snapshot.clusters)?;

        self.write_atomic(&self.locations_path(), &locations).await?;
        self.write_atomic(&self.clusters_path(), &clusters).await?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotLoader for JsonFileStore {
    async fn load(&self) -> Result<Option<Vec<LocationRecord>>> {
        let path = self.locations_path();
        if !fs::try_exists(&path).await? {
            debug!(path = %path.display(), "json_store: nothing persisted yet");
            return Ok(None);
        }

        let bytes = fs::read(&path).await?;
        let records: Vec<LocationRecord> = serde_json::from_slice(&bytes).map_err(|e| {
            Error::Persistence(format!("{} is not a valid location list: {}", path.display(), e))
        })?;
        Ok(Some(records))
    }
}

/// Last snapshot kept in memory.
#[derive(Default)]
pub struct MemoryStore {
    last: Mutex<Option<LocationSnapshot>>,
    writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that loads `records` as if they had been persisted earlier.
    pub fn seeded(records: Vec<LocationRecord>) -> Self {
        Self {
            last: Mutex::new(Some(LocationSnapshot {
                locations: records,
                clusters: vec![],
            })),
            writes: Mutex::new(0),
        }
    }

    pub async fn last_snapshot(&self) -> Option<LocationSnapshot> {
        self.last.lock().await.clone()
    }

    /// Number of `save` calls received.
    pub async fn write_count(&self) -> usize {
        *self.writes.lock().await
    }
}

#[async_trait]
impl PersistenceSink for MemoryStore {
    async fn save(&self, snapshot: &LocationSnapshot) -> Result<()> {
        *self.last.lock().await = Some(snapshot.clone());
        *self.writes.lock().await += 1;
        Ok(())
    }
}

#[async_trait]
impl SnapshotLoader for MemoryStore {
    async fn load(&self) -> Result<Option<Vec<LocationRecord>>> {
        Ok(self
            .last
            .lock()
            .await
            .as_ref()
            .map(|s| s.locations.clone()))
    }
}
