//! # AMBER Store
//!
//! File-backed alert catalogue. Two JSON artifacts live under one state
//! directory: `alerts.json`, the saved alert list, and `current_alert.json`,
//! the published-alert pointer the broadcaster watches. Every write goes
//! through a write-temp-then-rename so the reload watcher never observes a
//! half-written file.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs;

use amber_gatt::{AlertCatalogue, CatalogueError};
use amber_proto::{AlertRecord, ProtocolError};

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored record failed to parse or validate
    #[error("store record error: {0}")]
    Record(#[from] ProtocolError),

    /// Lookup miss on a caller-supplied id
    #[error("alert '{0}' not found")]
    NotFound(String),
}

impl From<StoreError> for CatalogueError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Io(io) => CatalogueError::Io(io),
            StoreError::Record(p) => CatalogueError::Record(p),
            StoreError::NotFound(id) => CatalogueError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("alert '{id}' not found"),
            )),
        }
    }
}

/// Resolved locations of the on-disk artifacts.
#[derive(Debug, Clone)]
pub struct StorePaths {
    /// State directory root.
    pub root: PathBuf,
    /// Saved alert list.
    pub alerts_file: PathBuf,
    /// Published-alert pointer.
    pub current_alert_file: PathBuf,
}

impl StorePaths {
    /// Resolve the artifact locations under `root`.
    pub fn new(root: PathBuf) -> Self {
        let alerts_file = root.join("alerts.json");
        let current_alert_file = root.join("current_alert.json");
        Self {
            root,
            alerts_file,
            current_alert_file,
        }
    }
}

/// File-backed alert store.
#[derive(Debug, Clone)]
pub struct AlertStore {
    paths: StorePaths,
}

impl AlertStore {
    /// Open the store under `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let paths = StorePaths::new(root.into());
        fs::create_dir_all(&paths.root).await?;
        Ok(Self { paths })
    }

    /// Default state directory: `~/.amber`.
    pub fn default_root() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".amber")
    }

    /// Artifact locations.
    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    /// All saved alerts, newest fetch first.
    pub async fn load_alerts(&self) -> Result<Vec<AlertRecord>, StoreError> {
        if !fs::try_exists(&self.paths.alerts_file).await? {
            return Ok(Vec::new());
        }
        let raw = fs::read(&self.paths.alerts_file).await?;
        let records: Vec<AlertRecord> =
            serde_json::from_slice(&raw).map_err(ProtocolError::from)?;
        for record in &records {
            record.validate().map_err(ProtocolError::from)?;
        }
        Ok(records)
    }

    /// Saved alert by id.
    pub async fn get_alert(&self, alert_id: &str) -> Result<Option<AlertRecord>, StoreError> {
        Ok(self
            .load_alerts()
            .await?
            .into_iter()
            .find(|a| a.alert_id == alert_id))
    }

    /// Insert or replace by id, keeping the list sorted by fetch time,
    /// newest first.
    pub async fn upsert_alert(&self, alert: AlertRecord) -> Result<(), StoreError> {
        let mut alerts = self.load_alerts().await?;
        alerts.retain(|a| a.alert_id != alert.alert_id);
        alerts.push(alert);
        alerts.sort_by_key(|a| std::cmp::Reverse(a.fetched_at));
        self.save_alerts(&alerts).await
    }

    /// Delete by id; `false` when no such alert was saved.
    pub async fn delete_alert(&self, alert_id: &str) -> Result<bool, StoreError> {
        let mut alerts = self.load_alerts().await?;
        let before = alerts.len();
        alerts.retain(|a| a.alert_id != alert_id);
        if alerts.len() == before {
            return Ok(false);
        }
        self.save_alerts(&alerts).await?;
        Ok(true)
    }

    /// Copy a saved alert into the published-alert pointer.
    pub async fn publish(&self, alert_id: &str) -> Result<AlertRecord, StoreError> {
        let alert = self
            .get_alert(alert_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(alert_id.to_string()))?;
        self.write_atomic(&self.paths.current_alert_file, &alert)
            .await?;
        tracing::debug!("published alert {} to {}", alert.alert_id, self.paths.current_alert_file.display());
        Ok(alert)
    }

    /// Currently published record, if any.
    pub async fn current_alert(&self) -> Result<Option<AlertRecord>, StoreError> {
        if !fs::try_exists(&self.paths.current_alert_file).await? {
            return Ok(None);
        }
        let raw = fs::read(&self.paths.current_alert_file).await?;
        Ok(Some(AlertRecord::from_json(&raw)?))
    }

    /// Modification time of the published-alert pointer, if present.
    pub async fn current_alert_modified(&self) -> Result<Option<SystemTime>, StoreError> {
        match fs::metadata(&self.paths.current_alert_file).await {
            Ok(meta) => Ok(Some(meta.modified()?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save_alerts(&self, alerts: &[AlertRecord]) -> Result<(), StoreError> {
        self.write_atomic(&self.paths.alerts_file, &alerts).await
    }

    /// Serialize to a sibling temp file, then rename into place. Rename is
    /// atomic on the same filesystem, so readers see either the old or the
    /// new artifact, never a torn one.
    async fn write_atomic<T: serde::Serialize>(
        &self,
        target: &Path,
        value: &T,
    ) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(value).map_err(ProtocolError::from)?;
        let tmp = target.with_extension("json.tmp");
        fs::write(&tmp, &bytes).await?;
        fs::rename(&tmp, target).await?;
        Ok(())
    }
}

#[async_trait]
impl AlertCatalogue for AlertStore {
    async fn current_alert(&self) -> Result<Option<AlertRecord>, CatalogueError> {
        Ok(AlertStore::current_alert(self).await?)
    }

    async fn last_modified(&self) -> Result<Option<SystemTime>, CatalogueError> {
        Ok(self.current_alert_modified().await?)
    }
}
