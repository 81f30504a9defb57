//! Local JSON snapshot: an array of rows shaped like the REST response.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use portarias_core::Record;
use tracing::info;

use crate::{RecordSource, SyncError};

pub struct SnapshotSource {
    path: PathBuf,
}

impl SnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read(&self) -> Result<Vec<Record>, SyncError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| SyncError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl RecordSource for SnapshotSource {
    async fn fetch_all_records(&self) -> Result<Vec<Record>, SyncError> {
        let records = self.read().await?;
        info!(path = %self.path.display(), count = records.len(), "loaded snapshot");
        Ok(records)
    }

    /// Latest parseable `updated_at` in the file.
    async fn fetch_last_updated(&self) -> Result<Option<DateTime<Utc>>, SyncError> {
        let records = self.read().await?;
        Ok(latest_updated_at(&records))
    }
}

/// Maximum RFC 3339 `updated_at` among `records`; unparseable values are skipped.
pub fn latest_updated_at(records: &[Record]) -> Option<DateTime<Utc>> {
    records
        .iter()
        .filter_map(|r| r.updated_at.as_deref())
        .filter_map(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|ts| ts.with_timezone(&Utc))
        .max()
}
