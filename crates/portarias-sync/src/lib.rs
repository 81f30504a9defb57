//! Data-supply layer: pulls the full record set from Supabase or a local
//! JSON snapshot.

use std::future::Future;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use portarias_core::Record;
use thiserror::Error;

pub mod http;
pub mod snapshot;

pub use http::SupabaseClient;
pub use snapshot::SnapshotSource;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cursor did not advance past id {after:?}")]
    StalledCursor { after: Option<i64> },
}

/// Something that can supply the complete record set.
pub trait RecordSource {
    /// Every row of the table, not a truncated page.
    fn fetch_all_records(&self) -> impl Future<Output = Result<Vec<Record>, SyncError>> + Send;

    /// Most recent modification time across the table, if any row has one.
    fn fetch_last_updated(
        &self,
    ) -> impl Future<Output = Result<Option<DateTime<Utc>>, SyncError>> + Send;
}
