//! HTTP client for the Supabase (PostgREST) table holding the portarias.

use std::future::Future;

use chrono::{DateTime, Utc};
use portarias_core::Record;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{RecordSource, SyncError};

/// Rows per request. PostgREST deployments cap responses at 1000 rows by
/// default, so larger windows would be silently truncated.
pub const WINDOW_SIZE: usize = 1000;

pub const DEFAULT_TABLE: &str = "portarias_iphan";

/// Supabase REST client for one table.
pub struct SupabaseClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    table: String,
}

#[derive(Deserialize)]
struct UpdatedAtRow {
    updated_at: Option<DateTime<Utc>>,
}

impl SupabaseClient {
    /// Create a client for the project at `base_url`.
    ///
    /// `base_url` should be like `https://xyz.supabase.co` (no trailing slash).
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            table: DEFAULT_TABLE.to_string(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        query: &[(&str, String)],
    ) -> Result<T, SyncError> {
        let url = self.table_url();
        debug!(url = %url, ?query, "GET");
        let resp = self
            .client
            .get(&url)
            .query(query)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::Server {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Fetch one window of rows with `id` greater than `after`.
    async fn fetch_window(&self, after: Option<i64>) -> Result<Vec<Record>, SyncError> {
        self.get_json(&window_query(after, WINDOW_SIZE)).await
    }
}

impl RecordSource for SupabaseClient {
    /// Pull the whole table, [`WINDOW_SIZE`] rows at a time, keyed on `id`.
    async fn fetch_all_records(&self) -> Result<Vec<Record>, SyncError> {
        info!(table = %self.table, "pulling records from supabase");
        let records = collect_windows(WINDOW_SIZE, |after| self.fetch_window(after)).await?;
        info!(count = records.len(), "pulled records");
        Ok(records)
    }

    async fn fetch_last_updated(&self) -> Result<Option<DateTime<Utc>>, SyncError> {
        let rows: Vec<UpdatedAtRow> = self
            .get_json(&[
                ("select", "updated_at".to_string()),
                ("order", "updated_at.desc.nullslast".to_string()),
                ("limit", "1".to_string()),
            ])
            .await?;
        Ok(rows.into_iter().next().and_then(|r| r.updated_at))
    }
}

/// PostgREST query for the window after cursor `after`.
pub fn window_query(after: Option<i64>, window: usize) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("select", "*".to_string()),
        ("order", "id.asc".to_string()),
        ("limit", window.to_string()),
    ];
    if let Some(id) = after {
        query.push(("id", format!("gt.{id}")));
    }
    query
}

/// Drive a cursor loop: fetch windows after the last seen id until a window
/// comes back shorter than `window`.
pub async fn collect_windows<F, Fut>(window: usize, mut fetch: F) -> Result<Vec<Record>, SyncError>
where
    F: FnMut(Option<i64>) -> Fut,
    Fut: Future<Output = Result<Vec<Record>, SyncError>>,
{
    let mut all = Vec::new();
    let mut cursor = None;
    loop {
        let batch = fetch(cursor).await?;
        let n = batch.len();
        let last_id = batch.last().map(|r| r.id);
        all.extend(batch);
        debug!(fetched = n, total = all.len(), "window complete");

        if n < window {
            break;
        }
        // A full window whose last id does not advance the cursor would loop forever.
        match last_id {
            Some(id) if cursor.is_none_or(|c| id > c) => cursor = Some(id),
            _ => return Err(SyncError::StalledCursor { after: cursor }),
        }
    }
    Ok(all)
}
