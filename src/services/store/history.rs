use std::path::PathBuf;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use super::{read_json, write_json};
use crate::core::errors::{Error, Result};
use crate::models::{HistoryEntry, SearchOutcome, SearchRequest};
use crate::services::search::SearchRunner;

pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Past searches, most recent first. Every mutation is written through to
/// disk; share across tasks behind a lock.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    capacity: usize,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    pub fn load(path: impl Into<PathBuf>, capacity: usize) -> Self {
        let path = path.into();
        let mut entries = match read_json::<Vec<HistoryEntry>>(&path) {
            Ok(Some(entries)) => {
                tracing::info!(count = entries.len(), "loaded search history");
                entries
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load search history, starting empty");
                Vec::new()
            }
        };
        entries.truncate(capacity);
        Self {
            path,
            capacity,
            entries,
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Inserts at the front, evicting the oldest entries past capacity.
    pub async fn add(&mut self, entry: HistoryEntry) -> Result<()> {
        tracing::info!(
            pattern = %entry.request.pattern,
            directory = %entry.request.directory,
            "added search to history"
        );
        self.entries.insert(0, entry);
        self.entries.truncate(self.capacity);
        self.save().await
    }

    /// Records the result of running `request`. Rejected requests are not
    /// worth remembering and are left out.
    pub async fn record(
        &mut self,
        request: SearchRequest,
        command_line: String,
        result: &Result<SearchOutcome>,
        elapsed: Duration,
    ) -> Result<()> {
        match result {
            Ok(outcome) => self.add(HistoryEntry::from_outcome(request, outcome)).await,
            Err(Error::InvalidRequest(_)) => Ok(()),
            Err(e) => {
                self.add(HistoryEntry::from_error(request, command_line, e, elapsed))
                    .await
            }
        }
    }

    pub async fn remove(&mut self, id: &str) -> Result<bool> {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        if self.entries.len() == before {
            return Ok(false);
        }
        self.save().await?;
        tracing::info!(%id, "removed history entry");
        Ok(true)
    }

    pub async fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.save().await?;
        tracing::info!("search history cleared");
        Ok(())
    }

    async fn save(&self) -> Result<()> {
        write_json(&self.path, &self.entries).await
    }
}

/// Runs a search and records it in `history`. The lock is only taken once
/// the search is over, so concurrent searches never wait on each other. A
/// failure to persist history is logged, not returned.
pub async fn run_recorded(
    runner: &SearchRunner,
    history: &Mutex<HistoryStore>,
    request: SearchRequest,
) -> Result<SearchOutcome> {
    let command_line = runner
        .prepare(&request)
        .map(|invocation| invocation.command_line())
        .unwrap_or_default();
    let started = Instant::now();
    let result = runner.execute(&request).await;

    let elapsed = started.elapsed();
    let mut store = history.lock().await;
    if let Err(e) = store.record(request, command_line, &result, elapsed).await {
        tracing::warn!(error = %e, "failed to save search history");
    }
    result
}
