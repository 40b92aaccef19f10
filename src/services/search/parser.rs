use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use super::paths::resolve_reported;
use crate::models::{SearchMatch, SearchResult};

#[derive(Deserialize)]
struct Record {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct LineData {
    path: Text,
    line_number: u64,
    lines: Text,
}

#[derive(Deserialize)]
struct Text {
    text: String,
}

/// Groups `match` and `context` records by file.
///
/// Keys are absolute path strings; the ordered map keeps files sorted by
/// ordinal comparison while lines stay in arrival order within each file.
pub struct ResultCollector {
    root: PathBuf,
    files: BTreeMap<String, Vec<SearchMatch>>,
    skipped: usize,
}

impl ResultCollector {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: BTreeMap::new(),
            skipped: 0,
        }
    }

    /// Feeds one output line. Lines that cannot be decoded are logged and
    /// counted, never fatal.
    pub fn push_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        let record: Record = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(%line, error = %e, "failed to parse search tool output line");
                self.skipped += 1;
                return;
            }
        };

        let is_context_only = match record.kind.as_str() {
            "match" => false,
            "context" => true,
            _ => return,
        };

        let data = match record
            .data
            .ok_or_else(|| "missing data".to_string())
            .and_then(|data| serde_json::from_value::<LineData>(data).map_err(|e| e.to_string()))
        {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(%line, error = %e, "skipping {} record", record.kind);
                self.skipped += 1;
                return;
            }
        };

        let file_path = resolve_reported(&self.root, &data.path.text)
            .to_string_lossy()
            .into_owned();
        self.files.entry(file_path).or_default().push(SearchMatch {
            line_number: data.line_number,
            content: data.lines.text.trim_end_matches(['\n', '\r']).to_string(),
            is_context_only,
        });
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Sorted results, cut down to the first `max_files` entries.
    pub fn finish(self, max_files: usize) -> Vec<SearchResult> {
        self.files
            .into_iter()
            .take(max_files)
            .map(|(file_path, matches)| SearchResult { file_path, matches })
            .collect()
    }
}
