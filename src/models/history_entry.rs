use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::core::errors::Error;
use crate::models::search::{SearchOutcome, SearchRequest, SearchResult};

/// One past search, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub command_line: String,
    pub request: SearchRequest,
    #[serde(default)]
    pub results: Vec<SearchResult>,
    pub duration_ms: u64,
    pub result_count: usize,
    #[serde(default)]
    pub has_error: bool,
    #[serde(default)]
    pub error_message: String,
}

impl HistoryEntry {
    pub fn from_outcome(request: SearchRequest, outcome: &SearchOutcome) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: OffsetDateTime::now_utc(),
            command_line: outcome.command_line.clone(),
            request,
            results: outcome.results.clone(),
            duration_ms: outcome.duration_ms,
            result_count: outcome.match_count(),
            has_error: false,
            error_message: String::new(),
        }
    }

    pub fn from_error(
        request: SearchRequest,
        command_line: String,
        error: &Error,
        elapsed: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: OffsetDateTime::now_utc(),
            command_line,
            request,
            results: Vec::new(),
            duration_ms: elapsed.as_millis() as u64,
            result_count: 0,
            has_error: true,
            error_message: error.to_string(),
        }
    }
}
