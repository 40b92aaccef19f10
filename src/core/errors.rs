use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::models::EditorKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("search tool '{program}' is not available: {source}")]
    SearchToolUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("search tool failed with {}: {stderr}", exit_label(.code))]
    SearchToolFailure { code: Option<i32>, stderr: String },
    #[error("search cancelled after {0:?}")]
    Cancelled(Duration),
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("file does not exist: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("custom editor path is not configured")]
    NotConfigured,
    #[error("no working executable found for {0}")]
    NoExecutable(EditorKind),
    #[error("failed to open {} with the system default application: {source}", .path.display())]
    SystemOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "termination by signal".to_string(),
    }
}
