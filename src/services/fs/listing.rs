use crate::core::errors::{Error, Result};
use serde::Serialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tokio::task;
use walkdir::WalkDir;

pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntryDto {
    pub name: String,
    pub path: String,
    pub modified: u64,
}

#[derive(Debug, Clone)]
pub struct ListParams<'a> {
    pub path: &'a str,
    pub limit: usize,
    pub cursor: Option<&'a str>,
    pub include_hidden: bool,
}

impl<'a> ListParams<'a> {
    pub fn new(path: &'a str) -> Self {
        Self {
            path,
            limit: DEFAULT_PAGE_SIZE,
            cursor: None,
            include_hidden: false,
        }
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ListResult {
    pub entries: Vec<DirectoryEntryDto>,
    pub next_cursor: Option<String>,
}

/// Lists the immediate subdirectories of `params.path`, one page at a time.
pub async fn list_subdirectories(params: ListParams<'_>) -> Result<ListResult> {
    // A zero page would hand back the same cursor forever.
    if params.limit == 0 {
        return Err(Error::InvalidRequest(
            "page limit must be greater than zero".to_string(),
        ));
    }
    // Directory walks block; keep them off the async executor.
    let path = params.path.to_string();
    let limit = params.limit;
    let cursor = params.cursor.map(|s| s.to_string());
    let include_hidden = params.include_hidden;

    task::spawn_blocking(move || list_impl(&path, limit, cursor.as_deref(), include_hidden))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))?
}

fn list_impl(
    path: &str,
    limit: usize,
    cursor: Option<&str>,
    include_hidden: bool,
) -> Result<ListResult> {
    let dir = Path::new(path);
    if !dir.is_dir() {
        return Err(Error::NotFound(format!("directory '{path}'")));
    }

    // Collect names and paths only (cheap), then sort by name for stable paging.
    let mut names: Vec<(String, PathBuf)> = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("skipping unreadable entry under {}: {}", path, e);
                continue;
            }
        };
        if !entry.path().is_dir() {
            continue;
        }
        let name = os_str_to_string(entry.file_name());
        if !include_hidden && name.starts_with('.') {
            continue;
        }
        names.push((name, entry.into_path()));
    }
    names.sort_by(|a, b| a.0.to_lowercase().cmp(&b.0.to_lowercase()));

    let total = names.len();
    let offset = cursor
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(0)
        .min(total);

    let end = offset.saturating_add(limit).min(total);
    let entries = names[offset..end]
        .iter()
        .map(|(name, path)| DirectoryEntryDto {
            name: name.clone(),
            path: path.to_string_lossy().to_string(),
            modified: path
                .metadata()
                .and_then(|md| md.modified())
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs())
                .unwrap_or(0),
        })
        .collect();

    let next_cursor = if end < total {
        Some(end.to_string())
    } else {
        None
    };

    Ok(ListResult {
        entries,
        next_cursor,
    })
}

fn os_str_to_string(s: impl AsRef<OsStr>) -> String {
    s.as_ref().to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in ["beta", "Alpha", "gamma", ".git", "delta"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        fs::write(dir.path().join("file.txt"), "not a dir").unwrap();
        dir
    }

    #[tokio::test]
    async fn lists_sorted_visible_directories_only() -> Result<()> {
        let dir = fixture();
        let path = dir.path().to_string_lossy().to_string();

        let listed = list_subdirectories(ListParams::new(&path)).await?;
        let names: Vec<&str> = listed.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "beta", "delta", "gamma"]);
        assert!(listed.next_cursor.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn hidden_directories_on_request() -> Result<()> {
        let dir = fixture();
        let path = dir.path().to_string_lossy().to_string();

        let params = ListParams {
            include_hidden: true,
            ..ListParams::new(&path)
        };
        let listed = list_subdirectories(params).await?;
        assert_eq!(listed.entries[0].name, ".git");
        assert_eq!(listed.entries.len(), 5);
        Ok(())
    }

    #[tokio::test]
    async fn pages_with_cursor() -> Result<()> {
        let dir = fixture();
        let path = dir.path().to_string_lossy().to_string();

        let first = list_subdirectories(ListParams {
            limit: 3,
            ..ListParams::new(&path)
        })
        .await?;
        assert_eq!(first.entries.len(), 3);
        assert_eq!(first.next_cursor.as_deref(), Some("3"));

        let second = list_subdirectories(ListParams {
            limit: 3,
            cursor: first.next_cursor.as_deref(),
            ..ListParams::new(&path)
        })
        .await?;
        let names: Vec<&str> = second.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["gamma"]);
        assert!(second.next_cursor.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn zero_limit_is_rejected() {
        let dir = fixture();
        let path = dir.path().to_string_lossy().to_string();

        let err = list_subdirectories(ListParams {
            limit: 0,
            cursor: Some("2"),
            ..ListParams::new(&path)
        })
        .await
        .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn following_cursors_always_terminates() -> Result<()> {
        let dir = fixture();
        let path = dir.path().to_string_lossy().to_string();

        let mut names = Vec::new();
        let mut cursor: Option<String> = None;
        for _ in 0..10 {
            let page = list_subdirectories(ListParams {
                limit: 1,
                cursor: cursor.as_deref(),
                ..ListParams::new(&path)
            })
            .await?;
            names.extend(page.entries.into_iter().map(|e| e.name));
            cursor = page.next_cursor;
            if cursor.is_none() {
                break;
            }
        }
        assert!(cursor.is_none());
        assert_eq!(names, vec!["Alpha", "beta", "delta", "gamma"]);
        Ok(())
    }

    #[tokio::test]
    async fn missing_directory_is_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent").to_string_lossy().to_string();
        let err = list_subdirectories(ListParams::new(&path)).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
