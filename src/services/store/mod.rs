//! JSON documents on local disk: editor preferences and search history.

pub mod history;
pub mod settings;

pub use history::{run_recorded, HistoryStore, DEFAULT_HISTORY_CAPACITY};
pub use settings::EditorSettingsStore;

use std::fs;
use std::io;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::task;

use crate::core::errors::{Error, Result};

/// Reads a JSON document. A missing file is `Ok(None)`.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}

/// Serializes `value` as pretty JSON and writes it on the blocking pool.
async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value)?;
    let path = path.to_path_buf();
    task::spawn_blocking(move || write_bytes(&path, &json))
        .await
        .map_err(|e| Error::Io(io::Error::other(e)))?
}

/// Writes through a sibling temp file and a rename, so readers never
/// observe a half-written document.
fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn write_then_read_creates_parent_dirs() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nested").join("doc.json");
        write_json(&path, &vec![1, 2, 3]).await?;
        let back: Option<Vec<i32>> = read_json(&path)?;
        assert_eq!(back, Some(vec![1, 2, 3]));
        assert!(!dir.path().join("nested").join("doc.json.tmp").exists());
        Ok(())
    }

    #[tokio::test(flavor = "current_thread")]
    async fn write_yields_to_other_tasks() -> Result<()> {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let dir = TempDir::new()?;
        let path = dir.path().join("doc.json");
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        tokio::spawn(async move { flag.store(true, Ordering::SeqCst) });

        // On a single-threaded runtime the spawned task can only run if the
        // write awaits instead of blocking the thread.
        write_json(&path, &vec!["x"; 10_000]).await?;
        assert!(ran.load(Ordering::SeqCst));

        let back: Option<Vec<String>> = read_json(&path)?;
        assert_eq!(back.map(|v| v.len()), Some(10_000));
        Ok(())
    }

    #[test]
    fn missing_file_reads_as_none() -> Result<()> {
        let dir = TempDir::new()?;
        let back: Option<Vec<i32>> = read_json(&dir.path().join("absent.json"))?;
        assert_eq!(back, None);
        Ok(())
    }
}
