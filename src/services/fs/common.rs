use std::path::{Path, PathBuf};

use crate::services::search::paths::absolutize;

/// Development folders commonly kept under the home directory.
const DEV_DIRS: &[&str] = &["Projects", "Code", "Source", "Dev", "src", "source/repos"];

/// Good starting points for picking a search directory: well-known user
/// folders that exist, plus the filesystem root.
pub fn common_directories() -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = [dirs::home_dir(), dirs::document_dir(), dirs::desktop_dir()]
        .into_iter()
        .flatten()
        .collect();

    if let Some(home) = dirs::home_dir() {
        found.extend(DEV_DIRS.iter().map(|dir| home.join(dir)));
    }
    found.extend(filesystem_roots());

    found.retain(|dir| dir.is_dir());
    found.sort();
    found.dedup();
    found
}

#[cfg(windows)]
fn filesystem_roots() -> Vec<PathBuf> {
    ('A'..='Z')
        .map(|letter| PathBuf::from(format!("{letter}:\\")))
        .collect()
}

#[cfg(not(windows))]
fn filesystem_roots() -> Vec<PathBuf> {
    vec![PathBuf::from("/")]
}

pub fn is_valid_directory(path: &str) -> bool {
    !path.trim().is_empty() && Path::new(path).is_dir()
}

/// Parent of `path` after making it absolute; `None` at the root.
pub fn parent_directory(path: &str) -> Option<PathBuf> {
    if path.trim().is_empty() {
        return None;
    }
    absolutize(Path::new(path))
        .ok()?
        .parent()
        .map(Path::to_path_buf)
}
