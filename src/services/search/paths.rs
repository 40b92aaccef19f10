use std::io;
use std::path::{Component, Path, PathBuf};

/// Resolves `.` and `..` segments without touching the filesystem, so
/// symlinks are left as they are.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Makes `path` absolute against the process working directory, then
/// normalizes it.
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(normalize(path))
    } else {
        Ok(normalize(&std::env::current_dir()?.join(path)))
    }
}

/// Turns a path reported by the search tool into the absolute key results
/// are grouped under.
pub fn resolve_reported(root: &Path, reported: &str) -> PathBuf {
    let reported = Path::new(reported);
    if reported.is_absolute() {
        normalize(reported)
    } else {
        normalize(&root.join(reported))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn normalize_drops_dot_and_resolves_parent() {
        assert_eq!(
            normalize(Path::new("/tmp/proj/./src/../a.txt")),
            PathBuf::from("/tmp/proj/a.txt")
        );
        assert_eq!(normalize(Path::new("/../etc")), PathBuf::from("/etc"));
        assert_eq!(normalize(Path::new("../a/./b")), PathBuf::from("../a/b"));
    }

    #[cfg(unix)]
    #[test]
    fn reported_paths_normalize_regardless_of_root_spelling() {
        let expected = PathBuf::from("/tmp/proj/a.txt");
        for root in ["/tmp/proj", "/tmp/proj/", "/tmp/proj/.", "/tmp/./proj//", "/tmp/x/../proj"] {
            assert_eq!(resolve_reported(Path::new(root), "a.txt"), expected, "root {root}");
            assert_eq!(resolve_reported(Path::new(root), "./a.txt"), expected, "root {root}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn absolute_reported_paths_ignore_root() {
        assert_eq!(
            resolve_reported(Path::new("/tmp/proj"), "/srv/data/./b.txt"),
            PathBuf::from("/srv/data/b.txt")
        );
    }

    #[test]
    fn absolutize_relative_uses_current_dir() -> io::Result<()> {
        let cwd = std::env::current_dir()?;
        assert_eq!(absolutize(Path::new("."))?, normalize(&cwd));
        assert_eq!(absolutize(Path::new("sub/.."))?, normalize(&cwd));
        Ok(())
    }
}
