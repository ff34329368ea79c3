// src/watch/path_utils.rs

//! Path normalisation for change notifications.

use std::path::Path;

/// Convert `path` into a string relative to `root`, with forward slashes.
///
/// - First try a direct `strip_prefix(root)`.
/// - If that fails (symlinked temp dirs, `/private/var` on macOS), retry
///   with both sides canonicalized. This only works while the path still
///   exists, so deleted files rely on the fast path.
///
/// Returns `None` for paths outside `root` and for `root` itself.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = match path.strip_prefix(root) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => {
            let root_canon = root.canonicalize().ok()?;
            let path_canon = path.canonicalize().ok()?;
            path_canon.strip_prefix(&root_canon).ok()?.to_path_buf()
        }
    };

    let s = rel.to_string_lossy().replace('\\', "/");
    if s.is_empty() { None } else { Some(s) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_root_prefix() {
        let root = Path::new("/work/repo");
        assert_eq!(
            relative_str(root, Path::new("/work/repo/src/a/b.go")).as_deref(),
            Some("src/a/b.go")
        );
    }

    #[test]
    fn rejects_root_and_outside_paths() {
        let root = Path::new("/work/repo");
        assert_eq!(relative_str(root, Path::new("/work/repo")), None);
        assert_eq!(relative_str(root, Path::new("/elsewhere/file.go")), None);
    }
}
