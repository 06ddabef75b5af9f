//! Path-traversal guard shared by every filesystem-touching endpoint.

use std::path::Path;

/// Whether `path` resolves inside one of the allowed root directories.
///
/// Both sides are canonicalized, so `..` segments and symlinks cannot escape
/// a root. A path that fails to canonicalize (typically: does not exist) is
/// never allowed; callers report that as not-found rather than forbidden to
/// avoid confirming which paths exist.
pub fn is_path_allowed(path: &Path, roots: &[impl AsRef<Path>]) -> bool {
    let Ok(real) = path.canonicalize() else {
        return false;
    };

    roots.iter().any(|root| {
        root.as_ref()
            .canonicalize()
            .map(|real_root| real.starts_with(&real_root))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn file_inside_root_is_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("movie.mp4");
        std::fs::write(&file, b"x").unwrap();
        assert!(is_path_allowed(&file, &[dir.path()]));
    }

    #[test]
    fn file_outside_root_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let file = other.path().join("movie.mp4");
        std::fs::write(&file, b"x").unwrap();
        assert!(!is_path_allowed(&file, &[root.path()]));
    }

    #[test]
    fn dotdot_cannot_escape() {
        let root = tempfile::tempdir().unwrap();
        let outside = root.path().parent().unwrap().join("escape.mp4");
        std::fs::write(&outside, b"x").unwrap();
        let sneaky = root.path().join("..").join("escape.mp4");
        assert!(!is_path_allowed(&sneaky, &[root.path()]));
        std::fs::remove_file(&outside).ok();
    }

    #[test]
    fn missing_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("missing.mp4");
        assert!(!is_path_allowed(&file, &[dir.path()]));
    }

    #[test]
    fn no_roots_rejects_everything() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("movie.mp4");
        std::fs::write(&file, b"x").unwrap();
        let roots: Vec<PathBuf> = Vec::new();
        assert!(!is_path_allowed(&file, &roots));
    }
}
