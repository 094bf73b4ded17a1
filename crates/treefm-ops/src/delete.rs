//! Recursive removal.

use std::fs;
use std::path::Path;

use treefm_core::FsError;

/// Remove a file, symlink or whole directory tree.
///
/// Symlinks are removed themselves, never followed.
pub fn remove_path(path: &Path) -> Result<(), FsError> {
    let metadata = fs::symlink_metadata(path).map_err(|e| FsError::io(path, e))?;

    if metadata.is_dir() {
        fs::remove_dir_all(path).map_err(|e| FsError::io(path, e))
    } else {
        fs::remove_file(path).map_err(|e| FsError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_remove_file_and_tree() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.txt");
        fs::write(&file, b"a").unwrap();
        remove_path(&file).unwrap();
        assert!(!file.exists());

        let dir = temp.path().join("tree");
        fs::create_dir_all(dir.join("x").join("y")).unwrap();
        fs::write(dir.join("x").join("y").join("z.txt"), b"z").unwrap();
        remove_path(&dir).unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn test_remove_missing() {
        let temp = TempDir::new().unwrap();
        assert!(remove_path(&temp.path().join("nope")).unwrap_err().is_not_found());
    }

    #[cfg(unix)]
    #[test]
    fn test_remove_symlink_keeps_target() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("target");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep.txt"), b"k").unwrap();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        remove_path(&link).unwrap();
        assert!(fs::symlink_metadata(&link).is_err());
        assert!(target.join("keep.txt").exists());
    }
}
