//! Recursive copy with metadata preservation.

use std::fs::{self, File};
use std::path::Path;

use treefm_core::FsError;

/// Copy a file or directory tree to `dest`, returning the bytes copied.
///
/// Directories are copied recursively, following symlinks. The first entry
/// that cannot be read or written aborts the copy; whatever was already
/// copied is left in place. Permissions are carried over by [`fs::copy`]
/// and modification times are restored where the platform allows.
pub fn copy_path(source: &Path, dest: &Path) -> Result<u64, FsError> {
    let metadata = fs::metadata(source).map_err(|e| FsError::io(source, e))?;

    if metadata.is_dir() {
        copy_dir_recursive(source, dest)
    } else {
        copy_file(source, dest)
    }
}

/// Copy a single file.
fn copy_file(source: &Path, dest: &Path) -> Result<u64, FsError> {
    let bytes = fs::copy(source, dest).map_err(|e| FsError::io(dest, e))?;
    preserve_modified(source, dest);
    Ok(bytes)
}

/// Recursively copy a directory.
fn copy_dir_recursive(source: &Path, dest: &Path) -> Result<u64, FsError> {
    fs::create_dir_all(dest).map_err(|e| FsError::io(dest, e))?;

    let mut total_bytes = 0u64;

    let entries = fs::read_dir(source).map_err(|e| FsError::io(source, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| FsError::io(source, e))?;
        let path = entry.path();
        let dest_path = dest.join(entry.file_name());

        let metadata = fs::metadata(&path).map_err(|e| FsError::io(&path, e))?;
        if metadata.is_dir() {
            total_bytes += copy_dir_recursive(&path, &dest_path)?;
        } else {
            total_bytes += copy_file(&path, &dest_path)?;
        }
    }

    // Directory metadata goes last so copying children does not bump mtime.
    if let Ok(metadata) = fs::metadata(source) {
        if let Err(e) = fs::set_permissions(dest, metadata.permissions()) {
            tracing::debug!(path = %dest.display(), error = %e, "could not copy permissions");
        }
    }
    preserve_modified(source, dest);

    Ok(total_bytes)
}

/// Best-effort copy of the modification time.
fn preserve_modified(source: &Path, dest: &Path) {
    let result = fs::metadata(source)
        .and_then(|m| m.modified())
        .and_then(|modified| File::open(dest)?.set_modified(modified));

    if let Err(e) = result {
        tracing::debug!(path = %dest.display(), error = %e, "could not preserve modification time");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn test_copy_file_preserves_mtime() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.txt");
        let dest = temp.path().join("b.txt");
        fs::write(&src, b"hello").unwrap();

        let old = SystemTime::now() - Duration::from_secs(86_400);
        File::options()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(old)
            .unwrap();

        let bytes = copy_path(&src, &dest).unwrap();
        assert_eq!(bytes, 5);
        assert_eq!(fs::read(&dest).unwrap(), b"hello");

        let copied = fs::metadata(&dest).unwrap().modified().unwrap();
        let original = fs::metadata(&src).unwrap().modified().unwrap();
        assert_eq!(copied, original);
    }

    #[test]
    fn test_copy_directory_tree() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("sub").join("deeper")).unwrap();
        fs::write(src.join("top.txt"), b"top").unwrap();
        fs::write(src.join("sub").join("mid.txt"), b"middle").unwrap();
        fs::write(src.join("sub").join("deeper").join(".hidden"), b"h").unwrap();

        let dest = temp.path().join("dest");
        let bytes = copy_path(&src, &dest).unwrap();

        assert_eq!(bytes, 3 + 6 + 1);
        assert_eq!(fs::read(dest.join("top.txt")).unwrap(), b"top");
        assert_eq!(fs::read(dest.join("sub").join("mid.txt")).unwrap(), b"middle");
        assert!(dest.join("sub").join("deeper").join(".hidden").exists());
        // Source untouched
        assert!(src.join("top.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_copy_keeps_partial_tree() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("sub")).unwrap();
        let unreadable = src.join("sub").join("secret.txt");
        fs::write(&unreadable, b"secret").unwrap();
        fs::set_permissions(&unreadable, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can read it anyway.
        if File::open(&unreadable).is_ok() {
            return;
        }

        let dest = temp.path().join("dest");
        let err = copy_path(&src, &dest).unwrap_err();
        fs::set_permissions(&unreadable, fs::Permissions::from_mode(0o644)).unwrap();

        assert!(err.is_permission_denied());
        // Directories created before the failure stay in place
        assert!(dest.join("sub").is_dir());
        assert!(!dest.join("sub").join("secret.txt").exists());
    }

    #[test]
    fn test_copy_missing_source() {
        let temp = TempDir::new().unwrap();
        let err = copy_path(&temp.path().join("nope"), &temp.path().join("dest")).unwrap_err();
        assert!(err.is_not_found());
        assert!(!temp.path().join("dest").exists());
    }
}
