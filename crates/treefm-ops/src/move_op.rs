//! Move with cross-device fallback.

use std::fs;
use std::io;
use std::path::Path;

use treefm_core::FsError;

use crate::copy::copy_path;
use crate::delete::remove_path;

/// How a move was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Atomic rename on the same device.
    Renamed,
    /// Copied to the destination, then the source was removed.
    CopiedAndRemoved,
}

/// Move `source` to `dest`.
///
/// Tries an atomic rename first and falls back to [`move_via_copy`] only
/// when the two paths live on different devices.
pub fn move_path(source: &Path, dest: &Path) -> Result<MoveOutcome, FsError> {
    match fs::rename(source, dest) {
        Ok(()) => Ok(MoveOutcome::Renamed),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!(
                source = %source.display(),
                dest = %dest.display(),
                "rename crosses devices, copying instead"
            );
            move_via_copy(source, dest)
        }
        Err(e) => Err(FsError::io(source, e)),
    }
}

/// Copy `source` to `dest`, then remove `source`.
///
/// If the copy fails the error is returned as is. If the copy succeeds but
/// removing the source fails, the destination copy is kept and a
/// [`FsError::CrossDeviceFallbackFailed`] is returned.
pub fn move_via_copy(source: &Path, dest: &Path) -> Result<MoveOutcome, FsError> {
    copy_path(source, dest)?;

    remove_path(source).map_err(|e| FsError::CrossDeviceFallbackFailed {
        source_path: source.to_path_buf(),
        destination: dest.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(MoveOutcome::CopiedAndRemoved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_move_same_device_renames() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.txt");
        let dest = temp.path().join("b.txt");
        fs::write(&src, b"content").unwrap();

        assert_eq!(move_path(&src, &dest).unwrap(), MoveOutcome::Renamed);
        assert!(!src.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"content");
    }

    #[test]
    fn test_move_via_copy_directory() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("inner")).unwrap();
        fs::write(src.join("inner").join("f.txt"), b"f").unwrap();
        let dest = temp.path().join("dest");

        assert_eq!(
            move_via_copy(&src, &dest).unwrap(),
            MoveOutcome::CopiedAndRemoved
        );
        assert!(!src.exists());
        assert_eq!(fs::read(dest.join("inner").join("f.txt")).unwrap(), b"f");
    }

    #[test]
    fn test_move_missing_source() {
        let temp = TempDir::new().unwrap();
        let err = move_path(&temp.path().join("nope"), &temp.path().join("x")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[cfg(unix)]
    #[test]
    fn test_move_via_copy_keeps_destination_when_source_removal_fails() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let locked = temp.path().join("locked");
        fs::create_dir(&locked).unwrap();
        let src = locked.join("a.txt");
        fs::write(&src, b"payload").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // Privileged users ignore directory permissions.
        if fs::write(locked.join("write-check"), b"").is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let dest = temp.path().join("a.txt");
        let err = move_via_copy(&src, &dest).unwrap_err();

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(err, FsError::CrossDeviceFallbackFailed { .. }));
        assert!(src.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"payload");
    }
}
