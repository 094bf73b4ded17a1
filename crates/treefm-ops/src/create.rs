//! Directory creation and name validation.

use std::fs;
use std::path::Path;

use treefm_core::FsError;

/// Validate a file or directory name typed by the user.
pub fn validate_filename(name: &str) -> Result<(), FsError> {
    let reject =
        |reason: &str| -> Result<(), FsError> { Err(FsError::invalid_name(name, reason)) };

    if name.is_empty() {
        return reject("Name cannot be empty");
    }

    if name.len() > 255 {
        return reject("Name is too long (max 255 characters)");
    }

    if name == "." || name == ".." {
        return reject("Name is reserved");
    }

    for c in ['/', '\0'] {
        if name.contains(c) {
            return Err(FsError::invalid_name(
                name,
                format!("Name cannot contain '{}'", c.escape_default()),
            ));
        }
    }

    #[cfg(windows)]
    for c in ['\\', ':', '*', '?', '"', '<', '>', '|'] {
        if name.contains(c) {
            return Err(FsError::invalid_name(name, format!("Name cannot contain '{c}'")));
        }
    }

    Ok(())
}

/// Create a directory, including missing parents.
///
/// Fails if anything already exists at `path`.
pub fn create_directory(path: &Path) -> Result<(), FsError> {
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        validate_filename(name)?;
    }

    if fs::symlink_metadata(path).is_ok() {
        return Err(FsError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }

    fs::create_dir_all(path).map_err(|e| FsError::io(path, e))
}
