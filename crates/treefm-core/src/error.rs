//! Error types for filesystem operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by treefm filesystem operations.
///
/// The `Display` text of every variant is what ends up in front of the user,
/// so variants wrapping an [`std::io::Error`] always include its message.
#[derive(Debug, Error)]
pub enum FsError {
    /// Path does not exist.
    #[error("No such file or directory: {path}")]
    NotFound { path: PathBuf },

    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Destination already exists and overwrite was not confirmed.
    #[error("Destination already exists: {path}")]
    AlreadyExists { path: PathBuf },

    /// Path exists but is not a directory.
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Destination cannot receive the source (itself, or inside itself).
    #[error("Cannot place {source_path} at {destination}: {reason}")]
    InvalidDestination {
        source_path: PathBuf,
        destination: PathBuf,
        reason: String,
    },

    /// A cross-device move copied the data but could not finish.
    #[error("Move from {source_path} to {destination} failed after copying: {reason}")]
    CrossDeviceFallbackFailed {
        source_path: PathBuf,
        destination: PathBuf,
        reason: String,
    },

    /// Generic I/O error (disk full, device error, ...).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external command could not be started.
    #[error("Failed to launch '{command}': {source}")]
    LaunchFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A file or directory name was rejected.
    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Settings could not be read or written.
    #[error("Settings error: {message}")]
    Settings { message: String },
}

impl FsError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::AlreadyExists => Self::AlreadyExists { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create an invalid name error.
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error means the path is gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this error is a permission wall.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }
}
