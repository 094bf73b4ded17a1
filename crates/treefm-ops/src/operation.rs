//! File operation types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use treefm_core::FsError;

/// The kind of operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    Copy,
    Move,
    Delete,
    CreateDirectory,
}

impl OperationKind {
    /// Whether requests of this kind need a destination path.
    pub fn needs_destination(&self) -> bool {
        matches!(self, Self::Copy | Self::Move)
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Copy => write!(f, "Copy"),
            Self::Move => write!(f, "Move"),
            Self::Delete => write!(f, "Delete"),
            Self::CreateDirectory => write!(f, "Create directory"),
        }
    }
}

/// A single file operation to be executed.
///
/// `destination` is the full target path (not its parent directory). It is
/// required for copy and move and ignored otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRequest {
    pub kind: OperationKind,
    pub source: PathBuf,
    pub destination: Option<PathBuf>,
    /// Replace an existing destination. Callers set this only after the
    /// user confirmed the overwrite.
    pub overwrite: bool,
}

impl OperationRequest {
    /// Create a copy request.
    pub fn copy(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            kind: OperationKind::Copy,
            source: source.into(),
            destination: Some(destination.into()),
            overwrite: false,
        }
    }

    /// Create a move request.
    pub fn move_to(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            kind: OperationKind::Move,
            source: source.into(),
            destination: Some(destination.into()),
            overwrite: false,
        }
    }

    /// Create a delete request.
    pub fn delete(target: impl Into<PathBuf>) -> Self {
        Self {
            kind: OperationKind::Delete,
            source: target.into(),
            destination: None,
            overwrite: false,
        }
    }

    /// Create a directory creation request.
    pub fn create_directory(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: OperationKind::CreateDirectory,
            source: path.into(),
            destination: None,
            overwrite: false,
        }
    }

    /// Allow replacing an existing destination.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Display name of the source, used in result messages.
    pub fn source_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.to_string_lossy().into_owned())
    }
}

/// Terminal outcome of a request. Exactly one is produced per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    pub success: bool,
    pub message: String,
}

impl OperationResult {
    /// A successful outcome.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// A failed outcome with a human-readable message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl From<Result<String, FsError>> for OperationResult {
    fn from(outcome: Result<String, FsError>) -> Self {
        match outcome {
            Ok(message) => Self::success(message),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

impl std::fmt::Display for OperationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let copy = OperationRequest::copy("/a/b.txt", "/c/b.txt");
        assert_eq!(copy.kind, OperationKind::Copy);
        assert_eq!(copy.destination, Some(PathBuf::from("/c/b.txt")));
        assert!(!copy.overwrite);
        assert!(copy.kind.needs_destination());

        let delete = OperationRequest::delete("/a/b.txt");
        assert!(delete.destination.is_none());
        assert!(!delete.kind.needs_destination());
        assert_eq!(delete.source_name(), "b.txt");

        assert!(OperationRequest::move_to("/a", "/b").with_overwrite(true).overwrite);
    }

    #[test]
    fn test_result_from_outcome() {
        let ok: OperationResult = Ok::<_, FsError>("Deleted 'x'".to_string()).into();
        assert!(ok.success);

        let err: OperationResult = Err(FsError::NotFound {
            path: PathBuf::from("/gone"),
        })
        .into();
        assert!(!err.success);
        assert!(err.message.contains("/gone"));
    }
}
