//! Destination conflict detection.
//!
//! The executor never asks the user anything. Callers run
//! [`detect_conflict`] before submitting, confirm an overwrite if needed, and
//! then submit with `overwrite` set.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A conflict between a source and its intended destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// The source path being operated on.
    pub source: PathBuf,
    /// The destination path where the conflict exists.
    pub destination: PathBuf,
    /// The kind of conflict.
    pub kind: ConflictKind,
}

impl Conflict {
    /// Create a new conflict.
    pub fn new(source: PathBuf, destination: PathBuf, kind: ConflictKind) -> Self {
        Self {
            source,
            destination,
            kind,
        }
    }

    /// Whether confirming an overwrite resolves this conflict.
    pub fn can_overwrite(&self) -> bool {
        matches!(
            self.kind,
            ConflictKind::FileExists | ConflictKind::DirectoryExists
        )
    }

    /// Prompt text for the overwrite confirmation.
    pub fn prompt(&self) -> String {
        let name = self
            .destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match self.kind {
            ConflictKind::FileExists | ConflictKind::DirectoryExists => {
                format!("'{name}' already exists. Replace it?")
            }
            _ => self.kind.to_string(),
        }
    }
}

/// The kind of conflict encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictKind {
    /// A file already exists at the destination.
    FileExists,
    /// A directory already exists at the destination.
    DirectoryExists,
    /// Cannot move/copy a directory into itself.
    SourceIsAncestor,
    /// Source and destination are the same file.
    SameFile,
    /// The destination is a directory containing the source.
    DestinationIsAncestor,
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileExists => write!(f, "File already exists"),
            Self::DirectoryExists => write!(f, "Directory already exists"),
            Self::SourceIsAncestor => write!(f, "Cannot copy/move a directory into itself"),
            Self::SameFile => write!(f, "Source and destination are the same file"),
            Self::DestinationIsAncestor => {
                write!(f, "Cannot replace a directory that contains the source")
            }
        }
    }
}

/// Check whether placing `source` at `destination` conflicts with anything.
pub fn detect_conflict(source: &Path, destination: &Path) -> Option<Conflict> {
    let source_abs = normalize(source);
    let dest_abs = normalize(destination);

    let kind = if source_abs == dest_abs {
        Some(ConflictKind::SameFile)
    } else if source.is_dir() && dest_abs.starts_with(&source_abs) {
        Some(ConflictKind::SourceIsAncestor)
    } else if source_abs.starts_with(&dest_abs) {
        // Replacing the destination would delete the source with it
        Some(ConflictKind::DestinationIsAncestor)
    } else {
        match fs::symlink_metadata(destination) {
            Ok(meta) if meta.is_dir() => Some(ConflictKind::DirectoryExists),
            Ok(_) => Some(ConflictKind::FileExists),
            Err(_) => None,
        }
    };

    kind.map(|kind| Conflict::new(source.to_path_buf(), destination.to_path_buf(), kind))
}

/// Canonicalize what exists, keeping the remaining components as given.
fn normalize(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            normalize(parent).join(name)
        }
        _ => path.to_path_buf(),
    }
}
