//! Directory listing for the file pane.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::FsError;

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    /// File name within the listed directory.
    pub name: String,
    /// Full path of the entry.
    pub path: PathBuf,
    /// Whether the entry is (or links to) a directory.
    pub is_dir: bool,
}

/// Contents of a directory, folders first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryListing {
    /// The directory that was listed.
    pub path: PathBuf,
    /// Subdirectories, sorted by name.
    pub folders: Vec<ListingEntry>,
    /// Everything else, sorted by name.
    pub files: Vec<ListingEntry>,
}

impl DirectoryListing {
    /// Number of subdirectories.
    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    /// Number of non-directory entries.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// All entries in display order.
    pub fn entries(&self) -> impl Iterator<Item = &ListingEntry> {
        self.folders.iter().chain(self.files.iter())
    }

    /// Status-line summary, e.g. "3 folders, 12 files".
    pub fn summary(&self) -> String {
        format!("{} folders, {} files", self.folder_count(), self.file_count())
    }
}

/// List every immediate entry of `path`, hidden entries included.
///
/// Entries whose type cannot be determined (e.g. a dangling symlink) are
/// listed as files.
pub fn list_directory(path: impl AsRef<Path>) -> Result<DirectoryListing, FsError> {
    let path = path.as_ref();
    let entries = fs::read_dir(path).map_err(|e| FsError::io(path, e))?;

    let mut folders: Vec<(OsString, ListingEntry)> = Vec::new();
    let mut files: Vec<(OsString, ListingEntry)> = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| FsError::io(path, e))?;
        let file_name = entry.file_name();
        let entry_path = entry.path();
        let is_dir = fs::metadata(&entry_path)
            .map(|m| m.is_dir())
            .unwrap_or(false);

        let item = ListingEntry {
            name: file_name.to_string_lossy().into_owned(),
            path: entry_path,
            is_dir,
        };

        if is_dir {
            folders.push((file_name, item));
        } else {
            files.push((file_name, item));
        }
    }

    folders.sort_by(|a, b| a.0.cmp(&b.0));
    files.sort_by(|a, b| a.0.cmp(&b.0));

    tracing::debug!(
        path = %path.display(),
        folders = folders.len(),
        files = files.len(),
        "listed directory"
    );

    Ok(DirectoryListing {
        path: path.to_path_buf(),
        folders: folders.into_iter().map(|(_, e)| e).collect(),
        files: files.into_iter().map(|(_, e)| e).collect(),
    })
}
