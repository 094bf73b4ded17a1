//! Path classification and metadata.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use serde::{Deserialize, Serialize};

/// Classification of a path at the time it was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    /// Anything that is not a directory (regular files, devices, sockets).
    File,
    /// Directory, or a symlink resolving to one.
    Directory,
    /// Nothing exists at the path (or a dangling symlink).
    Missing,
    /// The path could not be inspected.
    Denied,
}

impl std::fmt::Display for PathKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "File"),
            Self::Directory => write!(f, "Folder"),
            Self::Missing => write!(f, "Missing"),
            Self::Denied => write!(f, "Denied"),
        }
    }
}

/// Snapshot of a path's metadata.
///
/// Never cached: the filesystem is the source of truth, so callers resolve
/// again whenever they need fresh data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathInfo {
    /// The path as given, not normalized.
    pub path: PathBuf,
    /// What the path currently is.
    pub kind: PathKind,
    /// Whether the path itself is a symbolic link.
    pub is_symlink: bool,
    /// Size in bytes (0 for missing or denied paths).
    pub size: u64,
    /// Last modification time, when available.
    pub modified: Option<SystemTime>,
    /// Permission bits (`st_mode & 0o7777` on unix, 0o444/0o666 elsewhere).
    pub permissions: u32,
}

impl PathInfo {
    /// Stat a path and classify it.
    ///
    /// Errors are folded into [`PathKind::Missing`] or [`PathKind::Denied`].
    pub fn resolve(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let is_symlink = fs::symlink_metadata(path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false);

        match fs::metadata(path) {
            Ok(metadata) => Self {
                path: path.to_path_buf(),
                kind: if metadata.is_dir() {
                    PathKind::Directory
                } else {
                    PathKind::File
                },
                is_symlink,
                size: metadata.len(),
                modified: metadata.modified().ok(),
                permissions: permission_bits(&metadata),
            },
            Err(e) => Self::unresolved(path, is_symlink, &e),
        }
    }

    fn unresolved(path: &Path, is_symlink: bool, error: &io::Error) -> Self {
        let kind = match error.kind() {
            io::ErrorKind::PermissionDenied => PathKind::Denied,
            _ => PathKind::Missing,
        };
        Self {
            path: path.to_path_buf(),
            kind,
            is_symlink,
            size: 0,
            modified: None,
            permissions: 0,
        }
    }

    /// Final path component, or the whole path for roots.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }

    /// Check if the path is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == PathKind::Directory
    }

    /// Check if the path exists and could be inspected.
    pub fn exists(&self) -> bool {
        matches!(self.kind, PathKind::File | PathKind::Directory)
    }

    /// Render permissions the way `ls -l` does, e.g. `drwxr-xr-x`.
    pub fn mode_string(&self) -> String {
        let type_char = match (self.is_symlink, self.kind) {
            (true, _) => 'l',
            (false, PathKind::Directory) => 'd',
            (false, PathKind::File) => '-',
            (false, PathKind::Missing | PathKind::Denied) => '?',
        };

        let mut out = String::with_capacity(10);
        out.push(type_char);

        let bits = self.permissions;
        let special = [(0o4000, 's', 'S'), (0o2000, 's', 'S'), (0o1000, 't', 'T')];
        for (shift, (special_bit, with_exec, without_exec)) in [6u32, 3, 0].into_iter().zip(special)
        {
            let triplet = (bits >> shift) & 0o7;
            out.push(if triplet & 0o4 != 0 { 'r' } else { '-' });
            out.push(if triplet & 0o2 != 0 { 'w' } else { '-' });
            let exec = triplet & 0o1 != 0;
            out.push(match (bits & special_bit != 0, exec) {
                (true, true) => with_exec,
                (true, false) => without_exec,
                (false, true) => 'x',
                (false, false) => '-',
            });
        }

        out
    }
}

#[cfg(unix)]
fn permission_bits(metadata: &fs::Metadata) -> u32 {
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &fs::Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o666
    }
}
