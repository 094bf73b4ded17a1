//! Single-slot clipboard for copy/cut and paste.

use std::path::{Path, PathBuf};

use treefm_ops::OperationKind;

/// What a paste should do with the clipboard path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardOp {
    Copy,
    Cut,
}

impl ClipboardOp {
    /// The operation a paste submits.
    pub fn operation_kind(self) -> OperationKind {
        match self {
            Self::Copy => OperationKind::Copy,
            Self::Cut => OperationKind::Move,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardEntry {
    pub path: PathBuf,
    pub operation: ClipboardOp,
}

/// Holds at most one path. Setting a new entry replaces the old one.
///
/// An entry is cleared once a move of its path succeeds, whether that move
/// was its own paste or a rename. Pasting a copy leaves the entry in place.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    entry: Option<ClipboardEntry>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents.
    pub fn set(&mut self, path: impl Into<PathBuf>, operation: ClipboardOp) {
        self.entry = Some(ClipboardEntry {
            path: path.into(),
            operation,
        });
    }

    pub fn get(&self) -> Option<&ClipboardEntry> {
        self.entry.as_ref()
    }

    /// Clear only if the clipboard still holds `path`.
    ///
    /// Returns whether anything was cleared. The check keeps a move that
    /// finishes late from wiping an entry the user set in the meantime.
    pub fn clear_if_matches(&mut self, path: &Path) -> bool {
        let matches = self.entry.as_ref().is_some_and(|e| e.path == path);
        if matches {
            self.entry = None;
        }
        matches
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces() {
        let mut clipboard = Clipboard::new();
        clipboard.set("/a", ClipboardOp::Copy);
        clipboard.set("/b", ClipboardOp::Cut);

        let entry = clipboard.get().unwrap();
        assert_eq!(entry.path, PathBuf::from("/b"));
        assert_eq!(entry.operation, ClipboardOp::Cut);
        assert_eq!(entry.operation.operation_kind(), OperationKind::Move);
    }

    #[test]
    fn test_clear_if_matches_same_path() {
        let mut clipboard = Clipboard::new();
        clipboard.set("/a", ClipboardOp::Cut);

        assert!(!clipboard.clear_if_matches(Path::new("/other")));
        assert!(!clipboard.is_empty());

        assert!(clipboard.clear_if_matches(Path::new("/a")));
        assert!(clipboard.is_empty());
        assert!(!clipboard.clear_if_matches(Path::new("/a")));
    }

    #[test]
    fn test_clear_if_matches_ignores_operation() {
        let mut clipboard = Clipboard::new();
        clipboard.set("/a/b.txt", ClipboardOp::Copy);
        assert!(!clipboard.clear_if_matches(Path::new("/a/c.txt")));
        assert!(clipboard.clear_if_matches(Path::new("/a/b.txt")));
        assert!(clipboard.is_empty());
    }
}
