//! Back/forward navigation history.

use std::path::{Path, PathBuf};

/// Linear visited-folder history with a cursor.
///
/// Visiting a path while the cursor is not at the end discards the forward
/// branch, as web browsers do. Whenever the history is non-empty the cursor
/// points at the currently displayed path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationHistory {
    entries: Vec<PathBuf>,
    cursor: usize,
}

impl NavigationHistory {
    /// Start a history at `initial`.
    pub fn new(initial: impl Into<PathBuf>) -> Self {
        Self {
            entries: vec![initial.into()],
            cursor: 0,
        }
    }

    /// Record a visit to `path`.
    ///
    /// Re-visiting the current tail is a no-op apart from discarding any
    /// forward entries.
    pub fn visit(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();

        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }

        if self.entries.last() != Some(&path) {
            self.entries.push(path);
        }

        self.cursor = self.entries.len() - 1;
    }

    /// Step back, returning the path now current.
    pub fn back(&mut self) -> Option<&Path> {
        if !self.can_back() {
            return None;
        }
        self.cursor -= 1;
        self.current()
    }

    /// Step forward, returning the path now current.
    pub fn forward(&mut self) -> Option<&Path> {
        if !self.can_forward() {
            return None;
        }
        self.cursor += 1;
        self.current()
    }

    /// Whether [`back`](Self::back) would move.
    pub fn can_back(&self) -> bool {
        self.cursor > 0
    }

    /// Whether [`forward`](Self::forward) would move.
    pub fn can_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// The currently displayed path.
    pub fn current(&self) -> Option<&Path> {
        self.entries.get(self.cursor).map(PathBuf::as_path)
    }

    /// All recorded entries, oldest first.
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Index of the current entry.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been visited yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
