//! Interactive browsing state for treefm.
//!
//! Everything here is owned by the interactive context: the lazily expanded
//! directory tree, navigation history, the clipboard, and the [`Browser`]
//! controller tying them to the background operation executor and device
//! watcher.
//!
//! # Overview
//!
//! - [`DirectoryTreeCache`] - directory-only tree, one level per expansion
//! - [`NavigationHistory`] - browser-style back/forward over visited folders
//! - [`Clipboard`] - single copy/cut slot parameterizing the next paste
//! - [`Browser`] - controller; drain background results with [`Browser::poll`]

mod browser;
mod clipboard;
mod history;
mod opener;
mod tree;

pub use browser::{Browser, BrowserError, BrowserEvent, PasteOutcome};
pub use clipboard::{Clipboard, ClipboardEntry, ClipboardOp};
pub use history::NavigationHistory;
pub use opener::{launch, open_default, KNOWN_APPLICATIONS};
pub use tree::{DirectoryTreeCache, Expansion, TreeNode, TreeRow};
