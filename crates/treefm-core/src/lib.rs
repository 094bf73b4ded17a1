//! Core types and filesystem helpers for treefm.
//!
//! This crate provides the data model shared by the rest of the workspace:
//! path classification, directory listings for the file pane, mount-table
//! parsing, the error taxonomy, and persisted user settings.

mod error;
mod listing;
mod mounts;
mod path_info;
mod settings;

pub use error::FsError;
pub use listing::{list_directory, DirectoryListing, ListingEntry};
pub use mounts::{
    decode_mount_field, find_device, parse_mount_table, MountedDevice, DEFAULT_REMOVABLE_ROOTS,
};
pub use path_info::{PathInfo, PathKind};
pub use settings::{Theme, UserSettings, DEFAULT_FONT_SIZE, MIN_FONT_SIZE};
