//! Removable device watcher for treefm.
//!
//! A single background loop re-reads the mount table on a fixed interval and
//! broadcasts the full set of removable mounts every tick, changed or not.
//! Consumers diff against whatever they rendered last.

mod config;
mod watcher;

pub use config::{WatcherConfig, WatcherConfigBuilder, DEFAULT_MOUNT_TABLE, DEFAULT_POLL_INTERVAL};
pub use watcher::{read_mount_table, DeviceSnapshot, DeviceWatcher, SNAPSHOT_CHANNEL_SIZE};
