//! Device watcher configuration.

use std::path::PathBuf;
use std::time::Duration;

use derive_builder::Builder;
use treefm_core::DEFAULT_REMOVABLE_ROOTS;

/// How often the mount table is re-read.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Mount table read on Linux.
pub const DEFAULT_MOUNT_TABLE: &str = "/proc/mounts";

/// Configuration for the device watcher loop.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct WatcherConfig {
    /// Delay between ticks.
    #[builder(default = "DEFAULT_POLL_INTERVAL")]
    pub interval: Duration,

    /// Line-oriented mount table to parse each tick.
    #[builder(default = "PathBuf::from(DEFAULT_MOUNT_TABLE)")]
    pub mount_table: PathBuf,

    /// Mount point prefixes treated as removable media.
    #[builder(default = "default_roots()")]
    pub removable_roots: Vec<String>,
}

fn default_roots() -> Vec<String> {
    DEFAULT_REMOVABLE_ROOTS.iter().map(|r| r.to_string()).collect()
}

impl WatcherConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(interval) = self.interval {
            if interval.is_zero() {
                return Err("Poll interval must be greater than zero".to_string());
            }
        }
        Ok(())
    }
}

impl WatcherConfig {
    /// Create a new watcher config builder.
    pub fn builder() -> WatcherConfigBuilder {
        WatcherConfigBuilder::default()
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            mount_table: PathBuf::from(DEFAULT_MOUNT_TABLE),
            removable_roots: default_roots(),
        }
    }
}
