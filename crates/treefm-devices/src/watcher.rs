//! Background mount-table polling loop.

use std::path::Path;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use treefm_core::{parse_mount_table, FsError, MountedDevice};

use crate::config::WatcherConfig;

/// Channel buffer size for device snapshots.
pub const SNAPSHOT_CHANNEL_SIZE: usize = 16;

/// The removable devices seen on one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSnapshot {
    /// Tick number, starting at 0 and increasing by one per emission.
    pub tick: u64,
    /// Every removable mount present on this tick, in mount-table order.
    pub devices: Vec<MountedDevice>,
}

/// Polls the mount table until stopped.
///
/// The loop checks for cancellation between ticks. [`stop`](Self::stop)
/// cancels and joins it, so nothing is emitted once it returns. Dropping the
/// watcher cancels the loop without waiting for it.
#[derive(Debug)]
pub struct DeviceWatcher {
    tx: broadcast::Sender<DeviceSnapshot>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl DeviceWatcher {
    /// Start the loop on the current tokio runtime.
    ///
    /// The returned receiver is subscribed before the first tick, so it sees
    /// every snapshot.
    pub fn spawn(config: WatcherConfig) -> (Self, broadcast::Receiver<DeviceSnapshot>) {
        let (tx, rx) = broadcast::channel(SNAPSHOT_CHANNEL_SIZE);
        let cancel = CancellationToken::new();

        tracing::debug!(
            interval_ms = config.interval.as_millis() as u64,
            mount_table = %config.mount_table.display(),
            "starting device watcher"
        );

        let task = tokio::spawn(watch_loop(config, tx.clone(), cancel.clone()));

        (
            Self {
                tx,
                cancel,
                task: Some(task),
            },
            rx,
        )
    }

    /// Subscribe another consumer. It receives snapshots from the next tick.
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceSnapshot> {
        self.tx.subscribe()
    }

    /// Whether the loop is still running.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Signal the loop to stop and wait for it to exit.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "device watcher task ended abnormally");
            }
        }
        tracing::debug!("device watcher stopped");
    }
}

impl Drop for DeviceWatcher {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn watch_loop(
    config: WatcherConfig,
    tx: broadcast::Sender<DeviceSnapshot>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(config.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut tick = 0u64;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let devices = poll_devices(&config).await;

        if cancel.is_cancelled() {
            break;
        }

        // No receivers is fine; the next subscriber picks up later ticks.
        let _ = tx.send(DeviceSnapshot { tick, devices });
        tick += 1;
    }
}

/// Read one tick's devices. Any failure degrades to an empty set.
async fn poll_devices(config: &WatcherConfig) -> Vec<MountedDevice> {
    let mount_table = config.mount_table.clone();
    let roots = config.removable_roots.clone();

    match tokio::task::spawn_blocking(move || read_mount_table(&mount_table, &roots)).await {
        Ok(Ok(devices)) => devices,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "could not read mount table");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!(error = %e, "mount table task failed");
            Vec::new()
        }
    }
}

/// Read and filter a mount table file.
pub fn read_mount_table(path: &Path, roots: &[String]) -> Result<Vec<MountedDevice>, FsError> {
    let table = std::fs::read_to_string(path).map_err(|e| FsError::io(path, e))?;
    Ok(parse_mount_table(&table, roots))
}
