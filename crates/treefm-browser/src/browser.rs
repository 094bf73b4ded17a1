//! Browser controller owning the interactive state.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::broadcast;
use treefm_core::{
    list_directory, DirectoryListing, FsError, MountedDevice, PathInfo, PathKind, Theme,
    UserSettings,
};
use treefm_devices::{DeviceSnapshot, DeviceWatcher, WatcherConfig};
use treefm_ops::{
    detect_conflict, validate_filename, Conflict, OperationExecutor, OperationHandle,
    OperationKind, OperationRequest, OperationResult,
};

use crate::clipboard::{Clipboard, ClipboardOp};
use crate::history::NavigationHistory;
use crate::opener;
use crate::tree::DirectoryTreeCache;

/// Errors from browser actions that are refused before reaching the executor.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// An operation is still running.
    #[error("Another operation is still in progress")]
    Busy,

    /// Paste with nothing on the clipboard.
    #[error("Clipboard is empty")]
    ClipboardEmpty,

    #[error(transparent)]
    Fs(#[from] FsError),
}

/// Something that happened in the background since the last poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserEvent {
    /// The pending operation reported its result.
    OperationFinished {
        request: OperationRequest,
        result: OperationResult,
    },
    /// The removable device set differs from the one last reported.
    DevicesChanged(Vec<MountedDevice>),
}

/// What [`Browser::paste`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteOutcome {
    /// The copy or move was submitted with this operation id.
    Submitted(u64),
    /// The destination is taken; nothing was submitted.
    NeedsConfirmation(Conflict),
}

/// Controller for one browser window.
///
/// All state lives here and is mutated only through `&mut self`. Background
/// work (file operations, device polling) reports back through
/// [`poll`](Self::poll), which never blocks. At most one file operation is in
/// flight at a time.
#[derive(Debug)]
pub struct Browser {
    current: PathBuf,
    history: NavigationHistory,
    tree: DirectoryTreeCache,
    clipboard: Clipboard,
    executor: OperationExecutor,
    pending: Option<OperationHandle>,
    devices: Vec<MountedDevice>,
    device_rx: Option<broadcast::Receiver<DeviceSnapshot>>,
    watcher: Option<DeviceWatcher>,
    settings: UserSettings,
    settings_path: Option<PathBuf>,
}

impl Browser {
    /// Open a browser at `start` with the default tree roots and the user's
    /// saved settings.
    pub fn new(start: impl Into<PathBuf>) -> Result<Self, BrowserError> {
        let settings_path = UserSettings::config_path();
        let settings = settings_path
            .as_deref()
            .map(UserSettings::load_from)
            .unwrap_or_default();
        Self::with_parts(start, DirectoryTreeCache::new(), settings, settings_path)
    }

    /// Open a browser from explicit parts. Settings are persisted to
    /// `settings_path` when given.
    pub fn with_parts(
        start: impl Into<PathBuf>,
        tree: DirectoryTreeCache,
        settings: UserSettings,
        settings_path: Option<PathBuf>,
    ) -> Result<Self, BrowserError> {
        let start = start.into();
        require_directory(&start)?;

        Ok(Self {
            history: NavigationHistory::new(start.clone()),
            current: start,
            tree,
            clipboard: Clipboard::new(),
            executor: OperationExecutor::new(),
            pending: None,
            devices: Vec::new(),
            device_rx: None,
            watcher: None,
            settings,
            settings_path,
        })
    }

    /// Start polling for removable devices. Must be called within a tokio
    /// runtime. A watcher that is already running is kept.
    pub fn watch_devices(&mut self, config: WatcherConfig) {
        if self.watcher.is_some() {
            return;
        }
        let (watcher, rx) = DeviceWatcher::spawn(config);
        self.watcher = Some(watcher);
        self.device_rx = Some(rx);
    }

    pub fn current(&self) -> &Path {
        &self.current
    }

    pub fn history(&self) -> &NavigationHistory {
        &self.history
    }

    pub fn tree(&self) -> &DirectoryTreeCache {
        &self.tree
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// Latest removable device set.
    pub fn devices(&self) -> &[MountedDevice] {
        &self.devices
    }

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    /// Whether an operation is in flight.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    // ---------------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------------

    /// Show `path` and record it in the history.
    pub fn navigate(&mut self, path: impl Into<PathBuf>) -> Result<(), BrowserError> {
        let path = path.into();
        require_directory(&path)?;
        tracing::debug!(path = %path.display(), "navigating");

        self.history.visit(path.clone());
        self.current = path;
        Ok(())
    }

    /// Go back one step. Returns the new current path, or `None` at the start.
    pub fn back(&mut self) -> Option<&Path> {
        let path = self.history.back()?.to_path_buf();
        self.current = path;
        Some(&self.current)
    }

    /// Go forward one step. Returns the new current path, or `None` at the end.
    pub fn forward(&mut self) -> Option<&Path> {
        let path = self.history.forward()?.to_path_buf();
        self.current = path;
        Some(&self.current)
    }

    /// List the current directory for the file pane.
    pub fn list_current(&self) -> Result<DirectoryListing, FsError> {
        list_directory(&self.current)
    }

    /// Expand a tree node. See [`DirectoryTreeCache::expand`].
    pub fn expand(&mut self, path: &Path) -> Option<&[PathBuf]> {
        self.tree.expand(path)
    }

    /// Drop cached tree listings and re-expand the roots.
    pub fn refresh(&mut self) {
        self.tree.refresh();
    }

    // ---------------------------------------------------------------------
    // Clipboard and file operations
    // ---------------------------------------------------------------------

    pub fn copy(&mut self, path: impl Into<PathBuf>) {
        self.clipboard.set(path, ClipboardOp::Copy);
    }

    pub fn cut(&mut self, path: impl Into<PathBuf>) {
        self.clipboard.set(path, ClipboardOp::Cut);
    }

    /// Paste the clipboard into the current directory.
    ///
    /// Unless `overwrite` is set, an occupied destination is reported back
    /// for confirmation instead of being submitted.
    pub fn paste(&mut self, overwrite: bool) -> Result<PasteOutcome, BrowserError> {
        let entry = self.clipboard.get().ok_or(BrowserError::ClipboardEmpty)?;
        let name = entry
            .path
            .file_name()
            .ok_or_else(|| FsError::InvalidDestination {
                source_path: entry.path.clone(),
                destination: self.current.clone(),
                reason: "Source has no file name".to_string(),
            })?;
        let destination = self.current.join(name);

        if !overwrite {
            if let Some(conflict) = detect_conflict(&entry.path, &destination) {
                return Ok(PasteOutcome::NeedsConfirmation(conflict));
            }
        }

        let request = match entry.operation {
            ClipboardOp::Cut => OperationRequest::move_to(&entry.path, destination),
            ClipboardOp::Copy => OperationRequest::copy(&entry.path, destination),
        }
        .with_overwrite(overwrite);

        self.submit(request).map(PasteOutcome::Submitted)
    }

    pub fn delete(&mut self, path: impl Into<PathBuf>) -> Result<u64, BrowserError> {
        self.submit(OperationRequest::delete(path))
    }

    /// Rename `path` within its parent directory.
    ///
    /// Returns `None` without submitting when the name is unchanged.
    pub fn rename(&mut self, path: &Path, new_name: &str) -> Result<Option<u64>, BrowserError> {
        validate_filename(new_name)?;
        let parent = path.parent().unwrap_or(Path::new("/"));
        let destination = parent.join(new_name);
        if destination == path {
            return Ok(None);
        }
        self.submit(OperationRequest::move_to(path, destination)).map(Some)
    }

    /// Create a folder named `name` in the current directory.
    pub fn create_folder(&mut self, name: &str) -> Result<u64, BrowserError> {
        validate_filename(name)?;
        self.submit(OperationRequest::create_directory(self.current.join(name)))
    }

    /// Hand a request to the executor. Refused while another is pending.
    pub fn submit(&mut self, request: OperationRequest) -> Result<u64, BrowserError> {
        if self.pending.is_some() {
            return Err(BrowserError::Busy);
        }
        let handle = self.executor.submit(request);
        let id = handle.id();
        self.pending = Some(handle);
        Ok(id)
    }

    // ---------------------------------------------------------------------
    // Background results
    // ---------------------------------------------------------------------

    /// Collect finished work without blocking.
    pub fn poll(&mut self) -> Vec<BrowserEvent> {
        let mut events = Vec::new();

        if let Some(handle) = self.pending.as_mut() {
            if let Some(result) = handle.try_take() {
                let request = handle.request().clone();
                self.pending = None;
                events.push(self.finish_operation(request, result));
            }
        }

        if let Some(devices) = self.drain_snapshots() {
            if devices != self.devices {
                tracing::debug!(count = devices.len(), "device set changed");
                self.devices = devices.clone();
                events.push(BrowserEvent::DevicesChanged(devices));
            }
        }

        events
    }

    /// Wait for the pending operation, if any.
    pub async fn wait_operation(&mut self) -> Option<BrowserEvent> {
        let handle = self.pending.take()?;
        let request = handle.request().clone();
        let result = handle.wait().await;
        Some(self.finish_operation(request, result))
    }

    fn finish_operation(
        &mut self,
        request: OperationRequest,
        result: OperationResult,
    ) -> BrowserEvent {
        if result.success
            && request.kind == OperationKind::Move
            && self.clipboard.clear_if_matches(&request.source)
        {
            tracing::debug!(source = %request.source.display(), "cleared clipboard after move");
        }
        BrowserEvent::OperationFinished { request, result }
    }

    /// Latest queued snapshot's devices, if any arrived.
    fn drain_snapshots(&mut self) -> Option<Vec<MountedDevice>> {
        let rx = self.device_rx.as_mut()?;
        let mut latest = None;

        loop {
            match rx.try_recv() {
                Ok(snapshot) => latest = Some(snapshot.devices),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "device snapshots lagged");
                }
                Err(broadcast::error::TryRecvError::Empty)
                | Err(broadcast::error::TryRecvError::Closed) => break,
            }
        }

        latest
    }

    // ---------------------------------------------------------------------
    // Launching
    // ---------------------------------------------------------------------

    /// Activate an item: folders are entered, anything else goes to the
    /// system handler.
    pub fn open(&mut self, path: &Path) -> Result<(), BrowserError> {
        if PathInfo::resolve(path).is_dir() {
            return self.navigate(path);
        }
        opener::open_default(path).map_err(Into::into)
    }

    /// Open `path` with an explicit command.
    pub fn open_with(&self, command: &str, path: &Path) -> Result<(), BrowserError> {
        opener::launch(command, path).map_err(Into::into)
    }

    // ---------------------------------------------------------------------
    // Settings
    // ---------------------------------------------------------------------

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), BrowserError> {
        self.settings.theme = theme;
        self.persist_settings()
    }

    pub fn zoom_in(&mut self) -> Result<(), BrowserError> {
        self.settings.zoom_in();
        self.persist_settings()
    }

    /// Shrink the font. Returns false, without saving, at the minimum size.
    pub fn zoom_out(&mut self) -> Result<bool, BrowserError> {
        if !self.settings.zoom_out() {
            return Ok(false);
        }
        self.persist_settings()?;
        Ok(true)
    }

    fn persist_settings(&self) -> Result<(), BrowserError> {
        if let Some(path) = &self.settings_path {
            self.settings.save_to(path)?;
        }
        Ok(())
    }

    /// Stop the device watcher and wait for any pending operation.
    ///
    /// Returns the pending operation's event if one was still running.
    pub async fn shutdown(mut self) -> Option<BrowserEvent> {
        if let Some(watcher) = self.watcher.take() {
            watcher.stop().await;
        }
        self.device_rx = None;
        self.wait_operation().await
    }
}

fn require_directory(path: &Path) -> Result<(), FsError> {
    let info = PathInfo::resolve(path);
    match info.kind {
        PathKind::Directory => Ok(()),
        PathKind::File => Err(FsError::NotADirectory {
            path: path.to_path_buf(),
        }),
        PathKind::Missing => Err(FsError::NotFound {
            path: path.to_path_buf(),
        }),
        PathKind::Denied => Err(FsError::PermissionDenied {
            path: path.to_path_buf(),
        }),
    }
}
