//! Operation executor with one terminal result per request.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::oneshot;
use treefm_core::FsError;

use crate::conflict::{detect_conflict, ConflictKind};
use crate::copy::copy_path;
use crate::create::create_directory;
use crate::delete::remove_path;
use crate::move_op::{move_path, MoveOutcome};
use crate::operation::{OperationKind, OperationRequest, OperationResult};

/// Runs file operations off the calling thread.
///
/// Every [`submit`](Self::submit) spawns an independent task; the executor
/// does not serialize concurrent requests. Callers that need single-flight
/// behaviour must wait for the previous handle before submitting again.
#[derive(Debug, Clone, Default)]
pub struct OperationExecutor {
    next_id: Arc<AtomicU64>,
}

impl OperationExecutor {
    /// Create a new executor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit a request. Must be called from within a tokio runtime.
    ///
    /// Returns immediately; the result arrives through the handle.
    pub fn submit(&self, request: OperationRequest) -> OperationHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();

        tracing::info!(
            id,
            kind = %request.kind,
            source = %request.source.display(),
            destination = ?request.destination,
            "submitting operation"
        );

        let handle = OperationHandle {
            id,
            request: request.clone(),
            rx: Some(rx),
        };

        tokio::spawn(async move {
            let result =
                tokio::task::spawn_blocking(move || OperationResult::from(execute(&request)))
                    .await
                    .unwrap_or_else(|e| OperationResult::failure(format!("Task failed: {e}")));

            if result.success {
                tracing::info!(id, message = %result.message, "operation finished");
            } else {
                tracing::warn!(id, message = %result.message, "operation failed");
            }

            // The receiver may be gone if the caller stopped caring.
            let _ = tx.send(result);
        });

        handle
    }
}

/// Handle to a submitted operation.
///
/// Yields exactly one [`OperationResult`], either through [`wait`](Self::wait)
/// or through [`try_take`](Self::try_take).
#[derive(Debug)]
pub struct OperationHandle {
    id: u64,
    request: OperationRequest,
    rx: Option<oneshot::Receiver<OperationResult>>,
}

impl OperationHandle {
    /// Executor-assigned id, unique per executor.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The request this handle tracks.
    pub fn request(&self) -> &OperationRequest {
        &self.request
    }

    /// Whether the result has already been taken.
    pub fn is_taken(&self) -> bool {
        self.rx.is_none()
    }

    /// Wait for the result.
    pub async fn wait(mut self) -> OperationResult {
        match self.rx.take() {
            Some(rx) => rx.await.unwrap_or_else(|_| lost_result()),
            None => OperationResult::failure("Result already taken"),
        }
    }

    /// Take the result without blocking.
    ///
    /// Returns `None` while the operation is still running and on every call
    /// after the result has been handed out once.
    pub fn try_take(&mut self) -> Option<OperationResult> {
        let rx = self.rx.as_mut()?;
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => return None,
            Err(oneshot::error::TryRecvError::Closed) => lost_result(),
        };
        self.rx = None;
        Some(result)
    }
}

fn lost_result() -> OperationResult {
    OperationResult::failure("Operation ended without reporting a result")
}

/// Run a request to completion on the current thread.
///
/// Returns the success message, or the first error encountered. Nothing is
/// retried or rolled back.
pub fn execute(request: &OperationRequest) -> Result<String, FsError> {
    let name = request.source_name();

    match request.kind {
        OperationKind::Copy => {
            let dest = require_destination(request)?;
            prepare_destination(&request.source, dest, request.overwrite)?;
            copy_path(&request.source, dest)?;
            Ok(format!("Copied '{name}'"))
        }
        OperationKind::Move => {
            let dest = require_destination(request)?;
            prepare_destination(&request.source, dest, request.overwrite)?;
            match move_path(&request.source, dest)? {
                MoveOutcome::Renamed => Ok(format!("Moved '{name}'")),
                MoveOutcome::CopiedAndRemoved => Ok(format!("Moved '{name}' across devices")),
            }
        }
        OperationKind::Delete => {
            remove_path(&request.source)?;
            Ok(format!("Deleted '{name}'"))
        }
        OperationKind::CreateDirectory => {
            create_directory(&request.source)?;
            Ok(format!("Created folder '{name}'"))
        }
    }
}

fn require_destination(request: &OperationRequest) -> Result<&Path, FsError> {
    request
        .destination
        .as_deref()
        .ok_or_else(|| FsError::InvalidDestination {
            source_path: request.source.clone(),
            destination: PathBuf::new(),
            reason: format!("{} requires a destination", request.kind),
        })
}

/// Refuse impossible destinations and clear confirmed overwrites.
fn prepare_destination(source: &Path, dest: &Path, overwrite: bool) -> Result<(), FsError> {
    // Missing sources are reported before any destination is touched.
    std::fs::symlink_metadata(source).map_err(|e| FsError::io(source, e))?;

    let Some(conflict) = detect_conflict(source, dest) else {
        return Ok(());
    };

    match conflict.kind {
        ConflictKind::SameFile
        | ConflictKind::SourceIsAncestor
        | ConflictKind::DestinationIsAncestor => {
            Err(FsError::InvalidDestination {
                source_path: conflict.source,
                destination: conflict.destination,
                reason: conflict.kind.to_string(),
            })
        }
        ConflictKind::FileExists | ConflictKind::DirectoryExists if overwrite => {
            tracing::debug!(dest = %dest.display(), "removing destination before overwrite");
            remove_path(dest)
        }
        ConflictKind::FileExists | ConflictKind::DirectoryExists => Err(FsError::AlreadyExists {
            path: dest.to_path_buf(),
        }),
    }
}
