//! File operations engine for treefm.
//!
//! Each copy, move, delete or create-directory request runs as an isolated
//! unit of work on a background task and reports exactly one terminal
//! [`OperationResult`] through its [`OperationHandle`].
//!
//! Copies are best effort: when a recursive copy fails midway, entries that
//! were already copied stay in place. A cross-device move that copied its
//! data but could not remove the source reports failure and leaves the
//! destination copy behind.

mod conflict;
mod copy;
mod create;
mod delete;
mod executor;
mod move_op;
mod operation;

pub use conflict::{detect_conflict, Conflict, ConflictKind};
pub use copy::copy_path;
pub use create::{create_directory, validate_filename};
pub use delete::remove_path;
pub use executor::{execute, OperationExecutor, OperationHandle};
pub use move_op::{move_path, move_via_copy, MoveOutcome};
pub use operation::{OperationKind, OperationRequest, OperationResult};
