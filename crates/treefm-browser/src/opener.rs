//! Launching external applications.

use std::path::Path;
use std::process::{Command, Stdio};

use treefm_core::FsError;

/// Applications offered in the "Open with" menu, as `(label, command)`.
pub const KNOWN_APPLICATIONS: &[(&str, &str)] = &[
    ("Text Editor", "gedit"),
    ("Terminal", "gnome-terminal"),
    ("File Manager", "nautilus"),
];

/// Open a path with the system default application.
pub fn open_default(path: &Path) -> Result<(), FsError> {
    tracing::debug!(path = %path.display(), "opening with system default");
    open::that(path).map_err(|source| FsError::LaunchFailed {
        command: "system default".to_string(),
        source,
    })
}

/// Run `command` with `path` appended as the last argument.
///
/// The command is split on whitespace, so `"code --new-window"` works. The
/// child is detached from our stdio and not waited on.
pub fn launch(command: &str, path: &Path) -> Result<(), FsError> {
    let mut parts = command.split_whitespace();
    let Some(program) = parts.next() else {
        return Err(FsError::LaunchFailed {
            command: command.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        });
    };

    tracing::debug!(command, path = %path.display(), "launching application");

    Command::new(program)
        .args(parts)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(drop)
        .map_err(|source| FsError::LaunchFailed {
            command: command.to_string(),
            source,
        })
}
