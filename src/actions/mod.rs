//! File actions on scan results.
//!
//! Small wrappers around the destructive or outward-facing things a user
//! does with a duplicate report: remove a redundant copy (to the system
//! trash by default, permanently on request), move a file aside with
//! conflict-free naming, or open its containing directory in the platform
//! file manager.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

/// Errors from file actions.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The file was already gone when the action ran.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// The system trash rejected the file.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// The platform file manager could not be launched.
    #[error("could not open location {path}: {message}")]
    OpenFailed { path: PathBuf, message: String },

    /// Any other filesystem failure.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Delete one file, returning its size in bytes.
///
/// The default is the system trash so the removal is recoverable;
/// `permanent` unlinks outright and cannot be undone. A file that
/// disappeared between scan and action reports [`ActionError::NotFound`]
/// rather than succeeding silently.
pub fn delete_file(path: &Path, permanent: bool) -> Result<u64, ActionError> {
    let metadata = std::fs::metadata(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => ActionError::NotFound(path.to_path_buf()),
        _ => ActionError::Io {
            path: path.to_path_buf(),
            source: err,
        },
    })?;
    let size = metadata.len();

    if permanent {
        std::fs::remove_file(path).map_err(|source| ActionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Permanently deleted {} ({size} bytes)", path.display());
    } else {
        trash::delete(path).map_err(|err| ActionError::TrashFailed {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        log::info!("Moved to trash: {} ({size} bytes)", path.display());
    }

    Ok(size)
}

/// Move `source` into `dest_dir`, creating the directory as needed.
///
/// A name collision in the destination gets a `name_1.ext`, `name_2.ext`,
/// … suffix instead of overwriting. Falls back to copy-and-remove when a
/// plain rename fails (typically a cross-device move). Returns the final
/// destination path.
pub fn move_file(source: &Path, dest_dir: &Path) -> Result<PathBuf, ActionError> {
    if !source.exists() {
        return Err(ActionError::NotFound(source.to_path_buf()));
    }
    std::fs::create_dir_all(dest_dir).map_err(|source| ActionError::Io {
        path: dest_dir.to_path_buf(),
        source,
    })?;

    let destination = conflict_free_destination(source, dest_dir);

    if std::fs::rename(source, &destination).is_err() {
        std::fs::copy(source, &destination).map_err(|err| ActionError::Io {
            path: destination.clone(),
            source: err,
        })?;
        std::fs::remove_file(source).map_err(|err| ActionError::Io {
            path: source.to_path_buf(),
            source: err,
        })?;
    }

    log::info!("Moved {} to {}", source.display(), destination.display());
    Ok(destination)
}

/// Open the directory containing `path` in the platform file manager.
pub fn open_location(path: &Path) -> Result<(), ActionError> {
    let dir = path
        .parent()
        .filter(|dir| dir.is_dir())
        .ok_or_else(|| ActionError::NotFound(path.to_path_buf()))?;

    platform_opener(dir)
        .spawn()
        .map_err(|err| ActionError::OpenFailed {
            path: dir.to_path_buf(),
            message: err.to_string(),
        })?;
    Ok(())
}

fn platform_opener(dir: &Path) -> Command {
    let mut command = if cfg!(target_os = "windows") {
        Command::new("explorer")
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        Command::new("xdg-open")
    };
    command.arg(dir);
    command
}

/// First free name for `source` inside `dest_dir`.
fn conflict_free_destination(source: &Path, dest_dir: &Path) -> PathBuf {
    let name = source.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    let mut destination = dest_dir.join(&name);

    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1;
    while destination.exists() {
        destination = dest_dir.join(format!("{stem}_{counter}{ext}"));
        counter += 1;
    }
    destination
}
