//! Filesystem staging for build cycles.
//!
//! A cycle works on a scratch copy of the canonical source tree so a failed
//! rebuild never touches the tree the user edits. The copy leaves out build
//! output and version-control metadata. The finished binary is installed by
//! writing a temporary file next to the destination and renaming it into
//! place, so the destination is either the old binary or the new one.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::Builder;
use thiserror::Error;
use tracing::debug;

const WORKSPACE_TARGET: &str = "graft_build::workspace";

/// Top-level entries of the source tree that are never copied.
pub const SKIPPED_ENTRIES: &[&str] = &["target", ".git"];

/// Errors raised while staging the workspace or installing the binary.
#[derive(Debug, Clone, Error)]
pub enum WorkspaceError {
    /// The canonical source tree does not exist, or overlaps the workspace.
    #[error("source tree {} is unusable: {reason}", path.display())]
    MissingSource {
        /// Configured source directory.
        path: PathBuf,
        /// Why it cannot be used.
        reason: &'static str,
    },

    /// A file the cycle depends on is absent from the copied workspace.
    #[error("workspace is missing expected file {}", path.display())]
    MissingFile {
        /// Path that was checked.
        path: PathBuf,
    },

    /// A filesystem operation failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
}

impl WorkspaceError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source: Arc::new(source),
        }
    }
}

/// Replaces `workspace` with a fresh copy of `source` and checks that every
/// path in `required` exists afterwards.
///
/// # Errors
///
/// Returns [`WorkspaceError::MissingSource`] when `source` is not a
/// directory or either directory contains the other,
/// [`WorkspaceError::MissingFile`] when a required file is absent after the
/// copy, and [`WorkspaceError::Io`] for filesystem failures.
pub fn prepare_workspace(
    source: &Path,
    workspace: &Path,
    required: &[PathBuf],
) -> Result<(), WorkspaceError> {
    if !source.is_dir() {
        return Err(WorkspaceError::MissingSource {
            path: source.to_path_buf(),
            reason: "not a directory",
        });
    }
    if workspace.starts_with(source) || source.starts_with(workspace) {
        return Err(WorkspaceError::MissingSource {
            path: source.to_path_buf(),
            reason: "it overlaps the scratch workspace",
        });
    }

    remove_dir_if_present(workspace)?;
    copy_tree(source, workspace)?;

    if let Some(missing) = required.iter().find(|path| !path.is_file()) {
        return Err(WorkspaceError::MissingFile {
            path: missing.clone(),
        });
    }

    debug!(
        target: WORKSPACE_TARGET,
        source = %source.display(),
        workspace = %workspace.display(),
        "workspace prepared"
    );
    Ok(())
}

/// Recursively copies `source` into `dest`, leaving out [`SKIPPED_ENTRIES`]
/// at the top level. Symbolic links are copied as links on Unix and skipped
/// elsewhere.
///
/// # Errors
///
/// Returns [`WorkspaceError::Io`] naming the path that could not be read,
/// created or copied.
pub fn copy_tree(source: &Path, dest: &Path) -> Result<(), WorkspaceError> {
    copy_dir(source, dest, true)
}

fn copy_dir(source: &Path, dest: &Path, top_level: bool) -> Result<(), WorkspaceError> {
    fs::create_dir_all(dest).map_err(|err| WorkspaceError::io(dest, err))?;

    let entries = fs::read_dir(source).map_err(|err| WorkspaceError::io(source, err))?;
    for entry_result in entries {
        let entry = entry_result.map_err(|err| WorkspaceError::io(source, err))?;
        let name = entry.file_name();
        if top_level && SKIPPED_ENTRIES.iter().any(|skipped| name == *skipped) {
            continue;
        }

        let path = entry.path();
        let dest_path = dest.join(&name);
        let file_type = entry
            .file_type()
            .map_err(|err| WorkspaceError::io(&path, err))?;
        if file_type.is_symlink() {
            copy_symlink(&path, &dest_path)?;
        } else if file_type.is_dir() {
            copy_dir(&path, &dest_path, false)?;
        } else {
            fs::copy(&path, &dest_path).map_err(|err| WorkspaceError::io(&path, err))?;
        }
    }

    Ok(())
}

/// Links are recreated rather than followed, so a link pointing back up the
/// tree cannot make the copy recurse.
#[cfg(unix)]
fn copy_symlink(path: &Path, dest_path: &Path) -> Result<(), WorkspaceError> {
    let link_target = fs::read_link(path).map_err(|err| WorkspaceError::io(path, err))?;
    std::os::unix::fs::symlink(&link_target, dest_path)
        .map_err(|err| WorkspaceError::io(dest_path, err))
}

#[cfg(not(unix))]
fn copy_symlink(path: &Path, _dest_path: &Path) -> Result<(), WorkspaceError> {
    debug!(
        target: WORKSPACE_TARGET,
        path = %path.display(),
        "skipping symbolic link"
    );
    Ok(())
}

/// Deletes `dir` and everything below it; a missing directory is not an
/// error.
///
/// # Errors
///
/// Returns [`WorkspaceError::Io`] when the directory exists but cannot be
/// removed.
pub fn remove_dir_if_present(dir: &Path) -> Result<(), WorkspaceError> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(WorkspaceError::io(dir, err)),
    }
}

/// Atomically replaces `target` with a copy of `built`, keeping the built
/// file's permissions. The parent directory of `target` is created when
/// missing.
///
/// # Errors
///
/// Returns [`WorkspaceError::Io`] when the built binary cannot be read or
/// the destination cannot be written. The destination is unchanged on
/// failure.
pub fn install_binary(built: &Path, target: &Path) -> Result<(), WorkspaceError> {
    let directory = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&directory).map_err(|err| WorkspaceError::io(&directory, err))?;

    let permissions = fs::metadata(built)
        .map_err(|err| WorkspaceError::io(built, err))?
        .permissions();
    let mut source = File::open(built).map_err(|err| WorkspaceError::io(built, err))?;

    let mut staged = Builder::new()
        .prefix(".graft-install")
        .tempfile_in(&directory)
        .map_err(|err| WorkspaceError::io(&directory, err))?;
    io::copy(&mut source, staged.as_file_mut()).map_err(|err| WorkspaceError::io(target, err))?;
    staged
        .as_file()
        .set_permissions(permissions)
        .map_err(|err| WorkspaceError::io(target, err))?;
    staged
        .as_file()
        .sync_all()
        .map_err(|err| WorkspaceError::io(target, err))?;
    staged
        .persist(target)
        .map_err(|err| WorkspaceError::io(target, err.error))?;

    debug!(
        target: WORKSPACE_TARGET,
        built = %built.display(),
        installed = %target.display(),
        "binary installed"
    );
    Ok(())
}
