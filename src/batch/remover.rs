//! Forced recursive deletion.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Result, SweeperError};

/// Delete `path` and everything under it.
///
/// Write protection on the root and on every entry below it is lifted first
/// so the removal cannot stop half way. A path that does not exist is not an
/// error.
pub fn force_delete(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "Nothing to delete");
            return Ok(());
        }
        Err(e) => return Err(SweeperError::io(path, e)),
    };

    if !metadata.is_dir() {
        if !metadata.file_type().is_symlink() {
            make_removable(path, &metadata);
        }
        return fs::remove_file(path).map_err(|e| SweeperError::io(path, e));
    }

    clear_protection(path);
    fs::remove_dir_all(path).map_err(|e| SweeperError::io(path, e))?;

    tracing::debug!(path = %path.display(), "Deleted");
    Ok(())
}

/// Lift protection throughout the tree rooted at `root`.
///
/// Each directory is unlocked before it is listed, so a directory that was
/// unreadable or not searchable still has its contents fixed. Links are not
/// followed. Failures are left for `remove_dir_all` to report.
fn clear_protection(root: &Path) {
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        match fs::symlink_metadata(&dir) {
            Ok(metadata) => make_removable(&dir, &metadata),
            Err(e) => {
                tracing::debug!("No metadata for {}: {}", dir.display(), e);
                continue;
            }
        }

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Cannot list {}: {}", dir.display(), e);
                continue;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!("Cannot inspect entry under {}: {}", dir.display(), e);
                    continue;
                }
            };

            match entry.metadata() {
                Ok(metadata) if metadata.file_type().is_symlink() => {}
                Ok(metadata) if metadata.is_dir() => pending.push(entry.path()),
                Ok(metadata) => make_removable(&entry.path(), &metadata),
                Err(e) => tracing::debug!("No metadata for {}: {}", entry.path().display(), e),
            }
        }
    }
}

#[cfg(unix)]
fn make_removable(path: &Path, metadata: &fs::Metadata) {
    use std::os::unix::fs::PermissionsExt;

    let mode = metadata.permissions().mode();
    let wanted = if metadata.is_dir() {
        mode | 0o700
    } else {
        mode | 0o200
    };

    if wanted != mode {
        if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(wanted)) {
            tracing::debug!("Cannot unlock {}: {}", path.display(), e);
        }
    }
}

#[cfg(not(unix))]
fn make_removable(path: &Path, metadata: &fs::Metadata) {
    let mut permissions = metadata.permissions();
    if permissions.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
        if let Err(e) = fs::set_permissions(path, permissions) {
            tracing::debug!("Cannot unlock {}: {}", path.display(), e);
        }
    }
}
