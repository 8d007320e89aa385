//! Zip a project's folders to an archive directory, then remove the project.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use chrono::Local;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::remover::force_delete;
use crate::config::ArchiveConfig;
use crate::error::{Result, SweeperError};

/// Top-level project folders that go into the archive.
pub const ARCHIVED_FOLDERS: [&str; 5] = [
    ".git",
    "Assets",
    "ProjectSettings",
    "Packages",
    "UserSettings",
];

/// What a successful archive produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Final location of the archive.
    pub archive_path: PathBuf,
    /// Number of files stored.
    pub entries: usize,
    /// Size of the archive on disk.
    pub bytes: u64,
}

/// Builds project archives and moves them to a destination folder.
#[derive(Debug, Clone)]
pub struct Archiver {
    destination: Option<PathBuf>,
    default_destination: PathBuf,
}

impl Archiver {
    /// `destination` is used when set and present at archive time; otherwise
    /// archives go to `default_destination`, which is created on first use.
    pub fn new(destination: Option<PathBuf>, default_destination: PathBuf) -> Self {
        Self {
            destination,
            default_destination,
        }
    }

    pub fn from_config(config: &ArchiveConfig) -> Self {
        let destination = if config.destination.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(&config.destination))
        };
        Self::new(destination, config.default_destination())
    }

    /// Folder the next archive will be moved to, creating the default if needed.
    pub fn resolve_destination(&self) -> Result<PathBuf> {
        if let Some(dest) = &self.destination {
            if dest.is_dir() {
                return Ok(dest.clone());
            }
            tracing::warn!(
                "Archive destination {} does not exist, using {}",
                dest.display(),
                self.default_destination.display()
            );
        }

        if !self.default_destination.is_dir() {
            fs::create_dir_all(&self.default_destination)
                .map_err(|e| SweeperError::io(&self.default_destination, e))?;
            tracing::info!(path = %self.default_destination.display(), "Created archive folder");
        }
        Ok(self.default_destination.clone())
    }

    /// Archive `project` and delete it.
    ///
    /// The zip is built next to the project, moved into the destination
    /// (replacing any archive of the same name) and only then is the project
    /// removed. If building or moving fails the project is left untouched.
    pub fn archive(&self, project: &Path) -> Result<ArchiveReport> {
        let project = normalize(project);
        if !project.is_dir() {
            return Err(SweeperError::PathNotFound(project));
        }
        let name = project
            .file_name()
            .ok_or_else(|| {
                SweeperError::InvalidPath(format!("{} has no folder name", project.display()))
            })?
            .to_string_lossy()
            .into_owned();
        let parent = project.parent().ok_or_else(|| {
            SweeperError::InvalidPath(format!("{} has no parent folder", project.display()))
        })?;

        let archive_name = format!("{name}.zip");
        let staged = parent.join(&archive_name);

        tracing::debug!(project = %project.display(), archive = %staged.display(), "Building archive");
        let entries = match build_archive(&project, &staged) {
            Ok(n) => n,
            Err(e) => {
                // A half-written zip is useless; drop it and keep the project.
                let _ = fs::remove_file(&staged);
                return Err(e);
            }
        };

        let destination = self.resolve_destination()?;
        let archive_path = destination.join(&archive_name);
        move_archive(&staged, &archive_path)?;

        let bytes = fs::metadata(&archive_path)
            .map(|m| m.len())
            .map_err(|e| SweeperError::io(&archive_path, e))?;

        force_delete(&project)?;

        tracing::info!(
            project = %project.display(),
            archive = %archive_path.display(),
            entries,
            "Archived project"
        );

        Ok(ArchiveReport {
            archive_path,
            entries,
            bytes,
        })
    }
}

/// Drop trailing separators and `.` components.
fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}

/// Write every file under the archived folders of `project` into `target`.
///
/// Entry names are relative to `project` and always use `/`.
fn build_archive(project: &Path, target: &Path) -> Result<usize> {
    let file = File::create(target).map_err(|e| SweeperError::io(target, e))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(true);

    let mut entries = 0;
    for folder in ARCHIVED_FOLDERS {
        let root = project.join(folder);
        if !root.is_dir() {
            continue;
        }

        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&root).to_path_buf();
                SweeperError::io(path, io::Error::from(e))
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let metadata = entry
                .metadata()
                .map_err(|e| SweeperError::io(entry.path(), io::Error::from(e)))?;
            let name = entry_name(project, entry.path())?;
            zip.start_file(name, entry_options(options, entry.path(), &metadata))
                .map_err(|source| SweeperError::Archive {
                    path: target.to_path_buf(),
                    source,
                })?;

            let mut source =
                File::open(entry.path()).map_err(|e| SweeperError::io(entry.path(), e))?;
            io::copy(&mut source, &mut zip).map_err(|e| SweeperError::io(entry.path(), e))?;
            entries += 1;
        }
    }

    let mut writer = zip.finish().map_err(|source| SweeperError::Archive {
        path: target.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|e| SweeperError::io(target, e))?;

    Ok(entries)
}

/// Carry the file's permission bits and modification time into its entry.
///
/// Zip timestamps are local time with two-second precision from 1980 to
/// 2107; a time outside that range keeps the zip default.
fn entry_options(
    base: SimpleFileOptions,
    path: &Path,
    metadata: &fs::Metadata,
) -> SimpleFileOptions {
    let mut options = base;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        options = options.unix_permissions(metadata.permissions().mode() & 0o7777);
    }

    match metadata.modified() {
        Ok(modified) => {
            let local = chrono::DateTime::<Local>::from(modified).naive_local();
            match DateTime::try_from(local) {
                Ok(time) => options = options.last_modified_time(time),
                Err(_) => tracing::debug!("{} has an mtime zip cannot store", path.display()),
            }
        }
        Err(e) => tracing::debug!("No mtime for {}: {}", path.display(), e),
    }

    options
}

/// Forward-slash path of `file` relative to `project`.
fn entry_name(project: &Path, file: &Path) -> Result<String> {
    let relative = file.strip_prefix(project).map_err(|_| {
        SweeperError::InvalidPath(format!(
            "{} is outside {}",
            file.display(),
            project.display()
        ))
    })?;

    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    Ok(parts.join("/"))
}

/// Move `staged` to `target`, replacing whatever is there.
///
/// Falls back to copy-then-delete when a rename is not possible, e.g. across
/// volumes.
fn move_archive(staged: &Path, target: &Path) -> Result<()> {
    if staged == target {
        return Ok(());
    }

    if target.exists() {
        fs::remove_file(target).map_err(|e| SweeperError::io(target, e))?;
    }

    if let Err(e) = fs::rename(staged, target) {
        tracing::debug!("Rename to {} failed ({}), copying instead", target.display(), e);
        fs::copy(staged, target).map_err(|e| SweeperError::io(target, e))?;
        fs::remove_file(staged).map_err(|e| SweeperError::io(staged, e))?;
    }

    Ok(())
}
