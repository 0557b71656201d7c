//! Crash-safe file mutation helpers.
//!
//! All writes go through a sibling temp file that is renamed over the target,
//! so a reader never observes a half-written config. Backups are written with
//! `create_new` and never overwrite an earlier backup.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tempfile::NamedTempFile;

use crate::error::{CoreError, Result};

/// Timestamp layout appended to backup names: `<name>.bak-YYYYMMDDHHMMSS`.
const BACKUP_STAMP: &str = "%Y%m%d%H%M%S";

/// Upper bound on `-N` disambiguation suffixes for same-second backups.
const MAX_BACKUP_SUFFIX: u32 = 1000;

/// Replace `path` with `contents` via write-temp-then-rename.
///
/// The original file's permissions are carried over when they can be read.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp = stage(path, contents)?;
    if let Ok(meta) = fs::metadata(path) {
        if let Err(e) = tmp.as_file().set_permissions(meta.permissions()) {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "could not carry file permissions over, replacement keeps the temp file mode"
            );
        }
    }
    tmp.persist(path).map_err(|e| CoreError::io(path, e.error))?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "replaced file atomically");
    Ok(())
}

/// Create `path` with `contents`, failing if anything already exists there.
pub fn write_new(path: &Path, contents: &[u8]) -> Result<()> {
    if path.exists() {
        return Err(CoreError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    let tmp = stage(path, contents)?;
    tmp.persist_noclobber(path).map_err(|e| {
        if e.error.kind() == io::ErrorKind::AlreadyExists {
            CoreError::AlreadyExists {
                path: path.to_path_buf(),
            }
        } else {
            CoreError::io(path, e.error)
        }
    })?;
    Ok(())
}

/// Write `contents` (the pre-mutation bytes of `path`) to a timestamped
/// sibling backup and return the backup's path.
pub fn backup(path: &Path, contents: &[u8]) -> Result<PathBuf> {
    let base = backup_path_for(path, Local::now().naive_local());

    for attempt in 0..MAX_BACKUP_SUFFIX {
        let candidate = if attempt == 0 {
            base.clone()
        } else {
            append_to_name(&base, &format!("-{attempt}"))
        };

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate);
        match file {
            Ok(mut f) => {
                f.write_all(contents)
                    .and_then(|()| f.sync_all())
                    .map_err(|e| CoreError::io(&candidate, e))?;
                tracing::info!(backup = %candidate.display(), "wrote backup");
                return Ok(candidate);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(CoreError::io(&candidate, e)),
        }
    }

    Err(CoreError::AlreadyExists { path: base })
}

/// Backup location for `path` taken at `at`, before collision handling.
pub fn backup_path_for(path: &Path, at: NaiveDateTime) -> PathBuf {
    append_to_name(path, &format!(".bak-{}", at.format(BACKUP_STAMP)))
}

fn append_to_name(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

fn stage(path: &Path, contents: &[u8]) -> Result<NamedTempFile> {
    let dir = parent_dir(path);
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| CoreError::io(dir, e))?;
    tmp.write_all(contents)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| CoreError::io(tmp.path(), e))?;
    Ok(tmp)
}
