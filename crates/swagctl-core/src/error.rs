// ── Core error types ──
//
// Every failure the engine can surface. Structural and validation errors are
// raised before any byte is written; I/O errors always carry the path they
// concern so callers never have to guess which file failed.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Unified error type for the engine crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Caller input ─────────────────────────────────────────────────
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    // ── Document shape ───────────────────────────────────────────────
    #[error("unexpected config structure: {message}")]
    Structure { message: String },

    #[error("unclosed block starting at line {line}")]
    UnclosedBlock {
        /// 1-based line number of the block's opening line.
        line: usize,
    },

    // ── Registry / generator ─────────────────────────────────────────
    #[error("file already exists: {}", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("site not found: {name}")]
    SiteNotFound { name: String },

    #[error("config directory does not exist: {}", path.display())]
    DirectoryMissing { path: PathBuf },

    // ── Filesystem ───────────────────────────────────────────────────
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CoreError {
    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn structure(message: impl Into<String>) -> Self {
        Self::Structure {
            message: message.into(),
        }
    }

    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T, E = CoreError> = std::result::Result<T, E>;
