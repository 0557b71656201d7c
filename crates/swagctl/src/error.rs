//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use swagctl_config::ConfigError;
use swagctl_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Input ────────────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(swagctl::validation))]
    Validation { field: String, reason: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(swagctl::not_found),
        help("Run: swagctl {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{} already exists", path.display())]
    #[diagnostic(
        code(swagctl::conflict),
        help("Pick another name, or remove the existing file first.")
    )]
    Conflict { path: PathBuf },

    #[error("Directory not found: {}", path.display())]
    #[diagnostic(
        code(swagctl::missing_dir),
        help(
            "Check that the SWAG directory is right.\n\
             Pass --swag-dir (-d) or run: swagctl config set swag-dir <path>"
        )
    )]
    MissingDirectory { path: PathBuf },

    #[error("Default site config not found")]
    #[diagnostic(
        code(swagctl::no_default_site),
        help("Checked: {checked}\nPass --swag-dir (-d) if SWAG lives elsewhere.")
    )]
    NoDefaultSite { checked: String },

    // ── Config file shape ────────────────────────────────────────────
    #[error("Unexpected nginx config structure: {message}")]
    #[diagnostic(
        code(swagctl::structure),
        help("The file was left untouched. Restore it from a .bak-* copy if it was edited by hand.")
    )]
    Structure { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(swagctl::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(swagctl::config))]
    Config(ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error("I/O error on {}: {source}", path.display())]
    #[diagnostic(code(swagctl::io))]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(swagctl::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } | Self::MissingDirectory { .. } | Self::NoDefaultSite { .. } => {
                exit_code::NOT_FOUND
            }
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { field, reason } => Self::Validation { field, reason },

            CoreError::Structure { message } => Self::Structure { message },

            CoreError::UnclosedBlock { line } => Self::Structure {
                message: format!("unclosed block starting at line {line}"),
            },

            CoreError::AlreadyExists { path } => Self::Conflict { path },

            CoreError::SiteNotFound { name } => Self::NotFound {
                resource_type: "site".into(),
                identifier: name,
                list_command: "list".into(),
            },

            CoreError::DirectoryMissing { path } => Self::MissingDirectory { path },

            CoreError::Io { path, source } => Self::FileIo { path, source },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownKey { key } => Self::Validation {
                field: "config key".into(),
                reason: format!(
                    "unknown key '{key}' (expected one of: {})",
                    swagctl_config::keys().join(", ")
                ),
            },
            ConfigError::NginxDirMissing { path } => Self::MissingDirectory { path },
            ConfigError::DefaultSiteMissing { primary, fallback } => Self::NoDefaultSite {
                checked: format!("{}, {}", primary.display(), fallback.display()),
            },
            ConfigError::Write(core) => core.into(),
            other => Self::Config(other),
        }
    }
}
