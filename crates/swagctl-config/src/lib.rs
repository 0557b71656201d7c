//! Persisted configuration for swagctl.
//!
//! A single TOML file naming the SWAG installation directory, the SWAG
//! container and its Docker network, plus the nginx directory layout derived
//! from the installation directory.

use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use swagctl_core::CoreError;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown config key '{key}' (expected one of: {})", keys().join(", "))]
    UnknownKey { key: String },

    #[error("nginx config directory not found: {}", path.display())]
    NginxDirMissing { path: PathBuf },

    #[error(
        "default site config not found (checked: {}, {})",
        primary.display(),
        fallback.display()
    )]
    DefaultSiteMissing { primary: PathBuf, fallback: PathBuf },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("failed to write config: {0}")]
    Write(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config struct ───────────────────────────────────────────────────

const DEFAULT_SWAG_DIR: &str = "~/apps-docker/swag";
const DEFAULT_SWAG_CONTAINER: &str = "swag";
const DEFAULT_NETWORK: &str = "swag";

/// Environment variable prefix, e.g. `SWAGCTL_SWAG_DIR`.
pub const ENV_PREFIX: &str = "SWAGCTL_";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Base SWAG directory; `~/` expands to the home directory.
    pub swag_dir: String,

    /// Name of the SWAG container.
    pub swag_container: String,

    /// Docker network shared by SWAG and the proxied containers.
    pub network: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            swag_dir: DEFAULT_SWAG_DIR.into(),
            swag_container: DEFAULT_SWAG_CONTAINER.into(),
            network: DEFAULT_NETWORK.into(),
        }
    }
}

impl Config {
    /// Trim every value and put defaults back in place of empty ones.
    #[must_use]
    pub fn normalized(self) -> Self {
        fn or_default(value: &str, default: &str) -> String {
            match value.trim() {
                "" => default.to_owned(),
                v => v.to_owned(),
            }
        }
        Self {
            swag_dir: or_default(&self.swag_dir, DEFAULT_SWAG_DIR),
            swag_container: or_default(&self.swag_container, DEFAULT_SWAG_CONTAINER),
            network: or_default(&self.network, DEFAULT_NETWORK),
        }
    }

    // ── Directory layout ────────────────────────────────────────────

    /// The SWAG base directory with `~` expanded.
    pub fn swag_path(&self) -> PathBuf {
        expand_home(self.swag_dir.trim())
    }

    pub fn nginx_dir(&self) -> PathBuf {
        self.swag_path().join("config").join("nginx")
    }

    /// Where `*.subdomain.conf` / `*.subfolder.conf` files live.
    pub fn proxy_confs_dir(&self) -> PathBuf {
        self.nginx_dir().join("proxy-confs")
    }

    pub fn site_confs_dir(&self) -> PathBuf {
        self.nginx_dir().join("site-confs")
    }

    /// The default site file, preferring `site-confs/default` and falling
    /// back to the older `site-conf/default` layout.
    pub fn default_site_conf_path(&self) -> Result<PathBuf, ConfigError> {
        let nginx = self.nginx_dir();
        let primary = nginx.join("site-confs").join("default");
        if primary.exists() {
            return Ok(primary);
        }

        let fallback = nginx.join("site-conf").join("default");
        if fallback.exists() {
            tracing::debug!(path = %fallback.display(), "using legacy site-conf layout");
            return Ok(fallback);
        }

        if !nginx.is_dir() {
            return Err(ConfigError::NginxDirMissing { path: nginx });
        }
        Err(ConfigError::DefaultSiteMissing { primary, fallback })
    }

    // ── Key/value access ────────────────────────────────────────────

    pub fn get(&self, key: &str) -> Result<&str, ConfigError> {
        Ok(match normalize_key(key).as_str() {
            "swag-dir" => self.swag_dir.as_str(),
            "swag-container" => self.swag_container.as_str(),
            "network" => self.network.as_str(),
            _ => return Err(unknown_key(key)),
        })
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let slot = match normalize_key(key).as_str() {
            "swag-dir" => &mut self.swag_dir,
            "swag-container" => &mut self.swag_container,
            "network" => &mut self.network,
            _ => return Err(unknown_key(key)),
        };
        value.trim().clone_into(slot);
        Ok(())
    }
}

/// Settable keys, sorted.
pub fn keys() -> &'static [&'static str] {
    &["network", "swag-container", "swag-dir"]
}

fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase().replace('_', "-")
}

fn unknown_key(key: &str) -> ConfigError {
    ConfigError::UnknownKey {
        key: key.trim().to_owned(),
    }
}

/// Expand a leading `~` or `~/` to the home directory. Other paths, and
/// `~user` forms, are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = match path {
        "~" => "",
        p => match p.strip_prefix("~/").or_else(|| p.strip_prefix("~\\")) {
            Some(rest) => rest,
            None => return PathBuf::from(path),
        },
    };
    match BaseDirs::new() {
        Some(dirs) if rest.is_empty() => dirs.home_dir().to_path_buf(),
        Some(dirs) => dirs.home_dir().join(rest),
        None => PathBuf::from(path),
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "swagctl", "swagctl").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("swagctl");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load from the canonical path and environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load defaults, then `path` if it exists, then `SWAGCTL_*` variables.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()?;
    Ok(config.normalized())
}

/// Load config, falling back to defaults when the file is unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "ignoring unreadable config, using defaults");
        Config::default()
    })
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(&config_path(), cfg)
}

/// Normalize and write `cfg` to `path`, replacing any existing file atomically.
pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(&cfg.clone().normalized())?;
    swagctl_core::atomic::write_atomic(path, toml_str.as_bytes())?;
    tracing::info!(path = %path.display(), "saved config");
    Ok(())
}
