//! Directory-level registry of proxy confs.
//!
//! Each recognized file becomes a [`SiteRecord`]; its status comes from the
//! filename and its target from the last `set $upstream_*` / `root`
//! directives in the body.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{CoreError, Result};
use crate::model::{SiteRecord, SiteStatus, TargetType};

use super::document::is_comment_or_blank;

static UPSTREAM_APP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"set\s+\$upstream_app\s+([^;]+);").expect("upstream_app pattern is valid")
});

static UPSTREAM_PORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"set\s+\$upstream_port\s+([^;]+);").expect("upstream_port pattern is valid")
});

static ROOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*root\s+([^;]+);").expect("root pattern is valid"));

/// Values pulled out of a conf body; later occurrences win.
#[derive(Debug, Default, PartialEq, Eq)]
struct Extracted {
    upstream_app: Option<String>,
    upstream_port: Option<String>,
    root: Option<String>,
}

impl Extracted {
    fn scan(body: &str) -> Self {
        let mut out = Self::default();
        for line in body.lines().filter(|l| !is_comment_or_blank(l)) {
            if let Some(v) = capture(&UPSTREAM_APP, line) {
                out.upstream_app = Some(v);
            }
            if let Some(v) = capture(&UPSTREAM_PORT, line) {
                out.upstream_port = Some(v);
            }
            if let Some(v) = capture(&ROOT, line) {
                out.root = Some(v);
            }
        }
        out
    }

    fn apply_to(self, record: &mut SiteRecord) {
        record.port = self.upstream_port;
        match (self.upstream_app, self.root) {
            (Some(app), _) => {
                record.target_type = classify_upstream(&app);
                record.target_dest = app;
            }
            (None, Some(root)) => {
                record.target_type = TargetType::Static;
                record.target_dest = root;
            }
            (None, None) => {}
        }
    }
}

fn capture(re: &Regex, line: &str) -> Option<String> {
    re.captures(line).map(|c| c[1].trim().to_owned())
}

/// Container vs IP guess for an upstream value.
///
/// Known limitation: anything with exactly three dots that starts with a
/// digit counts as an IP, so a hostname like `10.db.internal.lan` is
/// reported as `IP`.
pub fn classify_upstream(value: &str) -> TargetType {
    let dotted_quad = value.matches('.').count() == 3;
    let numeric_start = value.starts_with(|c: char| c.is_ascii_digit());
    if dotted_quad && numeric_start {
        TargetType::Ip
    } else {
        TargetType::Container
    }
}

/// Proxy confs in one directory (normally `config/nginx/proxy-confs`).
#[derive(Debug, Clone)]
pub struct SiteRegistry {
    dir: PathBuf,
}

impl SiteRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// List recognized confs in directory-enumeration order.
    ///
    /// A missing directory is an empty registry, not an error. Callers that
    /// need a stable order must sort.
    pub fn list(&self) -> Result<Vec<SiteRecord>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CoreError::io(&self.dir, e)),
        };

        let mut sites = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CoreError::io(&self.dir, e))?;
            if !entry.path().is_file() {
                continue;
            }
            let Some(filename) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            let Some(mut record) = SiteRecord::from_filename(&filename) else {
                continue;
            };

            match fs::read_to_string(entry.path()) {
                Ok(body) => Extracted::scan(&body).apply_to(&mut record),
                Err(e) => tracing::warn!(file = %filename, error = %e, "could not read site conf"),
            }
            tracing::debug!(
                site = %record.name,
                target = %record.target_type,
                dest = %record.target_dest,
                "classified site"
            );
            sites.push(record);
        }
        Ok(sites)
    }

    /// Find a site by exact name. When several files share a name the one
    /// with the lexically smallest filename wins.
    pub fn find(&self, name: &str) -> Result<SiteRecord> {
        self.list()?
            .into_iter()
            .filter(|s| s.name == name)
            .min_by(|a, b| a.filename.cmp(&b.filename))
            .ok_or_else(|| CoreError::SiteNotFound { name: name.into() })
    }

    /// Flip a site between enabled and disabled by renaming it within its
    /// type. Content is never touched. Returns the new status.
    pub fn toggle(&self, name: &str) -> Result<SiteStatus> {
        let site = self.find(name)?;
        let from = self.dir.join(&site.filename);
        let to = self.dir.join(site.toggled_filename());

        if to.exists() {
            return Err(CoreError::AlreadyExists { path: to });
        }
        fs::rename(&from, &to).map_err(|e| CoreError::io(&from, e))?;

        let status = site.status().toggled();
        tracing::info!(site = %name, %status, file = %to.display(), "toggled site");
        Ok(status)
    }

    /// Remove a site's file. Returns the record as it was before deletion.
    pub fn delete(&self, name: &str) -> Result<SiteRecord> {
        let site = self.find(name)?;
        let path = self.dir.join(&site.filename);
        fs::remove_file(&path).map_err(|e| CoreError::io(&path, e))?;
        tracing::info!(site = %name, file = %path.display(), "deleted site");
        Ok(site)
    }
}
