//! Surgical editor for SWAG's `site-confs/default`.
//!
//! Points the root domain at an upstream ("set homepage") or restores static
//! file serving ("clear homepage") by rewriting only the body of the main TLS
//! server's `location /` block, plus `server_name` when asked. Every other
//! byte of the file is left as it was.
//!
//! At most one mutating call per target file may run at a time; the editor
//! takes no locks. The atomic rename protects against crashes, not against
//! concurrent writers.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::atomic;
use crate::error::{CoreError, Result};
use crate::model::Protocol;
use crate::model::common::{require_directive_value, validate_port};

use super::block::{Block, find_blocks, find_blocks_in_range};
use super::directive::{LocationShape, Upstream, is_shape_directive};
use super::document::{Document, contains_directive, is_comment_or_blank, leading_whitespace};

/// `server_name` value meaning "no specific name".
pub const SERVER_NAME_PLACEHOLDER: &str = "_";

/// One indentation step inside a block.
const INDENT_STEP: &str = "    ";

static SERVER_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*server\s*\{").expect("server block pattern is valid"));

static ROOT_LOCATION_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*location\s+/\s*\{").expect("root location pattern is valid")
});

static SERVER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*server_name\s+)([^;]+)(;.*)$").expect("server_name pattern is valid")
});

// ── Inputs / outputs ────────────────────────────────────────────────

/// Where the root domain should be proxied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomepageConfig {
    pub domain: String,
    pub upstream_app: String,
    pub upstream_port: u16,
    pub upstream_proto: Protocol,
    /// Leave `server_name _;` alone instead of writing the domain.
    pub keep_server_name_underscore: bool,
}

impl HomepageConfig {
    pub fn validate(&self) -> Result<()> {
        require_directive_value("domain", &self.domain)?;
        require_directive_value("upstream app", &self.upstream_app)?;
        validate_port("upstream port", self.upstream_port)
    }

    fn upstream(&self) -> Upstream {
        Upstream {
            app: self.upstream_app.trim().to_owned(),
            port: self.upstream_port,
            proto: self.upstream_proto,
        }
    }
}

/// Outcome of an edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditResult {
    /// Whether the file differs (or, on a dry run, would differ).
    pub changed: bool,
    /// Backup of the pre-edit bytes; only set when the file was written.
    pub backup_path: Option<PathBuf>,
}

// ── Editor ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DefaultSiteEditor {
    path: PathBuf,
}

impl DefaultSiteEditor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Proxy the root location to `cfg`'s upstream.
    ///
    /// Idempotent: repeating the call with the same config reports
    /// `changed = false` and performs no I/O beyond the read.
    pub fn set_homepage(&self, cfg: &HomepageConfig, dry_run: bool) -> Result<EditResult> {
        cfg.validate()?;
        let server_name = (!cfg.keep_server_name_underscore).then(|| cfg.domain.trim());
        self.apply(&LocationShape::Proxied(cfg.upstream()), server_name, dry_run)
    }

    /// Restore static serving on the root location, optionally resetting
    /// `server_name` to the placeholder. `domain` is informational only.
    pub fn clear_homepage(
        &self,
        domain: Option<&str>,
        restore_server_name_underscore: bool,
        dry_run: bool,
    ) -> Result<EditResult> {
        tracing::debug!(domain = domain.unwrap_or("-"), "clearing homepage");
        let server_name = restore_server_name_underscore.then_some(SERVER_NAME_PLACEHOLDER);
        self.apply(&LocationShape::Static, server_name, dry_run)
    }

    fn apply(
        &self,
        shape: &LocationShape,
        server_name: Option<&str>,
        dry_run: bool,
    ) -> Result<EditResult> {
        let original = fs::read(&self.path).map_err(|e| CoreError::io(&self.path, e))?;
        let text = std::str::from_utf8(&original).map_err(|_| {
            CoreError::structure(format!("{} is not valid UTF-8", self.path.display()))
        })?;

        let updated = rewrite(text, shape, server_name)?;
        if updated.as_bytes() == original.as_slice() {
            tracing::info!(path = %self.path.display(), "default site already up to date");
            return Ok(EditResult::default());
        }

        if dry_run {
            tracing::info!(path = %self.path.display(), "dry run: change computed, not written");
            return Ok(EditResult {
                changed: true,
                backup_path: None,
            });
        }

        let backup = atomic::backup(&self.path, &original)?;
        atomic::write_atomic(&self.path, updated.as_bytes())?;
        tracing::info!(path = %self.path.display(), backup = %backup.display(), "updated default site");

        Ok(EditResult {
            changed: true,
            backup_path: Some(backup),
        })
    }
}

// ── Pure transformation ─────────────────────────────────────────────

/// Rewrite a default-site document so its main `location /` has `shape`,
/// and set `server_name` in the main and redirect servers when given.
pub fn rewrite(input: &str, shape: &LocationShape, server_name: Option<&str>) -> Result<String> {
    let mut doc = Document::parse(input);

    let servers = find_blocks(&doc.lines, &SERVER_START)?;
    let main = servers
        .iter()
        .copied()
        .find(|b| is_default_server(&doc.lines, *b, "443"))
        .ok_or_else(|| CoreError::structure("main 443 default_server block not found"))?;
    let redirect = servers
        .iter()
        .copied()
        .find(|b| is_default_server(&doc.lines, *b, "80"));
    tracing::debug!(?main, ?redirect, "located default server blocks");

    if let Some(name) = server_name {
        if let Some(redirect) = redirect {
            set_server_name(&mut doc.lines, redirect, name);
        }
        set_server_name(&mut doc.lines, main, name);
    }

    let location = find_blocks_in_range(&doc.lines, &ROOT_LOCATION_START, main.start, main.end)?
        .into_iter()
        .next()
        .ok_or_else(|| CoreError::structure("location / block not found in main server block"))?;

    replace_location_body(&mut doc.lines, location, shape)?;
    Ok(doc.render())
}

fn is_default_server(lines: &[String], block: Block, port: &str) -> bool {
    let body = &lines[block.start..=block.end];
    contains_directive(body, "default_server") && listens_on(body, port)
}

/// A live `listen <port>` directive, not merely a longer port with the same
/// prefix (`listen 8080` does not listen on 80).
fn listens_on(lines: &[String], port: &str) -> bool {
    let needle = format!("listen {port}");
    lines
        .iter()
        .filter(|line| !is_comment_or_blank(line))
        .any(|line| {
            let s = line.trim();
            s.match_indices(&needle).any(|(at, m)| {
                !s[at + m.len()..].starts_with(|c: char| c.is_ascii_digit())
            })
        })
}

/// Replace the value of the first live `server_name` in `block`, keeping its
/// indentation and whatever follows the terminating `;`.
fn set_server_name(lines: &mut [String], block: Block, name: &str) {
    for line in &mut lines[block.start..=block.end] {
        if is_comment_or_blank(line.as_str()) || !line.trim_start().starts_with("server_name") {
            continue;
        }
        if let Some(caps) = SERVER_NAME.captures(line.as_str()) {
            let rewritten = format!("{}{name}{}", &caps[1], &caps[3]);
            *line = rewritten;
            return;
        }
    }
}

fn replace_location_body(
    lines: &mut Vec<String>,
    location: Block,
    shape: &LocationShape,
) -> Result<()> {
    if location.start == location.end {
        return Err(CoreError::structure(format!(
            "location / on line {} opens and closes on one line",
            location.start + 1
        )));
    }

    let indent = format!("{}{INDENT_STEP}", leading_whitespace(&lines[location.start]));
    let body_range = location.start + 1..location.end;

    let mut body: Vec<String> = lines[body_range.clone()]
        .iter()
        .filter(|line| !is_shape_directive(line))
        .cloned()
        .collect();

    // New directives go above the first surviving live line so commented
    // alternatives stay below them; otherwise at the end of the block.
    let insert_at = body
        .iter()
        .position(|line| !is_comment_or_blank(line))
        .unwrap_or(body.len());
    let injected = shape.directives().into_iter().map(|d| format!("{indent}{d}"));
    body.splice(insert_at..insert_at, injected);

    lines.splice(body_range, body);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const SAMPLE: &str = "error_page 502 /502.html;

# redirect all traffic to https
server {
    listen 80 default_server;
    listen [::]:80 default_server;
    server_name _;
    return 301 https://$host$request_uri;
}

# main server block
server {
    listen 443 ssl http2 default_server;
    listen [::]:443 ssl http2 default_server;

    root /config/www;
    index index.html index.htm index.php;

    server_name _;

    # enable subfolder method reverse proxy confs
    include /config/nginx/proxy-confs/*.subfolder.conf;

    # all ssl related config moved to ssl.conf
    include /config/nginx/ssl.conf;

    client_max_body_size 0;

    location / {
        # enable the next two lines for http auth
        #auth_basic \"Restricted\";
        #auth_basic_user_file /config/nginx/.htpasswd;

        # enable for Authelia
        #include /config/nginx/authelia-location.conf;

        try_files $uri $uri/ /index.html /index.php?$args =404;
    }
}
";

    const TRAILING_COMMENTS: &str = "server {
    listen 443 ssl default_server;
    server_name _;

    location / {
        # enable for Authelia
        try_files $uri $uri/ /index.html /index.php?$args =404;
        #auth_request /auth;
        #error_page 401 =200 /ldaplogin;
    }

    # disabled private area
    #location /private {
    #    deny all;
    #}
}
# end of main server
";

    const MIXED_ENDINGS: &str = "# header\r\nserver {\n    listen 443 ssl default_server;\n    location / {\n        try_files $uri $uri/ /index.html /index.php?$args =404;\n    }\n}\n";

    fn homepage() -> HomepageConfig {
        HomepageConfig {
            domain: "example.com".into(),
            upstream_app: "my-app".into(),
            upstream_port: 8080,
            upstream_proto: Protocol::Http,
            keep_server_name_underscore: false,
        }
    }

    fn write_sample(dir: &TempDir, text: &str) -> PathBuf {
        let path = dir.path().join("default");
        fs::write(&path, text).unwrap();
        path
    }

    fn comment_lines(text: &str) -> Vec<&str> {
        text.lines().filter(|l| l.trim().starts_with('#')).collect()
    }

    #[test]
    fn set_homepage_rewrites_location_and_server_name() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir, SAMPLE);

        let res = DefaultSiteEditor::new(&path).set_homepage(&homepage(), false).unwrap();
        assert!(res.changed);
        let backup = res.backup_path.unwrap();
        assert_eq!(fs::read_to_string(&backup).unwrap(), SAMPLE);

        let out = fs::read_to_string(&path).unwrap();
        assert_eq!(out.matches("server_name example.com;").count(), 2);
        assert!(!out.contains("try_files "));
        for line in [
            "        include /config/nginx/proxy.conf;",
            "        include /config/nginx/resolver.conf;",
            "        set $upstream_app my-app;",
            "        set $upstream_port 8080;",
            "        set $upstream_proto http;",
            "        proxy_pass $upstream_proto://$upstream_app:$upstream_port;",
        ] {
            assert!(out.lines().any(|l| l == line), "missing {line:?} in:\n{out}");
        }
    }

    #[test]
    fn set_homepage_produces_exact_location_body() {
        let out = rewrite(
            SAMPLE,
            &LocationShape::Proxied(homepage().upstream()),
            Some("example.com"),
        )
        .unwrap();
        let expected_tail = "    location / {
        # enable the next two lines for http auth
        #auth_basic \"Restricted\";
        #auth_basic_user_file /config/nginx/.htpasswd;

        # enable for Authelia
        #include /config/nginx/authelia-location.conf;

        include /config/nginx/proxy.conf;
        include /config/nginx/resolver.conf;
        set $upstream_app my-app;
        set $upstream_port 8080;
        set $upstream_proto http;
        proxy_pass $upstream_proto://$upstream_app:$upstream_port;
    }
}
";
        assert!(out.ends_with(expected_tail), "got:\n{out}");
        // Everything above the edited block is untouched apart from server_name.
        let head_before = SAMPLE.replace("server_name _;", "server_name example.com;");
        let split = head_before.find("    location / {").unwrap();
        assert_eq!(&out[..split], &head_before[..split]);
    }

    #[test]
    fn set_homepage_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir, SAMPLE);
        let editor = DefaultSiteEditor::new(&path);

        assert!(editor.set_homepage(&homepage(), false).unwrap().changed);
        let after_first = fs::read(&path).unwrap();

        let second = editor.set_homepage(&homepage(), false).unwrap();
        assert_eq!(second, EditResult::default());
        assert_eq!(fs::read(&path).unwrap(), after_first);
        // One file plus exactly one backup.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn changing_upstream_replaces_previous_proxy_shape() {
        let first = rewrite(SAMPLE, &LocationShape::Proxied(homepage().upstream()), None).unwrap();
        let other = Upstream {
            app: "blog".into(),
            port: 2368,
            proto: Protocol::Https,
        };
        let second = rewrite(&first, &LocationShape::Proxied(other), None).unwrap();
        assert_eq!(second.matches("proxy_pass ").count(), 1);
        assert!(second.contains("set $upstream_app blog;"));
        assert!(second.contains("set $upstream_proto https;"));
        assert!(!second.contains("my-app"));
    }

    #[test]
    fn clear_after_set_restores_original() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir, SAMPLE);
        let editor = DefaultSiteEditor::new(&path);

        editor.set_homepage(&homepage(), false).unwrap();
        let res = editor.clear_homepage(Some("example.com"), true, false).unwrap();
        assert!(res.changed);

        let out = fs::read_to_string(&path).unwrap();
        assert_eq!(out, SAMPLE);
        assert!(!out.contains("proxy_pass"));
        assert!(!out.contains("$upstream_"));
    }

    #[test]
    fn clear_on_pristine_file_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir, SAMPLE);
        let res = DefaultSiteEditor::new(&path).clear_homepage(None, true, false).unwrap();
        assert!(!res.changed);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn clear_without_restore_keeps_domain() {
        let with_domain = SAMPLE.replace("server_name _;", "server_name example.com;");
        let out = rewrite(&with_domain, &LocationShape::Static, None).unwrap();
        assert_eq!(out, with_domain);
    }

    #[test]
    fn comments_survive_in_order() {
        let out = rewrite(SAMPLE, &LocationShape::Proxied(homepage().upstream()), Some("example.com")).unwrap();
        assert_eq!(comment_lines(&out), comment_lines(SAMPLE));
    }

    #[test]
    fn comments_after_the_edited_region_survive_set_and_clear() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir, TRAILING_COMMENTS);
        let editor = DefaultSiteEditor::new(&path);

        editor.set_homepage(&homepage(), false).unwrap();
        let proxied = fs::read_to_string(&path).unwrap();
        assert_eq!(comment_lines(&proxied), comment_lines(TRAILING_COMMENTS));

        editor.clear_homepage(Some("example.com"), true, false).unwrap();
        let cleared = fs::read_to_string(&path).unwrap();
        assert_eq!(comment_lines(&cleared), comment_lines(TRAILING_COMMENTS));

        // Same lines overall, and everything after `location /` is byte-identical.
        let mut before: Vec<&str> = TRAILING_COMMENTS.lines().collect();
        let mut after: Vec<&str> = cleared.lines().collect();
        before.sort_unstable();
        after.sort_unstable();
        assert_eq!(after, before);

        let tail_at = TRAILING_COMMENTS.find("    }\n\n    # disabled").unwrap();
        assert!(cleared.ends_with(&TRAILING_COMMENTS[tail_at..]), "got:\n{cleared}");
        let auth = cleared.find("#auth_request /auth;").unwrap();
        assert!(auth < cleared.find("    # disabled private area").unwrap());
    }

    #[test]
    fn mixed_line_endings_are_not_normalized() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir, MIXED_ENDINGS);

        let res = DefaultSiteEditor::new(&path).clear_homepage(None, true, false).unwrap();
        assert!(!res.changed);
        assert_eq!(fs::read_to_string(&path).unwrap(), MIXED_ENDINGS);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);

        let out = rewrite(MIXED_ENDINGS, &LocationShape::Proxied(homepage().upstream()), None).unwrap();
        assert!(out.starts_with("# header\r\nserver {\n"));
        assert_eq!(out.matches("\r\n").count(), 1);
    }

    #[test]
    fn keep_underscore_leaves_server_name() {
        let cfg = HomepageConfig {
            keep_server_name_underscore: true,
            ..homepage()
        };
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir, SAMPLE);
        DefaultSiteEditor::new(&path).set_homepage(&cfg, false).unwrap();
        let out = fs::read_to_string(&path).unwrap();
        assert_eq!(out.matches("server_name _;").count(), 2);
        assert!(!out.contains("example.com"));
    }

    #[test]
    fn dry_run_reports_change_without_writing() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir, SAMPLE);

        let res = DefaultSiteEditor::new(&path).set_homepage(&homepage(), true).unwrap();
        assert_eq!(
            res,
            EditResult {
                changed: true,
                backup_path: None
            }
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn validation_happens_before_io() {
        let editor = DefaultSiteEditor::new("/nonexistent/swagctl/default");
        let bad = [
            HomepageConfig { domain: " ".into(), ..homepage() },
            HomepageConfig { upstream_app: String::new(), ..homepage() },
            HomepageConfig { upstream_port: 0, ..homepage() },
            HomepageConfig { upstream_app: "x; return 444".into(), ..homepage() },
        ];
        for cfg in bad {
            let err = editor.set_homepage(&cfg, false).unwrap_err();
            assert!(matches!(err, CoreError::Validation { .. }), "{cfg:?}: {err}");
        }
    }

    #[test]
    fn missing_main_block_is_a_structure_error() {
        let text = SAMPLE.replace("listen 443 ssl http2 default_server;", "#listen 443 ssl http2 default_server;");
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir, &text);

        let err = DefaultSiteEditor::new(&path).set_homepage(&homepage(), false).unwrap_err();
        assert!(matches!(err, CoreError::Structure { .. }), "{err}");
        assert_eq!(fs::read_to_string(&path).unwrap(), text);
    }

    #[test]
    fn missing_root_location_is_a_structure_error() {
        let text = SAMPLE.replace("location / {", "location /app {");
        let err = rewrite(&text, &LocationShape::Static, None).unwrap_err();
        assert!(matches!(err, CoreError::Structure { .. }), "{err}");
    }

    #[test]
    fn unclosed_block_is_reported() {
        let text = SAMPLE.trim_end().strip_suffix('}').unwrap().to_owned();
        let err = rewrite(&text, &LocationShape::Static, None).unwrap_err();
        assert!(matches!(err, CoreError::UnclosedBlock { line: 12 }), "{err}");
    }

    #[test]
    fn redirect_block_is_optional() {
        let start = SAMPLE.find("# redirect").unwrap();
        let end = SAMPLE.find("# main server block").unwrap();
        let text = format!("{}{}", &SAMPLE[..start], &SAMPLE[end..]);
        let out = rewrite(&text, &LocationShape::Static, Some("example.com")).unwrap();
        assert_eq!(out.matches("server_name example.com;").count(), 1);
    }

    #[test]
    fn port_8080_is_not_port_80() {
        let lines: Vec<String> = ["listen 8080 default_server;"].map(String::from).into();
        assert!(!listens_on(&lines, "80"));
        let lines: Vec<String> = ["listen 80;"].map(String::from).into();
        assert!(listens_on(&lines, "80"));
    }

    #[test]
    fn directives_land_above_live_neighbours() {
        let text = SAMPLE.replace(
            "        try_files $uri $uri/ /index.html /index.php?$args =404;\n",
            "        try_files $uri $uri/ /index.html /index.php?$args =404;\n        auth_request /auth;\n",
        );
        let out = rewrite(&text, &LocationShape::Proxied(homepage().upstream()), None).unwrap();
        let proxy = out.find("proxy_pass ").unwrap();
        let auth = out.find("auth_request /auth;").unwrap();
        assert!(proxy < auth);
    }

    #[test]
    fn empty_location_body_gets_directives() {
        let text = "server {\n\tlisten 443 ssl default_server;\n\tlocation / {\n\t}\n}\n";
        let out = rewrite(text, &LocationShape::Static, None).unwrap();
        assert_eq!(
            out,
            "server {\n\tlisten 443 ssl default_server;\n\tlocation / {\n\t    try_files $uri $uri/ /index.html /index.php?$args =404;\n\t}\n}\n"
        );
    }

    #[test]
    fn one_line_location_is_refused() {
        let text = "server {\n    listen 443 default_server;\n    location / { return 404; }\n}\n";
        let err = rewrite(text, &LocationShape::Static, None).unwrap_err();
        assert!(matches!(err, CoreError::Structure { .. }));
    }

    #[test]
    fn crlf_files_stay_crlf() {
        let crlf = SAMPLE.replace('\n', "\r\n");
        let out = rewrite(&crlf, &LocationShape::Static, None).unwrap();
        assert_eq!(out, crlf);
        let set = rewrite(&crlf, &LocationShape::Proxied(homepage().upstream()), None).unwrap();
        assert!(!set.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn server_name_trailing_content_is_kept() {
        let text = SAMPLE.replacen("    server_name _;", "    server_name _; # catch-all", 1);
        let out = rewrite(&text, &LocationShape::Static, Some("example.com")).unwrap();
        assert!(out.contains("    server_name example.com; # catch-all"));
    }
}
