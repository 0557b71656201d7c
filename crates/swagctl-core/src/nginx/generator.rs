//! Renders new `<subdomain>.subdomain.conf` files from the standard SWAG
//! proxy template. Existing files are never overwritten.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::atomic;
use crate::error::{CoreError, Result};
use crate::model::common::{require_directive_value, validate_port};
use crate::model::{Protocol, SiteType};

use super::directive::Upstream;

/// Inputs for one generated proxy conf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySite {
    pub subdomain: String,
    pub container_name: String,
    pub container_port: u16,
    pub protocol: Protocol,
    /// Free-form directives appended inside the server block.
    pub extra_config: Option<String>,
}

impl ProxySite {
    pub fn validate(&self) -> Result<()> {
        require_directive_value("subdomain", &self.subdomain)?;
        if self.subdomain.contains(['/', '\\']) || self.subdomain.starts_with('.') {
            return Err(CoreError::validation(
                "subdomain",
                format!("'{}' is not usable as a file name", self.subdomain),
            ));
        }
        require_directive_value("container name", &self.container_name)?;
        validate_port("container port", self.container_port)
    }

    fn upstream(&self) -> Upstream {
        Upstream {
            app: self.container_name.trim().to_owned(),
            port: self.container_port,
            proto: self.protocol,
        }
    }
}

/// Writes proxy confs into one directory.
#[derive(Debug, Clone)]
pub struct ConfigGenerator {
    dir: PathBuf,
}

impl ConfigGenerator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the conf for `subdomain` lives.
    pub fn target_path(&self, subdomain: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}", subdomain.trim(), SiteType::Subdomain.enabled_suffix()))
    }

    /// Render and create the conf, returning its path.
    pub fn generate(&self, site: &ProxySite) -> Result<PathBuf> {
        site.validate()?;
        if !self.dir.is_dir() {
            return Err(CoreError::DirectoryMissing {
                path: self.dir.clone(),
            });
        }

        let path = self.target_path(&site.subdomain);
        let rendered = render(site);
        atomic::write_new(&path, rendered.as_bytes())?;

        tracing::info!(
            subdomain = %site.subdomain,
            container = %site.container_name,
            file = %path.display(),
            "generated proxy conf"
        );
        Ok(path)
    }
}

/// Render the proxy template for `site`.
pub fn render(site: &ProxySite) -> String {
    let subdomain = site.subdomain.trim();

    let mut location = String::new();
    for directive in site.upstream().directives() {
        let _ = writeln!(location, "        {directive}");
    }

    let mut extra = String::new();
    if let Some(block) = site.extra_config.as_deref() {
        for line in block.trim_end().lines() {
            if line.trim().is_empty() {
                extra.push('\n');
            } else {
                let _ = writeln!(extra, "    {line}");
            }
        }
    }

    format!(
        r#"## Version 2023/05/31
# make sure that your dns has a cname set for {subdomain}

server {{
    listen 443 ssl;
    listen [::]:443 ssl;

    server_name {subdomain}.*;

    include /config/nginx/ssl.conf;

    client_max_body_size 0;

    # enable for ldap auth, fill in ldap.conf in the ldap folder
    #include /config/nginx/ldap.conf;

    # enable for Authelia
    #include /config/nginx/authelia-server.conf;

    location / {{
        # enable the next two lines for http auth
        #auth_basic "Restricted";
        #auth_basic_user_file /config/nginx/.htpasswd;

        # enable the next two lines for ldap auth
        #auth_request /auth;
        #error_page 401 =200 /ldaplogin;

        # enable for Authelia
        #include /config/nginx/authelia-location.conf;

{location}    }}

    # additional config block
{extra}}}
"#
    )
}
