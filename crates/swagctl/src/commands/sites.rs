//! Site command handlers: list, add, toggle, delete.

use std::fs;

use tabled::Tabled;

use swagctl_config::Config;
use swagctl_core::{ConfigGenerator, ProxySite, SiteRecord, SiteRegistry, SiteStatus};

use crate::cli::{AddArgs, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, Tone};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    site_type: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Destination")]
    destination: String,
    #[tabled(rename = "Port")]
    port: String,
}

impl From<&SiteRecord> for SiteRow {
    fn from(s: &SiteRecord) -> Self {
        Self {
            name: s.name.clone(),
            site_type: s.site_type.to_string(),
            status: s.status().to_string(),
            target: s.target_type.to_string(),
            destination: s.target_dest.clone(),
            port: s.port.clone().unwrap_or_default(),
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub fn list(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let mut sites = SiteRegistry::new(cfg.proxy_confs_dir()).list()?;
    sites.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.filename.cmp(&b.filename)));

    let out = output::render_list(
        &global.output,
        &sites,
        |s| SiteRow::from(s),
        |s| s.name.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub fn add(cfg: &Config, args: AddArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let subdomain = args
        .subdomain
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| args.container.clone());

    let extra_config = match args.extra_file {
        Some(path) => Some(
            fs::read_to_string(&path).map_err(|source| CliError::FileIo { path, source })?,
        ),
        None => args.extra,
    }
    .filter(|s| !s.trim().is_empty());

    let site = ProxySite {
        subdomain,
        container_name: args.container,
        container_port: args.port,
        protocol: args.proto,
        extra_config,
    };
    let path = ConfigGenerator::new(cfg.proxy_confs_dir()).generate(&site)?;

    output::status(
        global,
        Tone::Success,
        &format!("Generated {}", path.display()),
    );
    util::reload_hint(cfg, global);
    Ok(())
}

pub fn toggle(cfg: &Config, name: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let status = SiteRegistry::new(cfg.proxy_confs_dir()).toggle(name)?;

    match status {
        SiteStatus::Enabled => {
            output::status(global, Tone::Success, &format!("Site '{name}' enabled"));
        }
        SiteStatus::Disabled => {
            output::status(global, Tone::Notice, &format!("Site '{name}' disabled"));
        }
    }
    util::reload_hint(cfg, global);
    Ok(())
}

pub fn delete(cfg: &Config, name: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let registry = SiteRegistry::new(cfg.proxy_confs_dir());
    let site = registry.find(name)?;

    if !util::confirm(
        &format!("Delete site '{name}' ({})? This is destructive.", site.filename),
        "delete",
        global.yes,
    )? {
        return Ok(());
    }

    let removed = registry.delete(name)?;
    output::status(
        global,
        Tone::Success,
        &format!("Deleted {}", removed.filename),
    );
    util::reload_hint(cfg, global);
    Ok(())
}
