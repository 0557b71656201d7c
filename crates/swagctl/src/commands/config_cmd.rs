//! Config subcommand handlers.

use std::fmt::Write as _;

use swagctl_config::{self as config, Config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, Tone};

use super::resolve_config;

/// `key = value` lines in key order.
fn format_config(cfg: &Config) -> String {
    let mut out = String::new();
    for key in config::keys() {
        if let Ok(value) = cfg.get(key) {
            let _ = writeln!(out, "{key} = {value}");
        }
    }
    out.trim_end().to_owned()
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = resolve_config(global);
            let out = output::render_single(&global.output, &cfg, format_config, |c| {
                c.swag_dir.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        // ── Get <key> ───────────────────────────────────────────────
        ConfigCommand::Get { key } => {
            let cfg = resolve_config(global);
            output::print_output(cfg.get(&key)?, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config()?;
            cfg.set(&key, &value)?;
            let cfg = cfg.normalized();
            config::save_config(&cfg)?;

            output::status(
                global,
                Tone::Success,
                &format!("Set {} = {}", key.trim(), cfg.get(&key)?),
            );
            Ok(())
        }
    }
}
