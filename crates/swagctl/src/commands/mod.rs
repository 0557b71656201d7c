//! Command dispatch: bridges CLI args -> engine calls -> output formatting.

pub mod config_cmd;
pub mod homepage;
pub mod sites;
pub mod util;

use swagctl_config::Config;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Persisted config with `--swag-dir` applied on top.
pub fn resolve_config(global: &GlobalOpts) -> Config {
    let mut cfg = swagctl_config::load_config_or_default();
    if let Some(ref dir) = global.swag_dir {
        cfg.swag_dir = dir.display().to_string();
    }
    cfg
}

/// Dispatch a command to the appropriate handler.
pub fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    if let Command::Config(args) = cmd {
        return config_cmd::handle(args, global);
    }

    let cfg = resolve_config(global);
    tracing::debug!(swag_dir = %cfg.swag_dir, "resolved configuration");

    match cmd {
        Command::List => sites::list(&cfg, global),
        Command::Add(args) => sites::add(&cfg, args, global),
        Command::Toggle { name } => sites::toggle(&cfg, &name, global),
        Command::Delete { name } => sites::delete(&cfg, &name, global),
        Command::Homepage(args) => homepage::handle(&cfg, args, global),
        // Config is handled above, Completions in main
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
