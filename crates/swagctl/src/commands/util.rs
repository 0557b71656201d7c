//! Shared helpers for command handlers.

use std::io::{self, IsTerminal};

use swagctl_config::Config;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::{self, Tone};

/// Remind the user that nginx only picks changes up on reload.
pub fn reload_hint(cfg: &Config, global: &GlobalOpts) {
    output::status(
        global,
        Tone::Info,
        &format!(
            "Reload nginx to apply: docker exec {} nginx -s reload",
            cfg.swag_container
        ),
    );
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to prompt on, the caller must pass `--yes`.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(io::Error::other(e)))?;
    Ok(confirmed)
}
