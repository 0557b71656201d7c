//! Homepage command handlers: edit the root `location /` of the default site.

use swagctl_config::Config;
use swagctl_core::{DefaultSiteEditor, EditResult, HomepageConfig};

use crate::cli::{GlobalOpts, HomepageArgs, HomepageCommand};
use crate::error::CliError;
use crate::output::{self, Tone};

use super::util;

pub fn handle(cfg: &Config, args: HomepageArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = cfg.default_site_conf_path()?;
    let editor = DefaultSiteEditor::new(&path);

    let (result, dry_run) = match args.command {
        HomepageCommand::Set {
            container,
            domain,
            port,
            proto,
            keep_server_name_underscore,
            dry_run,
        } => {
            let homepage = HomepageConfig {
                domain,
                upstream_app: container,
                upstream_port: port,
                upstream_proto: proto,
                keep_server_name_underscore,
            };
            (editor.set_homepage(&homepage, dry_run)?, dry_run)
        }

        HomepageCommand::Clear {
            domain,
            restore_server_name_underscore,
            dry_run,
        } => {
            let result = editor.clear_homepage(
                domain.as_deref(),
                restore_server_name_underscore,
                dry_run,
            )?;
            (result, dry_run)
        }
    };

    report(&result, dry_run, &path.display().to_string(), cfg, global)
}

fn report(
    result: &EditResult,
    dry_run: bool,
    path: &str,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let out = output::render_single(
        &global.output,
        result,
        |_| String::new(),
        |r| r.changed.to_string(),
    )?;
    output::print_output(&out, global.quiet);

    if !result.changed {
        output::status(global, Tone::Notice, "No changes detected, nothing written.");
        return Ok(());
    }
    if dry_run {
        output::status(
            global,
            Tone::Success,
            "Dry run: a change was computed but not written.",
        );
        return Ok(());
    }

    if let Some(ref backup) = result.backup_path {
        output::status(
            global,
            Tone::Info,
            &format!("Backup written: {}", backup.display()),
        );
    }
    output::status(global, Tone::Success, &format!("Updated {path}"));
    util::reload_hint(cfg, global);
    Ok(())
}
