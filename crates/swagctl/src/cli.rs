//! Clap derive structures for the `swagctl` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use swagctl_core::Protocol;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// swagctl -- manage SWAG reverse-proxy configs
#[derive(Debug, Parser)]
#[command(
    name = "swagctl",
    version,
    about = "Manage SWAG reverse-proxy nginx configs from the command line",
    long_about = "Lists, generates, enables and disables SWAG proxy confs, and points the\n\
        root domain at a container by editing site-confs/default in place.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// SWAG base directory (overrides config)
    #[arg(long, short = 'd', global = true)]
    pub swag_dir: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SWAGCTL_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List proxy confs with their status and target
    #[command(alias = "ls")]
    List,

    /// Generate a subdomain proxy conf for a container
    Add(AddArgs),

    /// Enable a disabled site, or disable an enabled one
    Toggle {
        /// Site name (filename without suffix)
        name: String,
    },

    /// Delete a site's proxy conf
    #[command(alias = "rm")]
    Delete {
        /// Site name (filename without suffix)
        name: String,
    },

    /// Point the root domain at a container, or back to static files
    Homepage(HomepageArgs),

    /// Manage persisted swagctl configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Add ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Container to proxy to
    pub container: String,

    /// Subdomain (defaults to the container name)
    #[arg(long, short = 's')]
    pub subdomain: Option<String>,

    /// Port the container listens on
    #[arg(long, short = 'p', default_value = "80")]
    pub port: u16,

    /// Scheme used to reach the container
    #[arg(long, default_value = "http")]
    pub proto: Protocol,

    /// Extra nginx directives appended inside the server block
    #[arg(long, conflicts_with = "extra_file")]
    pub extra: Option<String>,

    /// Read the extra server-block directives from a file
    #[arg(long, value_name = "PATH")]
    pub extra_file: Option<PathBuf>,
}

// ── Homepage ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct HomepageArgs {
    #[command(subcommand)]
    pub command: HomepageCommand,
}

#[derive(Debug, Subcommand)]
pub enum HomepageCommand {
    /// Proxy the root domain to a container
    Set {
        /// Container to proxy to
        container: String,

        /// Root domain, e.g. example.com
        #[arg(long)]
        domain: String,

        /// Port the container listens on
        #[arg(long, short = 'p', default_value = "80")]
        port: u16,

        /// Scheme used to reach the container
        #[arg(long, default_value = "http")]
        proto: Protocol,

        /// Leave `server_name _;` unchanged
        #[arg(long)]
        keep_server_name_underscore: bool,

        /// Compute the change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Restore static file serving on the root domain
    Clear {
        /// Root domain (informational)
        #[arg(long)]
        domain: Option<String>,

        /// Reset `server_name` to `_`
        #[arg(
            long,
            default_value_t = true,
            action = clap::ArgAction::Set,
            num_args = 0..=1,
            default_missing_value = "true"
        )]
        restore_server_name_underscore: bool,

        /// Compute the change without writing
        #[arg(long)]
        dry_run: bool,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Print one configuration value
    Get {
        /// Config key (swag-dir, swag-container, network)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Config key (swag-dir, swag-container, network)
        key: String,

        /// Value to set
        value: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
