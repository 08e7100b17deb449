//! Clap derive structures for the `bigip-settings` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// bigip-settings -- provision BIG-IP base settings and licenses
#[derive(Debug, Parser)]
#[command(
    name = "bigip-settings",
    version,
    about = "Provision BIG-IP base settings and licenses from declarative block requests",
    long_about = "Applies hostname, NTP, DNS and syslog settings, optional factory reset,\n\
        and optional license activation to a BIG-IP device, driven by a block\n\
        request read from a JSON file.",
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
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the local device's REST service
    #[arg(long, global = true)]
    pub local_url: Option<String>,

    /// Username for basic-auth calls to the local device
    #[arg(long, short = 'u', global = true)]
    pub user: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Provision the device a block request points at
    Apply(ApplyArgs),

    /// Release a block (reports UNBOUND, no device changes)
    Delete(RequestArgs),

    /// Inspect configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct RequestArgs {
    /// JSON request file, or `-` for stdin
    pub file: PathBuf,

    /// Where task state reports go
    #[arg(long, value_enum, default_value = "device")]
    pub report: ReportTarget,
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Append error details to ERROR reports
    #[arg(long)]
    pub error_detail: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportTarget {
    /// PATCH reports to the block's self link on the local device
    Device,
    /// Print reports to stdout as JSON lines
    Stdout,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,
    /// Print the effective configuration (secrets redacted)
    Show,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,
}
