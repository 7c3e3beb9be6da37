//! Command-line surface of `mcp-sync`.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::{SyncOptions, DEFAULT_VSCODE_FLAVOR};
use crate::mcp::MergeMode;

#[derive(Debug, Parser)]
#[command(
    name = "mcp-sync",
    version,
    about = "Sync user-scoped MCP servers from one config file to every installed AI coding tool"
)]
pub struct Cli {
    /// Home directory the tool config paths are resolved against
    #[arg(long, global = true, env = "MCP_SYNC_HOME", value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// VS Code flavor directory under ~/.config (Code, Code - Insiders, VSCodium)
    #[arg(
        long,
        global = true,
        env = "MCP_SYNC_VSCODE_FLAVOR",
        default_value = DEFAULT_VSCODE_FLAVOR,
        value_name = "NAME"
    )]
    pub vscode_flavor: String,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Propagate the source servers to the target tools
    Sync(SyncArgs),
    /// List the registered targets and where their config files live
    Targets {
        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Source config file holding `mcpServers`
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: PathBuf,

    /// Remove target entries that are not in the source
    #[arg(long)]
    pub prune: bool,

    /// Show what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Leave targets whose config file does not exist yet
    #[arg(long)]
    pub skip_missing: bool,

    /// Only sync these target ids (comma separated)
    #[arg(long, value_delimiter = ',', value_name = "IDS")]
    pub only: Vec<String>,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Default log filter for the chosen verbosity; `RUST_LOG` still wins
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    /// Build run options for the `sync` subcommand
    pub fn sync_options(&self, args: &SyncArgs) -> SyncOptions {
        let mut opts = SyncOptions::new(args.config.clone());
        opts.home = self.home.clone();
        opts.vscode_flavor = self.vscode_flavor.clone();
        opts.mode = if args.prune {
            MergeMode::Prune
        } else {
            MergeMode::Preserve
        };
        opts.dry_run = args.dry_run;
        opts.skip_missing = args.skip_missing;
        opts.only = args.only.clone();
        opts
    }
}
