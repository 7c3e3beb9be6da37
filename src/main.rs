use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use log::error;

use mcp_sync_lib::cli::{Cli, Command, SyncArgs};
use mcp_sync_lib::{default_targets, describe_targets, get_home_dir, render_summary, render_targets};

fn init_logger(default_filter: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn run_sync(cli: &Cli, args: &SyncArgs) -> anyhow::Result<ExitCode> {
    let options = cli.sync_options(args);
    let report = match mcp_sync_lib::run(&options) {
        Ok(report) => report,
        Err(e) if e.is_fatal() => {
            error!("Cannot load source config: {e}");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e).context("sync aborted"),
    };

    if args.json {
        let text = serde_json::to_string_pretty(&report).context("serialize report")?;
        println!("{text}");
    } else {
        print!("{}", render_summary(&report));
    }

    // per-target failures are reported above and do not change the exit status
    Ok(ExitCode::SUCCESS)
}

fn list_targets(cli: &Cli, json: bool) -> anyhow::Result<ExitCode> {
    let home = match &cli.home {
        Some(home) => home.clone(),
        None => get_home_dir()?,
    };
    let infos = describe_targets(&default_targets(&home, &cli.vscode_flavor));
    if json {
        let text = serde_json::to_string_pretty(&infos).context("serialize targets")?;
        println!("{text}");
    } else {
        print!("{}", render_targets(&infos));
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.log_filter());

    let result = match &cli.command {
        Command::Sync(args) => run_sync(&cli, args),
        Command::Targets { json } => list_targets(&cli, *json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
