// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj`: the control-socket CLI client (§6c).

mod client;
mod color;
mod exit_error;
mod output;

use clap::{Parser, Subcommand};
use client::{ClientError, DaemonClient};
use exit_error::ExitError;
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "oj", version = env!("BUILD_GIT_HASH"), styles = color::styles())]
struct Cli {
    /// Override the resolved state directory (defaults match `ojd`'s).
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every loaded job and its goal/state.
    List,
    /// Show one job's detail.
    Get { name: String },
    /// Start a job (sets goal=start; sugar over `emit`).
    Start { name: String },
    /// Stop a job (sets goal=stop; sugar over `emit`).
    Stop { name: String },
    /// Emit an event by hand.
    Emit {
        name: String,
        /// A value turns this into a level event rather than an edge event.
        #[arg(long)]
        value: Option<String>,
        #[arg(long = "arg")]
        args: Vec<String>,
        #[arg(long = "env", value_parser = parse_env_pair)]
        env: Vec<(String, String)>,
    },
    /// Reload every `*.conf` file under the jobs directory.
    Reload,
}

fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("oj: {err}");
            std::process::ExitCode::from(err.code as u8)
        }
    }
}

async fn run(cli: Cli) -> Result<(), ExitError> {
    let state_dir = match cli.state_dir {
        Some(dir) => dir,
        None => oj_daemon::config::state_dir().map_err(|err| ExitError::new(1, err.to_string()))?,
    };
    let client = DaemonClient::new(state_dir.join("control.sock"));

    let result: Result<(), ClientError> = match cli.command {
        Command::List => client.list_jobs().await.and_then(|jobs| {
            output::print_jobs(&jobs, cli.format).map_err(|err| ClientError::UnexpectedResponse(err.to_string()))
        }),
        Command::Get { name } => client.get_job(&name).await.and_then(|job| {
            output::print_job(&job, cli.format).map_err(|err| ClientError::UnexpectedResponse(err.to_string()))
        }),
        Command::Start { name } => client.start_job(&name).await,
        Command::Stop { name } => client.stop_job(&name).await,
        Command::Emit { name, value, args, env } => client.emit_event(&name, value, args, env).await,
        Command::Reload => client.reload_config().await,
    };

    result.map_err(|err| ExitError::new(1, err.to_string()))
}
