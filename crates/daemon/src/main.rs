// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ojd`: the supervisor daemon entry point (§6c).

use clap::Parser;
use oj_daemon::config::Config;
use oj_daemon::{lifecycle, listener};
use oj_engine::Supervisor;
use std::path::PathBuf;
use tokio::net::UnixListener;
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(name = "ojd", about = "Event-driven job supervisor daemon")]
struct Args {
    /// Override the resolved state directory.
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Override the job-definition directory (default: `<state-dir>/jobs.d`).
    #[arg(long)]
    jobs_dir: Option<PathBuf>,

    /// Stay attached to the controlling terminal and log to stderr instead
    /// of the rolling log file.
    #[arg(long)]
    foreground: bool,

    /// Repeatable verbosity flag; overrides `RUST_LOG` when present.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::process::ExitCode {
    let args = Args::parse();

    let config = match Config::load(args.state_dir, args.jobs_dir, args.foreground) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("ojd: {err}");
            return std::process::ExitCode::FAILURE;
        }
    };

    let _lock = match lifecycle::acquire(&config) {
        Ok(lock) => lock,
        Err(err) => {
            eprintln!("ojd: {err}");
            return std::process::ExitCode::FAILURE;
        }
    };

    init_logging(&config, args.verbose);

    let (loaded, errors) = oj_runbook::Runbook::load_dir(&config.jobs_dir);
    for err in &errors {
        tracing::warn!(error = %err, "runbook load error");
    }

    let mut supervisor = Supervisor::new();
    for (_, job_config) in loaded {
        supervisor.load_job(job_config);
    }
    supervisor.emit_startup();

    let reload_jobs_dir = config.jobs_dir.clone();
    supervisor.set_reload_hook(Box::new(move |sup| {
        let (loaded, errors) = oj_runbook::Runbook::load_dir(&reload_jobs_dir);
        for err in &errors {
            tracing::warn!(error = %err, "runbook reload error");
        }
        oj_runbook::reconcile(&mut sup.table, loaded, sup.clock.epoch_ms());
    }));

    let socket = match UnixListener::bind(&config.socket_path) {
        Ok(socket) => socket,
        Err(err) => {
            tracing::error!(error = %err, path = %config.socket_path.display(), "failed to bind control socket");
            return std::process::ExitCode::FAILURE;
        }
    };

    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(listener::accept_loop(socket, config.jobs_dir.clone(), tx));

    let result = supervisor.run(rx).await;
    lifecycle::release_socket(&config);

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "supervisor loop exited with an error");
            std::process::ExitCode::FAILURE
        }
    }
}

fn init_logging(config: &Config, verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if config.foreground {
        fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    } else {
        let appender = tracing_appender::rolling::daily(&config.log_path, "ojd.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        std::mem::forget(guard);
        fmt().with_env_filter(filter).with_writer(writer).with_ansi(false).init();
    }
}
