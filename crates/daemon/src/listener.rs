// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control-socket listener (§6b). Accepts one `tokio::spawn`ed task per
//! connection; every parsed request is boxed into a `ControlAction` and
//! sent across a single channel into the supervisor's own loop, so this
//! module never touches a `JobTable` directly.

use oj_core::{Event, JobGoal, SystemClock};
use oj_engine::{ControlAction, Supervisor};
use oj_wire::{job_path, read_request, write_response, ControlErrorKind, JobSummary, Request, Response, ResponseBody};
use std::path::PathBuf;
use tokio::io::BufReader;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, oneshot};

pub async fn accept_loop(listener: UnixListener, jobs_dir: PathBuf, tx: mpsc::Sender<ControlAction>) {
    loop {
        let (stream, _addr) = match listener.accept().await {
            Ok(pair) => pair,
            Err(err) => {
                tracing::warn!(error = %err, "control socket accept failed");
                continue;
            }
        };
        let tx = tx.clone();
        let jobs_dir = jobs_dir.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_connection(stream, jobs_dir, tx).await {
                tracing::debug!(error = %err, "control connection ended");
            }
        });
    }
}

async fn handle_connection(
    stream: UnixStream,
    jobs_dir: PathBuf,
    tx: mpsc::Sender<ControlAction>,
) -> Result<(), std::io::Error> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    loop {
        let request = match read_request(&mut reader).await {
            Ok(Some(req)) => req,
            Ok(None) => return Ok(()),
            Err(err) => {
                let response = Response::err(ControlErrorKind::Protocol, err.to_string());
                let _ = write_response(&mut write_half, &response).await;
                continue;
            }
        };

        let jobs_dir = jobs_dir.clone();
        let (reply_tx, reply_rx) = oneshot::channel();
        let action: ControlAction = Box::new(move |sup| {
            let response = apply_request(sup, &jobs_dir, request);
            let _ = reply_tx.send(response);
        });
        if tx.send(action).await.is_err() {
            return Ok(());
        }
        let Ok(response) = reply_rx.await else { return Ok(()) };
        write_response(&mut write_half, &response).await?;
    }
}

/// Translate one parsed `Request` into the matching supervisor operation.
/// `StartJob`/`StopJob` are sugar over `EmitEvent`: they build a synthetic
/// control-originated cause event and run it through `oj_engine::start`/
/// `stop`, exactly like any other cause (§6b) — they never set `goal`
/// directly.
fn apply_request(sup: &mut Supervisor<SystemClock>, jobs_dir: &std::path::Path, request: Request) -> Response {
    match request {
        Request::EmitEvent { name, value, args, env } => {
            match value {
                Some(v) => {
                    sup.store.emit_level(name, v);
                }
                None => {
                    sup.store.emit_edge(Event::edge_with(name, args, env));
                }
            }
            Response::ok(ResponseBody::Unit)
        }
        Request::ListJobs => {
            let jobs = sup.table.iter().map(summarize).collect();
            Response::ok(ResponseBody::Jobs(jobs))
        }
        Request::GetJob { name } => match sup.table.get(&name) {
            Some(job) => Response::ok(ResponseBody::Job(summarize(job))),
            None => not_found(&name),
        },
        Request::StartJob { name } => {
            let clock = sup.clock.clone();
            match sup.table.get_mut(&name) {
                Some(job) => {
                    let cause = Event::edge(format!("control/start{}", job_path(&name)));
                    let effects = oj_engine::start(job, cause, &clock);
                    sup.execute_all(effects);
                    Response::ok(ResponseBody::Unit)
                }
                None => not_found(&name),
            }
        }
        Request::StopJob { name } => {
            let clock = sup.clock.clone();
            match sup.table.get_mut(&name) {
                Some(job) => {
                    let cause = Event::edge(format!("control/stop{}", job_path(&name)));
                    let effects = oj_engine::stop(job, cause, &clock);
                    sup.execute_all(effects);
                    Response::ok(ResponseBody::Unit)
                }
                None => not_found(&name),
            }
        }
        Request::ReloadConfig => {
            let (loaded, errors) = oj_runbook::Runbook::load_dir(jobs_dir);
            for err in &errors {
                tracing::warn!(error = %err, "runbook reload error");
            }
            oj_runbook::reconcile(&mut sup.table, loaded, sup.clock.epoch_ms());
            Response::ok(ResponseBody::Unit)
        }
    }
}

fn not_found(name: &str) -> Response {
    Response::err(ControlErrorKind::NotFound, format!("no such job: {name}"))
}

fn summarize(job: &oj_core::Job) -> JobSummary {
    JobSummary {
        name: job.name.clone(),
        path: job_path(&job.name),
        goal: match job.goal {
            JobGoal::Start => "start".to_string(),
            JobGoal::Stop => "stop".to_string(),
        },
        state: format!("{:?}", job.state).to_lowercase(),
        pid: job.slot.main_pid,
        failed: job.failed,
    }
}
