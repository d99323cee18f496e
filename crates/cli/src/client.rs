// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `DaemonClient`: a thin Unix-socket client for the control surface (§6b).

use oj_wire::{read_response, write_request, JobSummary, Request, Response, ResponseBody};
use std::path::PathBuf;
use tokio::io::BufReader;
use tokio::net::UnixStream;

pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    pub fn new(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let mut stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|source| ClientError::DaemonNotRunning { source })?;
        let (read_half, mut write_half) = stream.split();
        write_request(&mut write_half, request).await?;
        let mut reader = BufReader::new(read_half);
        read_response(&mut reader).await?.ok_or(ClientError::ConnectionClosed)
    }

    fn reject<T>(response: Response) -> Result<T, ClientError> {
        match response {
            Response::Err(err) => Err(ClientError::Control(err)),
            other => Err(ClientError::UnexpectedResponse(format!("{other:?}"))),
        }
    }

    pub async fn list_jobs(&self) -> Result<Vec<JobSummary>, ClientError> {
        match self.send(&Request::ListJobs).await? {
            Response::Ok(ResponseBody::Jobs(jobs)) => Ok(jobs),
            other => Self::reject(other),
        }
    }

    pub async fn get_job(&self, name: &str) -> Result<JobSummary, ClientError> {
        let request = Request::GetJob { name: name.to_string() };
        match self.send(&request).await? {
            Response::Ok(ResponseBody::Job(job)) => Ok(job),
            other => Self::reject(other),
        }
    }

    pub async fn start_job(&self, name: &str) -> Result<(), ClientError> {
        let request = Request::StartJob { name: name.to_string() };
        match self.send(&request).await? {
            Response::Ok(ResponseBody::Unit) => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn stop_job(&self, name: &str) -> Result<(), ClientError> {
        let request = Request::StopJob { name: name.to_string() };
        match self.send(&request).await? {
            Response::Ok(ResponseBody::Unit) => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn emit_event(
        &self,
        name: &str,
        value: Option<String>,
        args: Vec<String>,
        env: Vec<(String, String)>,
    ) -> Result<(), ClientError> {
        let request = Request::EmitEvent { name: name.to_string(), value, args, env };
        match self.send(&request).await? {
            Response::Ok(ResponseBody::Unit) => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn reload_config(&self) -> Result<(), ClientError> {
        match self.send(&Request::ReloadConfig).await? {
            Response::Ok(ResponseBody::Unit) => Ok(()),
            other => Self::reject(other),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("daemon is not running (is ojd started?)")]
    DaemonNotRunning { source: std::io::Error },
    #[error("connection closed before a response arrived")]
    ConnectionClosed,
    #[error(transparent)]
    Wire(#[from] oj_wire::WireError),
    #[error("control error: {0}")]
    Control(oj_wire::ControlError),
    #[error("unexpected response from daemon: {0}")]
    UnexpectedResponse(String),
}
