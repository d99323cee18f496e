// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response DTOs for the control socket (§6b).

use serde::{Deserialize, Serialize};

/// One line of the control protocol, sent by a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    EmitEvent {
        name: String,
        #[serde(default)]
        value: Option<String>,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        env: Vec<(String, String)>,
    },
    ListJobs,
    GetJob { name: String },
    StartJob { name: String },
    StopJob { name: String },
    ReloadConfig,
}

/// Snapshot of one job, shaped for `ListJobs`/`GetJob`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobSummary {
    pub name: String,
    /// Canonical path rooted at the manager; non-alphanumeric bytes of
    /// `name` are percent-escaped (§6b).
    pub path: String,
    pub goal: String,
    pub state: String,
    pub pid: Option<i32>,
    pub failed: bool,
}

/// The success payload half of a `Response` (the `{"ok": ...}` content).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ResponseBody {
    Unit,
    Job(JobSummary),
    Jobs(Vec<JobSummary>),
}

/// One line of the control protocol, sent back to a client. Serializes as
/// `{"ok": ...}` or `{"err": {...}}` (§6b).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Response {
    Ok(ResponseBody),
    Err(ControlError),
}

impl Response {
    pub fn ok(body: ResponseBody) -> Self {
        Response::Ok(body)
    }

    pub fn err(kind: ControlErrorKind, message: impl Into<String>) -> Self {
        Response::Err(ControlError { kind, message: message.into() })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, thiserror::Error)]
#[error("{kind:?}: {message}")]
pub struct ControlError {
    pub kind: ControlErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ControlErrorKind {
    /// `GetJob`/`StartJob`/`StopJob` named a job not present in the table.
    NotFound,
    /// The request line didn't parse (bad JSON, unknown `op`, missing field).
    Protocol,
    /// A lower layer (spawn, runbook reload) failed applying the request.
    Internal,
}

/// Percent-escape `name` into the canonical control-surface path (§6b):
/// bytes outside `[A-Za-z0-9]` become `_XX` (two lowercase hex digits).
pub fn job_path(name: &str) -> String {
    let mut out = String::from("/job/");
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() {
            out.push(byte as char);
        } else {
            out.push('_');
            out.push_str(&format!("{byte:02x}"));
        }
    }
    out
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
