// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by the side-effecting layer: spawning children and
//! escalating a stop into a kill.

use thiserror::Error;

/// Which step of preparing a child process failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnStep {
    Console,
    Environ,
    Chdir,
    Exec,
}

oj_core::simple_display! {
    SpawnStep {
        Console => "console",
        Environ => "environ",
        Chdir => "chdir",
        Exec => "exec",
    }
}

/// A failure at one documented step of preparing or exec'ing a child.
#[derive(Debug, Error)]
#[error("spawn failed at step={step} arg={arg}: {source}")]
pub struct SpawnError {
    pub step: SpawnStep,
    pub arg: String,
    #[source]
    pub source: std::io::Error,
}

impl SpawnError {
    pub fn new(step: SpawnStep, arg: impl Into<String>, source: std::io::Error) -> Self {
        Self { step, arg: arg.into(), source }
    }
}

/// Errors raised while sending a signal to a job's process.
#[derive(Debug, Error)]
pub enum KillError {
    #[error("send signal to pid {pid}: {source}")]
    Signal {
        pid: i32,
        #[source]
        source: nix::Error,
    },
}
