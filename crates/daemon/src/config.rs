// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: state-directory resolution and the paths derived
//! from it (§6c).

use crate::lifecycle::LifecycleError;
use std::path::PathBuf;

/// Resolve the state directory: `OJ_STATE_DIR` > `XDG_STATE_HOME/oj` >
/// `~/.local/state/oj`.
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("OJ_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("oj"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/oj"))
}

/// Daemon configuration, derived from a resolved state directory plus any
/// CLI overrides (§6c).
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub jobs_dir: PathBuf,
    pub socket_path: PathBuf,
    pub lock_path: PathBuf,
    pub log_path: PathBuf,
    pub foreground: bool,
}

impl Config {
    pub fn load(state_dir_override: Option<PathBuf>, jobs_dir_override: Option<PathBuf>, foreground: bool) -> Result<Self, LifecycleError> {
        let state_dir = state_dir_override.map(Ok).unwrap_or_else(state_dir)?;
        let jobs_dir = jobs_dir_override.unwrap_or_else(|| state_dir.join("jobs.d"));
        Ok(Self {
            socket_path: state_dir.join("control.sock"),
            lock_path: state_dir.join("ojd.lock"),
            log_path: state_dir.join("logs"),
            jobs_dir,
            state_dir,
            foreground,
        })
    }
}
