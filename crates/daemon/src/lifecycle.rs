// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-instance lock and directory setup. No WAL/snapshot machinery —
//! this core does not persist across reboots (Non-goal).

use crate::config::Config;
use fs2::FileExt;
use std::fs::File;
use std::io::Write;

/// Holds the daemon's single-instance lock; releases it on drop.
pub struct Lock {
    #[allow(dead_code)]
    file: File,
}

/// Create `state_dir`/`jobs_dir`/`log_path` if missing, then take an
/// exclusive, non-blocking lock on `lock_path`. A contended lock means
/// another instance is already running — a startup error, not a panic.
pub fn acquire(config: &Config) -> Result<Lock, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;
    std::fs::create_dir_all(&config.jobs_dir)?;
    std::fs::create_dir_all(&config.log_path)?;

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&config.lock_path)?;
    file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;
    file.set_len(0)?;
    writeln!(file, "{}", std::process::id())?;

    Ok(Lock { file })
}

/// Remove the control socket so a stale file doesn't block the next start.
pub fn release_socket(config: &Config) {
    if config.socket_path.exists() {
        if let Err(err) = std::fs::remove_file(&config.socket_path) {
            tracing::warn!(error = %err, "failed to remove control socket on shutdown");
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("could not determine state directory")]
    NoStateDir,
    #[error("failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
