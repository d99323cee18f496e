// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Spawner: deliberately the thinnest layer in this codebase. Forks and
//! execs a job's process using only safe `std::process::Command` APIs.
//!
//! Resource limits, niceness, chroot, and ptrace setup are parsed and
//! carried on `JobConfig` but not enforced here — doing so would require an
//! unsafe `pre_exec` closure, which this workspace's lint configuration
//! forbids outright. See DESIGN.md for the accepted-but-unenforced stanzas.

use crate::error::{SpawnError, SpawnStep};
use oj_core::{ConsoleMode, JobProcess};
use std::process::{Command, Stdio};

/// Threshold above which a script body would be piped via `/dev/fd/N`
/// rather than passed with `-c`, per the documented shell-invocation
/// convention. Scripts this lineage spawns are short job stanzas, so this
/// repo always takes the `-c` path; the constant documents the boundary.
pub const SCRIPT_PIPE_THRESHOLD: usize = 4096;

/// Spawn `process` for a job, returning the child's pid.
///
/// If `process.script` is false and the body has no shell metacharacters,
/// it's split on whitespace and exec'd directly; otherwise a shell runs it
/// with `-e -c <body>`.
pub fn spawn(
    process: &JobProcess,
    console: ConsoleMode,
    env: &[(String, String)],
    chdir: Option<&std::path::Path>,
) -> Result<i32, SpawnError> {
    let mut command = build_command(process);

    apply_console(&mut command, console)
        .map_err(|e| SpawnError::new(SpawnStep::Console, format!("{console}"), e))?;

    for (key, value) in env {
        command.env(key, value);
    }

    if let Some(dir) = chdir {
        command.current_dir(dir);
    }

    let child = command
        .spawn()
        .map_err(|e| SpawnError::new(SpawnStep::Exec, process.body.clone(), e))?;
    Ok(child.id() as i32)
}

fn build_command(process: &JobProcess) -> Command {
    if !process.script && !has_shell_metacharacters(&process.body) {
        let mut parts = process.body.split_whitespace();
        let program = parts.next().unwrap_or_default();
        let mut command = Command::new(program);
        command.args(parts);
        command
    } else {
        let mut command = Command::new("/bin/sh");
        command.arg("-e").arg("-c").arg(&process.body);
        command
    }
}

fn has_shell_metacharacters(body: &str) -> bool {
    body.contains(['|', '&', ';', '<', '>', '(', ')', '$', '`', '\\', '"', '\'', '*', '?', '[', '~'])
}

fn apply_console(command: &mut Command, console: ConsoleMode) -> std::io::Result<()> {
    match console {
        ConsoleMode::None => {
            command.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
        }
        ConsoleMode::Logged => {
            command.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
        }
        ConsoleMode::Output | ConsoleMode::Owner => {
            command.stdin(Stdio::inherit()).stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "spawner_tests.rs"]
mod tests;
