// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared scaffolding for end-to-end specs: runs `ojd` as a background
//! child process against an isolated state directory and drives it with
//! the `oj` client binary.

use assert_cmd::cargo::cargo_bin;
use std::path::PathBuf;
use std::process::{Child, Command};
use std::time::{Duration, Instant};

pub const WAIT_MAX_MS: u64 = 5_000;

/// A running `ojd` bound to a throwaway state directory. Killed on drop.
pub struct Daemon {
    child: Child,
    pub state_dir: PathBuf,
    _temp: tempfile::TempDir,
}

impl Daemon {
    /// Start `ojd` against a fresh state directory, with `jobs` written as
    /// `<name>.conf` files under `jobs.d` before the daemon loads them.
    pub fn start(jobs: &[(&str, &str)]) -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        let state_dir = temp.path().join("state");
        let jobs_dir = state_dir.join("jobs.d");
        std::fs::create_dir_all(&jobs_dir).expect("create jobs.d");
        for (name, contents) in jobs {
            std::fs::write(jobs_dir.join(format!("{name}.conf")), contents).expect("write job conf");
        }

        let child = Command::new(cargo_bin("ojd"))
            .arg("--state-dir")
            .arg(&state_dir)
            .arg("--foreground")
            .spawn()
            .expect("spawn ojd");

        let daemon = Daemon { child, state_dir, _temp: temp };
        daemon.wait_for_socket();
        daemon
    }

    /// Start `ojd` with no job-definition files at all.
    pub fn start_empty() -> Self {
        Self::start(&[])
    }

    fn wait_for_socket(&self) {
        let found = wait_for(WAIT_MAX_MS, || self.state_dir.join("control.sock").exists());
        assert!(found, "ojd did not create control.sock in time");
    }

    /// An `oj` invocation pre-pointed at this daemon's state directory.
    pub fn oj(&self) -> Command {
        let mut cmd = Command::new(cargo_bin("oj"));
        cmd.arg("--state-dir").arg(&self.state_dir);
        cmd
    }

    pub fn jobs_dir(&self) -> PathBuf {
        self.state_dir.join("jobs.d")
    }

    pub fn write_job(&self, name: &str, contents: &str) {
        std::fs::write(self.jobs_dir().join(format!("{name}.conf")), contents).expect("write job conf");
    }

    pub fn remove_job(&self, name: &str) {
        let _ = std::fs::remove_file(self.jobs_dir().join(format!("{name}.conf")));
    }

    pub fn pid(&self) -> i32 {
        self.child.id() as i32
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Poll `condition` every 25ms until it's true or `max_ms` elapses.
pub fn wait_for(max_ms: u64, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
}

/// Run `oj --format json <args>` against `daemon` and parse stdout as JSON.
pub fn oj_json(daemon: &Daemon, args: &[&str]) -> serde_json::Value {
    let mut cmd = daemon.oj();
    cmd.arg("--format").arg("json").args(args);
    let output = cmd.output().expect("run oj");
    assert!(output.status.success(), "oj {args:?} failed: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap_or_else(|err| {
        panic!("oj {args:?} did not print valid JSON: {err}\nstdout: {}", String::from_utf8_lossy(&output.stdout))
    })
}

pub fn oj_ok(daemon: &Daemon, args: &[&str]) {
    let output = daemon.oj().args(args).output().expect("run oj");
    assert!(output.status.success(), "oj {args:?} failed: {}", String::from_utf8_lossy(&output.stderr));
}
