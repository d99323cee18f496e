// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job configuration and the runtime `Job` record.
//!
//! `JobConfig` is the immutable, parsed description of a job (produced by
//! the runbook reader); `Job` is the mutable runtime instance tracked by
//! the `JobTable` — its `goal`/`state`/`ProcessSlot` evolve under the state
//! machine in `oj-engine`.

use crate::event::{Event, EventPattern};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

crate::define_id! {
    /// Unique identifier for a job instance.
    pub struct JobId("job-");
}

/// How the job's stdin/stdout/stderr should be arranged by the Spawner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleMode {
    /// Output captured into the supervisor's log.
    Logged,
    /// Output connected to the console device.
    Output,
    /// Console ownership (controlling terminal) transferred to the job.
    Owner,
    /// All three streams connected to `/dev/null`.
    None,
}

impl Default for ConsoleMode {
    fn default() -> Self {
        ConsoleMode::Logged
    }
}

crate::simple_display! {
    ConsoleMode {
        Logged => "logged",
        Output => "output",
        Owner => "owner",
        None => "none",
    }
}

/// A soft/hard resource limit pair for one `RLIMIT_*` resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimit {
    pub soft: u64,
    pub hard: u64,
}

/// A command or embedded script body for one of a job's process slots.
///
/// `script == true` forces shell execution even if `body` has no shell
/// metacharacters (set by a `script ... end script` stanza); `script ==
/// false` lets the Spawner decide based on `body`'s content (set by `exec`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobProcess {
    pub body: String,
    pub script: bool,
}

impl JobProcess {
    pub fn exec(body: impl Into<String>) -> Self {
        Self { body: body.into(), script: false }
    }

    pub fn script(body: impl Into<String>) -> Self {
        Self { body: body.into(), script: true }
    }
}

/// Immutable, parsed description of a job. Produced by the runbook reader;
/// never mutated once loaded — a config change produces a new `JobConfig`
/// and the existing `Job`'s runtime state is left alone if the two are
/// identical (see the round-trip idempotence property).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    pub command: JobProcess,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_start: Option<JobProcess>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_start: Option<JobProcess>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_stop: Option<JobProcess>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_stop: Option<JobProcess>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<JobProcess>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respawn_script: Option<JobProcess>,

    #[serde(default)]
    pub start_events: Vec<EventPattern>,
    #[serde(default)]
    pub stop_events: Vec<EventPattern>,
    #[serde(default)]
    pub emits: Vec<String>,

    #[serde(default)]
    pub respawn: bool,
    #[serde(default)]
    pub daemon: bool,
    #[serde(default)]
    pub service: bool,
    #[serde(default)]
    pub instance: bool,

    #[serde(default = "default_respawn_limit")]
    pub respawn_limit: u32,
    #[serde(default = "default_respawn_interval")]
    pub respawn_interval: Duration,
    #[serde(default = "default_kill_timeout")]
    pub kill_timeout: Duration,
    #[serde(default = "default_pid_timeout")]
    pub pid_timeout: Duration,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid_binary: Option<PathBuf>,
    #[serde(default)]
    pub normalexit: Vec<i32>,

    #[serde(default)]
    pub console: ConsoleMode,
    #[serde(default)]
    pub env: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub umask: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nice: Option<i32>,
    #[serde(default)]
    pub limits: Vec<(String, ResourceLimit)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chroot: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chdir: Option<PathBuf>,
}

fn default_respawn_limit() -> u32 {
    10
}

fn default_respawn_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_kill_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_pid_timeout() -> Duration {
    Duration::from_secs(10)
}

impl JobConfig {
    /// A minimal config: just a name and a main command, everything else defaulted.
    pub fn new(name: impl Into<String>, command: JobProcess) -> Self {
        Self {
            name: name.into(),
            description: None,
            author: None,
            version: None,
            command,
            pre_start: None,
            post_start: None,
            pre_stop: None,
            post_stop: None,
            stop: None,
            respawn_script: None,
            start_events: Vec::new(),
            stop_events: Vec::new(),
            emits: Vec::new(),
            respawn: false,
            daemon: false,
            service: false,
            instance: false,
            respawn_limit: default_respawn_limit(),
            respawn_interval: default_respawn_interval(),
            kill_timeout: default_kill_timeout(),
            pid_timeout: default_pid_timeout(),
            pid_file: None,
            pid_binary: None,
            normalexit: Vec::new(),
            console: ConsoleMode::default(),
            env: Vec::new(),
            umask: None,
            nice: None,
            limits: Vec::new(),
            chroot: None,
            chdir: None,
        }
    }

    pub fn builder(name: impl Into<String>, command: JobProcess) -> JobConfigBuilder {
        JobConfigBuilder { config: JobConfig::new(name, command) }
    }

    /// Does the emitted exit code count as a clean exit even though it's nonzero?
    pub fn is_normal_exit(&self, code: i32) -> bool {
        code == 0 || self.normalexit.contains(&code)
    }
}

/// Builder for `JobConfig`, used by the runbook reader and tests.
pub struct JobConfigBuilder {
    config: JobConfig,
}

impl JobConfigBuilder {
    pub fn pre_start(mut self, p: JobProcess) -> Self {
        self.config.pre_start = Some(p);
        self
    }
    pub fn post_start(mut self, p: JobProcess) -> Self {
        self.config.post_start = Some(p);
        self
    }
    pub fn pre_stop(mut self, p: JobProcess) -> Self {
        self.config.pre_stop = Some(p);
        self
    }
    pub fn post_stop(mut self, p: JobProcess) -> Self {
        self.config.post_stop = Some(p);
        self
    }
    pub fn stop(mut self, p: JobProcess) -> Self {
        self.config.stop = Some(p);
        self
    }
    pub fn respawn_script(mut self, p: JobProcess) -> Self {
        self.config.respawn_script = Some(p);
        self
    }
    pub fn start_on(mut self, pattern: EventPattern) -> Self {
        self.config.start_events.push(pattern);
        self
    }
    pub fn stop_on(mut self, pattern: EventPattern) -> Self {
        self.config.stop_events.push(pattern);
        self
    }

    pub fn set_respawn(mut self, v: bool) -> Self {
        self.config.respawn = v;
        self
    }
    pub fn set_daemon(mut self, v: bool) -> Self {
        self.config.daemon = v;
        self
    }
    pub fn set_service(mut self, v: bool) -> Self {
        self.config.service = v;
        self
    }
    pub fn set_instance(mut self, v: bool) -> Self {
        self.config.instance = v;
        self
    }
    pub fn set_respawn_limit(mut self, v: u32) -> Self {
        self.config.respawn_limit = v;
        self
    }
    pub fn set_respawn_interval(mut self, v: Duration) -> Self {
        self.config.respawn_interval = v;
        self
    }
    pub fn set_kill_timeout(mut self, v: Duration) -> Self {
        self.config.kill_timeout = v;
        self
    }
    pub fn set_pid_timeout(mut self, v: Duration) -> Self {
        self.config.pid_timeout = v;
        self
    }
    pub fn set_console(mut self, v: ConsoleMode) -> Self {
        self.config.console = v;
        self
    }
    pub fn set_normalexit(mut self, v: Vec<i32>) -> Self {
        self.config.normalexit = v;
        self
    }
    pub fn set_env(mut self, v: Vec<(String, String)>) -> Self {
        self.config.env = v;
        self
    }
    pub fn push_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.env.push((key.into(), value.into()));
        self
    }
    pub fn set_umask(mut self, v: u32) -> Self {
        self.config.umask = Some(v);
        self
    }
    pub fn set_nice(mut self, v: i32) -> Self {
        self.config.nice = Some(v);
        self
    }
    pub fn push_limit(mut self, name: impl Into<String>, limit: ResourceLimit) -> Self {
        self.config.limits.push((name.into(), limit));
        self
    }
    pub fn set_pid_file(mut self, v: Option<PathBuf>) -> Self {
        self.config.pid_file = v;
        self
    }
    pub fn set_pid_binary(mut self, v: Option<PathBuf>) -> Self {
        self.config.pid_binary = v;
        self
    }
    pub fn set_chroot(mut self, v: Option<PathBuf>) -> Self {
        self.config.chroot = v;
        self
    }
    pub fn set_chdir(mut self, v: Option<PathBuf>) -> Self {
        self.config.chdir = v;
        self
    }
    pub fn description_str(mut self, v: impl Into<String>) -> Self {
        self.config.description = Some(v.into());
        self
    }
    pub fn author_str(mut self, v: impl Into<String>) -> Self {
        self.config.author = Some(v.into());
        self
    }
    pub fn version_str(mut self, v: impl Into<String>) -> Self {
        self.config.version = Some(v.into());
        self
    }
    pub fn emits_extend(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.config.emits.extend(names);
        self
    }

    /// A builder seeded with `name` and a placeholder command, for callers
    /// (the runbook reader) that only learn the real command partway
    /// through a file and fill it in via `build_with` at the end.
    pub fn default_for(name: impl Into<String>) -> Self {
        JobConfigBuilder { config: JobConfig::new(name, JobProcess::exec("")) }
    }

    /// Finish the builder, replacing its placeholder command with `command`.
    pub fn build_with(mut self, command: JobProcess) -> JobConfig {
        self.config.command = command;
        self.config
    }

    pub fn build(self) -> JobConfig {
        self.config
    }
}

/// Goal: the target condition the state machine is driving the job toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobGoal {
    Start,
    Stop,
}

impl Default for JobGoal {
    fn default() -> Self {
        JobGoal::Stop
    }
}

crate::simple_display! {
    JobGoal {
        Start => "start",
        Stop => "stop",
    }
}

/// State: the job's current point in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Waiting,
    Starting,
    Running,
    Stopping,
    Respawning,
}

impl Default for JobState {
    fn default() -> Self {
        JobState::Waiting
    }
}

crate::simple_display! {
    JobState {
        Waiting => "waiting",
        Starting => "starting",
        Running => "running",
        Stopping => "stopping",
        Respawning => "respawning",
    }
}

/// Whether the job's main process has been spawned, is actively running,
/// or has been sent a kill signal and is awaiting reaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessState {
    None,
    Spawned,
    Active,
    Killed,
}

impl Default for ProcessState {
    fn default() -> Self {
        ProcessState::None
    }
}

crate::simple_display! {
    ProcessState {
        None => "none",
        Spawned => "spawned",
        Active => "active",
        Killed => "killed",
    }
}

/// The pid(s) a job currently occupies and their lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSlot {
    pub main_pid: Option<i32>,
    pub aux_pid: Option<i32>,
    pub process_state: ProcessState,
}

impl ProcessSlot {
    pub fn is_idle(&self) -> bool {
        self.main_pid.is_none() && self.aux_pid.is_none() && self.process_state == ProcessState::None
    }
}

/// A runtime job instance: `JobConfig` plus everything the state machine,
/// Reaper, and Killer mutate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub name: String,
    pub config: JobConfig,

    pub goal: JobGoal,
    pub state: JobState,
    pub slot: ProcessSlot,

    /// The event that drove the most recent goal change; supplies args/env
    /// to scripts and is cleared on reaching WAITING.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Event>,
    /// An event this job is currently emitting whose completion is awaited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<Event>,

    #[serde(default)]
    pub failed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_state: Option<JobState>,
    #[serde(default)]
    pub exit_status: i32,

    #[serde(default)]
    pub kill_timer_armed: bool,
    #[serde(default)]
    pub pid_discovery_timer_armed: bool,

    #[serde(default)]
    pub respawn_count: u32,
    #[serde(default)]
    pub respawn_window_start_ms: u64,

    /// Marks a job whose config was removed; freed when it next reaches WAITING.
    #[serde(default)]
    pub delete: bool,
}

impl Job {
    pub fn new(config: JobConfig, now_epoch_ms: u64) -> Self {
        Self {
            id: JobId::new(),
            name: config.name.clone(),
            config,
            goal: JobGoal::Stop,
            state: JobState::Waiting,
            slot: ProcessSlot::default(),
            cause: None,
            blocked: None,
            failed: false,
            failed_state: None,
            exit_status: 0,
            kill_timer_armed: false,
            pid_discovery_timer_armed: false,
            respawn_count: 0,
            respawn_window_start_ms: now_epoch_ms,
            delete: false,
        }
    }

    /// Universal invariant: WAITING jobs hold no pid and no armed kill timer.
    pub fn waiting_invariant_holds(&self) -> bool {
        if self.state != JobState::Waiting {
            return true;
        }
        self.slot.main_pid.is_none() && !self.kill_timer_armed
    }

    pub fn is_at_rest(&self) -> bool {
        self.goal == JobGoal::Stop && self.state == JobState::Waiting
    }
}

crate::builder! {
    pub struct JobBuilder => Job {
        into {
            name: String = "test-job",
        }
        set {
            id: JobId = JobId::new(),
            config: JobConfig = JobConfig::new("test-job", JobProcess::exec("/bin/true")),
            goal: JobGoal = JobGoal::Stop,
            state: JobState = JobState::Waiting,
            slot: ProcessSlot = ProcessSlot::default(),
            failed: bool = false,
            exit_status: i32 = 0,
            kill_timer_armed: bool = false,
            pid_discovery_timer_armed: bool = false,
            respawn_count: u32 = 0,
            respawn_window_start_ms: u64 = 0,
            delete: bool = false,
        }
        option {
            cause: Event = None,
            blocked: Event = None,
            failed_state: JobState = None,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
