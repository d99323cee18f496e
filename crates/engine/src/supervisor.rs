// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Supervisor`: the single value owning the `JobTable`, `EventStore`, and
//! timer wheel, and the cooperative main loop that drives them. Everything
//! mutates through loop-driven code paths; signal handlers only set flags.

use crate::dispatcher::{self, StallDetector};
use crate::effect::Effect;
use crate::error::{KillError, SpawnError};
use crate::reaper;
use crate::timers::TimerWheel;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use oj_core::{Clock, Event, EventStore, JobConfig, JobId, JobTable, SystemClock, TimerKind};
use std::time::Duration;

/// Everything the single-threaded main loop owns. Constructed once at
/// startup; never shared across threads.
pub struct Supervisor<C: Clock = SystemClock> {
    pub table: JobTable,
    pub store: EventStore,
    pub timers: TimerWheel,
    pub clock: C,
    pub paused: bool,
    stall: StallDetector,
    reload_hook: Option<ReloadHook>,
}

/// An action queued by the control listener (§6b) to run inside the main
/// loop's own thread, so the listener never touches the `JobTable` directly.
pub type ControlAction = Box<dyn FnOnce(&mut Supervisor<SystemClock>) + Send>;

/// Re-run on every `SIGHUP`, set once at startup by the daemon binary. Kept
/// as an opaque closure (rather than a direct call into a runbook reload
/// function) so `oj-engine` never depends on `oj-runbook`, mirroring how
/// `ControlAction` keeps this crate free of `oj-wire` too.
pub type ReloadHook = Box<dyn Fn(&mut Supervisor<SystemClock>) + Send>;

impl Supervisor<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Install the closure `SIGHUP` invokes (§6/§6c's "reload configs").
    /// The daemon binary builds this capturing its `jobs_dir`, the same way
    /// the control listener builds a `ControlAction` capturing it.
    pub fn set_reload_hook(&mut self, hook: ReloadHook) {
        self.reload_hook = Some(hook);
    }

    /// The cooperative main loop (§4.8/§5): each iteration reaps, dispatches,
    /// fires due timers, then blocks in `tokio::select!` until a signal
    /// fires, a queued control action arrives, or the next timer deadline
    /// arrives. Runs until `shutdown` fires `SIGTERM` a second time (the
    /// first is logged and ignored, per §6b's re-exec-for-upgrade being out
    /// of scope here). `control_rx` carries closures built by the control
    /// socket listener (§6b) from a parsed `Request` — the listener itself
    /// never sees the `JobTable`.
    pub async fn run(
        &mut self,
        mut control_rx: tokio::sync::mpsc::Receiver<ControlAction>,
    ) -> Result<(), std::io::Error> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigchld = signal(SignalKind::child())?;
        let mut sighup = signal(SignalKind::hangup())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigwinch = signal(SignalKind::window_change())?;
        let mut sigpwr = signal(SignalKind::from_raw(30))?;
        let mut sigtstp = signal(SignalKind::from_raw(20))?;
        let mut sigcont = signal(SignalKind::from_raw(18))?;
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut term_seen_once = false;

        loop {
            if !self.paused {
                self.reap();
                self.dispatch();
            }
            self.poll_pid_discovery();
            self.tick_timers();

            tokio::select! {
                _ = sigchld.recv() => {}
                _ = sighup.recv() => {
                    match self.reload_hook.take() {
                        Some(hook) => {
                            hook(self);
                            self.reload_hook = Some(hook);
                        }
                        None => tracing::info!("SIGHUP: no reload hook configured, ignoring"),
                    }
                }
                _ = sigint.recv() => {
                    self.store.emit_edge(Event::edge(oj_core::CTRLALTDEL_EVENT));
                }
                _ = sigwinch.recv() => {
                    self.store.emit_edge(Event::edge(oj_core::KBDREQUEST_EVENT));
                }
                _ = sigpwr.recv() => {
                    self.store.emit_edge(Event::edge(oj_core::POWER_STATUS_EVENT));
                }
                _ = sigtstp.recv() => {
                    self.paused = true;
                }
                _ = sigcont.recv() => {
                    self.paused = false;
                }
                _ = sigterm.recv() => {
                    if term_seen_once {
                        self.store.emit_edge(Event::edge(oj_core::SHUTDOWN_EVENT));
                        return Ok(());
                    }
                    term_seen_once = true;
                    tracing::info!("SIGTERM: re-exec for live upgrade is out of scope, ignoring");
                }
                action = control_rx.recv() => {
                    if let Some(action) = action {
                        action(self);
                    }
                }
                _ = tokio::time::sleep(self.next_wait()) => {}
            }
        }
    }
}

impl Default for Supervisor<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Supervisor<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            table: JobTable::new(),
            store: EventStore::new(),
            timers: TimerWheel::new(),
            clock,
            paused: false,
            stall: StallDetector::new(),
            reload_hook: None,
        }
    }

    pub fn load_job(&mut self, config: JobConfig) -> JobId {
        let job = oj_core::Job::new(config, self.clock.epoch_ms());
        let id = job.id;
        self.table.insert(job);
        id
    }

    pub fn emit_startup(&mut self) {
        self.store.emit_edge(Event::edge(oj_core::STARTUP_EVENT));
    }

    /// Run the Reaper, then execute every `Effect` it produced.
    pub fn reap(&mut self) {
        let effects = reaper::reap_all(&mut self.table, &self.clock);
        self.execute_all(effects);
        self.prune_deleted();
    }

    /// Run the Dispatcher until the queue empties and no new events were
    /// produced by the pass (§4.8 step 3), then check for a stall.
    pub fn dispatch(&mut self) {
        loop {
            if self.store.is_empty() {
                break;
            }
            let effects = dispatcher::dispatch(&mut self.table, &self.store, &self.clock);
            self.execute_all(effects);
        }
        self.prune_deleted();
        if let Some(stalled) = self.stall.check(&self.table) {
            self.store.emit_edge(stalled);
        }
    }

    /// Remove any job that reached WAITING with `delete` set (§4.3's
    /// WAITING-entry cleanup, driven here rather than inside
    /// `state_machine::change_state` since only the table owner can
    /// actually drop the `Job`).
    fn prune_deleted(&mut self) {
        let gone: Vec<String> = self
            .table
            .iter()
            .filter(|job| job.delete && job.state == oj_core::JobState::Waiting)
            .map(|job| job.name.clone())
            .collect();
        for name in gone {
            self.table.remove(&name);
        }
    }

    /// Escalate any kill timers that have expired, and fail any `daemon`
    /// job whose pid-discovery timer expired without a pid ever arriving.
    pub fn tick_timers(&mut self) {
        for kind in self.timers.expired(&self.clock) {
            let effects = match kind {
                TimerKind::Kill(job_id) => self.escalate(job_id),
                TimerKind::PidDiscovery(job_id) => self.fail_pid_discovery(job_id),
            };
            self.execute_all(effects);
        }
    }

    /// Check every `daemon` job still waiting on pid discovery; for each one
    /// found, cancel its failure timer and record the discovered pid (§4.4).
    /// Run unconditionally, even while paused, so a pid that shows up during
    /// a `SIGTSTP` pause isn't lost to the timer expiring the instant we
    /// resume.
    pub fn poll_pid_discovery(&mut self) {
        for (job_id, pid) in crate::pid_discovery::poll(&mut self.table) {
            self.timers.cancel(TimerKind::PidDiscovery(job_id));
            let Some(job) = find_job_mut(&mut self.table, job_id) else { continue };
            job.pid_discovery_timer_armed = false;
            job.slot.main_pid = Some(pid);
            job.slot.process_state = oj_core::ProcessState::Active;
            let name = job.name.clone();
            tracing::info!(job = %name, pid, "daemon pid discovered");
            self.table.sync_pid_index(&name);
        }
    }

    fn escalate(&mut self, job_id: JobId) -> Vec<Effect> {
        let Some(job) = find_job_mut(&mut self.table, job_id) else { return Vec::new() };
        crate::killer::escalate(job)
    }

    fn fail_pid_discovery(&mut self, job_id: JobId) -> Vec<Effect> {
        let clock = self.clock.clone();
        let Some(job) = find_job_mut(&mut self.table, job_id) else { return Vec::new() };
        job.pid_discovery_timer_armed = false;
        job.failed = true;
        job.failed_state = Some(job.state);
        job.goal = oj_core::JobGoal::Stop;
        crate::state_machine::change_state(job, &clock)
    }

    /// Perform every effect produced by a transition, in order, feeding any
    /// resulting events back into the dispatch queue for the next pass.
    pub fn execute_all(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.execute(effect);
        }
    }

    fn execute(&mut self, effect: Effect) {
        let started = self.clock.now();
        let name = effect.name();
        match self.execute_inner(&effect) {
            Ok(()) => {
                tracing::debug!(
                    effect = name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "effect applied"
                );
            }
            Err(err) => {
                tracing::error!(effect = name, error = %err, "effect failed");
            }
        }
    }

    fn execute_inner(&mut self, effect: &Effect) -> Result<(), EffectError> {
        match effect {
            Effect::EmitEdge(event) => {
                self.store.emit_edge(event.clone());
                Ok(())
            }
            Effect::EmitLevel { name, value } => {
                self.store.emit_level(name.clone(), value.clone());
                Ok(())
            }
            Effect::Spawn { job_id, slot, process, .. } => {
                self.apply_spawn(*job_id, *slot, process)
            }
            Effect::SendTerm { pid, .. } => send_signal(*pid, Signal::SIGTERM),
            Effect::SendKill { pid, .. } => send_signal(*pid, Signal::SIGKILL),
            Effect::SetTimer { kind, duration } => {
                self.timers.arm(&self.clock, *kind, *duration);
                Ok(())
            }
            Effect::CancelTimer { kind } => {
                self.timers.cancel(*kind);
                Ok(())
            }
        }
    }

    fn apply_spawn(
        &mut self,
        job_id: JobId,
        slot: oj_core::PidSlot,
        process: &oj_core::JobProcess,
    ) -> Result<(), EffectError> {
        let Some(job) = find_job_mut(&mut self.table, job_id) else { return Ok(()) };
        let console = job.config.console;
        let env = job.config.env.clone();
        let chdir = job.config.chdir.clone();
        let name = job.name.clone();

        let pid = crate::spawner::spawn(process, console, &env, chdir.as_deref())?;

        let pid_timeout = {
            let Some(job) = find_job_mut(&mut self.table, job_id) else { return Ok(()) };
            match slot {
                oj_core::PidSlot::Main => job.slot.main_pid = Some(pid),
                oj_core::PidSlot::Aux => job.slot.aux_pid = Some(pid),
            }
            job.slot.process_state = oj_core::ProcessState::Active;
            if job.config.daemon {
                job.pid_discovery_timer_armed = true;
                Some(job.config.pid_timeout)
            } else {
                None
            }
        };

        if let Some(timeout) = pid_timeout {
            self.timers.arm(&self.clock, TimerKind::PidDiscovery(job_id), timeout);
        }
        self.table.sync_pid_index(&name);
        Ok(())
    }

    /// Shortest wait before the next loop iteration must do something: the
    /// next armed timer's deadline, or a default idle tick.
    pub fn next_wait(&self) -> Duration {
        self.timers.next_deadline(&self.clock).unwrap_or(Duration::from_secs(1))
    }
}

/// Look up a job by id rather than name. `JobTable` indexes by name and pid
/// only; this is the one place the engine needs id-keyed lookup (timer
/// expiry callbacks only carry a `JobId`), so it pays for the linear scan
/// rather than adding a third index to `JobTable` for it.
fn find_job_mut(table: &mut JobTable, job_id: JobId) -> Option<&mut oj_core::Job> {
    let name = table.iter().find(|j| j.id == job_id).map(|j| j.name.clone())?;
    table.get_mut(&name)
}

fn send_signal(pid: i32, sig: Signal) -> Result<(), EffectError> {
    match signal::kill(Pid::from_raw(pid), sig) {
        Ok(()) => Ok(()),
        Err(nix::Error::ESRCH) => Ok(()), // already dead, treat as reaped (§7)
        Err(source) => Err(KillError::Signal { pid, source }.into()),
    }
}

#[derive(Debug, thiserror::Error)]
enum EffectError {
    #[error(transparent)]
    Spawn(#[from] SpawnError),
    #[error(transparent)]
    Kill(#[from] KillError),
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
