// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oj-engine: the side-effecting half of the job supervisor. `oj-core`
//! defines the data model; this crate defines the state machine's transition
//! logic and the primitives (Spawner, Killer, Reaper, Dispatcher, timer
//! wheel) that turn its `Effect`s into real signals, forks, and timers, plus
//! the `Supervisor` that owns and drives all of it.

pub mod dispatcher;
pub mod effect;
pub mod error;
pub mod killer;
pub mod pid_discovery;
pub mod reaper;
pub mod spawner;
pub mod state_machine;
pub mod supervisor;
pub mod timers;

pub use dispatcher::{dispatch, StallDetector};
pub use effect::{Effect, ScriptKind};
pub use error::{KillError, SpawnError, SpawnStep};
pub use killer::kill;
pub use reaper::reap_all;
pub use spawner::spawn;
pub use state_machine::{change_state, next_state, start, stop};
pub use supervisor::{ControlAction, ReloadHook, Supervisor};
pub use timers::TimerWheel;
