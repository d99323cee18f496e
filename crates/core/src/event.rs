// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events: the named, optionally valued records that drive job goals.
//!
//! An event with no value is an *edge*: a one-shot notification, enqueued
//! every time it fires. An event carrying a value is a *level*: a named
//! state variable whose current value is remembered by the [`EventStore`]
//! and only re-enqueued when that value actually changes.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Name of the event emitted once, at supervisor startup.
pub const STARTUP_EVENT: &str = "startup";
/// Name of the event that begins the shutdown process.
pub const SHUTDOWN_EVENT: &str = "shutdown";
/// Name of the event emitted when every job is goal=STOP, state=WAITING.
pub const STALLED_EVENT: &str = "stalled";
/// Name of the event emitted on a Control-Alt-Delete-equivalent signal.
pub const CTRLALTDEL_EVENT: &str = "ctrlaltdel";
/// Name of the event emitted on a keyboard-request-equivalent signal.
pub const KBDREQUEST_EVENT: &str = "kbdrequest";
/// Name of the event emitted when external power status changes.
pub const POWER_STATUS_EVENT: &str = "power-status-changed";

/// A named occurrence, optionally carrying a value, args, and environment.
///
/// `value.is_none()` marks an edge event; `value.is_some()` marks a level
/// event reporting its current value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<(String, String)>,
}

impl Event {
    /// A bare edge event with no args/env.
    pub fn edge(name: impl Into<String>) -> Self {
        Self { name: name.into(), value: None, args: Vec::new(), env: Vec::new() }
    }

    /// An edge event carrying args/env (e.g. the `cause` of a goal change).
    pub fn edge_with(
        name: impl Into<String>,
        args: Vec<String>,
        env: Vec<(String, String)>,
    ) -> Self {
        Self { name: name.into(), value: None, args, env }
    }

    /// A level event reporting `value`.
    pub fn level(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: Some(value.into()), args: Vec::new(), env: Vec::new() }
    }

    pub fn is_edge(&self) -> bool {
        self.value.is_none()
    }

    pub fn is_level(&self) -> bool {
        self.value.is_some()
    }

    /// Does this event satisfy a `start on`/`stop on` pattern?
    ///
    /// - Names must be equal.
    /// - A valueless pattern matches any event of the same name (edge or level).
    /// - A valued pattern matches only a level event carrying the same value;
    ///   an edge event never matches a value-bearing pattern.
    pub fn matches(&self, pattern: &EventPattern) -> bool {
        if self.name != pattern.name {
            return false;
        }
        match &pattern.value {
            None => true,
            Some(want) => self.value.as_deref() == Some(want.as_str()),
        }
    }

    /// One-line summary for logging.
    pub fn log_summary(&self) -> String {
        match &self.value {
            Some(v) => format!("{}={}", self.name, v),
            None => self.name.clone(),
        }
    }
}

/// A `start on` / `stop on` pattern matched against dispatched [`Event`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPattern {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl EventPattern {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), value: None }
    }

    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: Some(value.into()) }
    }
}

#[derive(Default)]
struct EventStoreInner {
    levels: HashMap<String, String>,
    queue: VecDeque<Event>,
}

/// Process-wide table of level-event values plus the FIFO dispatch queue.
///
/// Owned by the supervisor loop; never touched directly by signal handlers
/// (see the concurrency model's shared-resource policy).
pub struct EventStore {
    inner: Mutex<EventStoreInner>,
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EventStore {
    pub fn new() -> Self {
        Self { inner: Mutex::new(EventStoreInner::default()) }
    }

    /// Look up the current value of a level event, if one has ever been recorded.
    pub fn find(&self, name: &str) -> Option<String> {
        self.inner.lock().levels.get(name).cloned()
    }

    /// Append a fresh edge event to the dispatch queue. Edge events may be
    /// enqueued any number of times.
    pub fn emit_edge(&self, event: Event) -> Event {
        debug_assert!(event.is_edge(), "emit_edge called with a valued event");
        self.inner.lock().queue.push_back(event.clone());
        event
    }

    /// Record a level event's value; enqueue it only if the value changed.
    ///
    /// Returns the queued event on change, `None` if the value was
    /// unchanged (so nothing was enqueued).
    pub fn emit_level(&self, name: impl Into<String>, value: impl Into<String>) -> Option<Event> {
        let name = name.into();
        let value = value.into();
        let mut inner = self.inner.lock();
        if inner.levels.get(&name) == Some(&value) {
            return None;
        }
        inner.levels.insert(name.clone(), value.clone());
        let event = Event::level(name, value);
        inner.queue.push_back(event.clone());
        Some(event)
    }

    /// Drain every event currently queued, in FIFO order.
    ///
    /// Events emitted by side effects of processing this batch are appended
    /// to the same underlying queue and are picked up by a later call to
    /// `drain`, never by this one (the queue is swapped out up front).
    pub fn drain(&self) -> Vec<Event> {
        let mut inner = self.inner.lock();
        std::mem::take(&mut inner.queue).into_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().queue.len()
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
