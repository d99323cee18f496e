// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised while reading job-definition files.

use std::path::PathBuf;
use thiserror::Error;

/// A malformed stanza or structurally broken file, located by path and
/// 1-based line number wherever the reader has one (§6a).
#[derive(Debug, Error)]
pub enum RunbookError {
    #[error("{path}:{line}: unknown stanza {stanza:?}")]
    UnknownStanza { path: PathBuf, line: usize, stanza: String },

    #[error("{path}:{line}: {stanza} takes {expected}, got {found:?}")]
    BadArguments { path: PathBuf, line: usize, stanza: &'static str, expected: &'static str, found: String },

    #[error("{path}: `{stanza} script` is never closed with `end script`")]
    UnterminatedScript { path: PathBuf, stanza: &'static str },

    #[error("{path}:{line}: `instance` jobs are not supported")]
    UnsupportedStanza { path: PathBuf, line: usize },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RunbookError {
    pub fn path(&self) -> &PathBuf {
        match self {
            RunbookError::UnknownStanza { path, .. }
            | RunbookError::BadArguments { path, .. }
            | RunbookError::UnterminatedScript { path, .. }
            | RunbookError::UnsupportedStanza { path, .. }
            | RunbookError::Io { path, .. } => path,
        }
    }
}
