// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stanza-per-line reader for job-definition files (§6a).
//!
//! Hand-written, not a port of any grammar-engine-based parser — the
//! format is too regular (one keyword plus arguments per line, with a
//! `script`/`end script` escape hatch for embedded shell) to need one.

use crate::error::RunbookError;
use oj_core::{ConsoleMode, EventPattern, JobConfig, JobConfigBuilder, JobProcess, ResourceLimit};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub type JobName = String;

/// Reads every `*.conf` file in `dir`, one job per file. A file's own
/// parse failures never prevent the rest of the directory from loading.
pub struct Runbook;

impl Runbook {
    pub fn load_dir(dir: &Path) -> (Vec<(JobName, JobConfig)>, Vec<RunbookError>) {
        let mut configs = Vec::new();
        let mut errors = Vec::new();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(source) => {
                errors.push(RunbookError::Io { path: dir.to_path_buf(), source });
                return (configs, errors);
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "conf"))
            .collect();
        paths.sort();

        for path in paths {
            match parse_file(&path) {
                Ok((config, mut file_errors)) => {
                    errors.append(&mut file_errors);
                    if let Some(config) = config {
                        configs.push((config.name.clone(), config));
                    }
                }
                Err(err) => errors.push(err),
            }
        }

        (configs, errors)
    }
}

fn parse_file(path: &Path) -> Result<(Option<JobConfig>, Vec<RunbookError>), RunbookError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|source| RunbookError::Io { path: path.to_path_buf(), source })?;
    let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("job").to_string();
    parse_str(path, &name, &contents)
}

/// Parse one file's text, given its job name. Exposed directly for tests
/// that don't want to touch the filesystem.
pub fn parse_str(
    path: &Path,
    name: &str,
    contents: &str,
) -> Result<(Option<JobConfig>, Vec<RunbookError>), RunbookError> {
    let mut cursor = Cursor::new(contents);
    let mut errors = Vec::new();
    let mut command: Option<JobProcess> = None;
    let mut builder = JobConfigBuilder::default_for(name);
    let mut rejected = false;

    while let Some((line_no, raw)) = cursor.next_line() {
        let line = strip_comment(raw);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut words = line.split_whitespace();
        let Some(stanza) = words.next() else { continue };
        let rest: Vec<&str> = words.collect();

        let result = match stanza {
            "description" => {
                builder = builder.description_str(rest.join(" "));
                Ok(())
            }
            "author" => {
                builder = builder.author_str(rest.join(" "));
                Ok(())
            }
            "version" => {
                builder = builder.version_str(rest.join(" "));
                Ok(())
            }
            "exec" => {
                command = Some(JobProcess::exec(rest.join(" ")));
                Ok(())
            }
            "script" => {
                let body = read_script_block(&mut cursor, path, "script")?;
                command = Some(JobProcess::script(body));
                Ok(())
            }
            "start" if rest.first() == Some(&"on") => {
                parse_on(&rest[1..], path, line_no, "start on").map(|p| builder = builder.start_on(p))
            }
            "stop" if rest.first() == Some(&"on") => {
                parse_on(&rest[1..], path, line_no, "stop on").map(|p| builder = builder.stop_on(p))
            }
            "pre-start" | "post-start" | "pre-stop" | "post-stop" | "stop" | "respawn"
                if rest.first() == Some(&"script") =>
            {
                let body = read_script_block(&mut cursor, path, stanza)?;
                builder = attach_script(builder, stanza, JobProcess::script(body));
                Ok(())
            }
            "pre-start" | "post-start" | "pre-stop" | "post-stop" | "stop" => {
                builder = attach_script(builder, stanza, JobProcess::exec(rest.join(" ")));
                Ok(())
            }
            "emits" => {
                builder = builder.emits_extend(rest.iter().map(|s| s.to_string()));
                Ok(())
            }
            "respawn" if rest.first() == Some(&"limit") => {
                parse_respawn_limit(&rest[1..], path, line_no).map(|(limit, interval)| {
                    builder = builder.set_respawn_limit(limit).set_respawn_interval(interval);
                })
            }
            "respawn" if rest.is_empty() => {
                builder = builder.set_respawn(true);
                Ok(())
            }
            "respawn" => {
                builder = builder.set_respawn(true).respawn_script(JobProcess::exec(rest.join(" ")));
                Ok(())
            }
            "daemon" => {
                builder = builder.set_daemon(true);
                Ok(())
            }
            "service" => {
                builder = builder.set_service(true);
                Ok(())
            }
            "instance" => {
                rejected = true;
                Err(RunbookError::UnsupportedStanza { path: path.to_path_buf(), line: line_no })
            }
            "pid" => parse_pid(&rest, path, line_no).map(|stanza| match stanza {
                PidStanza::File(p) => builder = builder.set_pid_file(Some(p)),
                PidStanza::Binary(p) => builder = builder.set_pid_binary(Some(p)),
                PidStanza::Timeout(secs) => builder = builder.set_pid_timeout(Duration::from_secs(secs)),
            }),
            "kill" if rest.first() == Some(&"timeout") => {
                parse_secs(&rest[1..], path, line_no, "kill timeout")
                    .map(|secs| builder = builder.set_kill_timeout(Duration::from_secs(secs)))
            }
            "normalexit" => parse_ints(&rest, path, line_no, "normalexit")
                .map(|codes| builder = builder.set_normalexit(codes)),
            "console" => parse_console(&rest, path, line_no).map(|mode| builder = builder.set_console(mode)),
            "env" => parse_env(&rest, path, line_no).map(|(k, v)| builder = builder.push_env(k, v)),
            "umask" => parse_octal(&rest, path, line_no).map(|mask| builder = builder.set_umask(mask)),
            "nice" => parse_nice(&rest, path, line_no).map(|n| builder = builder.set_nice(n)),
            "limit" => parse_limit(&rest, path, line_no).map(|(res, lim)| builder = builder.push_limit(res, lim)),
            "chroot" => one_arg(&rest, path, line_no, "chroot")
                .map(|p| builder = builder.set_chroot(Some(PathBuf::from(p)))),
            "chdir" => one_arg(&rest, path, line_no, "chdir")
                .map(|p| builder = builder.set_chdir(Some(PathBuf::from(p)))),
            other => Err(RunbookError::UnknownStanza {
                path: path.to_path_buf(),
                line: line_no,
                stanza: other.to_string(),
            }),
        };

        if let Err(err) = result {
            tracing::warn!(error = %err, "skipping malformed stanza");
            errors.push(err);
        }
    }

    if rejected {
        return Ok((None, errors));
    }

    let Some(command) = command else {
        return Ok((None, errors));
    };

    Ok((Some(builder.build_with(command)), errors))
}

fn attach_script(builder: JobConfigBuilder, stanza: &str, process: JobProcess) -> JobConfigBuilder {
    match stanza {
        "pre-start" => builder.pre_start(process),
        "post-start" => builder.post_start(process),
        "pre-stop" => builder.pre_stop(process),
        "post-stop" => builder.post_stop(process),
        "stop" => builder.stop(process),
        "respawn" => builder.set_respawn(true).respawn_script(process),
        _ => unreachable!("attach_script called with an unrecognized stanza"),
    }
}

fn read_script_block(cursor: &mut Cursor, path: &Path, stanza: &'static str) -> Result<String, RunbookError> {
    let mut lines = Vec::new();
    loop {
        match cursor.next_line() {
            Some((_, raw)) if raw.trim() == "end script" => return Ok(lines.join("\n")),
            Some((_, raw)) => lines.push(raw.to_string()),
            None => return Err(RunbookError::UnterminatedScript { path: path.to_path_buf(), stanza }),
        }
    }
}

fn parse_on(args: &[&str], path: &Path, line: usize, stanza: &'static str) -> Result<EventPattern, RunbookError> {
    match args {
        [name] => Ok(EventPattern::named(*name)),
        [name, value] => Ok(EventPattern::with_value(*name, *value)),
        _ => Err(bad_args(path, line, stanza, "NAME or NAME VALUE", args)),
    }
}

fn parse_respawn_limit(args: &[&str], path: &Path, line: usize) -> Result<(u32, Duration), RunbookError> {
    match args {
        [count, interval] => {
            let count: u32 = count
                .parse()
                .map_err(|_| bad_args(path, line, "respawn limit", "N M", args))?;
            let interval: u64 = interval
                .parse()
                .map_err(|_| bad_args(path, line, "respawn limit", "N M", args))?;
            Ok((count, Duration::from_secs(interval)))
        }
        _ => Err(bad_args(path, line, "respawn limit", "N M", args)),
    }
}

enum PidStanza {
    File(PathBuf),
    Binary(PathBuf),
    Timeout(u64),
}

fn parse_pid(rest: &[&str], path: &Path, line: usize) -> Result<PidStanza, RunbookError> {
    match rest {
        ["file", value] => Ok(PidStanza::File(PathBuf::from(*value))),
        ["binary", value] => Ok(PidStanza::Binary(PathBuf::from(*value))),
        ["timeout", value] => {
            let secs: u64 = value.parse().map_err(|_| bad_args(path, line, "pid timeout", "SECS", rest))?;
            Ok(PidStanza::Timeout(secs))
        }
        _ => Err(bad_args(path, line, "pid", "file PATH | binary PATH | timeout SECS", rest)),
    }
}

fn parse_secs(args: &[&str], path: &Path, line: usize, stanza: &'static str) -> Result<u64, RunbookError> {
    match args {
        [value] => value.parse().map_err(|_| bad_args(path, line, stanza, "SECS", args)),
        _ => Err(bad_args(path, line, stanza, "SECS", args)),
    }
}

fn parse_ints(args: &[&str], path: &Path, line: usize, stanza: &'static str) -> Result<Vec<i32>, RunbookError> {
    args.iter()
        .map(|s| s.parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| bad_args(path, line, stanza, "N...", args))
}

fn parse_console(args: &[&str], path: &Path, line: usize) -> Result<ConsoleMode, RunbookError> {
    match args {
        ["logged"] => Ok(ConsoleMode::Logged),
        ["output"] => Ok(ConsoleMode::Output),
        ["owner"] => Ok(ConsoleMode::Owner),
        ["none"] => Ok(ConsoleMode::None),
        _ => Err(bad_args(path, line, "console", "logged|output|owner|none", args)),
    }
}

fn parse_env(args: &[&str], path: &Path, line: usize) -> Result<(String, String), RunbookError> {
    match args {
        [kv] => match kv.split_once('=') {
            Some((k, v)) => Ok((k.to_string(), v.to_string())),
            None => Err(bad_args(path, line, "env", "KEY=VAL", args)),
        },
        _ => Err(bad_args(path, line, "env", "KEY=VAL", args)),
    }
}

fn parse_octal(args: &[&str], path: &Path, line: usize) -> Result<u32, RunbookError> {
    match args {
        [value] => u32::from_str_radix(value, 8).map_err(|_| bad_args(path, line, "umask", "OCT", args)),
        _ => Err(bad_args(path, line, "umask", "OCT", args)),
    }
}

fn parse_nice(args: &[&str], path: &Path, line: usize) -> Result<i32, RunbookError> {
    match args {
        [value] => {
            let n: i32 = value.parse().map_err(|_| bad_args(path, line, "nice", "-20..19", args))?;
            if (-20..=19).contains(&n) {
                Ok(n)
            } else {
                Err(bad_args(path, line, "nice", "-20..19", args))
            }
        }
        _ => Err(bad_args(path, line, "nice", "-20..19", args)),
    }
}

fn parse_limit(args: &[&str], path: &Path, line: usize) -> Result<(String, ResourceLimit), RunbookError> {
    match args {
        [name, soft, hard] => {
            let soft: u64 = soft.parse().map_err(|_| bad_args(path, line, "limit", "NAME SOFT HARD", args))?;
            let hard: u64 = hard.parse().map_err(|_| bad_args(path, line, "limit", "NAME SOFT HARD", args))?;
            Ok((name.to_string(), ResourceLimit { soft, hard }))
        }
        _ => Err(bad_args(path, line, "limit", "NAME SOFT HARD", args)),
    }
}

fn one_arg<'a>(args: &[&'a str], path: &Path, line: usize, stanza: &'static str) -> Result<&'a str, RunbookError> {
    match args {
        [value] => Ok(value),
        _ => Err(bad_args(path, line, stanza, "PATH", args)),
    }
}

fn bad_args(path: &Path, line: usize, stanza: &'static str, expected: &'static str, found: &[&str]) -> RunbookError {
    RunbookError::BadArguments {
        path: path.to_path_buf(),
        line,
        stanza,
        expected,
        found: found.join(" "),
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Tracks a 1-based line number over a file's lines without the allocation
/// of collecting them all up front.
struct Cursor<'a> {
    lines: std::str::Lines<'a>,
    line_no: usize,
}

impl<'a> Cursor<'a> {
    fn new(contents: &'a str) -> Self {
        Self { lines: contents.lines(), line_no: 0 }
    }

    fn next_line(&mut self) -> Option<(usize, &'a str)> {
        let line = self.lines.next()?;
        self.line_no += 1;
        Some((self.line_no, line))
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
