// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::ValueEnum;
use oj_wire::JobSummary;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print a `ListJobs` result, one job per line in text mode.
pub fn print_jobs(jobs: &[JobSummary], format: OutputFormat) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(jobs)?),
        OutputFormat::Text => {
            if jobs.is_empty() {
                println!("{}", crate::color::context("no jobs loaded"));
                return Ok(());
            }
            println!(
                "{:<20} {:<10} {:<12} {}",
                crate::color::header("NAME"),
                crate::color::header("GOAL"),
                crate::color::header("STATE"),
                crate::color::header("PID")
            );
            for job in jobs {
                println!(
                    "{:<20} {:<10} {:<12} {}",
                    crate::color::literal(&job.name),
                    job.goal,
                    state_label(job),
                    job.pid.map(|p| p.to_string()).unwrap_or_else(|| crate::color::muted("-")),
                );
            }
        }
    }
    Ok(())
}

/// Print a single `GetJob` result.
pub fn print_job(job: &JobSummary, format: OutputFormat) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(job)?),
        OutputFormat::Text => {
            println!("{} {}", crate::color::header("name:"), job.name);
            println!("{} {}", crate::color::header("path:"), crate::color::context(&job.path));
            println!("{} {}", crate::color::header("goal:"), job.goal);
            println!("{} {}", crate::color::header("state:"), state_label(job));
            println!(
                "{} {}",
                crate::color::header("pid:"),
                job.pid.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string())
            );
        }
    }
    Ok(())
}

fn state_label(job: &JobSummary) -> String {
    if job.failed {
        format!("{} (failed)", job.state)
    } else {
        job.state.clone()
    }
}
