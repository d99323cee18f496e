// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::Path;

fn parse(name: &str, body: &str) -> (Option<oj_core::JobConfig>, Vec<RunbookError>) {
    parse_str(Path::new("test.conf"), name, body).expect("parse_str never fails outright here")
}

#[test]
fn bare_exec_job_parses_with_defaults() {
    let (config, errors) = parse("logd", "exec /usr/sbin/syslogd\n");
    assert!(errors.is_empty());
    let config = config.unwrap();
    assert_eq!(config.command.body, "/usr/sbin/syslogd");
    assert!(!config.command.script);
    assert!(!config.respawn);
}

#[test]
fn script_block_is_captured_verbatim() {
    let body = "script\necho one\necho two\nend script\n";
    let (config, errors) = parse("multiline", body);
    assert!(errors.is_empty());
    let config = config.unwrap();
    assert_eq!(config.command.body, "echo one\necho two");
    assert!(config.command.script);
}

#[test]
fn unterminated_script_rejects_the_whole_file() {
    let body = "script\necho one\n";
    let (config, errors) = parse("broken", body);
    assert!(config.is_none());
    assert!(matches!(errors[0], RunbookError::UnterminatedScript { .. }));
}

#[test]
fn start_on_and_stop_on_accumulate_and_parse_level_values() {
    let body = "exec /bin/true\nstart on startup\nstop on runlevel 2\nstart on net-device-up\n";
    let (config, errors) = parse("web", body);
    assert!(errors.is_empty());
    let config = config.unwrap();
    assert_eq!(config.start_events.len(), 2);
    assert_eq!(config.stop_events.len(), 1);
    assert_eq!(config.stop_events[0].value.as_deref(), Some("2"));
}

#[test]
fn respawn_limit_sets_count_and_interval() {
    let body = "exec /bin/true\nrespawn\nrespawn limit 5 30\n";
    let (config, _) = parse("flapper", body);
    let config = config.unwrap();
    assert!(config.respawn);
    assert_eq!(config.respawn_limit, 5);
    assert_eq!(config.respawn_interval, std::time::Duration::from_secs(30));
}

#[test]
fn pre_start_and_post_start_scripts_attach_to_their_own_fields() {
    let body = "exec /bin/true\npre-start script\nmkdir -p /run/web\nend script\npost-start exec /bin/notify\n";
    let (config, errors) = parse("web", body);
    assert!(errors.is_empty());
    let config = config.unwrap();
    assert_eq!(config.pre_start.as_ref().unwrap().body, "mkdir -p /run/web");
    assert_eq!(config.post_start.as_ref().unwrap().body, "/bin/notify");
}

#[test]
fn malformed_stanza_is_skipped_but_the_rest_of_the_file_still_loads() {
    let body = "exec /bin/true\nnice banana\nrespawn\n";
    let (config, errors) = parse("web", body);
    assert_eq!(errors.len(), 1);
    let config = config.unwrap();
    assert!(config.respawn);
    assert!(config.nice.is_none());
}

#[test]
fn instance_stanza_rejects_the_whole_job() {
    let body = "exec /bin/true\ninstance $PORT\n";
    let (config, errors) = parse("web", body);
    assert!(config.is_none());
    assert!(matches!(errors[0], RunbookError::UnsupportedStanza { .. }));
}

#[test]
fn comments_and_blank_lines_are_ignored() {
    let body = "# a comment\nexec /bin/true  # trailing note\n\ndaemon\n";
    let (config, errors) = parse("daemonized", body);
    assert!(errors.is_empty());
    let config = config.unwrap();
    assert_eq!(config.command.body, "/bin/true");
    assert!(config.daemon);
}

#[test]
fn env_and_console_and_limits_round_trip() {
    let body = "exec /bin/true\nenv PORT=8080\nconsole logged\nlimit nofile 1024 4096\nnice -5\numask 022\n";
    let (config, errors) = parse("tuned", body);
    assert!(errors.is_empty());
    let config = config.unwrap();
    assert_eq!(config.env, vec![("PORT".to_string(), "8080".to_string())]);
    assert_eq!(config.console, oj_core::ConsoleMode::Logged);
    assert_eq!(config.limits[0].0, "nofile");
    assert_eq!(config.nice, Some(-5));
    assert_eq!(config.umask, Some(0o022));
}

#[test]
fn unknown_stanza_is_reported_with_its_line_number() {
    let body = "exec /bin/true\nfrobnicate yes\n";
    let (_, errors) = parse("web", body);
    match &errors[0] {
        RunbookError::UnknownStanza { line, stanza, .. } => {
            assert_eq!(*line, 2);
            assert_eq!(stanza, "frobnicate");
        }
        other => panic!("expected UnknownStanza, got {other:?}"),
    }
}
