// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for daemon client behavior.

use super::*;
use std::fs;
use tempfile::tempdir;
use tokio::net::UnixListener;

fn config_in(dir: &Path) -> Config {
    let state = dir.to_string_lossy().into_owned();
    Config::resolve(None, move |key| (key == "ESCHED_STATE_DIR").then(|| state.clone())).unwrap()
}

/// Serve exactly one request with `response`, returning what was asked
async fn serve_once(listener: UnixListener, response: Response) -> Request {
    let (stream, _) = listener.accept().await.unwrap();
    let (mut reader, mut writer) = stream.into_split();
    let request = protocol::read_request(&mut reader, Duration::from_secs(5))
        .await
        .unwrap();
    protocol::write_response(&mut writer, &response, Duration::from_secs(5))
        .await
        .unwrap();
    request
}

/// connect() must not delete state files when the daemon is mid-startup
#[test]
fn connect_does_not_delete_pid_file() {
    let state_dir = tempdir().unwrap();
    let config = config_in(state_dir.path());
    fs::write(&config.lock_path, "12345\n").unwrap();

    let result = DaemonClient::connect(&config);

    assert!(matches!(result, Err(ClientError::DaemonNotRunning)));
    assert!(config.lock_path.exists(), "connect() must not delete pid file");
    assert_eq!(read_daemon_pid(&config.lock_path), Some(12345));
}

#[test]
fn startup_error_is_read_from_last_attempt_only() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("eschedd.log");
    fs::write(
        &log,
        "--- eschedd: starting (pid: 1) ---\n\
         ERROR Failed to start daemon: old failure\n\
         --- eschedd: starting (pid: 2) ---\n\
         ERROR Failed to start daemon: No host URL configured\n",
    )
    .unwrap();

    assert_eq!(
        read_startup_error(&log).as_deref(),
        Some("No host URL configured")
    );
}

#[test]
fn clean_startup_has_no_error() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("eschedd.log");
    fs::write(
        &log,
        "--- eschedd: starting (pid: 1) ---\n\
         ERROR Failed to start daemon: old failure\n\
         --- eschedd: starting (pid: 2) ---\n\
         2025-01-01T09:00:00Z  INFO eschedd: Daemon ready\n",
    )
    .unwrap();

    assert_eq!(read_startup_error(&log), None);
    assert_eq!(read_startup_error(&dir.path().join("missing.log")), None);
}

#[test]
fn not_running_error_is_not_rewrapped_without_log() {
    let dir = tempdir().unwrap();
    let err = wrap_with_startup_error(
        ClientError::DaemonStartTimeout,
        &dir.path().join("eschedd.log"),
    );
    assert!(matches!(err, ClientError::DaemonStartTimeout));
}

#[tokio::test]
async fn tick_round_trip() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    let listener = UnixListener::bind(&config.socket_path).unwrap();
    let server = tokio::spawn(serve_once(listener, Response::Tick { activated: 3 }));

    let client = DaemonClient::connect(&config).unwrap();
    let activated = client.tick().await.unwrap();

    assert_eq!(activated, 3);
    assert_eq!(server.await.unwrap(), Request::Tick);
}

#[tokio::test]
async fn error_response_becomes_rejected_with_kind() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    let listener = UnixListener::bind(&config.socket_path).unwrap();
    let server = tokio::spawn(serve_once(
        listener,
        Response::error("not_found", "schedule not found: 9"),
    ));

    let client = DaemonClient::connect(&config).unwrap();
    let err = client.get(ScheduleId(9)).await.unwrap_err();

    match err {
        ClientError::Rejected { kind, message } => {
            assert_eq!(kind, "not_found");
            assert_eq!(message, "schedule not found: 9");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
    assert_eq!(
        server.await.unwrap(),
        Request::GetSchedule { id: ScheduleId(9) }
    );
}

#[tokio::test]
async fn mismatched_response_is_unexpected() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    let listener = UnixListener::bind(&config.socket_path).unwrap();
    let server = tokio::spawn(serve_once(listener, Response::Pong));

    let client = DaemonClient::connect(&config).unwrap();
    let err = client.list(ScheduleFilter::default()).await.unwrap_err();

    assert!(matches!(err, ClientError::UnexpectedResponse));
    server.await.unwrap();
}

#[tokio::test]
async fn stop_without_daemon_reports_not_running() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    fs::write(&config.lock_path, "999999\n").unwrap();

    let stopped = daemon_stop(&config).await.unwrap();

    assert!(!stopped);
    assert!(!config.lock_path.exists(), "stale pid file should be removed");
}
