// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn error_display() {
    let err = CliError::new("Something went wrong")
        .with_context("First context")
        .with_context("Second context")
        .with_suggestion("Try this")
        .with_suggestion("Or this");

    let output = format!("{}", err);
    assert!(output.contains("error: Something went wrong"));
    assert!(output.contains("-> First context"));
    assert!(output.contains("-> Second context"));
    assert!(output.contains("1. Try this"));
    assert!(output.contains("2. Or this"));
}

#[test]
fn already_scheduled_suggests_editing() {
    let err = CliError::from(ClientError::Rejected {
        kind: "already_scheduled".to_string(),
        message: "user 5 already has a pending schedule for course 10 (schedule 1)".to_string(),
    });

    let output = err.to_string();
    assert!(output.starts_with("error: user 5 already has a pending schedule"));
    assert!(output.contains("esched schedule edit"));
}

#[test]
fn already_enrolled_points_at_the_host() {
    let err = CliError::from(ClientError::Rejected {
        kind: "already_enrolled".to_string(),
        message: "user 5 is already enrolled in course 10 (host-3)".to_string(),
    });

    let output = err.to_string();
    assert!(output.contains("already grants"));
    assert_eq!(err.suggestions.len(), 1);
}

#[test]
fn unknown_kind_keeps_plain_message() {
    let err = CliError::from(ClientError::Rejected {
        kind: "validation".to_string(),
        message: "note must be at most 1000 characters".to_string(),
    });

    assert!(err.context.is_empty());
    assert!(err.suggestions.is_empty());
}

#[test]
fn missing_host_url_points_at_config() {
    let err = CliError::from(ClientError::DaemonStartFailed(
        "No host URL configured (set [host] base_url or ESCHED_HOST_URL)".to_string(),
    ));

    assert!(err.suggestions[0].contains("ESCHED_HOST_URL"));
}

#[test]
fn anyhow_client_errors_are_enriched() {
    let err = CliError::from_anyhow(anyhow::Error::new(ClientError::DaemonNotRunning));
    assert!(err.to_string().contains("esched daemon start"));

    let plain = CliError::from_anyhow(anyhow::anyhow!("bad input"));
    assert_eq!(plain.message, "bad input");
}
