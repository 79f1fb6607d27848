// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_without_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().to_str().unwrap();

    let config = Config::resolve(None, env_of(&[("ESCHED_STATE_DIR", state)])).unwrap();

    assert_eq!(config.state_dir, dir.path());
    assert_eq!(config.config_path, dir.path().join("esched.toml"));
    assert_eq!(config.socket_path, dir.path().join("eschedd.sock"));
    assert_eq!(config.wal_path, dir.path().join("wal/schedules.wal"));
    assert_eq!(config.tick_interval, Duration::from_secs(60));
    assert_eq!(config.edit_suppression, Duration::from_secs(30));
    assert_eq!(config.ref_marker, "esched");
    assert_eq!(config.host.timeout, Duration::from_secs(5));
    assert!(matches!(
        config.host.base_url(),
        Err(ConfigError::MissingHostUrl)
    ));
}

#[test]
fn state_dir_falls_back_to_xdg_then_home() {
    let xdg = Config::resolve(
        None,
        env_of(&[("XDG_STATE_HOME", "/nonexistent/xdg"), ("HOME", "/nonexistent/home")]),
    )
    .unwrap();
    assert_eq!(xdg.state_dir, PathBuf::from("/nonexistent/xdg/esched"));

    let home = Config::resolve(None, env_of(&[("HOME", "/nonexistent/home")])).unwrap();
    assert_eq!(
        home.state_dir,
        PathBuf::from("/nonexistent/home/.local/state/esched")
    );
}

#[test]
fn no_home_is_an_error() {
    let err = Config::resolve(None, env_of(&[])).unwrap_err();
    assert!(matches!(err, ConfigError::NoStateDir));
}

#[test]
fn reads_durations_and_host_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(
        &path,
        r#"
tick_interval = "2m"
edit_suppression = "45s"
ref_marker = "campus"

[host]
base_url = "http://lms.internal/api"
timeout = "10s"
"#,
    )
    .unwrap();

    let config = Config::resolve(
        Some(path.as_path()),
        env_of(&[("ESCHED_STATE_DIR", dir.path().to_str().unwrap())]),
    )
    .unwrap();

    assert_eq!(config.tick_interval, Duration::from_secs(120));
    assert_eq!(config.edit_suppression, Duration::from_secs(45));
    assert_eq!(config.ref_marker, "campus");
    assert_eq!(config.host.base_url().unwrap(), "http://lms.internal/api");
    assert_eq!(config.host.timeout, Duration::from_secs(10));

    let engine = config.lifecycle_config();
    assert_eq!(engine.ref_marker, "campus");
    assert_eq!(engine.edit_suppression, Duration::from_secs(45));
}

#[test]
fn environment_overrides_socket_and_host() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("esched.toml"),
        "[host]\nbase_url = \"http://from-file\"\n",
    )
    .unwrap();

    let config = Config::resolve(
        None,
        env_of(&[
            ("ESCHED_STATE_DIR", dir.path().to_str().unwrap()),
            ("ESCHED_SOCKET", "/tmp/esched-test.sock"),
            ("ESCHED_HOST_URL", "http://from-env"),
        ]),
    )
    .unwrap();

    assert_eq!(config.socket_path, PathBuf::from("/tmp/esched-test.sock"));
    assert_eq!(config.host.base_url().unwrap(), "http://from-env");
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    let err = Config::resolve(
        Some(missing.as_path()),
        env_of(&[("ESCHED_STATE_DIR", dir.path().to_str().unwrap())]),
    )
    .unwrap_err();

    assert!(matches!(err, ConfigError::Read(..)));
}

#[test]
fn unknown_keys_and_bad_durations_fail_to_parse() {
    let dir = tempfile::tempdir().unwrap();
    let env = env_of(&[("ESCHED_STATE_DIR", dir.path().to_str().unwrap())]);

    let typo = dir.path().join("typo.toml");
    std::fs::write(&typo, "tick_intervall = \"1m\"\n").unwrap();
    assert!(matches!(
        Config::resolve(Some(typo.as_path()), &env),
        Err(ConfigError::Parse(..))
    ));

    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, "tick_interval = \"soon\"\n").unwrap();
    assert!(matches!(
        Config::resolve(Some(bad.as_path()), &env),
        Err(ConfigError::Parse(..))
    ));
}

#[test]
fn zero_tick_and_empty_marker_are_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let env = env_of(&[("ESCHED_STATE_DIR", dir.path().to_str().unwrap())]);

    let zero = dir.path().join("zero.toml");
    std::fs::write(&zero, "tick_interval = \"0s\"\n").unwrap();
    assert!(matches!(
        Config::resolve(Some(zero.as_path()), &env),
        Err(ConfigError::Invalid(_))
    ));

    let blank = dir.path().join("blank.toml");
    std::fs::write(&blank, "ref_marker = \" \"\n").unwrap();
    assert!(matches!(
        Config::resolve(Some(blank.as_path()), &env),
        Err(ConfigError::Invalid(_))
    ));
}
