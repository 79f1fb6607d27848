// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn args(list: &[&str]) -> impl Iterator<Item = String> {
    list.iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .into_iter()
}

#[test]
fn no_arguments_uses_default_config() {
    assert_eq!(parse_args(args(&[])).unwrap(), None);
}

#[test]
fn config_flag_takes_a_path() {
    assert_eq!(
        parse_args(args(&["--config", "/etc/esched.toml"])).unwrap(),
        Some(PathBuf::from("/etc/esched.toml"))
    );
    assert!(parse_args(args(&["--config"])).is_err());
}

#[test]
fn unknown_argument_is_rejected() {
    let err = parse_args(args(&["--verbose"])).unwrap_err();
    assert!(err.contains("--verbose"));
}

#[test]
fn startup_marker_is_appended() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::resolve(None, |key| {
        (key == "ESCHED_STATE_DIR").then(|| dir.path().to_string_lossy().into_owned())
    })
    .unwrap();

    write_startup_marker(&config).unwrap();
    write_startup_marker(&config).unwrap();

    let log = std::fs::read_to_string(&config.log_path).unwrap();
    assert_eq!(log.matches(STARTUP_MARKER_PREFIX).count(), 2);
    assert!(log.ends_with(") ---\n"));
}
