// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: TOML file plus environment overrides

use esched_engine::LifecycleConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const CONFIG_FILE: &str = "esched.toml";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine state directory (set ESCHED_STATE_DIR or HOME)")]
    NoStateDir,

    #[error("Failed to read {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("No host URL configured (set [host] base_url or ESCHED_HOST_URL)")]
    MissingHostUrl,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// On-disk shape of `esched.toml`; every key is optional
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    #[serde(with = "humantime_serde")]
    tick_interval: Duration,
    #[serde(with = "humantime_serde")]
    edit_suppression: Duration,
    ref_marker: String,
    host: FileHost,
}

impl Default for FileConfig {
    fn default() -> Self {
        let engine = LifecycleConfig::default();
        Self {
            tick_interval: Duration::from_secs(60),
            edit_suppression: engine.edit_suppression,
            ref_marker: engine.ref_marker,
            host: FileHost::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileHost {
    base_url: Option<String>,
    #[serde(with = "humantime_serde")]
    timeout: Duration,
}

impl Default for FileHost {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Host LMS connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl HostConfig {
    /// The base URL, required by the daemon but not by the CLI
    pub fn base_url(&self) -> Result<&str, ConfigError> {
        self.base_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingHostUrl)
    }
}

/// Resolved daemon configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the WAL, lock, log and default socket
    pub state_dir: PathBuf,
    /// Config file consulted (may not exist)
    pub config_path: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Path to the schedule WAL
    pub wal_path: PathBuf,
    pub tick_interval: Duration,
    pub edit_suppression: Duration,
    pub ref_marker: String,
    pub host: HostConfig,
}

impl Config {
    /// Resolve from the process environment
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::resolve(config_path, |key| std::env::var(key).ok())
    }

    /// Resolve using `env` for variable lookups
    ///
    /// An explicit `config_path` must exist; the default one is optional.
    pub fn resolve(
        config_path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let state_dir = state_dir(&env)?;

        let (config_path, file) = match config_path {
            Some(path) => (path.to_path_buf(), read_file(path)?),
            None => {
                let path = state_dir.join(CONFIG_FILE);
                let file = if path.exists() {
                    read_file(&path)?
                } else {
                    FileConfig::default()
                };
                (path, file)
            }
        };

        if file.tick_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "tick_interval must be greater than zero".to_string(),
            ));
        }
        if file.ref_marker.trim().is_empty() {
            return Err(ConfigError::Invalid("ref_marker must not be empty".to_string()));
        }

        let socket_path = env("ESCHED_SOCKET")
            .map(PathBuf::from)
            .unwrap_or_else(|| state_dir.join("eschedd.sock"));
        let base_url = env("ESCHED_HOST_URL").or(file.host.base_url);

        Ok(Self {
            config_path,
            socket_path,
            lock_path: state_dir.join("eschedd.pid"),
            log_path: state_dir.join("eschedd.log"),
            wal_path: state_dir.join("wal").join("schedules.wal"),
            state_dir,
            tick_interval: file.tick_interval,
            edit_suppression: file.edit_suppression,
            ref_marker: file.ref_marker,
            host: HostConfig {
                base_url,
                timeout: file.host.timeout,
            },
        })
    }

    pub fn lifecycle_config(&self) -> LifecycleConfig {
        LifecycleConfig {
            ref_marker: self.ref_marker.clone(),
            edit_suppression: self.edit_suppression,
        }
    }
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let text =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    toml::from_str(&text).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
}

/// ESCHED_STATE_DIR, then XDG_STATE_HOME/esched, then ~/.local/state/esched
fn state_dir(env: &impl Fn(&str) -> Option<String>) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = env("ESCHED_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = env("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("esched"));
    }
    let home = env("HOME").ok_or(ConfigError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/esched"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
