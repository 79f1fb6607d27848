// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client for CLI commands

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use esched_core::{
    AccessDecision, CourseId, NewSchedule, Schedule, ScheduleFilter, ScheduleId, UserId,
};
use esched_daemon::protocol::{self, ProtocolError, PROTOCOL_VERSION};
use esched_daemon::{Config, Request, Response};
use esched_engine::{BulkAction, BulkOutcome};
use esched_storage::ScheduleStats;
use thiserror::Error;
use tokio::net::UnixStream;

// Timeout configuration (env vars in milliseconds)
fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Timeout for IPC requests
pub fn timeout_ipc() -> Duration {
    parse_duration_ms("ESCHED_TIMEOUT_IPC_MS").unwrap_or(Duration::from_secs(5))
}

/// Timeout for waiting for daemon to start
pub fn timeout_connect() -> Duration {
    parse_duration_ms("ESCHED_TIMEOUT_CONNECT_MS").unwrap_or(Duration::from_secs(5))
}

/// Timeout for waiting for process to exit
pub fn timeout_exit() -> Duration {
    parse_duration_ms("ESCHED_TIMEOUT_EXIT_MS").unwrap_or(Duration::from_secs(2))
}

/// Polling interval for retries
pub fn poll_interval() -> Duration {
    parse_duration_ms("ESCHED_POLL_INTERVAL_MS").unwrap_or(Duration::from_millis(50))
}

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Daemon not running")]
    DaemonNotRunning,

    #[error("Failed to start daemon: {0}")]
    DaemonStartFailed(String),

    #[error("Connection timeout waiting for daemon to start")]
    DaemonStartTimeout,

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The daemon answered with `Response::Error`
    #[error("{message}")]
    Rejected { kind: String, message: String },

    #[error("Unexpected response from daemon")]
    UnexpectedResponse,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn unexpected(response: Response) -> ClientError {
    match response {
        Response::Error { kind, message } => ClientError::Rejected { kind, message },
        _ => ClientError::UnexpectedResponse,
    }
}

/// Daemon client
pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    /// Connect to daemon, auto-starting if not running
    pub fn connect_or_start(config: &Config) -> Result<Self, ClientError> {
        match Self::connect(config) {
            Ok(client) => Ok(client),
            Err(ClientError::DaemonNotRunning) => {
                let child = start_daemon_background(config)?;
                Self::connect_with_retry(config, timeout_connect(), child)
            }
            Err(e) => Err(wrap_with_startup_error(e, &config.log_path)),
        }
    }

    /// Connect to existing daemon (no auto-start)
    pub fn connect(config: &Config) -> Result<Self, ClientError> {
        if !config.socket_path.exists() {
            return Err(ClientError::DaemonNotRunning);
        }
        Ok(Self {
            socket_path: config.socket_path.clone(),
        })
    }

    fn connect_with_retry(
        config: &Config,
        timeout: Duration,
        mut child: std::process::Child,
    ) -> Result<Self, ClientError> {
        let start = Instant::now();
        while start.elapsed() < timeout {
            // Process exited early: startup failed
            if let Ok(Some(status)) = child.try_wait() {
                let poll_start = Instant::now();
                while poll_start.elapsed() < timeout_exit() {
                    if let Some(err) = read_startup_error(&config.log_path) {
                        return Err(ClientError::DaemonStartFailed(err));
                    }
                    std::thread::sleep(poll_interval());
                }
                return Err(ClientError::DaemonStartFailed(format!(
                    "exited with {}",
                    status
                )));
            }

            match Self::connect(config) {
                Ok(client) => return Ok(client),
                Err(ClientError::DaemonNotRunning) => {
                    std::thread::sleep(poll_interval());
                }
                Err(e) => return Err(wrap_with_startup_error(e, &config.log_path)),
            }
        }

        Err(wrap_with_startup_error(
            ClientError::DaemonStartTimeout,
            &config.log_path,
        ))
    }

    /// Send a request and receive a response with specific timeouts
    async fn send_with_timeout(
        &self,
        request: Request,
        read_timeout: Duration,
        write_timeout: Duration,
    ) -> Result<Response, ClientError> {
        let stream = UnixStream::connect(&self.socket_path).await?;
        let (mut reader, mut writer) = stream.into_split();

        let data = protocol::encode(&request)?;
        tokio::time::timeout(write_timeout, protocol::write_message(&mut writer, &data))
            .await
            .map_err(|_| ProtocolError::Timeout)??;

        let response_bytes =
            tokio::time::timeout(read_timeout, protocol::read_message(&mut reader))
                .await
                .map_err(|_| ProtocolError::Timeout)??;

        Ok(protocol::decode(&response_bytes)?)
    }

    /// Send a request and receive a response
    pub async fn send(&self, request: Request) -> Result<Response, ClientError> {
        self.send_with_timeout(request, timeout_ipc(), timeout_ipc())
            .await
    }

    /// Get daemon version via Hello handshake
    pub async fn hello(&self) -> Result<String, ClientError> {
        match self
            .send(Request::Hello {
                version: PROTOCOL_VERSION.to_string(),
            })
            .await?
        {
            Response::Hello { version } => Ok(version),
            other => Err(unexpected(other)),
        }
    }

    pub async fn status(&self) -> Result<(u64, ScheduleStats), ClientError> {
        match self.send(Request::Status).await? {
            Response::Status { uptime_secs, stats } => Ok((uptime_secs, stats)),
            other => Err(unexpected(other)),
        }
    }

    /// Run the activation pass now; returns how many were activated
    pub async fn tick(&self) -> Result<usize, ClientError> {
        match self.send(Request::Tick).await? {
            Response::Tick { activated } => Ok(activated),
            other => Err(unexpected(other)),
        }
    }

    pub async fn create(&self, schedule: NewSchedule) -> Result<Schedule, ClientError> {
        self.expect_schedule(Request::CreateSchedule { schedule })
            .await
            .map(|(schedule, _)| schedule)
    }

    pub async fn list(&self, filter: ScheduleFilter) -> Result<Vec<Schedule>, ClientError> {
        match self.send(Request::ListSchedules { filter }).await? {
            Response::Schedules { schedules } => Ok(schedules),
            other => Err(unexpected(other)),
        }
    }

    pub async fn get(&self, id: ScheduleId) -> Result<Schedule, ClientError> {
        self.expect_schedule(Request::GetSchedule { id })
            .await
            .map(|(schedule, _)| schedule)
    }

    /// Reschedule and/or change the note; returns the outcome message if any
    pub async fn update(
        &self,
        id: ScheduleId,
        scheduled_start: Option<DateTime<Utc>>,
        note: Option<Option<String>>,
    ) -> Result<(Schedule, Option<String>), ClientError> {
        self.expect_schedule(Request::UpdateSchedule {
            id,
            scheduled_start,
            note,
        })
        .await
    }

    pub async fn delete(&self, id: ScheduleId) -> Result<Schedule, ClientError> {
        self.expect_schedule(Request::DeleteSchedule { id })
            .await
            .map(|(schedule, _)| schedule)
    }

    pub async fn activate(&self, id: ScheduleId) -> Result<Schedule, ClientError> {
        self.expect_schedule(Request::ActivateSchedule { id })
            .await
            .map(|(schedule, _)| schedule)
    }

    pub async fn bulk(
        &self,
        action: BulkAction,
        ids: Vec<ScheduleId>,
    ) -> Result<BulkOutcome, ClientError> {
        match self.send(Request::Bulk { action, ids }).await? {
            Response::Bulk { outcome } => Ok(outcome),
            other => Err(unexpected(other)),
        }
    }

    pub async fn decide(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<AccessDecision, ClientError> {
        match self.send(Request::Decide { user_id, course_id }).await? {
            Response::Decision { decision } => Ok(decision),
            other => Err(unexpected(other)),
        }
    }

    /// Request daemon shutdown
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(Request::Shutdown).await? {
            Response::Ok | Response::ShuttingDown => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    async fn expect_schedule(
        &self,
        request: Request,
    ) -> Result<(Schedule, Option<String>), ClientError> {
        match self.send(request).await? {
            Response::Schedule { schedule, message } => Ok((schedule, message)),
            other => Err(unexpected(other)),
        }
    }
}

/// Start the daemon in the background, returning the child process handle
fn start_daemon_background(config: &Config) -> Result<std::process::Child, ClientError> {
    let daemon_path = find_daemon_binary();

    let mut command = Command::new(&daemon_path);
    if config.config_path.exists() {
        command.arg("--config").arg(&config.config_path);
    }
    command
        .env("ESCHED_STATE_DIR", &config.state_dir)
        .env("ESCHED_SOCKET", &config.socket_path)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(|e| ClientError::DaemonStartFailed(e.to_string()))
}

/// Stop the daemon (graceful first, then forceful)
/// Returns true if daemon was stopped, false if it wasn't running
pub async fn daemon_stop(config: &Config) -> Result<bool, ClientError> {
    let client = match DaemonClient::connect(config) {
        Ok(c) => c,
        Err(ClientError::DaemonNotRunning) => {
            cleanup_stale_pid(&config.lock_path);
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    let shutdown_result = client.shutdown().await;

    if let Some(pid) = read_daemon_pid(&config.lock_path) {
        if shutdown_result.is_ok() {
            wait_for_exit(pid, timeout_exit()).await;
        }
        if process_exists(pid) {
            force_kill_daemon(pid);
            wait_for_exit(pid, timeout_exit()).await;
        }
    }

    cleanup_stale_pid(&config.lock_path);
    Ok(true)
}

/// Wait for a process to exit
async fn wait_for_exit(pid: u32, timeout: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if !process_exists(pid) {
            return true;
        }
        tokio::time::sleep(poll_interval()).await;
    }
    false
}

/// Find the eschedd binary
fn find_daemon_binary() -> PathBuf {
    // Explicit override (used by tests to ensure correct binary)
    if let Ok(path) = std::env::var("ESCHED_DAEMON_BINARY") {
        return PathBuf::from(path);
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("eschedd");
            if sibling.exists() {
                return sibling;
            }
        }
    }

    PathBuf::from("eschedd")
}

fn cleanup_stale_pid(pid_path: &Path) {
    if pid_path.exists() {
        let _ = std::fs::remove_file(pid_path);
    }
}

/// Get the PID from the daemon PID file, if it exists
pub fn read_daemon_pid(pid_path: &Path) -> Option<u32> {
    std::fs::read_to_string(pid_path)
        .ok()
        .and_then(|content| content.trim().parse::<u32>().ok())
}

/// Check if a process with the given PID exists
pub fn process_exists(pid: u32) -> bool {
    // kill -0 checks existence without sending a signal
    Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Force kill a daemon process
pub fn force_kill_daemon(pid: u32) -> bool {
    Command::new("kill")
        .args(["-9", &pid.to_string()])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Startup marker prefix that daemon writes to log before anything else.
/// Full format: "--- eschedd: starting (pid: 12345) ---"
const STARTUP_MARKER_PREFIX: &str = "--- eschedd: starting (pid: ";

/// Read daemon log from the last startup marker, looking for errors.
pub fn read_startup_error(log_path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(log_path).ok()?;

    let start_pos = content.rfind(STARTUP_MARKER_PREFIX)?;
    let startup_log = &content[start_pos..];

    let errors: Vec<&str> = startup_log
        .lines()
        .filter(|line| line.contains(" ERROR ") || line.contains("Failed to start"))
        .collect();

    if errors.is_empty() {
        return None;
    }

    // Format: "timestamp LEVEL target: message"
    let error_messages: Vec<String> = errors
        .iter()
        .filter_map(|line| line.split_once(": ").map(|(_, msg)| msg.to_string()))
        .collect();

    if error_messages.is_empty() {
        Some(errors.join("\n"))
    } else {
        Some(error_messages.join("\n"))
    }
}

/// Replace `err` with the daemon's own startup error when the log has one
fn wrap_with_startup_error(err: ClientError, log_path: &Path) -> ClientError {
    if matches!(err, ClientError::DaemonStartFailed(_)) {
        return err;
    }

    match read_startup_error(log_path) {
        Some(startup_error) => ClientError::DaemonStartFailed(startup_error),
        None => err,
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
