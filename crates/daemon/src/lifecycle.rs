// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup and shutdown.

use std::fs::File;
use std::sync::Arc;

use esched_adapters::{HttpHostAdapter, TracedDirectoryAdapter, TracedEnrollmentAdapter};
use esched_core::{Clock, SystemClock};
use esched_daemon::{Config, ConfigError, Service};
use esched_engine::{Lifecycle, LifecycleDeps};
use esched_storage::{ScheduleStore, StoreError, WalScheduleStore};
use fs2::FileExt;
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

/// Service with concrete adapter types (wrapped with tracing)
pub type DaemonService = Service<
    WalScheduleStore,
    TracedEnrollmentAdapter<HttpHostAdapter>,
    TracedDirectoryAdapter<HttpHostAdapter>,
    SystemClock,
>;

/// Daemon state during operation
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    /// Unix socket listener
    pub listener: UnixListener,
    /// Request handler shared with connection tasks
    pub service: Arc<DaemonService>,
}

impl DaemonState {
    /// Remove the socket and pid files; the lock goes with `lock_file`
    pub fn shutdown(&self) {
        info!("Shutting down daemon...");

        if self.config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
                warn!("Failed to remove socket file: {}", e);
            }
        }
        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }

        info!("Daemon shutdown complete");
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(std::path::PathBuf, std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon
pub async fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    match startup_inner(config).await {
        Ok(state) => Ok(state),
        Err(e) => {
            cleanup_on_failure(config);
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<DaemonState, LifecycleError> {
    // 1. Host URL is mandatory for the daemon
    let base_url = config.host.base_url()?;

    // 2. Lock before touching anything else
    std::fs::create_dir_all(&config.state_dir)?;
    let lock_file = File::create(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    use std::io::Write;
    let mut lock_file = lock_file;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    // 3. Directories
    if let Some(parent) = config.socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if let Some(parent) = config.wal_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // 4. Replay the WAL
    let store = Arc::new(WalScheduleStore::open(&config.wal_path)?);
    let stats = store.stats(SystemClock.now())?;
    info!(
        pending = stats.pending,
        activated = stats.activated,
        due = stats.due,
        "Loaded schedule state"
    );

    // 5. Host adapters, one HTTP agent shared by both
    let host = HttpHostAdapter::new(base_url, config.host.timeout);
    let lifecycle = Lifecycle::new(
        LifecycleDeps {
            store,
            enrollments: TracedEnrollmentAdapter::new(host.clone()),
            directory: TracedDirectoryAdapter::new(host),
        },
        SystemClock,
        config.lifecycle_config(),
    );

    // 6. Remove stale socket and bind (LAST - only after all validation passes)
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    info!(host = base_url, "Daemon started");

    Ok(DaemonState {
        config: config.clone(),
        lock_file,
        listener,
        service: Arc::new(Service::new(Arc::new(lifecycle))),
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}
