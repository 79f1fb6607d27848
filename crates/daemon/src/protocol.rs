// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire protocol between `esched` and `eschedd`
//!
//! Each message is a 4-byte big-endian length followed by a JSON body.

use chrono::{DateTime, Utc};
use esched_core::{AccessDecision, CourseId, NewSchedule, Schedule, ScheduleFilter, ScheduleId, UserId};
use esched_engine::{BulkAction, BulkOutcome};
use esched_storage::ScheduleStats;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Version reported in `Hello`
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default read/write timeout on the daemon side
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Largest message either side will accept
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Client requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    Ping,
    Hello {
        version: String,
    },
    /// Uptime and schedule counters
    Status,
    /// Run the timer path immediately
    Tick,
    CreateSchedule {
        schedule: NewSchedule,
    },
    ListSchedules {
        #[serde(default)]
        filter: ScheduleFilter,
    },
    GetSchedule {
        id: ScheduleId,
    },
    /// Reschedule and/or change the note
    UpdateSchedule {
        id: ScheduleId,
        #[serde(default)]
        scheduled_start: Option<DateTime<Utc>>,
        /// Absent leaves the note alone; `null` clears it
        #[serde(
            default,
            skip_serializing_if = "Option::is_none",
            deserialize_with = "double_option"
        )]
        note: Option<Option<String>>,
    },
    DeleteSchedule {
        id: ScheduleId,
    },
    ActivateSchedule {
        id: ScheduleId,
    },
    Bulk {
        action: BulkAction,
        ids: Vec<ScheduleId>,
    },
    /// Content-gate decision at the daemon's current time
    Decide {
        user_id: UserId,
        course_id: CourseId,
    },
    Shutdown,
}

impl Request {
    /// Whether handling this request first runs the opportunistic trigger
    pub fn runs_trigger(&self) -> bool {
        !matches!(
            self,
            Request::Ping | Request::Hello { .. } | Request::Shutdown | Request::Tick
        )
    }
}

/// Keeps an explicit `null` distinct from an absent field
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Daemon responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    Pong,
    Hello {
        version: String,
    },
    Ok,
    Status {
        uptime_secs: u64,
        stats: ScheduleStats,
    },
    Tick {
        activated: usize,
    },
    Schedule {
        schedule: Schedule,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Schedules {
        schedules: Vec<Schedule>,
    },
    Bulk {
        outcome: BulkOutcome,
    },
    Decision {
        decision: AccessDecision,
    },
    /// `kind` is the engine's stable error name (`not_found`, ...)
    Error {
        kind: String,
        message: String,
    },
    ShuttingDown,
}

impl Response {
    pub fn error(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Response::Error {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Timeout")]
    Timeout,

    #[error("Message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },
}

/// Serialize a message body (no length prefix)
pub fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(msg)?)
}

/// Deserialize a message body
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Write a length-prefixed message
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    data: &[u8],
) -> Result<(), ProtocolError> {
    if data.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: data.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    let len = data.len() as u32;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

/// Read a length-prefixed message
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::ConnectionClosed)
        }
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

/// Read and decode a request within `timeout`
pub async fn read_request<R: AsyncRead + Unpin>(
    reader: &mut R,
    timeout: Duration,
) -> Result<Request, ProtocolError> {
    let bytes = tokio::time::timeout(timeout, read_message(reader))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    decode(&bytes)
}

/// Encode and write a response within `timeout`
pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
    timeout: Duration,
) -> Result<(), ProtocolError> {
    let data = encode(response)?;
    tokio::time::timeout(timeout, write_message(writer, &data))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
