// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP adapter for the host LMS REST API
//!
//! Endpoints, relative to the configured base URL:
//!
//! - `POST   /enrollments` with `{user_id, course_id, start_time, ref_marker, ref_id}`
//! - `DELETE /enrollments?ref_marker=..&ref_id=..` returning `{"deleted": n}`
//! - `GET    /enrollments?user_id=..&course_id=..` returning a list of records
//! - `GET    /users/{id}` and `GET /courses/{id}` (404 means "does not exist")

use crate::directory::{DirectoryAdapter, DirectoryError};
use crate::enrollment::{EnrollmentAdapter, EnrollmentError, EnrollmentRecord, ExternalId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use esched_core::{CourseId, ScheduleId, UserId};
use serde::Serialize;
use std::time::Duration;
use ureq::Agent;

/// Failure of a single host request
#[derive(Debug)]
enum HostFailure {
    Status(u16),
    Transport(String),
    Decode(String),
}

impl From<ureq::Error> for HostFailure {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::StatusCode(code) => HostFailure::Status(code),
            other => HostFailure::Transport(other.to_string()),
        }
    }
}

impl From<HostFailure> for EnrollmentError {
    fn from(f: HostFailure) -> Self {
        match f {
            HostFailure::Status(code) if (400..500).contains(&code) => {
                EnrollmentError::Rejected(format!("HTTP {}", code))
            }
            HostFailure::Status(code) => EnrollmentError::Unavailable(format!("HTTP {}", code)),
            HostFailure::Transport(msg) => EnrollmentError::Unavailable(msg),
            HostFailure::Decode(msg) => EnrollmentError::Decode(msg),
        }
    }
}

impl From<HostFailure> for DirectoryError {
    fn from(f: HostFailure) -> Self {
        match f {
            HostFailure::Status(code) => DirectoryError::Unavailable(format!("HTTP {}", code)),
            HostFailure::Transport(msg) | HostFailure::Decode(msg) => {
                DirectoryError::Unavailable(msg)
            }
        }
    }
}

#[derive(Serialize)]
struct CreateBody<'a> {
    user_id: UserId,
    course_id: CourseId,
    start_time: DateTime<Utc>,
    ref_marker: &'a str,
    ref_id: ScheduleId,
}

/// Host adapter speaking JSON over HTTP
///
/// `ureq` is blocking, so every call runs on the blocking thread pool.
#[derive(Clone)]
pub struct HttpHostAdapter {
    agent: Agent,
    base_url: String,
}

impl HttpHostAdapter {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let config = Agent::config_builder().timeout_global(Some(timeout)).build();
        Self {
            agent: Agent::new_with_config(config),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a path and report whether it exists
    async fn exists(&self, path: String) -> Result<bool, HostFailure> {
        let agent = self.agent.clone();
        let url = self.url(&path);
        blocking(move || match agent.get(&url).call() {
            Ok(_) => Ok(true),
            Err(ureq::Error::StatusCode(404)) => Ok(false),
            Err(e) => Err(e.into()),
        })
        .await
    }
}

async fn blocking<T, F>(f: F) -> Result<T, HostFailure>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, HostFailure> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| HostFailure::Transport(format!("request task failed: {}", e)))?
}

fn read_json(
    response: &mut ureq::http::Response<ureq::Body>,
) -> Result<serde_json::Value, HostFailure> {
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| HostFailure::Transport(format!("failed to read response: {}", e)))?;
    serde_json::from_str(&body).map_err(|e| HostFailure::Decode(e.to_string()))
}

/// The host may report ids as numbers or strings
fn external_id(value: &serde_json::Value) -> Result<ExternalId, HostFailure> {
    match value.get("id") {
        Some(serde_json::Value::String(s)) => Ok(ExternalId(s.clone())),
        Some(serde_json::Value::Number(n)) => Ok(ExternalId(n.to_string())),
        _ => Err(HostFailure::Decode("missing enrollment id".into())),
    }
}

#[async_trait]
impl EnrollmentAdapter for HttpHostAdapter {
    async fn create_enrollment(
        &self,
        user_id: UserId,
        course_id: CourseId,
        start_time: DateTime<Utc>,
        ref_marker: &str,
        ref_id: ScheduleId,
    ) -> Result<ExternalId, EnrollmentError> {
        let body = serde_json::to_string(&CreateBody {
            user_id,
            course_id,
            start_time,
            ref_marker,
            ref_id,
        })
        .map_err(|e| EnrollmentError::Decode(e.to_string()))?;
        let agent = self.agent.clone();
        let url = self.url("/enrollments");

        let id = blocking(move || {
            let mut response = agent
                .post(&url)
                .header("Content-Type", "application/json")
                .send(body.as_str())?;
            external_id(&read_json(&mut response)?)
        })
        .await?;
        Ok(id)
    }

    async fn delete_enrollment_by_ref(
        &self,
        ref_marker: &str,
        ref_id: ScheduleId,
    ) -> Result<usize, EnrollmentError> {
        let agent = self.agent.clone();
        let url = self.url("/enrollments");
        let marker = ref_marker.to_string();

        let deleted = blocking(move || {
            let mut response = agent
                .delete(&url)
                .query("ref_marker", &marker)
                .query("ref_id", ref_id.to_string())
                .call()?;
            let value = read_json(&mut response)?;
            value
                .get("deleted")
                .and_then(|d| d.as_u64())
                .map(|d| d as usize)
                .ok_or_else(|| HostFailure::Decode("missing deleted count".into()))
        })
        .await?;
        Ok(deleted)
    }

    async fn find_enrollment(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<EnrollmentRecord>, EnrollmentError> {
        let agent = self.agent.clone();
        let url = self.url("/enrollments");

        let records = blocking(move || {
            let mut response = agent
                .get(&url)
                .query("user_id", user_id.to_string())
                .query("course_id", course_id.to_string())
                .call()?;
            let value = read_json(&mut response)?;
            serde_json::from_value::<Vec<EnrollmentRecord>>(value)
                .map_err(|e| HostFailure::Decode(e.to_string()))
        })
        .await?;

        let active = records.iter().position(|r| r.status.is_active());
        Ok(match active {
            Some(i) => records.into_iter().nth(i),
            None => records.into_iter().next(),
        })
    }
}

#[async_trait]
impl DirectoryAdapter for HttpHostAdapter {
    async fn user_exists(&self, user_id: UserId) -> Result<bool, DirectoryError> {
        Ok(self.exists(format!("/users/{}", user_id)).await?)
    }

    async fn course_exists(&self, course_id: CourseId) -> Result<bool, DirectoryError> {
        Ok(self.exists(format!("/courses/{}", course_id)).await?)
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
