// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request dispatch onto the lifecycle engine

use crate::protocol::{Request, Response, PROTOCOL_VERSION};
use esched_adapters::{DirectoryAdapter, EnrollmentAdapter};
use esched_core::Clock;
use esched_engine::{AccessService, EngineError, Lifecycle, Trigger};
use esched_storage::ScheduleStore;
use std::sync::Arc;
use std::time::Instant;

/// Answers protocol requests; shared by every connection
pub struct Service<S, E, D, C> {
    lifecycle: Arc<Lifecycle<S, E, D, C>>,
    trigger: Trigger<S, E, D, C>,
    access: AccessService<S>,
    start_time: Instant,
}

impl<S, E, D, C> Service<S, E, D, C>
where
    S: ScheduleStore,
    E: EnrollmentAdapter,
    D: DirectoryAdapter,
    C: Clock,
{
    pub fn new(lifecycle: Arc<Lifecycle<S, E, D, C>>) -> Self {
        Self {
            trigger: Trigger::new(Arc::clone(&lifecycle)),
            access: AccessService::new(Arc::clone(lifecycle.store())),
            lifecycle,
            start_time: Instant::now(),
        }
    }

    pub fn trigger(&self) -> &Trigger<S, E, D, C> {
        &self.trigger
    }

    /// Handle one request; engine failures become `Response::Error`
    pub async fn handle(&self, request: Request) -> Response {
        if request.runs_trigger() {
            if let Err(e) = self.trigger.on_request().await {
                tracing::warn!(error = %e, "opportunistic activation failed");
            }
        }

        match self.dispatch(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(kind = e.kind(), error = %e, "request failed");
                Response::error(e.kind(), e.to_string())
            }
        }
    }

    async fn dispatch(&self, request: Request) -> Result<Response, EngineError> {
        let response = match request {
            Request::Ping => Response::Pong,

            Request::Hello { version } => {
                if version != PROTOCOL_VERSION {
                    tracing::warn!(
                        client = %version,
                        daemon = PROTOCOL_VERSION,
                        "client version differs from daemon"
                    );
                }
                Response::Hello {
                    version: PROTOCOL_VERSION.to_string(),
                }
            }

            Request::Status => Response::Status {
                uptime_secs: self.start_time.elapsed().as_secs(),
                stats: self.lifecycle.stats(self.lifecycle.clock().now())?,
            },

            Request::Tick => Response::Tick {
                activated: self.trigger.tick().await?,
            },

            Request::CreateSchedule { schedule } => Response::Schedule {
                schedule: self.lifecycle.create_schedule(schedule).await?,
                message: None,
            },

            Request::ListSchedules { filter } => Response::Schedules {
                schedules: self.lifecycle.list(&filter)?,
            },

            Request::GetSchedule { id } => Response::Schedule {
                schedule: self.lifecycle.get(id)?,
                message: None,
            },

            Request::UpdateSchedule {
                id,
                scheduled_start,
                note,
            } => {
                if scheduled_start.is_none() && note.is_none() {
                    return Err(EngineError::Validation(
                        "nothing to update: give a start time or a note".to_string(),
                    ));
                }

                let (schedule, message) = match scheduled_start {
                    Some(start) => {
                        let rescheduled = self.lifecycle.reschedule(id, start).await?;
                        let message = rescheduled.outcome.message().to_string();
                        (rescheduled.schedule, Some(message))
                    }
                    None => (self.lifecycle.get(id)?, None),
                };
                let schedule = match note {
                    Some(note) => self.lifecycle.update_note(id, note)?,
                    None => schedule,
                };
                Response::Schedule { schedule, message }
            }

            Request::DeleteSchedule { id } => Response::Schedule {
                schedule: self.lifecycle.delete_schedule(id)?,
                message: None,
            },

            Request::ActivateSchedule { id } => Response::Schedule {
                schedule: self.lifecycle.activate_now(id).await?,
                message: None,
            },

            Request::Bulk { action, ids } => Response::Bulk {
                outcome: self.lifecycle.bulk(action, &ids).await,
            },

            Request::Decide { user_id, course_id } => Response::Decision {
                decision: self
                    .access
                    .decide(user_id, course_id, self.lifecycle.clock().now())?,
            },

            Request::Shutdown => Response::ShuttingDown,
        };
        Ok(response)
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
