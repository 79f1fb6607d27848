// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket server and connection handling.

use esched_daemon::protocol::{self, Request, DEFAULT_TIMEOUT};
use tokio::net::UnixStream;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::lifecycle::DaemonService;

/// Handle a single client connection
///
/// A `Shutdown` request is acknowledged first, then forwarded on `shutdown`.
pub async fn handle_connection(
    service: &DaemonService,
    stream: UnixStream,
    shutdown: mpsc::Sender<()>,
) -> Result<(), ServerError> {
    let (mut reader, mut writer) = stream.into_split();

    let request = match protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await {
        Ok(req) => req,
        Err(protocol::ProtocolError::Timeout) => {
            error!("Request read timeout");
            return Err(ServerError::Timeout);
        }
        Err(protocol::ProtocolError::ConnectionClosed) => {
            debug!("Client disconnected before sending request");
            return Ok(());
        }
        Err(e) => {
            error!("Failed to read request: {}", e);
            return Err(ServerError::Protocol(e));
        }
    };

    debug!("Received request: {:?}", request);

    let is_shutdown = request == Request::Shutdown;
    let response = service.handle(request).await;

    debug!("Sending response: {:?}", response);

    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT)
        .await
        .map_err(ServerError::Protocol)?;

    if is_shutdown {
        let _ = shutdown.send(()).await;
    }
    Ok(())
}

/// Server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),

    #[error("Request timeout")]
    Timeout,
}
