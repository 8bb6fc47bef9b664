//! Inbound HTTP surface
//!
//! A tokio `TcpListener` accepting one request per connection, each served on
//! its own task. Requests share nothing but the read-only [`RenderApp`].

pub mod handlers;
pub mod http;

pub use handlers::{handle, RequestParams, ACCESS_KEY_HEADER};
pub use http::{HttpError, HttpRequest, HttpResponse};

use crate::app::RenderApp;
use crate::rendering::ExportError;
use crate::world::JobError;
use reqwest::StatusCode;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

/// How long a client gets to send its full request.
const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Back-off after a failed `accept`, e.g. when out of file descriptors.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Request-level failure, surfaced to the caller as an HTTP status.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Unauthorized request")]
    Unauthorized,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Invalid or missing RenderType: {0:?}")]
    InvalidRenderType(String),

    #[error(transparent)]
    Job(#[from] JobError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Bad request: {0}")]
    Http(#[from] HttpError),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Unauthorized => StatusCode::FORBIDDEN,
            ServiceError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ServiceError::InvalidRenderType(_) | ServiceError::Job(_) | ServiceError::Http(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::Export(ExportError::InvalidName { .. }) => StatusCode::BAD_REQUEST,
            ServiceError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message for the response body. Internal failures stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::InvalidRenderType(_) => "Invalid or missing RenderType".to_string(),
            ServiceError::Export(ExportError::InvalidName { .. }) => "Invalid output name".to_string(),
            ServiceError::Export(_) => "Internal server error".to_string(),
            ServiceError::Http(_) => "Bad request".to_string(),
            other => other.to_string(),
        }
    }
}

pub struct RenderServer {
    listener: TcpListener,
    app: Arc<RenderApp>,
}

impl RenderServer {
    pub async fn bind(address: &str, app: Arc<RenderApp>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(address).await?;
        Ok(Self { listener, app })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever.
    pub async fn run(self) -> std::io::Result<()> {
        info!("Starting server on {}", self.local_addr()?);

        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };

            let app = Arc::clone(&self.app);
            tokio::spawn(async move {
                serve_connection(stream, peer, app).await;
            });
        }
    }
}

async fn serve_connection(mut stream: TcpStream, peer: SocketAddr, app: Arc<RenderApp>) {
    let response = match tokio::time::timeout(REQUEST_READ_TIMEOUT, HttpRequest::read_from(&mut stream)).await {
        Ok(Ok(request)) => {
            debug!("{} {} from {}", request.method, request.target, peer);
            handle(&app, &request).await
        }
        Ok(Err(HttpError::Incomplete)) => {
            debug!("Connection from {} closed before a full request", peer);
            return;
        }
        Ok(Err(e)) => {
            let err = ServiceError::from(e);
            warn!("Bad request from {}: {}", peer, err);
            HttpResponse::error(err.status(), &err.public_message())
        }
        Err(_) => {
            warn!("Timed out reading request from {}", peer);
            HttpResponse::error(StatusCode::REQUEST_TIMEOUT, "Request timeout")
        }
    };

    if let Err(e) = response.write_to(&mut stream).await {
        warn!("Failed to write response to {}: {}", peer, e);
        return;
    }
    let _ = stream.shutdown().await;
}
