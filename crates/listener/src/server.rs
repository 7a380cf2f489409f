//! HTTP server that feeds CloudEvents to the dispatcher.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use handlers::{Dispatcher, Outcome};
use serde::Serialize;
use thiserror::Error;

use crate::cloudevent;

/// Errors that stop the listener itself (not individual events).
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The listening socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested.
        addr: SocketAddr,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The server loop failed.
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Liveness response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Builds the router: `POST /` receives events, `GET /healthz` reports liveness.
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/", post(receive))
        .route("/healthz", get(health))
        .with_state(dispatcher)
}

/// Binds `addr` and serves until `shutdown` resolves.
///
/// # Errors
///
/// Returns [`ListenerError`] if the socket cannot be bound or the server fails.
pub async fn serve(
    addr: SocketAddr,
    dispatcher: Arc<Dispatcher>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ListenerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ListenerError::Bind { addr, source })?;
    tracing::info!(%addr, "Listening for build notifications");

    axum::serve(listener, router(dispatcher))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ListenerError::Serve)
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Handles one pushed event.
///
/// Any relay error answers `500` so the push subscription redelivers the
/// event; a body that is not a CloudEvent answers `400`.
async fn receive(
    State(dispatcher): State<Arc<Dispatcher>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let event = match cloudevent::from_request(&headers, &body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected request that is not a Pub/Sub CloudEvent");
            return (StatusCode::BAD_REQUEST, format!("invalid CloudEvent: {e}")).into_response();
        }
    };

    match dispatcher.dispatch(&event).await {
        Ok(Outcome::Handled { flavor }) => {
            tracing::info!(%flavor, "Build notification handled");
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(Outcome::Ignored { .. }) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            tracing::error!(error = %e, event_id = event.id.as_deref(), "Build notification failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
