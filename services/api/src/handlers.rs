//! Axum Handlers for the Call Control Surface
//!
//! This module contains the logic for handling HTTP requests: starting
//! and stopping calls plus the per-call SSE event feed. It uses `utoipa`
//! doc comments to generate OpenAPI documentation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        IntoResponse, Json, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures_util::Stream;
use std::{convert::Infallible, sync::Arc};
use tokio_stream::{StreamExt, wrappers::BroadcastStream};
use tracing::{error, warn};

use crate::{
    call::service,
    models::{ErrorResponse, StartCallResponse, StopCallPayload, StopCallResponse},
    state::AppState,
};

pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(error) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response()
            }
            ApiError::NotFound(error) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse { error })).into_response()
            }
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                let error = format!("{err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { error }),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::InternalServerError(err.into())
    }
}

/// Start a new call.
///
/// Provisions a media room and agent plus a voice-agent call, wires the
/// relay between them, and returns everything the browser needs to join.
#[utoipa::path(
    post,
    path = "/api/start-call",
    responses(
        (status = 200, description = "Call started", body = StartCallResponse),
        (status = 500, description = "A provisioning step failed", body = ErrorResponse)
    )
)]
pub async fn start_call(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StartCallResponse>, ApiError> {
    let started = service::start_call(&state).await?;
    Ok(Json(started))
}

/// Stop an active call.
#[utoipa::path(
    post,
    path = "/api/stop-call",
    request_body = StopCallPayload,
    responses(
        (status = 200, description = "Call stopped", body = StopCallResponse),
        (status = 400, description = "Missing room id", body = ErrorResponse),
        (status = 404, description = "No such call", body = ErrorResponse)
    )
)]
pub async fn stop_call(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<StopCallPayload>,
) -> Result<Json<StopCallResponse>, ApiError> {
    let room_id = payload
        .room_id
        .ok_or_else(|| ApiError::BadRequest("roomId required".to_string()))?;

    if !service::stop_call(&state, &room_id).await {
        return Err(ApiError::NotFound("call not found".to_string()));
    }
    Ok(Json(StopCallResponse { ok: true }))
}

/// Subscribe to a call's event feed.
///
/// Server-sent events; each message carries the event kind as its SSE
/// event name and the full control payload as JSON data. A client
/// disconnect unsubscribes it without affecting the call.
#[utoipa::path(
    get,
    path = "/api/events/{room_id}",
    params(("room_id" = String, Path, description = "Room id returned by start-call")),
    responses(
        (status = 200, description = "SSE stream of session events"),
        (status = 404, description = "No such call", body = ErrorResponse)
    )
)]
pub async fn events(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let handle = state
        .registry
        .lookup(&room_id)
        .ok_or_else(|| ApiError::NotFound("call not found".to_string()))?;

    let stream = BroadcastStream::new(handle.subscribe()).filter_map(|result| match result {
        Ok(event) => Some(Ok(Event::default()
            .event(event.kind.as_str())
            .data(event.payload.to_string()))),
        Err(err) => {
            warn!(error = %err, "observer lagged; events were dropped for this subscriber");
            None
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
