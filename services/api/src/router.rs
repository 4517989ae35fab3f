//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the call control API, the SSE event feed, and OpenAPI
//! documentation.

use crate::{
    handlers,
    models::{ErrorResponse, StartCallResponse, StopCallPayload, StopCallResponse},
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::start_call, handlers::stop_call, handlers::events),
    components(
        schemas(StartCallResponse, StopCallPayload, StopCallResponse, ErrorResponse)
    ),
    tags(
        (name = "Voicebridge API", description = "Call control for the media-room to voice-agent bridge")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Group all routes that require AppState into their own router.
    let api_router = Router::new()
        .route("/api/start-call", post(handlers::start_call))
        .route("/api/stop-call", post(handlers::stop_call))
        .route("/api/events/{room_id}", get(handlers::events))
        .with_state(app_state);

    // Merge the stateful routes with the stateless Swagger UI.
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use tracing::Level;

    fn test_router() -> Router {
        let state = AppState::new(Config {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            fishjam_id: "test".to_string(),
            fishjam_management_token: "token".to_string(),
            fishjam_url: None,
            fishjam_socket_url: None,
            vapi_api_key: "key".to_string(),
            vapi_assistant_id: "assistant".to_string(),
            vapi_url: None,
            log_level: Level::INFO,
        });
        create_router(Arc::new(state))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_stop_call_without_room_id_is_bad_request() {
        let response = test_router()
            .oneshot(
                Request::post("/api/stop-call")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "roomId required");
    }

    #[tokio::test]
    async fn test_stop_call_unknown_room_is_not_found() {
        let response = test_router()
            .oneshot(
                Request::post("/api/stop-call")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"roomId":"nope"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "call not found");
    }

    #[tokio::test]
    async fn test_events_for_unknown_room_is_not_found() {
        let response = test_router()
            .oneshot(
                Request::get("/api/events/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "call not found");
    }
}
