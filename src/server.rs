//! HTTP API
//!
//! Routes:
//!
//! - `POST /api/chat` answers `{"message": "..."}` with `{"answer", "source"}`
//! - `GET /api/emissions` is reserved and always returns `[]`
//! - `GET /` is a liveness probe

use crate::chat::{ChatOrchestrator, ChatResult};
use crate::config::ServerConfig;
use crate::error::{EcoInsightError, Result};

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared handler state
#[derive(Clone)]
struct AppState {
    orchestrator: Arc<ChatOrchestrator>,
}

/// Errors surfaced to HTTP callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    /// The request body had no usable `message`
    MessageRequired,
    /// Answering failed unexpectedly
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MessageRequired => (StatusCode::BAD_REQUEST, "Message required"),
            Self::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Build the API router around an orchestrator
pub fn router(orchestrator: Arc<ChatOrchestrator>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health_check))
        .route("/api/emissions", get(list_emissions))
        .route("/api/chat", post(handle_chat))
        .layer(cors)
        .with_state(AppState { orchestrator })
}

/// Bind the configured address and serve until Ctrl-C
///
/// # Errors
///
/// Returns error if the address cannot be bound or the server fails
pub async fn serve(config: &ServerConfig, orchestrator: Arc<ChatOrchestrator>) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| EcoInsightError::Server(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}. Ready to accept requests.", addr);

    axum::serve(listener, router(orchestrator))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| EcoInsightError::Server(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

async fn health_check() -> &'static str {
    "API running"
}

async fn list_emissions() -> Json<JsonValue> {
    Json(json!([]))
}

async fn handle_chat(
    State(state): State<AppState>,
    body: Bytes,
) -> std::result::Result<Json<ChatResult>, ApiError> {
    let message = parse_message(&body).ok_or(ApiError::MessageRequired)?;
    tracing::info!("Chat request: {} chars", message.len());

    let orchestrator = Arc::clone(&state.orchestrator);
    let result = tokio::spawn(async move { orchestrator.handle(&message).await })
        .await
        .map_err(|e| {
            tracing::error!("Chat Error: {}", e);
            ApiError::Internal
        })?;

    Ok(Json(result))
}

/// The non-empty string `message` field of a JSON body
fn parse_message(body: &[u8]) -> Option<String> {
    let value: JsonValue = serde_json::from_slice(body).ok()?;
    let message = value.get("message")?.as_str()?;
    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let mut config = Config::default();
        config.chat.fallback_delay_ms = 0;
        router(Arc::new(ChatOrchestrator::from_config(&config).unwrap()))
    }

    async fn body_json(response: Response) -> JsonValue {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_parse_message() {
        assert_eq!(
            parse_message(br#"{"message":"hi"}"#),
            Some("hi".to_string())
        );
        assert_eq!(parse_message(b""), None);
        assert_eq!(parse_message(b"not json"), None);
        assert_eq!(parse_message(br#"{"message":""}"#), None);
        assert_eq!(parse_message(br#"{"message":42}"#), None);
        assert_eq!(parse_message(br#"{"text":"hi"}"#), None);
    }

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(
            ApiError::MessageRequired.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = test_router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"API running");
    }

    #[tokio::test]
    async fn test_emissions_is_empty_list() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/api/emissions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_chat_with_empty_body_is_bad_request() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Message required" })
        );
    }

    #[tokio::test]
    async fn test_chat_without_credentials_returns_default_answer() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"message":"Show transport trends"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "answer": crate::chat::DEFAULT_ANSWER,
                "source": "System"
            })
        );
    }
}
