//! Fulfillment webhook server
//!
//! # Endpoints
//!
//! - POST /fulfillment - Run one conversation turn
//! - GET /health - Liveness and content source

use crate::conversation::wire::TurnRequest;
use crate::runner::TurnRunner;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use sdk::errors::{EngineError, PersonaErrorExt};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// State shared by all requests
struct ServerState {
    runner: TurnRunner,
    started_at: DateTime<Utc>,
}

/// Build the webhook router
pub fn router(runner: TurnRunner) -> Router {
    let state = Arc::new(ServerState {
        runner,
        started_at: Utc::now(),
    });
    Router::new()
        .route("/fulfillment", post(fulfillment_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the webhook on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, runner: TurnRunner, shutdown: F) -> Result<(), EngineError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("Fulfillment webhook listening on http://{}", addr);

    axum::serve(listener, router(runner))
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!("Fulfillment webhook shutting down gracefully");
        })
        .await?;
    Ok(())
}

async fn fulfillment_handler(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<TurnRequest>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(request)) => Json(state.runner.handle_turn(request).await).into_response(),
        Err(rejection) => {
            let error = EngineError::MalformedRequest(rejection.body_text());
            tracing::warn!("Rejected fulfillment request: {}", error);
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": error.user_hint() })),
            )
                .into_response()
        }
    }
}

async fn health_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "content": state.runner.store().name(),
        "started_at": state.started_at.to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::TurnSettings;
    use axum::body::Body;
    use axum::http::Request;
    use sdk::bundle::ContentBundle;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let store = crate::content::StaticContentStore::new(ContentBundle::default());
        router(TurnRunner::new(Arc::new(store), TurnSettings::default()))
    }

    #[tokio::test]
    async fn test_health_reports_store() {
        let response = test_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["content"], "static");
    }

    #[tokio::test]
    async fn test_malformed_request_is_rejected() {
        let response = test_router()
            .oneshot(
                Request::post("/fulfillment")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
