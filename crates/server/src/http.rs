//! HTTP surface: health, REST analysis endpoints, document upload, and
//! static frontend serving. The WebSocket gateway is mounted on the same
//! router.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use venturescope_collaborators::prompts;
use venturescope_protocol::{AnalysisData, ServiceConnectivity, ServiceHealth, StartupForm};

use crate::auth::auth_middleware;
use crate::scoring;
use crate::state::{now_rfc3339, AppState};
use crate::websocket::ws_handler;

const ANALYSIS_MAX_OUTPUT_TOKENS: u32 = 2000;

/// Build the full application router
pub fn build_router(
    state: Arc<AppState>,
    static_dir: Option<PathBuf>,
    auth_token: Option<String>,
) -> Router {
    let mut app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/analyze/document", post(analyze_document_handler))
        .route("/api/history", get(history_handler))
        .with_state(state);

    if let Some(token) = auth_token {
        info!(
            component = "server",
            event = "server.auth.enabled",
            "auth token required for /ws and /api routes"
        );
        app = app.layer(middleware::from_fn_with_state(token, auth_middleware));
    }

    if let Some(dir) = static_dir {
        // Single-page frontend: unknown paths fall back to index.html
        let index = dir.join("index.html");
        app = app.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    app.layer(TraceLayer::new_for_http()).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

/// Liveness report. Collaborators are listed as configured, not probed:
/// this endpoint must answer fast even when a provider is down.
async fn health_handler() -> Json<ServiceHealth> {
    Json(ServiceHealth {
        status: "ok".to_string(),
        timestamp: now_rfc3339(),
        services: ServiceConnectivity {
            llm: "configured".to_string(),
            speech: "configured".to_string(),
            search: "configured".to_string(),
            websocket: "available".to_string(),
        },
    })
}

/// One-shot startup analysis over plain HTTP
async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<StartupForm>,
) -> impl IntoResponse {
    let missing = form.missing_fields();
    if !missing.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": format!("Missing required fields: {}", missing.join(", ")),
            })),
        );
    }

    let composite_score = scoring::composite_score(&form.scores);
    let prompt = prompts::analysis_prompt(&form);
    let reply = match state
        .collaborators
        .llm
        .generate(&prompt, ANALYSIS_MAX_OUTPUT_TOKENS)
        .await
    {
        Ok(reply) => reply,
        Err(err) => {
            error!(
                component = "http",
                event = "http.analyze.failed",
                error = %err,
                "analysis request failed"
            );
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to analyze startup" })),
            );
        }
    };

    let data = AnalysisData {
        composite_score,
        scores: form.scores.clone(),
        ai_analysis: scoring::parse_analysis_reply(&reply),
        timestamp: now_rfc3339(),
    };
    (
        StatusCode::OK,
        Json(json!({ "success": true, "data": data })),
    )
}

/// Deep analysis of an uploaded document. Text only: binary uploads are
/// rejected rather than silently mangled.
async fn analyze_document_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) => break field,
            Ok(None) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "No document provided" })),
                );
            }
            Err(err) => {
                warn!(
                    component = "http",
                    event = "http.document.read_failed",
                    error = %err,
                    "failed to read multipart field"
                );
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "Invalid multipart upload" })),
                );
            }
        }
    };

    let bytes = match field.bytes().await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(
                component = "http",
                event = "http.document.read_failed",
                error = %err,
                "failed to read document body"
            );
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid multipart upload" })),
            );
        }
    };

    let text = match std::str::from_utf8(&bytes) {
        Ok(text) => text.trim(),
        Err(_) => {
            return (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                Json(json!({ "error": "Unsupported document type; upload UTF-8 text" })),
            );
        }
    };
    if text.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Document is empty" })),
        );
    }

    let prompt = prompts::deep_analysis_prompt(text);
    match state
        .collaborators
        .llm
        .generate(&prompt, ANALYSIS_MAX_OUTPUT_TOKENS)
        .await
    {
        Ok(analysis) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "analysis": analysis, "timestamp": now_rfc3339() },
            })),
        ),
        Err(err) => {
            error!(
                component = "http",
                event = "http.document.failed",
                error = %err,
                "document analysis failed"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to analyze document" })),
            )
        }
    }
}

/// Analysis history lives in per-session context and the transcript sink;
/// there is no cross-session store to query yet.
async fn history_handler() -> Json<serde_json::Value> {
    Json(json!({ "analyses": [], "total": 0 }))
}
