//! HTTP API server for the interactive-learning front end.
//!
//! Provides the transcript-and-quiz endpoint and a health check.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::orchestrator::Pipeline;
use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::{error, info};

/// Shared application state.
struct AppState {
    pipeline: Pipeline,
}

/// Run the HTTP API server.
pub async fn run_serve(host: Option<&str>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    // Every request needs the completion client, so a missing key stops startup
    preflight::check_api_key(&settings.completion.api_key_env)?;
    for tool in preflight::REQUIRED_TOOLS {
        if let Err(e) = preflight::check_tool(tool) {
            Output::warning(&format!("{} (audio fallback will fail)", e));
        }
    }

    let pipeline = Pipeline::new(&settings)?;
    let app = router(Arc::new(AppState { pipeline }), &settings.server.allowed_origins)?;

    let host = host.unwrap_or(&settings.server.host);
    let port = port.unwrap_or(settings.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Clipquiz API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Transcript + quiz", "POST /get_transcript/");
    Output::kv("Allowed origins", &settings.server.allowed_origins.join(", "));
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router with CORS for `allowed_origins`.
fn router(state: Arc<AppState>, allowed_origins: &[String]) -> anyhow::Result<Router> {
    let origins = allowed_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request());

    Ok(Router::new()
        .route("/health", get(health))
        .route("/get_transcript/", post(get_transcript))
        .route("/get_transcript", post(get_transcript))
        .layer(cors)
        .with_state(state))
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct TranscriptRequest {
    video_url: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn get_transcript(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TranscriptRequest>,
) -> Response {
    match state.pipeline.process(&req.video_url).await {
        Ok(result) => {
            info!(
                video_id = %result.video_id,
                "Served {} windows and {} questions",
                result.segments.len(),
                result.questions.len()
            );
            Json(result.response_body()).into_response()
        }
        Err(e) => {
            let status = if e.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            error!(status = status.as_u16(), "Request failed: {}", e);
            (
                status,
                Json(ErrorResponse {
                    detail: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
