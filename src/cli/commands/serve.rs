//! HTTP API server for integration with other systems.
//!
//! Builds the corpus once and serves search and question answering over it.

use super::pipeline::load_pipeline;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::DocsageError;
use crate::orchestrator::{Orchestrator, PipelineState};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = load_pipeline(&settings).await?;
    let state = Arc::new(AppState { orchestrator });

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("docsage API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Sources", "GET  /sources");
    Output::kv("Search", "POST /search");
    Output::kv("Ask", "POST /ask");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/sources", get(sources))
        .route("/search", post(search))
        .route("/ask", post(ask))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Serialize)]
struct HealthResponse {
    status: PipelineState,
    documents: usize,
}

#[derive(Serialize)]
struct SourceInfo {
    position: usize,
    url: String,
    chars: usize,
}

#[derive(Serialize)]
struct SkippedInfo {
    url: String,
    reason: String,
}

#[derive(Serialize)]
struct SourcesResponse {
    documents: Vec<SourceInfo>,
    skipped: Vec<SkippedInfo>,
}

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default = "default_k")]
    k: usize,
}

fn default_k() -> usize {
    3
}

#[derive(Serialize)]
struct SearchHit {
    position: usize,
    url: String,
    distance: f32,
    content: String,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(e: DocsageError) -> Response {
    let status = match e {
        DocsageError::EmptyCorpus => StatusCode::SERVICE_UNAVAILABLE,
        DocsageError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        DocsageError::GenerationFailure(_) | DocsageError::OpenAI(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: state.orchestrator.state(),
        documents: state.orchestrator.documents().len(),
    })
}

async fn sources(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(SourcesResponse {
        documents: state
            .orchestrator
            .documents()
            .iter()
            .map(|d| SourceInfo {
                position: d.position,
                url: d.url.clone(),
                chars: d.char_count(),
            })
            .collect(),
        skipped: state
            .orchestrator
            .skipped()
            .iter()
            .map(|s| SkippedInfo {
                url: s.url.clone(),
                reason: s.reason.clone(),
            })
            .collect(),
    })
}

async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Response {
    if req.query.trim().is_empty() {
        return error_response(DocsageError::InvalidInput("query is empty".to_string()));
    }

    match state.orchestrator.retrieve(&req.query, req.k).await {
        Ok(hits) => Json(SearchResponse {
            results: hits
                .into_iter()
                .map(|h| SearchHit {
                    position: h.document.position,
                    url: h.document.url,
                    distance: h.distance,
                    content: h.document.raw_text,
                })
                .collect(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn ask(State(state): State<Arc<AppState>>, Json(req): Json<AskRequest>) -> Response {
    if req.question.trim().is_empty() {
        return error_response(DocsageError::InvalidInput("question is empty".to_string()));
    }

    match state.orchestrator.ask(&req.question).await {
        Ok(answer) => Json(answer).into_response(),
        Err(e) => error_response(e),
    }
}
