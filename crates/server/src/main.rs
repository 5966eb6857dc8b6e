use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use document::PageMode;
use generation::GeminiClient;
use planner::load_settings;
use serde::Deserialize;
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{FormEvent, FormOptions, GenerateResponse, SessionId, SessionSnapshot},
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod api;
mod app_state;

use app_state::AppState;

const MAX_REQUEST_BYTES: usize = 256 * 1024;

#[derive(Debug, Deserialize)]
struct DocumentQuery {
    #[serde(default)]
    print: bool,
}

type HttpResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings();
    info!(?settings, "settings loaded");
    if settings.api_key.trim().is_empty() {
        warn!("no generation API key configured; generate requests will fail");
    }

    let backend = GeminiClient::new(settings.gemini_config()?);
    let state = AppState::new(
        Arc::new(backend),
        settings.controller_config(),
        settings.signature_place.clone(),
    )
    .with_session_ttl(settings.session_ttl);
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.bind_addr))?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/options", get(http_options))
        .route("/api/sessions", post(http_create_session))
        .route(
            "/api/sessions/:session_id",
            get(http_snapshot).delete(http_delete_session),
        )
        .route("/api/sessions/:session_id/events", post(http_apply_event))
        .route("/api/sessions/:session_id/generate", post(http_generate))
        .route("/api/sessions/:session_id/document", get(http_document))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BYTES))
        .with_state(state)
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::Upstream | ErrorCode::MalformedResponse => StatusCode::BAD_GATEWAY,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn http_error(err: ApiError) -> (StatusCode, Json<ApiError>) {
    (status_for(err.code), Json(err))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_options(State(state): State<Arc<AppState>>) -> Json<FormOptions> {
    Json(api::options(&state))
}

async fn http_create_session(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<SessionSnapshot>) {
    (StatusCode::CREATED, Json(api::create_session(&state).await))
}

async fn http_snapshot(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> HttpResult<Json<SessionSnapshot>> {
    let snapshot = api::snapshot(&state, SessionId(session_id))
        .await
        .map_err(http_error)?;
    Ok(Json(snapshot))
}

async fn http_delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> HttpResult<StatusCode> {
    api::delete_session(&state, SessionId(session_id))
        .await
        .map_err(http_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn http_apply_event(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(event): Json<FormEvent>,
) -> HttpResult<Json<SessionSnapshot>> {
    let snapshot = api::apply_event(&state, SessionId(session_id), event)
        .await
        .map_err(http_error)?;
    Ok(Json(snapshot))
}

async fn http_generate(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> HttpResult<Json<GenerateResponse>> {
    let response = api::generate(&state, SessionId(session_id))
        .await
        .map_err(http_error)?;
    Ok(Json(response))
}

async fn http_document(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Query(q): Query<DocumentQuery>,
) -> HttpResult<Html<String>> {
    let mode = if q.print {
        PageMode::Print
    } else {
        PageMode::Screen
    };
    let page = api::document_page(&state, SessionId(session_id), mode)
        .await
        .map_err(http_error)?;
    Ok(Html(page))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
