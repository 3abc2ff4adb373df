use super::{appointments, conversations, telegram, voice, AppResult, AppState, JsonResponse};
use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use medivoice_core::{ProviderAttempt, StorageStats};
use serde::{Deserialize, Serialize};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .route("/api/stats", get(stats))
        .route("/api/llm-logs", get(llm_logs))
        .route("/metrics", get(metrics))
        .route("/api/voice/interact", post(voice::interact))
        .route("/api/conversations/history", get(conversations::history))
        .route("/api/conversations/:id", get(conversations::get_conversation))
        .route(
            "/api/appointments",
            get(appointments::list_appointments),
        )
        .route("/api/appointments/book", post(appointments::book))
        .route("/api/appointments/:id", get(appointments::get_appointment))
        .route("/api/telegram/webhook", post(telegram::webhook))
        .route("/api/telegram/info", get(telegram::info))
        .with_state(state)
}

#[derive(Serialize)]
struct Welcome {
    app: String,
    version: String,
    message: String,
}

async fn root(State(state): State<AppState>) -> Json<JsonResponse<Welcome>> {
    Json(JsonResponse::ok(Welcome {
        message: format!("Welcome to {} API", state.app_name),
        app: state.app_name,
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    app_name: String,
    version: String,
    timestamp: String,
    uptime_seconds: u64,
}

async fn health(State(state): State<AppState>) -> Json<JsonResponse<HealthResponse>> {
    Json(JsonResponse::ok(HealthResponse {
        status: "healthy",
        app_name: state.app_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    }))
}

async fn stats(State(state): State<AppState>) -> AppResult<Json<JsonResponse<StorageStats>>> {
    let stats = state.storage.stats()?;
    Ok(Json(JsonResponse::ok(stats)))
}

#[derive(Deserialize)]
pub(super) struct LimitQuery {
    limit: Option<usize>,
}

impl LimitQuery {
    pub(super) fn limit_or(&self, default: usize) -> usize {
        self.limit.unwrap_or(default).clamp(1, 500)
    }
}

async fn llm_logs(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<JsonResponse<Vec<ProviderAttempt>>>> {
    let attempts = state.storage.list_attempts(query.limit_or(50))?;
    Ok(Json(JsonResponse::ok(attempts)))
}

async fn metrics(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let stats = state.storage.stats()?;
    state
        .metrics
        .refresh(&stats, state.start_time.elapsed().as_secs());
    let body = state.metrics.encode()?;
    Ok((
        [(
            header::CONTENT_TYPE,
            "application/openmetrics-text; version=1.0.0; charset=utf-8",
        )],
        body,
    ))
}
