pub mod auth;
mod appointments;
mod conversations;
mod routes;
mod telegram;
mod voice;

pub use routes::create_router;

use crate::metrics::MediVoiceMetrics;
use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use medivoice_core::{
    ConversationPipeline, MediVoiceError, PipelineError, Storage, TelegramClient, WebhookNotifier,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub pipeline: Arc<ConversationPipeline>,
    pub webhook: Option<WebhookNotifier>,
    pub telegram: Option<TelegramClient>,
    pub metrics: Arc<MediVoiceMetrics>,
    pub app_name: String,
    pub start_time: std::time::Instant,
}

/// Layers wrapped around the router by [`create_app`].
#[derive(Debug, Clone, Default)]
pub struct HttpOptions {
    pub auth_enabled: bool,
    pub auth_token: Option<String>,
    pub allowed_origins: Vec<String>,
}

/// Router plus bearer auth, CORS and request tracing.
pub fn create_app(state: AppState, options: &HttpOptions) -> Router {
    let auth_enabled = options.auth_enabled;
    let auth_token = options.auth_token.clone();

    create_router(state)
        .layer(axum::middleware::from_fn(move |req, next| {
            let tok = auth_token.clone();
            async move { auth::check(req, next, auth_enabled, tok).await }
        }))
        .layer(cors_layer(&options.allowed_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", o);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// JSON response wrapper
#[derive(Serialize)]
pub struct JsonResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> JsonResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> JsonResponse<()> {
        JsonResponse {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Custom error type for HTTP handlers.
///
/// Server errors are logged and answered with a generic message; client
/// errors echo their own message.
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: anyhow::anyhow!(msg.into()),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: anyhow::anyhow!(msg.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn from_core(err: MediVoiceError) -> Self {
        let status = match &err {
            MediVoiceError::Validation(_) => StatusCode::BAD_REQUEST,
            MediVoiceError::ConversationNotFound(_) | MediVoiceError::AppointmentNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            error: err.into(),
        }
    }

    pub fn from_pipeline(err: PipelineError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            error: err.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = if self.status.is_server_error() {
            tracing::error!("Request failed: {:#}", self.error);
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.error.to_string()
        };
        (self.status, Json(JsonResponse::<()>::err(message))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: err.into(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
