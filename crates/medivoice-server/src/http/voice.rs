use super::{AppError, AppResult, AppState, JsonResponse};
use axum::{extract::State, response::Json};
use base64::{engine::general_purpose::STANDARD, Engine};
use medivoice_core::{InteractionInput, InteractionResponse};
use serde::Deserialize;
use std::time::Instant;

#[derive(Deserialize)]
pub(super) struct VoiceRequest {
    /// Base64-encoded recording.
    #[serde(default)]
    audio_data: Option<String>,
    #[serde(default)]
    text_message: Option<String>,
    /// Synthesise the reply when speech is configured.
    #[serde(default = "default_speak")]
    speak: bool,
}

fn default_speak() -> bool {
    true
}

pub(super) async fn interact(
    State(state): State<AppState>,
    Json(body): Json<VoiceRequest>,
) -> AppResult<Json<JsonResponse<InteractionResponse>>> {
    let started = Instant::now();

    let audio = match body.audio_data.as_deref().map(str::trim) {
        Some(encoded) if !encoded.is_empty() => match STANDARD.decode(encoded) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                state.metrics.record_rejection("client_error");
                return Err(AppError::bad_request(format!(
                    "audio_data is not valid base64: {}",
                    e
                )));
            }
        },
        _ => None,
    };

    let input = InteractionInput {
        audio,
        text: body.text_message,
    };

    match state.pipeline.run(input, body.speak).await {
        Ok(response) => {
            state.metrics.record_interaction(
                &response.provider_used,
                response.is_emergency,
                started.elapsed().as_secs_f64(),
            );
            Ok(Json(JsonResponse::ok(response)))
        }
        Err(e) => {
            let outcome = if e.is_client_error() {
                "client_error"
            } else {
                "internal"
            };
            state.metrics.record_rejection(outcome);
            Err(AppError::from_pipeline(e))
        }
    }
}
