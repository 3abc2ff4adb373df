use super::{AppError, AppResult, AppState, JsonResponse};
use axum::{body::Bytes, extract::State, response::Json};
use medivoice_core::Outcome;
use serde::Serialize;
use serde_json::{json, Value};

/// Bot API update handler. Always answers 200 once a bot is configured so
/// Telegram does not redeliver the update.
pub(super) async fn webhook(State(state): State<AppState>, body: Bytes) -> AppResult<Json<Value>> {
    let client = state
        .telegram
        .clone()
        .ok_or_else(|| AppError::not_found("Telegram bot not configured"))?;

    let update: Value = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!("Unparseable Telegram update: {}", e);
            return Ok(Json(json!({ "ok": false, "error": e.to_string() })));
        }
    };

    let chat_id = update.pointer("/message/chat/id").and_then(Value::as_i64);
    let text = update
        .pointer("/message/text")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("");

    let chat_id = match chat_id {
        Some(id) if !text.is_empty() => id,
        _ => return Ok(Json(json!({ "ok": true }))),
    };

    let reply = state.pipeline.respond_text(text).await;
    state.metrics.telegram_messages.inc();
    tracing::info!(
        "Telegram message answered by {} (emergency: {})",
        reply.provider_used,
        reply.is_emergency
    );

    match client.send_message(chat_id, &reply.text).await {
        Outcome::Ready(()) => Ok(Json(json!({ "ok": true }))),
        Outcome::Degraded { reason } => Ok(Json(json!({ "ok": false, "error": reason }))),
    }
}

#[derive(Serialize)]
pub(super) struct TelegramInfo {
    configured: bool,
    webhook_path: &'static str,
    setup_instructions: Vec<&'static str>,
}

pub(super) async fn info(State(state): State<AppState>) -> AppResult<Json<JsonResponse<TelegramInfo>>> {
    if state.telegram.is_none() {
        return Err(AppError::not_found("Telegram bot not configured"));
    }

    Ok(Json(JsonResponse::ok(TelegramInfo {
        configured: true,
        webhook_path: "/api/telegram/webhook",
        setup_instructions: vec![
            "Expose this server over HTTPS",
            "Call https://api.telegram.org/bot<TOKEN>/setWebhook?url=<PUBLIC_URL>/api/telegram/webhook",
            "Send a message to the bot to test",
        ],
    })))
}
