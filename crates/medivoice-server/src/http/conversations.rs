use super::routes::LimitQuery;
use super::{AppError, AppResult, AppState, JsonResponse};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use medivoice_core::{ConversationFilter, ConversationRecord};
use uuid::Uuid;

pub(super) async fn history(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<JsonResponse<Vec<ConversationRecord>>>> {
    let records = state
        .storage
        .list_conversations(ConversationFilter::new().with_limit(query.limit_or(50)))?;
    Ok(Json(JsonResponse::ok(records)))
}

pub(super) async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<JsonResponse<ConversationRecord>>> {
    match state.storage.get_conversation(id)? {
        Some(record) => Ok(Json(JsonResponse::ok(record))),
        None => Err(AppError::not_found(format!("Conversation not found: {}", id))),
    }
}
