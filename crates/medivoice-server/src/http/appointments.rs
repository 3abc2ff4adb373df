use super::routes::LimitQuery;
use super::{AppError, AppResult, AppState, JsonResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use medivoice_core::{Appointment, AppointmentRequest, Outcome};
use uuid::Uuid;

pub(super) async fn book(
    State(state): State<AppState>,
    Json(request): Json<AppointmentRequest>,
) -> AppResult<(StatusCode, Json<JsonResponse<Appointment>>)> {
    for (field, value) in [
        ("full_name", &request.full_name),
        ("phone", &request.phone),
        ("preferred_date", &request.preferred_date),
        ("preferred_time", &request.preferred_time),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::bad_request(format!("{} is required", field)));
        }
    }

    let appointment = Appointment::from_request(request);
    state
        .storage
        .put_appointment(&appointment)
        .map_err(AppError::from_core)?;
    state.metrics.appointments_booked.inc();
    tracing::info!("Appointment {} booked", appointment.id);

    if let Some(notifier) = state.webhook.clone() {
        let storage = state.storage.clone();
        let mut notified = appointment.clone();
        tokio::spawn(async move {
            match notifier.notify_appointment(&notified).await {
                Outcome::Ready(Some(body)) => {
                    notified.webhook_response = Some(body);
                    if let Err(e) = storage.put_appointment(&notified) {
                        tracing::warn!(
                            "Failed to store webhook reply for appointment {}: {}",
                            notified.id,
                            e
                        );
                    }
                }
                Outcome::Ready(None) => {}
                Outcome::Degraded { reason } => {
                    tracing::warn!("Appointment {} webhook failed: {}", notified.id, reason);
                }
            }
        });
    }

    Ok((StatusCode::CREATED, Json(JsonResponse::ok(appointment))))
}

pub(super) async fn list_appointments(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<JsonResponse<Vec<Appointment>>>> {
    let appointments = state.storage.list_appointments(Some(query.limit_or(50)))?;
    Ok(Json(JsonResponse::ok(appointments)))
}

pub(super) async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<JsonResponse<Appointment>>> {
    match state.storage.get_appointment(id)? {
        Some(appointment) => Ok(Json(JsonResponse::ok(appointment))),
        None => Err(AppError::not_found(format!("Appointment not found: {}", id))),
    }
}
