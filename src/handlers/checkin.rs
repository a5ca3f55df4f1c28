use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::checkin::Notification;
use crate::models::AttendanceStatus;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    pub code: String,
}

/// Manual code entry from the door page.
pub async fn check_in(
    State(state): State<AppState>,
    Json(request): Json<CheckInRequest>,
) -> Result<Response, AppError> {
    let result = state.checkin.check_in(&request.code).await;
    let notification = match &result {
        Ok(receipt) => Notification::checked_in(receipt),
        Err(err) => err.notification(),
    };

    let receipt = result?;
    Ok(created(receipt, notification.message))
}

#[derive(Debug, Serialize)]
pub struct StatusPayload {
    pub ticket: Uuid,
    pub status: AttendanceStatus,
    pub label: &'static str,
}

pub async fn registration_status(
    State(state): State<AppState>,
    Path(ticket): Path<Uuid>,
) -> Result<Response, AppError> {
    let status = state
        .checkin
        .status(ticket)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ticket '{}' was not found", ticket)))?;

    let payload = StatusPayload {
        ticket,
        status,
        label: status.label(),
    };
    Ok(success(payload, "Ticket status"))
}
