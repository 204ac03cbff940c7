use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
    Json,
};
use ponto_store::{events_to_csv, IdentityId};

use crate::dto::PunchSummary;
use crate::error::{ApiError, ApiResult};
use crate::routes::form::UploadForm;
use crate::state::AppState;
use crate::workflow::Location;

/// `POST /punches`
pub async fn punch(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<PunchSummary>> {
    let form = UploadForm::read(multipart).await?;
    let employee_id: IdentityId = form
        .parsed("employee_id")?
        .ok_or_else(|| ApiError::validation("field 'employee_id' is required"))?;
    let location = Location {
        lat: form.coordinate("lat", 90.0)?,
        lon: form.coordinate("lon", 180.0)?,
    };

    let event = state
        .workflow
        .verify(employee_id, form.selfie()?, location)
        .await?;
    Ok(Json(event.into()))
}

/// `GET /punches/export.csv`
pub async fn export_csv(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let events = state.workflow.records().list_events().await?;
    tracing::debug!(rows = events.len(), "exporting punches");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"punches.csv\""),
        ],
        events_to_csv(&events),
    ))
}
