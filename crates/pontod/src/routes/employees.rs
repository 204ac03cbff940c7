use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use ponto_store::{IdentityId, NewIdentity};

use crate::dto::IdentitySummary;
use crate::error::ApiResult;
use crate::routes::form::UploadForm;
use crate::state::AppState;

/// `POST /employees`
pub async fn create_employee(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<IdentitySummary>> {
    let form = UploadForm::read(multipart).await?;
    let new = NewIdentity {
        name: form.required_text("name")?,
        document: form.text("document"),
        email: form.text("email"),
    };
    let identity = state.workflow.enroll(new, form.selfie()?).await?;
    Ok(Json(identity.into()))
}

/// `GET /employees`
pub async fn list_employees(State(state): State<AppState>) -> ApiResult<Json<Vec<IdentitySummary>>> {
    let identities = state.workflow.records().list_identities().await?;
    Ok(Json(identities.into_iter().map(IdentitySummary::from).collect()))
}

/// `POST /faces/enroll/:employee_id`
pub async fn re_enroll(
    State(state): State<AppState>,
    Path(employee_id): Path<IdentityId>,
    multipart: Multipart,
) -> ApiResult<Json<IdentitySummary>> {
    let form = UploadForm::read(multipart).await?;
    let identity = state.workflow.re_enroll(employee_id, form.selfie()?).await?;
    Ok(Json(identity.into()))
}
