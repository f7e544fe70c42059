use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use super::{ApiError, guest_not_found, map_directory_error};
use crate::domain::guest::{Guest, GuestChanges, GuestSummary, NewGuest};
use crate::interface_adapters::auth::RequireAdmin;
use crate::interface_adapters::protocol::{
    ConfirmRequest, GuestListResponse, ImportResponse, RemoveGuestResponse,
};
use crate::interface_adapters::state::AppState;

const EXPORT_FILE_NAME: &str = "guests.json";

#[tracing::instrument(name = "list_guests", skip_all)]
pub async fn list_guests(_admin: RequireAdmin, State(state): State<AppState>) -> Json<GuestListResponse> {
    let guests = state.directory.list().await;
    let summary = GuestSummary::from_guests(&guests);

    Json(GuestListResponse { guests, summary })
}

#[tracing::instrument(name = "guest_summary", skip_all)]
pub async fn guest_summary(_admin: RequireAdmin, State(state): State<AppState>) -> Json<GuestSummary> {
    Json(state.directory.summary().await)
}

#[tracing::instrument(name = "add_guest", skip_all)]
pub async fn add_guest(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(payload): Json<NewGuest>,
) -> Result<(StatusCode, Json<Guest>), ApiError> {
    let guest = state.directory.add(payload).await.map_err(map_directory_error)?;

    Ok((StatusCode::CREATED, Json(guest)))
}

#[tracing::instrument(name = "update_guest", skip_all, fields(guest_id = %id))]
pub async fn update_guest(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<GuestChanges>,
) -> Result<Json<Guest>, ApiError> {
    state
        .directory
        .update(&id, payload)
        .await
        .map_err(map_directory_error)?
        .map(Json)
        .ok_or_else(guest_not_found)
}

#[tracing::instrument(name = "remove_guest", skip_all, fields(guest_id = %id))]
pub async fn remove_guest(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RemoveGuestResponse>, ApiError> {
    let removed = state.directory.remove(&id).await.map_err(map_directory_error)?;

    Ok(Json(RemoveGuestResponse { removed }))
}

#[tracing::instrument(name = "confirm_guest", skip_all, fields(guest_id = %id))]
pub async fn confirm_guest(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ConfirmRequest>,
) -> Result<Json<Guest>, ApiError> {
    state
        .directory
        .confirm(&id, payload.count)
        .await
        .map_err(map_directory_error)?
        .map(Json)
        .ok_or_else(guest_not_found)
}

#[tracing::instrument(name = "clear_confirmation", skip_all, fields(guest_id = %id))]
pub async fn clear_confirmation(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Guest>, ApiError> {
    state
        .directory
        .clear_confirmation(&id)
        .await
        .map_err(map_directory_error)?
        .map(Json)
        .ok_or_else(guest_not_found)
}

// Serves the full set as a download in the same format `import_guests` takes.
#[tracing::instrument(name = "export_guests", skip_all)]
pub async fn export_guests(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let body = state.directory.export_all().await.map_err(map_directory_error)?;
    let disposition = format!("attachment; filename=\"{EXPORT_FILE_NAME}\"");

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

// The body is the uploaded file as-is; it is validated before anything is
// replaced.
#[tracing::instrument(name = "import_guests", skip_all)]
pub async fn import_guests(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ImportResponse>, ApiError> {
    let imported = state.directory.import_all(&body).await.map_err(map_directory_error)?;

    Ok(Json(ImportResponse { imported }))
}
