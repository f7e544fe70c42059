// HTTP handlers for the admin guest table and the public invitation page.

mod admin;
mod guests;
mod invitation;

pub use admin::{admin_login, admin_logout};
pub use guests::{
    add_guest, clear_confirmation, confirm_guest, export_guests, guest_summary, import_guests,
    list_guests, remove_guest, update_guest,
};
pub use invitation::resolve_invitation;

use axum::{Json, http::StatusCode};

use crate::domain::errors::DirectoryError;
use crate::interface_adapters::protocol::ErrorResponse;

pub type ApiError = (StatusCode, Json<ErrorResponse>);

// Helper to build a JSON error response.
pub fn error_response(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            message: message.to_string(),
        }),
    )
}

pub fn guest_not_found() -> ApiError {
    error_response(StatusCode::NOT_FOUND, "guest not found")
}

// Rule violations are the caller's fault; storage problems are upstream.
pub fn map_directory_error(err: DirectoryError) -> ApiError {
    let status = match &err {
        DirectoryError::InvalidName
        | DirectoryError::InvalidPasses(_)
        | DirectoryError::InvalidConfirmation { .. }
        | DirectoryError::InvalidFile(_) => StatusCode::BAD_REQUEST,
        DirectoryError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        DirectoryError::Storage(_) => StatusCode::BAD_GATEWAY,
    };

    error_response(status, &err.to_string())
}
