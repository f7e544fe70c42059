use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::interface_adapters::handlers::{
    add_guest, admin_login, admin_logout, clear_confirmation, confirm_guest, export_guests,
    guest_summary, import_guests, list_guests, remove_guest, resolve_invitation, update_guest,
};
use crate::interface_adapters::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/admin/login", post(admin_login))
        .route("/admin/logout", post(admin_logout))
        .route("/admin/guests", get(list_guests).post(add_guest))
        .route("/admin/guests/export", get(export_guests))
        .route("/admin/guests/import", post(import_guests))
        .route("/admin/guests/{id}", patch(update_guest).delete(remove_guest))
        .route(
            "/admin/guests/{id}/confirmation",
            put(confirm_guest).delete(clear_confirmation),
        )
        .route("/admin/summary", get(guest_summary))
        .route("/invitation", get(resolve_invitation))
        .with_state(state)
}
