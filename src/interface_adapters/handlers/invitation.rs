use axum::{
    Json,
    extract::{RawQuery, State},
    http::StatusCode,
};

use crate::interface_adapters::protocol::{InvitationResponse, InvitationStatus};
use crate::interface_adapters::state::AppState;
use crate::use_cases::InvitationLookup;

// Public handler behind the invitation page; no admin session needed.
// An unknown token is a normal outcome and still answers 200.
pub async fn resolve_invitation(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> (StatusCode, Json<InvitationResponse>) {
    let (status, invitation_status, guest) =
        match state.invitations.execute(query.as_deref()).await {
            InvitationLookup::Found(guest) => (StatusCode::OK, InvitationStatus::Found, Some(guest)),
            InvitationLookup::NotFound => (StatusCode::OK, InvitationStatus::NotFound, None),
            InvitationLookup::NoGuestRequested => (StatusCode::OK, InvitationStatus::NoGuest, None),
            InvitationLookup::Unavailable => (StatusCode::BAD_GATEWAY, InvitationStatus::Error, None),
        };

    (
        status,
        Json(InvitationResponse {
            status: invitation_status,
            guest,
        }),
    )
}
