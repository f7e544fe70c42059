use serde::{Deserialize, Serialize};

use crate::domain::guest::{Guest, GuestSummary};
use crate::use_cases::PublicInvitation;

// Request payload for admin sign-in.
#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

// Response payload for admin sign-in.
#[derive(Debug, Serialize)]
pub struct AdminLoginResponse {
    pub token: String,
    pub expires_at: u64,
}

// Response payload for admin sign-out.
#[derive(Debug, Serialize)]
pub struct AdminLogoutResponse {
    pub revoked: bool,
}

// Full guest list plus its aggregates for the admin table.
#[derive(Debug, Serialize)]
pub struct GuestListResponse {
    pub guests: Vec<Guest>,
    pub summary: GuestSummary,
}

// Request payload for recording a guest's response.
#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub count: u32,
}

#[derive(Debug, Serialize)]
pub struct RemoveGuestResponse {
    pub removed: bool,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Found,
    NotFound,
    NoGuest,
    Error,
}

// Public invitation lookup result.
#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    pub status: InvitationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest: Option<PublicInvitation>,
}

// Simple error envelope for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}
