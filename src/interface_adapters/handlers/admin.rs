use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use tracing::info;

use super::{ApiError, error_response};
use crate::interface_adapters::auth::{bearer_token, map_admin_auth_error};
use crate::interface_adapters::protocol::{
    AdminLoginRequest, AdminLoginResponse, AdminLogoutResponse,
};
use crate::interface_adapters::state::{AppState, InMemorySessionStore, SystemClock};
use crate::use_cases::admin_login::AdminLoginUseCase;
use crate::use_cases::admin_logout::AdminLogoutUseCase;

// Handler for admin sign-in.
#[tracing::instrument(name = "admin_login", skip_all)]
pub async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<Json<AdminLoginResponse>, ApiError> {
    let use_case = AdminLoginUseCase {
        clock: SystemClock,
        store: InMemorySessionStore {
            sessions: state.sessions.clone(),
        },
        credentials: state.admin.clone(),
        ttl_seconds: state.session_ttl_seconds,
    };

    let result = use_case
        .execute(&payload.email, &payload.password)
        .await
        .map_err(map_admin_auth_error)?;

    info!(expires_at = result.expires_at, "admin signed in");

    Ok(Json(AdminLoginResponse {
        token: result.token,
        expires_at: result.expires_at,
    }))
}

// Handler for revoking the caller's admin session.
#[tracing::instrument(name = "admin_logout", skip_all)]
pub async fn admin_logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AdminLogoutResponse>, ApiError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| error_response(StatusCode::UNAUTHORIZED, "admin sign-in required"))?;

    let use_case = AdminLogoutUseCase {
        store: InMemorySessionStore {
            sessions: state.sessions.clone(),
        },
    };

    let revoked = use_case.execute(token).await.map_err(map_admin_auth_error)?;

    Ok(Json(AdminLogoutResponse { revoked }))
}
