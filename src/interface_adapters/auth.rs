//! Admin gate for the guest management routes.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
};

use crate::domain::admin::AdminSession;
use crate::domain::errors::AdminAuthError;
use crate::interface_adapters::handlers::error_response;
use crate::interface_adapters::protocol::ErrorResponse;
use crate::interface_adapters::state::{AppState, InMemorySessionStore, SystemClock};
use crate::use_cases::verify_admin::VerifyAdminUseCase;

/// Extractor that only succeeds for a live admin session.
///
/// Handlers that take it are unreachable without a valid
/// `Authorization: Bearer <token>` header; the directory itself performs no
/// authorization of its own.
pub struct RequireAdmin(pub AdminSession);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| error_response(StatusCode::UNAUTHORIZED, "admin sign-in required"))?;

        let use_case = VerifyAdminUseCase {
            clock: SystemClock,
            store: InMemorySessionStore {
                sessions: state.sessions.clone(),
            },
        };
        let session = use_case.execute(token).await.map_err(map_admin_auth_error)?;

        Ok(Self(session))
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub fn map_admin_auth_error(err: AdminAuthError) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        AdminAuthError::InvalidCredentials => {
            error_response(StatusCode::UNAUTHORIZED, "invalid email or password")
        }
        AdminAuthError::InvalidToken => {
            error_response(StatusCode::UNAUTHORIZED, "invalid session token")
        }
        AdminAuthError::SessionExpired => error_response(StatusCode::UNAUTHORIZED, "session expired"),
        AdminAuthError::StorageFailure => error_response(StatusCode::BAD_GATEWAY, "storage error"),
    }
}
