use uuid::Uuid;

use crate::domain::admin::{AdminCredentials, AdminSession};
use crate::domain::errors::AdminAuthError;
use crate::domain::ports::{Clock, SessionStore};

// Response returned by the admin login use case.
pub struct AdminLoginResponse {
    pub token: String,
    pub expires_at: u64,
}

// Admin login use case with injected dependencies.
pub struct AdminLoginUseCase<C, S> {
    pub clock: C,
    pub store: S,
    pub credentials: AdminCredentials,
    pub ttl_seconds: u64,
}

impl<C, S> AdminLoginUseCase<C, S>
where
    C: Clock,
    S: SessionStore,
{
    pub async fn execute(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AdminLoginResponse, AdminAuthError> {
        if !self.credentials.matches(email, password) {
            return Err(AdminAuthError::InvalidCredentials);
        }

        let now = self.clock.now_epoch_seconds();
        // Expired tokens that are never presented again would otherwise stay
        // in the store for the life of the process.
        self.store
            .remove_expired(now)
            .await
            .map_err(|_| AdminAuthError::StorageFailure)?;

        let token = Uuid::new_v4().to_string();
        let session_id = Uuid::new_v4().to_string();
        let expires_at = now + self.ttl_seconds;

        let session = AdminSession {
            email: self.credentials.email.clone(),
            session_id,
            expires_at,
        };

        self.store
            .insert(token.clone(), session)
            .await
            .map_err(|_| AdminAuthError::StorageFailure)?;

        Ok(AdminLoginResponse { token, expires_at })
    }
}
