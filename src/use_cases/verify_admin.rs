use crate::domain::admin::AdminSession;
use crate::domain::errors::AdminAuthError;
use crate::domain::ports::{Clock, SessionStore};

// Admin token verification use case with injected dependencies.
pub struct VerifyAdminUseCase<C, S> {
    pub clock: C,
    pub store: S,
}

impl<C, S> VerifyAdminUseCase<C, S>
where
    C: Clock,
    S: SessionStore,
{
    pub async fn execute(&self, token: &str) -> Result<AdminSession, AdminAuthError> {
        let session = self
            .store
            .get(token)
            .await
            .map_err(|_| AdminAuthError::StorageFailure)?
            .ok_or(AdminAuthError::InvalidToken)?;

        if session.expires_at <= self.clock.now_epoch_seconds() {
            // Best-effort cleanup of expired session.
            let _ = self.store.remove(token).await;
            return Err(AdminAuthError::SessionExpired);
        }

        Ok(session)
    }
}
