use crate::domain::errors::AdminAuthError;
use crate::domain::ports::SessionStore;

// Logout use case with injected dependencies.
pub struct AdminLogoutUseCase<S> {
    pub store: S,
}

impl<S> AdminLogoutUseCase<S>
where
    S: SessionStore,
{
    /// Returns whether a live session was revoked.
    pub async fn execute(&self, token: &str) -> Result<bool, AdminAuthError> {
        self.store
            .remove(token)
            .await
            .map_err(|_| AdminAuthError::StorageFailure)
    }
}
