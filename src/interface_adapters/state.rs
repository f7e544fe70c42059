use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

use crate::domain::admin::{AdminCredentials, AdminSession};
use crate::domain::ports::{Clock, SessionStore};
use crate::use_cases::{GuestDirectory, ResolveInvitationUseCase};

// Application state shared by every HTTP handler.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<GuestDirectory>,
    pub invitations: Arc<ResolveInvitationUseCase>,
    // Signed-in admin sessions keyed by bearer token.
    pub sessions: Arc<Mutex<HashMap<String, AdminSession>>>,
    pub admin: AdminCredentials,
    pub session_ttl_seconds: u64,
}

// In-memory session store adapter for admin sign-in.
#[derive(Clone)]
pub struct InMemorySessionStore {
    pub sessions: Arc<Mutex<HashMap<String, AdminSession>>>,
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, token: String, session: AdminSession) -> Result<(), String> {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(token, session);
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<AdminSession>, String> {
        let sessions = self.sessions.lock().await;
        Ok(sessions.get(token).cloned())
    }

    async fn remove(&self, token: &str) -> Result<bool, String> {
        let mut sessions = self.sessions.lock().await;
        Ok(sessions.remove(token).is_some())
    }

    async fn remove_expired(&self, now: u64) -> Result<usize, String> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > now);
        Ok(before - sessions.len())
    }
}

// System clock adapter used by the admin sign-in use cases.
#[derive(Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
