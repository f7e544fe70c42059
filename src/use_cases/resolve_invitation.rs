use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::domain::guest::Guest;
use crate::domain::ports::GuestStore;

pub const DEFAULT_INVITATION_PARAM: &str = "guest";

// What the public invitation page is allowed to see about a guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicInvitation {
    pub name: String,
    pub passes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed: Option<u32>,
}

impl From<Guest> for PublicInvitation {
    fn from(guest: Guest) -> Self {
        Self {
            name: guest.name,
            passes: guest.passes,
            confirmed: guest.confirmed,
        }
    }
}

/// Outcome of resolving an invitation token. Only `Unavailable` is an error;
/// a missing or unknown token is a normal result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvitationLookup {
    NoGuestRequested,
    NotFound,
    Found(PublicInvitation),
    Unavailable,
}

// Public token resolution use case. The token is the guest id itself.
pub struct ResolveInvitationUseCase {
    pub store: Arc<dyn GuestStore>,
    pub param: String,
}

impl ResolveInvitationUseCase {
    pub fn token_from_query(&self, query: Option<&str>) -> Option<String> {
        let query = query?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == self.param.as_str())
            .map(|(_, value)| value.trim().to_string())
            .filter(|token| !token.is_empty())
    }

    pub async fn execute(&self, query: Option<&str>) -> InvitationLookup {
        let Some(token) = self.token_from_query(query) else {
            return InvitationLookup::NoGuestRequested;
        };

        match self.store.load_by_id(&token).await {
            Ok(Some(guest)) => {
                info!(guest_id = %guest.id, "invitation resolved");
                InvitationLookup::Found(guest.into())
            }
            Ok(None) => {
                info!("invitation token not found");
                InvitationLookup::NotFound
            }
            Err(err) => {
                error!(error = %err, "failed to load invitation");
                InvitationLookup::Unavailable
            }
        }
    }
}
