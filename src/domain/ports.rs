use async_trait::async_trait;

use crate::domain::admin::AdminSession;
use crate::domain::errors::StoreError;
use crate::domain::guest::{Guest, GuestPatch};
use crate::domain::subscription::GuestSubscription;

/// Persistence port for the guest set. The local file store and the
/// PostgreSQL store both implement it, and the directory never knows which
/// one it holds.
///
/// Stores are dumb persistence: they never check uniqueness or business
/// rules, and a `create` with an existing id replaces that record.
#[async_trait]
pub trait GuestStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<Guest>, StoreError>;

    /// Absent ids are `Ok(None)`, not an error.
    async fn load_by_id(&self, id: &str) -> Result<Option<Guest>, StoreError>;

    async fn create(&self, guest: &Guest) -> Result<(), StoreError>;

    /// Merges only the fields present in `patch`.
    async fn update(&self, id: &str, patch: &GuestPatch) -> Result<(), StoreError>;

    async fn remove(&self, id: &str) -> Result<(), StoreError>;

    /// Drops `confirmed` entirely, returning the guest to "no response yet".
    async fn clear_confirmation(&self, id: &str) -> Result<(), StoreError>;

    /// Replaces the whole set in one step. Used by imports.
    async fn replace_all(&self, guests: &[Guest]) -> Result<(), StoreError>;

    /// Delivers the current set right away, then again after every change.
    async fn subscribe(&self) -> Result<GuestSubscription, StoreError>;
}

// Port for admin session storage used by the sign-in use cases.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, token: String, session: AdminSession) -> Result<(), String>;
    async fn get(&self, token: &str) -> Result<Option<AdminSession>, String>;
    async fn remove(&self, token: &str) -> Result<bool, String>;
    /// Drops every session that expired at or before `now`.
    async fn remove_expired(&self, now: u64) -> Result<usize, String>;
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now_epoch_seconds(&self) -> u64;
}
