// File-backed guest store for offline and demo use.
//
// The whole set lives in one `<key>.json` file inside the data directory.
// Reads never fail: anything missing or unreadable falls back to the
// bundled default guest list. Writes go to a temp file first and are then
// renamed over the real one.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use crate::domain::errors::StoreError;
use crate::domain::guest::{Guest, GuestPatch};
use crate::domain::ports::GuestStore;
use crate::domain::subscription::{GuestSubscription, SUBSCRIPTION_BUFFER};
use crate::domain::validator::check_guest_list;

pub const DEFAULT_STORAGE_KEY: &str = "wedding_guests";

const DEFAULT_GUESTS: &str = include_str!("../../../data/default_guests.json");

pub struct LocalGuestStore {
    path: PathBuf,
    guests: Mutex<Vec<Guest>>,
    changes: watch::Sender<Arc<Vec<Guest>>>,
}

impl LocalGuestStore {
    pub fn open(data_dir: impl AsRef<Path>, key: &str) -> Self {
        let path = data_dir.as_ref().join(format!("{key}.json"));
        let guests = read_or_default(&path);
        info!(path = %path.display(), count = guests.len(), "local guest store opened");

        let (changes, _) = watch::channel(Arc::new(guests.clone()));
        Self {
            path,
            guests: Mutex::new(guests),
            changes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-reads the stored set, falling back to the bundled defaults.
    /// Subscribers see the reloaded set when it differs from the cache.
    pub fn load(&self) -> Vec<Guest> {
        let guests = read_or_default(&self.path);
        let mut current = self.lock();
        if *current != guests {
            *current = guests.clone();
            self.changes.send_replace(Arc::new(guests.clone()));
        }
        guests
    }

    pub fn save(&self, guests: &[Guest]) -> Result<(), StoreError> {
        let mut current = self.lock();
        write_atomically(&self.path, guests)?;
        *current = guests.to_vec();
        self.changes.send_replace(Arc::new(current.clone()));
        Ok(())
    }

    // Applies `change` to a copy, persists it, and only then commits it.
    fn mutate(&self, change: impl FnOnce(&mut Vec<Guest>)) -> Result<(), StoreError> {
        let mut current = self.lock();
        let mut next = current.clone();
        change(&mut next);

        write_atomically(&self.path, &next)?;
        *current = next;
        self.changes.send_replace(Arc::new(current.clone()));
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Guest>> {
        self.guests.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl GuestStore for LocalGuestStore {
    async fn load_all(&self) -> Result<Vec<Guest>, StoreError> {
        Ok(self.lock().clone())
    }

    async fn load_by_id(&self, id: &str) -> Result<Option<Guest>, StoreError> {
        Ok(self.lock().iter().find(|guest| guest.id == id).cloned())
    }

    async fn create(&self, guest: &Guest) -> Result<(), StoreError> {
        self.mutate(|guests| match guests.iter_mut().find(|g| g.id == guest.id) {
            Some(existing) => *existing = guest.clone(),
            None => guests.push(guest.clone()),
        })
    }

    async fn update(&self, id: &str, patch: &GuestPatch) -> Result<(), StoreError> {
        self.mutate(|guests| {
            if let Some(guest) = guests.iter_mut().find(|guest| guest.id == id) {
                patch.apply_to(guest);
            }
        })
    }

    async fn remove(&self, id: &str) -> Result<(), StoreError> {
        self.mutate(|guests| guests.retain(|guest| guest.id != id))
    }

    async fn clear_confirmation(&self, id: &str) -> Result<(), StoreError> {
        self.mutate(|guests| {
            if let Some(guest) = guests.iter_mut().find(|guest| guest.id == id) {
                guest.confirmed = None;
            }
        })
    }

    async fn replace_all(&self, guests: &[Guest]) -> Result<(), StoreError> {
        self.save(guests)
    }

    // Only sees writes made through this process.
    async fn subscribe(&self) -> Result<GuestSubscription, StoreError> {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let mut changes = self.changes.subscribe();

        let listener = tokio::spawn(async move {
            loop {
                let snapshot = changes.borrow_and_update().to_vec();
                if tx.send(Ok(snapshot)).await.is_err() {
                    return;
                }
                if changes.changed().await.is_err() {
                    return;
                }
            }
        });

        Ok(GuestSubscription::new(rx, listener))
    }
}

/// The guest list shipped with the application.
pub fn default_guests() -> Vec<Guest> {
    let parsed = serde_json::from_str::<serde_json::Value>(DEFAULT_GUESTS)
        .map_err(|err| err.to_string())
        .and_then(|value| check_guest_list(&value).map_err(|err| err.to_string()));

    match parsed {
        Ok(guests) => guests,
        Err(err) => {
            error!(error = %err, "bundled default guests are invalid");
            Vec::new()
        }
    }
}

fn read_or_default(path: &Path) -> Vec<Guest> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "no stored guests, using defaults");
            return default_guests();
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read stored guests, using defaults");
            return default_guests();
        }
    };

    let parsed = serde_json::from_str::<serde_json::Value>(&raw)
        .map_err(|err| err.to_string())
        .and_then(|value| check_guest_list(&value).map_err(|err| err.to_string()));

    match parsed {
        Ok(guests) => guests,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "stored guests are invalid, using defaults");
            default_guests()
        }
    }
}

fn write_atomically(path: &Path, guests: &[Guest]) -> Result<(), StoreError> {
    let body =
        serde_json::to_vec(guests).map_err(|err| StoreError::WriteFailed(err.to_string()))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_failed)?;
    }
    let staging = path.with_extension("json.tmp");
    std::fs::write(&staging, body).map_err(write_failed)?;
    std::fs::rename(&staging, path).map_err(write_failed)?;

    Ok(())
}

fn write_failed(err: std::io::Error) -> StoreError {
    error!(error = %err, "failed to save guests");
    StoreError::WriteFailed(err.to_string())
}
