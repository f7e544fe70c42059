use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use crate::domain::admin::AdminSession;
use crate::domain::errors::StoreError;
use crate::domain::guest::{Guest, GuestPatch};
use crate::domain::ports::{Clock, GuestStore, SessionStore};
use crate::domain::subscription::{GuestSetUpdate, GuestSubscription, SUBSCRIPTION_BUFFER};

pub(crate) type SessionTable = Arc<Mutex<HashMap<String, AdminSession>>>;

// Shared fixed time source for deterministic use-case tests.
pub(crate) struct FixedClock(pub(crate) u64);

impl Clock for FixedClock {
    fn now_epoch_seconds(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Default)]
pub(crate) struct FailureFlags {
    pub read: bool,
    pub write: bool,
}

pub(crate) fn guest(id: &str, name: &str, passes: u32, confirmed: Option<u32>) -> Guest {
    Guest {
        id: id.to_string(),
        name: name.to_string(),
        passes,
        confirmed,
    }
}

// In-memory guest store that records patches and can simulate failures or
// writes made by another client.
#[derive(Clone)]
pub(crate) struct RecordingStore {
    guests: Arc<Mutex<Vec<Guest>>>,
    patches: Arc<Mutex<Vec<(String, GuestPatch)>>>,
    version: Arc<watch::Sender<u64>>,
    subscribers: Arc<Mutex<Vec<mpsc::Sender<GuestSetUpdate>>>>,
    failures: FailureFlags,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self::with_guests(Vec::new())
    }

    pub(crate) fn with_guests(guests: Vec<Guest>) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            guests: Arc::new(Mutex::new(guests)),
            patches: Arc::new(Mutex::new(Vec::new())),
            version: Arc::new(version),
            subscribers: Arc::new(Mutex::new(Vec::new())),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn stored(&self) -> Vec<Guest> {
        self.guests.lock().expect("guests mutex poisoned").clone()
    }

    pub(crate) fn recorded_patches(&self) -> Vec<(String, GuestPatch)> {
        self.patches.lock().expect("patches mutex poisoned").clone()
    }

    // Simulates a write made by a different client sharing the store.
    pub(crate) fn external_write(&self, guest: Guest) {
        {
            let mut guests = self.guests.lock().expect("guests mutex poisoned");
            guests.retain(|existing| existing.id != guest.id);
            guests.push(guest);
        }
        self.bump();
    }

    // Pushes `snapshot` to every subscriber without touching the stored set,
    // like a backend delivering a read it took before the latest write.
    pub(crate) fn deliver_snapshot(&self, snapshot: Vec<Guest>) {
        let subscribers = self.subscribers.lock().expect("subscribers mutex poisoned");
        for subscriber in subscribers.iter() {
            let _ = subscriber.try_send(Ok(snapshot.clone()));
        }
    }

    fn bump(&self) {
        self.version.send_modify(|version| *version += 1);
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.failures.read {
            return Err(StoreError::ReadFailed("read failed".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.failures.write {
            return Err(StoreError::WriteFailed("write failed".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl GuestStore for RecordingStore {
    async fn load_all(&self) -> Result<Vec<Guest>, StoreError> {
        self.check_read()?;
        Ok(self.stored())
    }

    async fn load_by_id(&self, id: &str) -> Result<Option<Guest>, StoreError> {
        self.check_read()?;
        Ok(self.stored().into_iter().find(|guest| guest.id == id))
    }

    async fn create(&self, guest: &Guest) -> Result<(), StoreError> {
        self.check_write()?;
        self.external_write(guest.clone());
        Ok(())
    }

    async fn update(&self, id: &str, patch: &GuestPatch) -> Result<(), StoreError> {
        self.check_write()?;
        {
            let mut guests = self.guests.lock().expect("guests mutex poisoned");
            if let Some(guest) = guests.iter_mut().find(|guest| guest.id == id) {
                patch.apply_to(guest);
            }
        }
        self.patches
            .lock()
            .expect("patches mutex poisoned")
            .push((id.to_string(), patch.clone()));
        self.bump();
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), StoreError> {
        self.check_write()?;
        self.guests
            .lock()
            .expect("guests mutex poisoned")
            .retain(|guest| guest.id != id);
        self.bump();
        Ok(())
    }

    async fn clear_confirmation(&self, id: &str) -> Result<(), StoreError> {
        self.check_write()?;
        {
            let mut guests = self.guests.lock().expect("guests mutex poisoned");
            if let Some(guest) = guests.iter_mut().find(|guest| guest.id == id) {
                guest.confirmed = None;
            }
        }
        self.bump();
        Ok(())
    }

    async fn replace_all(&self, guests: &[Guest]) -> Result<(), StoreError> {
        self.check_write()?;
        *self.guests.lock().expect("guests mutex poisoned") = guests.to_vec();
        self.bump();
        Ok(())
    }

    async fn subscribe(&self) -> Result<GuestSubscription, StoreError> {
        self.check_read()?;
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        self.subscribers
            .lock()
            .expect("subscribers mutex poisoned")
            .push(tx.clone());
        let mut version = self.version.subscribe();
        let store = self.clone();
        let listener = tokio::spawn(async move {
            loop {
                if tx.send(Ok(store.stored())).await.is_err() {
                    return;
                }
                if version.changed().await.is_err() {
                    return;
                }
            }
        });
        Ok(GuestSubscription::new(rx, listener))
    }
}

#[derive(Clone, Copy, Default)]
pub(crate) struct SessionFailureFlags {
    pub insert: bool,
    pub get: bool,
    pub remove: bool,
}

#[derive(Clone)]
pub(crate) struct RecordingSessionStore {
    sessions: SessionTable,
    failures: SessionFailureFlags,
}

impl RecordingSessionStore {
    pub(crate) fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            failures: SessionFailureFlags::default(),
        }
    }

    pub(crate) fn with_failures(mut self, failures: SessionFailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn insert_test_session(&self, token: impl Into<String>, session: AdminSession) {
        let mut guard = self.sessions.lock().expect("sessions mutex poisoned");
        guard.insert(token.into(), session);
    }

    pub(crate) fn get_test_session(&self, token: &str) -> Option<AdminSession> {
        let guard = self.sessions.lock().expect("sessions mutex poisoned");
        guard.get(token).cloned()
    }
}

#[async_trait]
impl SessionStore for RecordingSessionStore {
    async fn insert(&self, token: String, session: AdminSession) -> Result<(), String> {
        if self.failures.insert {
            return Err("insert failed".to_string());
        }

        let mut guard = self.sessions.lock().expect("sessions mutex poisoned");
        guard.insert(token, session);
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<AdminSession>, String> {
        if self.failures.get {
            return Err("get failed".to_string());
        }

        let guard = self.sessions.lock().expect("sessions mutex poisoned");
        Ok(guard.get(token).cloned())
    }

    async fn remove(&self, token: &str) -> Result<bool, String> {
        if self.failures.remove {
            return Err("remove failed".to_string());
        }

        let mut guard = self.sessions.lock().expect("sessions mutex poisoned");
        Ok(guard.remove(token).is_some())
    }

    async fn remove_expired(&self, now: u64) -> Result<usize, String> {
        if self.failures.remove {
            return Err("remove failed".to_string());
        }

        let mut guard = self.sessions.lock().expect("sessions mutex poisoned");
        let before = guard.len();
        guard.retain(|_, session| session.expires_at > now);
        Ok(before - guard.len())
    }
}
