// Guest directory façade: owns the canonical guest set and is the only writer.

use std::collections::HashSet;
use std::sync::{Arc, Mutex as StdMutex, PoisonError, Weak};

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domain::errors::DirectoryError;
use crate::domain::guest::{
    self, Guest, GuestChanges, GuestPatch, GuestSummary, NewGuest, check_confirmed, check_name,
    check_passes,
};
use crate::domain::id::allocate_id;
use crate::domain::ports::GuestStore;
use crate::domain::subscription::GuestSetUpdate;
use crate::domain::validator::check_guest_list;

pub type GuestSnapshot = Arc<Vec<Guest>>;

/// In-memory owner of the guest set, backed by one [`GuestStore`].
///
/// Lifecycle is `init` → any number of mutations → `dispose`. Every mutation
/// is persisted before it is committed to memory, and the canonical lock is
/// held across the store call, so mutations apply in the order they were
/// issued and a failed write leaves the previous state untouched.
pub struct GuestDirectory {
    store: Arc<dyn GuestStore>,
    guests: Mutex<Vec<Guest>>,
    snapshots: watch::Sender<GuestSnapshot>,
    follower: StdMutex<Option<JoinHandle<()>>>,
}

impl GuestDirectory {
    pub async fn init(store: Arc<dyn GuestStore>) -> Result<Arc<Self>, DirectoryError> {
        let guests = store.load_all().await?;
        info!(count = guests.len(), "guest directory loaded");

        let (snapshots, _) = watch::channel(Arc::new(guests.clone()));
        Ok(Arc::new(Self {
            store,
            guests: Mutex::new(guests),
            snapshots,
            follower: StdMutex::new(None),
        }))
    }

    /// Receiver that observes every committed change to the guest set.
    pub fn watch(&self) -> watch::Receiver<GuestSnapshot> {
        self.snapshots.subscribe()
    }

    pub async fn list(&self) -> Vec<Guest> {
        self.guests.lock().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Guest> {
        let guests = self.guests.lock().await;
        guests.iter().find(|guest| guest.id == id).cloned()
    }

    pub async fn summary(&self) -> GuestSummary {
        GuestSummary::from_guests(&self.guests.lock().await)
    }

    pub async fn total_passes(&self) -> u32 {
        guest::total_passes(&self.guests.lock().await)
    }

    pub async fn total_confirmed_persons(&self) -> u32 {
        guest::total_confirmed_persons(&self.guests.lock().await)
    }

    pub async fn responded_count(&self) -> usize {
        guest::responded_count(&self.guests.lock().await)
    }

    pub async fn add(&self, data: NewGuest) -> Result<Guest, DirectoryError> {
        let name = data.name.trim().to_string();
        check_name(&name)?;
        check_passes(data.passes)?;

        let mut guests = self.guests.lock().await;
        let id = {
            let taken: HashSet<&str> = guests.iter().map(|guest| guest.id.as_str()).collect();
            allocate_id(&taken)
        };
        let guest = Guest {
            id,
            name,
            passes: data.passes,
            confirmed: None,
        };

        self.store.create(&guest).await?;
        guests.push(guest.clone());
        self.publish(&guests);
        info!(guest_id = %guest.id, passes = guest.passes, "guest added");

        Ok(guest)
    }

    /// Applies a partial edit. Returns `None` when the id is unknown.
    pub async fn update(
        &self,
        id: &str,
        changes: GuestChanges,
    ) -> Result<Option<Guest>, DirectoryError> {
        let mut guests = self.guests.lock().await;
        let Some(index) = position(&guests, id) else {
            return Ok(None);
        };

        let patch = GuestPatch {
            name: changes.name.map(|name| name.trim().to_string()),
            passes: changes.passes,
            confirmed: None,
        };
        if patch.is_empty() {
            return Ok(Some(guests[index].clone()));
        }

        let mut updated = guests[index].clone();
        patch.apply_to(&mut updated);
        check_name(&updated.name)?;
        check_passes(updated.passes)?;
        if let Some(confirmed) = updated.confirmed {
            check_confirmed(confirmed, updated.passes)?;
        }

        self.store.update(id, &patch).await?;
        guests[index] = updated.clone();
        self.publish(&guests);
        info!(guest_id = %id, "guest updated");

        Ok(Some(updated))
    }

    /// Removing an unknown id is not an error; the return value says whether
    /// a guest was actually dropped.
    pub async fn remove(&self, id: &str) -> Result<bool, DirectoryError> {
        let mut guests = self.guests.lock().await;
        self.store.remove(id).await?;

        let Some(index) = position(&guests, id) else {
            return Ok(false);
        };
        guests.remove(index);
        self.publish(&guests);
        info!(guest_id = %id, "guest removed");

        Ok(true)
    }

    /// Records a response of `count` attendees. Zero is a valid response.
    pub async fn confirm(&self, id: &str, count: u32) -> Result<Option<Guest>, DirectoryError> {
        let mut guests = self.guests.lock().await;
        let Some(index) = position(&guests, id) else {
            return Ok(None);
        };
        check_confirmed(count, guests[index].passes)?;

        let patch = GuestPatch {
            confirmed: Some(count),
            ..Default::default()
        };
        self.store.update(id, &patch).await?;

        guests[index].confirmed = Some(count);
        let confirmed = guests[index].clone();
        self.publish(&guests);
        info!(guest_id = %id, count, "guest confirmed");

        Ok(Some(confirmed))
    }

    /// Returns the guest to "no response yet".
    pub async fn clear_confirmation(&self, id: &str) -> Result<Option<Guest>, DirectoryError> {
        let mut guests = self.guests.lock().await;
        let Some(index) = position(&guests, id) else {
            return Ok(None);
        };

        self.store.clear_confirmation(id).await?;

        guests[index].confirmed = None;
        let cleared = guests[index].clone();
        self.publish(&guests);
        info!(guest_id = %id, "guest confirmation cleared");

        Ok(Some(cleared))
    }

    /// Replaces the whole set with the guests in `raw`. Nothing changes unless
    /// the entire file parses and validates.
    pub async fn import_all(&self, raw: &str) -> Result<usize, DirectoryError> {
        let value: serde_json::Value = serde_json::from_str(raw).map_err(|err| {
            warn!(error = %err, "import rejected: not json");
            DirectoryError::InvalidFile(format!("not valid JSON: {err}"))
        })?;
        let imported = check_guest_list(&value).map_err(|err| {
            warn!(error = %err, "import rejected: invalid guest list");
            DirectoryError::InvalidFile(err.to_string())
        })?;

        let mut guests = self.guests.lock().await;
        self.store.replace_all(&imported).await?;

        let count = imported.len();
        *guests = imported;
        self.publish(&guests);
        info!(count, "guest list imported");

        Ok(count)
    }

    /// Pretty-printed JSON array of every guest, in the import file format.
    pub async fn export_all(&self) -> Result<String, DirectoryError> {
        let guests = self.guests.lock().await;
        serde_json::to_string_pretty(&*guests)
            .map_err(|err| DirectoryError::Export(err.to_string()))
    }

    /// Keeps the in-memory set in step with changes other clients make to
    /// the store. Replaces any previous follower.
    ///
    /// A delivery only signals that the store changed. The set itself is
    /// re-read under the directory lock, so a snapshot taken before a local
    /// mutation committed can never roll that mutation back.
    pub async fn follow_store(self: &Arc<Self>) -> Result<(), DirectoryError> {
        let mut subscription = self.store.subscribe().await?;
        let directory: Weak<Self> = Arc::downgrade(self);

        let follower = tokio::spawn(async move {
            while let Some(update) = subscription.next().await {
                let mut changed = report(update);
                while let Some(queued) = subscription.try_next() {
                    changed |= report(queued);
                }
                if !changed {
                    continue;
                }

                let Some(directory) = directory.upgrade() else {
                    break;
                };
                directory.refresh_from_store().await;
            }
        });

        let previous = self
            .follower
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(follower);
        if let Some(previous) = previous {
            previous.abort();
        }
        Ok(())
    }

    /// Stops following the store. The directory stays readable afterwards.
    pub fn dispose(&self) {
        let follower = self
            .follower
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(follower) = follower {
            follower.abort();
            info!("guest directory stopped following store");
        }
    }

    async fn refresh_from_store(&self) {
        let mut guests = self.guests.lock().await;
        let current = match self.store.load_all().await {
            Ok(current) => current,
            Err(err) => {
                warn!(error = %err, "failed to refresh guests from store");
                return;
            }
        };
        if *guests == current {
            return;
        }
        *guests = current;
        self.publish(&guests);
        info!(count = guests.len(), "guest set refreshed from store");
    }

    fn publish(&self, guests: &[Guest]) {
        self.snapshots.send_replace(Arc::new(guests.to_vec()));
    }
}

impl Drop for GuestDirectory {
    fn drop(&mut self) {
        self.dispose();
    }
}

// Logs subscription errors; true when the delivery signals a change.
fn report(update: GuestSetUpdate) -> bool {
    match update {
        Ok(_) => true,
        Err(err) => {
            warn!(error = %err, "guest subscription error");
            false
        }
    }
}

fn position(guests: &[Guest], id: &str) -> Option<usize> {
    guests.iter().position(|guest| guest.id == id)
}
