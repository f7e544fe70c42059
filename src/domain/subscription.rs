use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::errors::StoreError;
use crate::domain::guest::Guest;

// Each update carries the whole guest set, or the error the listener hit.
pub type GuestSetUpdate = Result<Vec<Guest>, StoreError>;

pub const SUBSCRIPTION_BUFFER: usize = 16;

/// Live feed of the guest set produced by a store backend.
///
/// The listener task is owned by the handle: calling [`unsubscribe`] or
/// dropping the handle stops it.
///
/// [`unsubscribe`]: GuestSubscription::unsubscribe
pub struct GuestSubscription {
    updates: mpsc::Receiver<GuestSetUpdate>,
    listener: JoinHandle<()>,
}

impl GuestSubscription {
    pub fn new(updates: mpsc::Receiver<GuestSetUpdate>, listener: JoinHandle<()>) -> Self {
        Self { updates, listener }
    }

    /// Waits for the next delivery. `None` means the listener has stopped.
    pub async fn next(&mut self) -> Option<GuestSetUpdate> {
        self.updates.recv().await
    }

    /// Takes a delivery that is already queued, without waiting.
    pub fn try_next(&mut self) -> Option<GuestSetUpdate> {
        self.updates.try_recv().ok()
    }

    pub fn unsubscribe(self) {
        self.listener.abort();
    }
}

impl Drop for GuestSubscription {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
