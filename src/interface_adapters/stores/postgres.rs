use async_trait::async_trait;
use sqlx::postgres::{PgListener, PgPool, PgRow};
use sqlx::Row;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::domain::errors::StoreError;
use crate::domain::guest::{Guest, GuestPatch};
use crate::domain::ports::GuestStore;
use crate::domain::subscription::{GuestSubscription, SUBSCRIPTION_BUFFER};

// Channel the `guests` table trigger notifies on every row change.
pub const GUESTS_CHANNEL: &str = "guests_changed";

// Pause before re-reading after the listener connection drops.
const LISTENER_RETRY_DELAY: Duration = Duration::from_secs(2);

// PostgreSQL-backed guest store shared by every admin client.
// Rows are last-write-wins; `update` merges per column.
#[derive(Clone)]
pub struct PostgresGuestStore {
    pub db: PgPool,
}

impl PostgresGuestStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GuestStore for PostgresGuestStore {
    async fn load_all(&self) -> Result<Vec<Guest>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, passes, confirmed
            FROM guests
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(read_failed)?;

        Ok(keep_valid(rows.iter().map(guest_from_row)))
    }

    async fn load_by_id(&self, id: &str) -> Result<Option<Guest>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, passes, confirmed
            FROM guests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(read_failed)?;

        Ok(row.map(|row| guest_from_row(&row)).and_then(|guest| keep_valid([guest]).pop()))
    }

    async fn create(&self, guest: &Guest) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO guests (id, name, passes, confirmed, created_at, updated_at)
            VALUES ($1, $2, $3, $4, clock_timestamp(), clock_timestamp())
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                passes = EXCLUDED.passes,
                confirmed = EXCLUDED.confirmed,
                created_at = EXCLUDED.created_at,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&guest.id)
        .bind(&guest.name)
        .bind(count_to_db(guest.passes)?)
        .bind(guest.confirmed.map(count_to_db).transpose()?)
        .execute(&self.db)
        .await
        .map_err(write_failed)?;

        Ok(())
    }

    async fn update(&self, id: &str, patch: &GuestPatch) -> Result<(), StoreError> {
        if patch.is_empty() {
            return Ok(());
        }

        // COALESCE keeps every column the patch leaves out.
        sqlx::query(
            r#"
            UPDATE guests SET
                name = COALESCE($2, name),
                passes = COALESCE($3, passes),
                confirmed = COALESCE($4, confirmed),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.passes.map(count_to_db).transpose()?)
        .bind(patch.confirmed.map(count_to_db).transpose()?)
        .execute(&self.db)
        .await
        .map_err(write_failed)?;

        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM guests WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(write_failed)?;

        Ok(())
    }

    async fn clear_confirmation(&self, id: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE guests SET
                confirmed = NULL,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(write_failed)?;

        Ok(())
    }

    async fn replace_all(&self, guests: &[Guest]) -> Result<(), StoreError> {
        let mut tx = self.db.begin().await.map_err(write_failed)?;

        sqlx::query("DELETE FROM guests")
            .execute(&mut *tx)
            .await
            .map_err(write_failed)?;

        for guest in guests {
            sqlx::query(
                r#"
                INSERT INTO guests (id, name, passes, confirmed, created_at, updated_at)
                VALUES ($1, $2, $3, $4, clock_timestamp(), clock_timestamp())
                "#,
            )
            .bind(&guest.id)
            .bind(&guest.name)
            .bind(count_to_db(guest.passes)?)
            .bind(guest.confirmed.map(count_to_db).transpose()?)
            .execute(&mut *tx)
            .await
            .map_err(write_failed)?;
        }

        tx.commit().await.map_err(write_failed)?;
        Ok(())
    }

    async fn subscribe(&self) -> Result<GuestSubscription, StoreError> {
        let mut listener = PgListener::connect_with(&self.db)
            .await
            .map_err(read_failed)?;
        listener.listen(GUESTS_CHANNEL).await.map_err(read_failed)?;

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let store = self.clone();
        let task = tokio::spawn(async move {
            loop {
                if tx.send(store.load_all().await).await.is_err() {
                    return;
                }

                // PgListener reconnects on the next recv after an error, so
                // report it, back off, and re-read in case changes were missed.
                match listener.recv().await {
                    Ok(notification) => {
                        let coalesced = 1 + drain_buffered(&mut listener);
                        debug!(
                            guest_id = notification.payload(),
                            coalesced, "guest change notification"
                        );
                    }
                    Err(err) => {
                        warn!(error = %err, "guest change listener failed");
                        if tx.send(Err(StoreError::backend(err))).await.is_err() {
                            return;
                        }
                        tokio::time::sleep(LISTENER_RETRY_DELAY).await;
                    }
                }
            }
        });

        Ok(GuestSubscription::new(rx, task))
    }
}

// The trigger fires once per row, so an import of N guests arrives as a
// burst. Notifications already read off the socket are folded into a single
// re-read.
fn drain_buffered(listener: &mut PgListener) -> usize {
    let mut drained = 0;
    while listener.next_buffered().is_some() {
        drained += 1;
    }
    drained
}

fn guest_from_row(row: &PgRow) -> Result<Guest, sqlx::Error> {
    let passes: i32 = row.try_get("passes")?;
    let confirmed: Option<i32> = row.try_get("confirmed")?;

    Ok(Guest {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        passes: count_from_db(passes),
        confirmed: confirmed.map(count_from_db),
    })
}

// Rows written by other tools are not trusted; drop any that break the
// guest rules instead of failing the whole read.
fn keep_valid(rows: impl IntoIterator<Item = Result<Guest, sqlx::Error>>) -> Vec<Guest> {
    rows.into_iter()
        .filter_map(|row| match row {
            Ok(guest) => match guest.check_invariants() {
                Ok(()) => Some(guest),
                Err(err) => {
                    warn!(guest_id = %guest.id, error = %err, "skipping invalid guest row");
                    None
                }
            },
            Err(err) => {
                warn!(error = %err, "skipping unreadable guest row");
                None
            }
        })
        .collect()
}

// Negative values can only come from outside writers; they map to zero so
// the invariant check rejects the row.
fn count_from_db(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

fn count_to_db(value: u32) -> Result<i32, StoreError> {
    i32::try_from(value)
        .map_err(|_| StoreError::WriteFailed(format!("count {value} is out of range")))
}

fn read_failed(err: sqlx::Error) -> StoreError {
    StoreError::ReadFailed(err.to_string())
}

fn write_failed(err: sqlx::Error) -> StoreError {
    StoreError::WriteFailed(err.to_string())
}
