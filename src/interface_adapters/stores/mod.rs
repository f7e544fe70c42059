// Guest store adapters: a JSON file for offline/demo use and PostgreSQL for
// the shared production store.

pub mod local;
pub mod postgres;

pub use local::{DEFAULT_STORAGE_KEY, LocalGuestStore, default_guests};
pub use postgres::PostgresGuestStore;
