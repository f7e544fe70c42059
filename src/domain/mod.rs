// Domain layer: the guest entity, its rules, and the ports stores implement.

pub mod admin;
pub mod errors;
pub mod guest;
pub mod id;
pub mod ports;
pub mod subscription;
pub mod validator;

pub use admin::{AdminCredentials, AdminSession};
pub use errors::{AdminAuthError, DirectoryError, GuestRuleError, StoreError};
pub use guest::{Guest, GuestChanges, GuestPatch, GuestSummary, NewGuest};
pub use ports::{Clock, GuestStore, SessionStore};
pub use subscription::{GuestSetUpdate, GuestSubscription};
