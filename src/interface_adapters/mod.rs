// Interface adapters: HTTP surface, admin gate and guest store backends.

pub mod auth;
pub mod handlers;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod stores;
