// Runtime wiring: settings, database plumbing and the HTTP server.

pub mod config;
pub mod db;
pub mod server;
