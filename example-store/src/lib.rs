pub mod api;
pub mod cache_keys;
pub mod config;
pub mod ids;
pub mod metrics;
pub mod models;
pub mod router;
pub mod server;
pub mod service;
pub mod state;
pub mod store;
pub mod utils;
