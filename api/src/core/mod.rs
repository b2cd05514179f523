pub mod app_state;
pub mod config;
pub mod http;
pub mod ingest;
pub mod interaction;
pub mod session;
