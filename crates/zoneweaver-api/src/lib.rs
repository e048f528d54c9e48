// zoneweaver-api: Async Rust client for the Zoneweaver host management API

pub mod client;
pub mod error;
pub mod models;
pub mod network;
pub mod system;
pub mod time;
pub mod transport;

pub use client::ApiClient;
pub use error::Error;
