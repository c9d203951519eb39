//! Persistence adapters.

pub mod config_json;

pub use config_json::JsonConfigStore;
