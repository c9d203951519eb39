//! Telegram adapter (grammers).

pub mod client;
pub mod mapper;
pub mod session;

pub use client::GrammersChatBackend;
