//! tg-digest: summarize unread Telegram chats with Gemini. Hexagonal architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
