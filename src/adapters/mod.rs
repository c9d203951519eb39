//! Infrastructure adapters. Implement ports.
//!
//! Telegram, Gemini, config file, terminal UI. Map errors to DomainError.

pub mod ai;
pub mod persistence;
pub mod telegram;
pub mod ui;
