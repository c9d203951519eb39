//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;

pub use entities::{
    BlockOutcome, ChatHistory, ConfigKey, Conversation, ConversationKind, Message, ResultBlock,
    SignInCredentials, SignInResult, MEDIA_PLACEHOLDER,
};
pub use errors::{DomainError, SummaryError};
