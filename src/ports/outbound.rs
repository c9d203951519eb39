//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{
    ChatHistory, ConfigKey, Conversation, DomainError, SignInCredentials, SignInResult,
    SummaryError,
};
use std::collections::HashMap;

/// Persisted credentials (flat key-value mapping).
#[async_trait::async_trait]
pub trait ConfigStore: Send + Sync {
    /// Current value for `key`. Unreadable storage counts as empty.
    async fn get(&self, key: ConfigKey) -> Option<String>;

    /// Merge `entries` into the persisted mapping; other keys are left untouched.
    async fn save(&self, entries: HashMap<ConfigKey, String>) -> Result<(), DomainError>;
}

/// Telegram session: login flow plus the reads needed for summarization.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Build the client from stored credentials (if not built yet), connect, and
    /// report whether the session is already authorized.
    ///
    /// Returns `DomainError::Config` when credentials are missing or unusable.
    async fn connect_and_check_authorized(&self) -> Result<bool, DomainError>;

    /// Drop the current client so the next connect picks up new credentials.
    async fn reset(&self);

    /// Request a login code for `phone`.
    async fn send_login_code(&self, phone: &str) -> Result<(), DomainError>;

    /// Complete sign-in with a code, or with the 2FA password after `PasswordRequired`.
    async fn sign_in(&self, credentials: SignInCredentials) -> Result<SignInResult, DomainError>;

    /// Scan up to `limit` non-archived dialogs and keep those with unread messages.
    async fn list_unread_conversations(
        &self,
        limit: usize,
    ) -> Result<Vec<Conversation>, DomainError>;

    /// Fetch `unread + context` most recent messages, split into new and old.
    async fn fetch_history(
        &self,
        conversation: &Conversation,
        context: u32,
    ) -> Result<ChatHistory, DomainError>;
}

/// Generative-language backend.
#[async_trait::async_trait]
pub trait SummarizerPort: Send + Sync {
    /// Summarize `prompt`. Failures carry the notice to show instead of a summary.
    async fn summarize(&self, prompt: &str) -> Result<String, SummaryError>;
}
