//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Telegram error: {0}")]
    ChatBackend(String),

    /// Missing or unusable credentials. Sends the setup flow back to the API step.
    #[error("Config error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Summarizer error: {0}")]
    Summarizer(String),

    /// Analysis requested with no eligible conversation selected.
    #[error("You haven't selected any chats.")]
    NothingSelected,

    #[error("UI error: {0}")]
    Ui(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// Typed failure reasons of a summarization request.
///
/// `Display` is the notice shown to the user in place of a summary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummaryError {
    #[error("Error: Gemini API key not found in settings.")]
    MissingKey,

    #[error("Connection error: {0}")]
    Connection(String),

    /// Body was not JSON (relay or gateway page, HTML error, ...).
    #[error("Network error: {status} - {body}")]
    Network { status: u16, body: String },

    #[error("⚠️ Content blocked by Google (Hard Block): {reason}")]
    Blocked { reason: String },

    #[error("API Error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("⚠️ Google hid the response due to safety settings (Safety Filter).")]
    SafetyHidden,

    #[error("AI returned no text.")]
    NoText,
}
