//! Domain entities. Pure data structures for the core business.
//!
//! No Telegram/IO types here; adapters map into these.

use serde::{Deserialize, Serialize};

/// An unread Telegram conversation (user, group, or channel).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ConversationKind,
    pub unread_count: u32,
}

impl Conversation {
    /// Only conversations with something unread can be summarized.
    pub fn is_eligible(&self) -> bool {
        self.unread_count > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    Direct,
    Group,
    Broadcast,
}

/// Shown instead of the text of media-only and service messages.
pub const MEDIA_PLACEHOLDER: &str = "[Media/Sticker]";

/// A single message from a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i32,
    pub sender: String,
    /// `None` for media-only messages (photo, sticker, ...).
    pub text: Option<String>,
    pub reply_to_msg_id: Option<i32>,
}

/// Message history of one conversation, split at the unread boundary.
///
/// Both groups are ordered oldest-first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatHistory {
    /// Unread messages: the subject of the summary.
    pub new_messages: Vec<Message>,
    /// Already-read messages preceding them: context only.
    pub old_messages: Vec<Message>,
}

impl ChatHistory {
    /// Split a newest-first fetch into new/old groups.
    ///
    /// The newest `unread` messages are "new", the rest "old". Each group is
    /// reversed so it reads oldest-to-newest.
    pub fn split_newest_first(mut messages: Vec<Message>, unread: u32) -> Self {
        let boundary = (unread as usize).min(messages.len());
        let mut old_messages = messages.split_off(boundary);
        messages.reverse();
        old_messages.reverse();
        Self {
            new_messages: messages,
            old_messages,
        }
    }
}

/// What the user supplies to complete sign-in.
#[derive(Debug, Clone)]
pub enum SignInCredentials {
    /// Login code received in Telegram / SMS.
    Code(String),
    /// Cloud (2FA) password.
    Password(String),
}

/// Result of a sign-in attempt. Transport failures are reported as `DomainError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInResult {
    Success,
    InvalidCredentials(String),
    /// Account is protected by a cloud password; ask for it next.
    PasswordRequired { hint: Option<String> },
    /// The login code can no longer be used (expired, too many attempts).
    /// A new one has to be requested.
    CodeExpired { reason: String },
}

/// Keys persisted in the credentials file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    ApiId,
    ApiHash,
    GeminiKey,
}

impl ConfigKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::ApiId => "api_id",
            ConfigKey::ApiHash => "api_hash",
            ConfigKey::GeminiKey => "gemini_key",
        }
    }
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rendered entry of the results view. Never mutated after it is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultBlock {
    pub conversation: Conversation,
    pub outcome: BlockOutcome,
    /// Self-contained HTML fragment for this block.
    pub html: String,
}

impl ResultBlock {
    pub fn is_error(&self) -> bool {
        matches!(self.outcome, BlockOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    /// Generated summary (Markdown as returned by the model).
    Summary { text: String },
    /// The summarizer answered with a failure notice (blocked, API error, ...).
    Unavailable { notice: String },
    /// Fetching or formatting the conversation failed.
    Failed { error: String },
}
