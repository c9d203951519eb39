//! In-memory fakes for the outbound ports.

use crate::domain::{
    ChatHistory, ConfigKey, Conversation, ConversationKind, DomainError, Message,
    SignInCredentials, SignInResult, SummaryError,
};
use crate::ports::{ChatBackend, ConfigStore, SummarizerPort};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct MemoryConfigStore {
    values: Mutex<HashMap<ConfigKey, String>>,
}

impl MemoryConfigStore {
    pub fn with(entries: &[(ConfigKey, &str)]) -> Self {
        let store = Self::default();
        {
            let mut values = store.values.lock().unwrap();
            for (k, v) in entries {
                values.insert(*k, v.to_string());
            }
        }
        store
    }

    pub fn value(&self, key: ConfigKey) -> Option<String> {
        self.values.lock().unwrap().get(&key).cloned()
    }
}

#[async_trait::async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn get(&self, key: ConfigKey) -> Option<String> {
        self.value(key)
    }

    async fn save(&self, entries: HashMap<ConfigKey, String>) -> Result<(), DomainError> {
        self.values.lock().unwrap().extend(entries);
        Ok(())
    }
}

/// Backend whose answers are set up front. Counts network-like calls.
#[derive(Default)]
pub struct ScriptedBackend {
    pub authorized: Mutex<Option<Result<bool, String>>>,
    pub send_code_error: Mutex<Option<DomainError>>,
    pub sign_in_results: Mutex<VecDeque<Result<SignInResult, DomainError>>>,
    pub conversations: Mutex<Vec<Conversation>>,
    /// Newest-first history per chat id; missing id means fetch error.
    pub histories: Mutex<HashMap<i64, Vec<Message>>>,
    pub calls: AtomicUsize,
    pub resets: AtomicUsize,
    pub fetched: Mutex<Vec<i64>>,
}

impl ScriptedBackend {
    pub fn authorized(value: bool) -> Self {
        let backend = Self::default();
        *backend.authorized.lock().unwrap() = Some(Ok(value));
        backend
    }

    pub fn push_sign_in(&self, result: SignInResult) {
        self.sign_in_results.lock().unwrap().push_back(Ok(result));
    }

    pub fn push_sign_in_error(&self, error: DomainError) {
        self.sign_in_results.lock().unwrap().push_back(Err(error));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ChatBackend for ScriptedBackend {
    async fn connect_and_check_authorized(&self) -> Result<bool, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.authorized.lock().unwrap().clone() {
            Some(Ok(v)) => Ok(v),
            Some(Err(e)) => Err(DomainError::ChatBackend(e)),
            None => Err(DomainError::Config("API ID and API HASH are not set".into())),
        }
    }

    async fn reset(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }

    async fn send_login_code(&self, _phone: &str) -> Result<(), DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.send_code_error.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn sign_in(&self, _credentials: SignInCredentials) -> Result<SignInResult, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sign_in_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(DomainError::Auth("no scripted sign-in result".into())))
    }

    async fn list_unread_conversations(
        &self,
        limit: usize,
    ) -> Result<Vec<Conversation>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .conversations
            .lock()
            .unwrap()
            .iter()
            .take(limit)
            .filter(|c| c.is_eligible())
            .cloned()
            .collect())
    }

    async fn fetch_history(
        &self,
        conversation: &Conversation,
        context: u32,
    ) -> Result<ChatHistory, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.fetched.lock().unwrap().push(conversation.id);
        let histories = self.histories.lock().unwrap();
        let all = histories
            .get(&conversation.id)
            .ok_or_else(|| DomainError::ChatBackend("CHANNEL_PRIVATE".into()))?;
        let window = (conversation.unread_count + context) as usize;
        let fetched = all.iter().take(window).cloned().collect();
        Ok(ChatHistory::split_newest_first(
            fetched,
            conversation.unread_count,
        ))
    }
}

/// Echoes a fixed summary, or fails for prompts containing a marker.
pub struct ScriptedSummarizer {
    pub fail_on: Option<(String, SummaryError)>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedSummarizer {
    pub fn ok() -> Self {
        Self {
            fail_on: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(marker: &str, error: SummaryError) -> Self {
        Self {
            fail_on: Some((marker.to_string(), error)),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl SummarizerPort for ScriptedSummarizer {
    async fn summarize(&self, prompt: &str) -> Result<String, SummaryError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some((marker, err)) = &self.fail_on {
            if prompt.contains(marker.as_str()) {
                return Err(err.clone());
            }
        }
        Ok("**Summary**: nothing urgent".to_string())
    }
}

pub fn conversation(id: i64, title: &str, unread: u32) -> Conversation {
    Conversation {
        id,
        title: title.to_string(),
        kind: ConversationKind::Group,
        unread_count: unread,
    }
}

/// `count` messages, newest first, ids `count..=1`.
pub fn history(count: i32) -> Vec<Message> {
    (1..=count)
        .rev()
        .map(|id| Message {
            id,
            sender: "Alice".to_string(),
            text: Some(format!("message {id}")),
            reply_to_msg_id: None,
        })
        .collect()
}
