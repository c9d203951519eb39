//! Implements ChatBackend using grammers Client.
//!
//! The client is built lazily from the credentials in the ConfigStore, since
//! they may only be entered during setup. Login and password tokens are kept
//! between calls for the auth flow. History is paged with raw GetHistory.

use crate::adapters::telegram::{mapper, session};
use crate::domain::{
    ChatHistory, ConfigKey, Conversation, DomainError, Message, SignInCredentials, SignInResult,
};
use crate::ports::{ChatBackend, ConfigStore};
use async_trait::async_trait;
use grammers_client::client::{LoginToken, PasswordToken};
use grammers_client::tl;
use grammers_client::{Client, InvocationError};
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Telegram returns at most this many messages per GetHistory call.
const HISTORY_PAGE_SIZE: usize = 100;

/// Live client plus the API hash it was built with (needed to request login codes).
struct Connection {
    client: Client,
    api_hash: String,
}

/// Telegram adapter. One session file, reused across runs.
pub struct GrammersChatBackend {
    config: Arc<dyn ConfigStore>,
    session_path: PathBuf,
    connection: Mutex<Option<Connection>>,
    /// Token from request_login_code; consumed by sign_in.
    login_token: Mutex<Option<LoginToken>>,
    /// Token from sign_in(PasswordRequired); consumed by the first password attempt.
    password_token: Mutex<Option<PasswordToken>>,
    /// InputPeer by chat id, filled while listing dialogs.
    peer_cache: Mutex<HashMap<i64, tl::enums::InputPeer>>,
}

impl GrammersChatBackend {
    pub fn new(config: Arc<dyn ConfigStore>, session_path: impl Into<PathBuf>) -> Self {
        Self {
            config,
            session_path: session_path.into(),
            connection: Mutex::new(None),
            login_token: Mutex::new(None),
            password_token: Mutex::new(None),
            peer_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Build the client from stored credentials unless one is already running.
    async fn ensure_connected(&self) -> Result<(Client, String), DomainError> {
        let mut guard = self.connection.lock().await;
        if let Some(conn) = guard.as_ref() {
            return Ok((conn.client.clone(), conn.api_hash.clone()));
        }

        let api_id = self.config.get(ConfigKey::ApiId).await;
        let api_hash = self.config.get(ConfigKey::ApiHash).await;
        let (Some(api_id), Some(api_hash)) = (api_id, api_hash) else {
            return Err(DomainError::Config("API ID and API HASH are not set".into()));
        };
        let api_id: i32 = api_id
            .trim()
            .parse()
            .map_err(|_| DomainError::Config(format!("API ID is not a number: {}", api_id)))?;

        let client = session::start_client(&self.session_path, api_id).await?;
        info!(path = %self.session_path.display(), "telegram client started");
        *guard = Some(Connection {
            client: client.clone(),
            api_hash: api_hash.clone(),
        });
        Ok((client, api_hash))
    }

    async fn client(&self) -> Result<Client, DomainError> {
        self.ensure_connected().await.map(|(client, _)| client)
    }

    /// Resolve chat id to InputPeer, scanning dialogs only on a cache miss.
    async fn resolve_input_peer(&self, chat_id: i64) -> Result<tl::enums::InputPeer, DomainError> {
        if let Some(peer) = self.peer_cache.lock().await.get(&chat_id) {
            return Ok(peer.clone());
        }
        let client = self.client().await?;
        let mut dialogs = client.iter_dialogs();
        while let Some(dialog) = dialogs
            .next()
            .await
            .map_err(|e| DomainError::ChatBackend(e.to_string()))?
        {
            let peer = dialog.peer();
            if peer.id().bot_api_dialog_id() == chat_id {
                let peer_ref = peer
                    .to_ref()
                    .await
                    .ok_or_else(|| DomainError::ChatBackend("peer not in session cache".into()))?;
                let input_peer: tl::enums::InputPeer = peer_ref.into();
                self.peer_cache
                    .lock()
                    .await
                    .insert(chat_id, input_peer.clone());
                return Ok(input_peer);
            }
        }
        Err(DomainError::ChatBackend(format!(
            "chat {} not found in dialogs",
            chat_id
        )))
    }

    async fn sign_in_with_code(&self, code: &str) -> Result<SignInResult, DomainError> {
        let client = self.client().await?;
        let token = self.login_token.lock().await.take().ok_or_else(|| {
            DomainError::Auth("request a login code before signing in".into())
        })?;
        match client.sign_in(&token, code).await {
            Ok(_user) => Ok(SignInResult::Success),
            Err(grammers_client::SignInError::PasswordRequired(pt)) => {
                let hint = pt.hint().map(String::from);
                *self.password_token.lock().await = Some(pt);
                Ok(SignInResult::PasswordRequired { hint })
            }
            Err(grammers_client::SignInError::InvalidCode) => {
                // The code can be retyped with the same token.
                *self.login_token.lock().await = Some(token);
                Ok(SignInResult::InvalidCredentials("Invalid login code.".into()))
            }
            Err(grammers_client::SignInError::SignUpRequired) => {
                Ok(SignInResult::InvalidCredentials(
                    "Sign-up required. Create an account with the official Telegram app first."
                        .into(),
                ))
            }
            // PHONE_CODE_EXPIRED and friends: the token is dead, a new code is needed.
            Err(grammers_client::SignInError::Other(InvocationError::Rpc(rpc))) => {
                info!(error = %rpc.name, "login code rejected");
                Ok(SignInResult::CodeExpired {
                    reason: rpc.name.clone(),
                })
            }
            Err(e) => {
                *self.login_token.lock().await = Some(token);
                Err(DomainError::Auth(format!("sign in: {}", e)))
            }
        }
    }

    async fn sign_in_with_password(&self, password: &str) -> Result<SignInResult, DomainError> {
        let client = self.client().await?;
        let pt = match self.password_token.lock().await.take() {
            Some(pt) => pt,
            // SRP parameters are single-use; a retry needs fresh ones.
            None => client
                .get_password_information()
                .await
                .map_err(|e| DomainError::Auth(format!("password parameters: {}", e)))?,
        };
        match client.check_password(pt, password.as_bytes()).await {
            Ok(_user) => Ok(SignInResult::Success),
            Err(e) => Ok(SignInResult::InvalidCredentials(e.to_string())),
        }
    }
}

#[async_trait]
impl ChatBackend for GrammersChatBackend {
    async fn connect_and_check_authorized(&self) -> Result<bool, DomainError> {
        let client = self.client().await?;
        client
            .is_authorized()
            .await
            .map_err(|e| DomainError::ChatBackend(e.to_string()))
    }

    async fn reset(&self) {
        *self.connection.lock().await = None;
        *self.login_token.lock().await = None;
        *self.password_token.lock().await = None;
        self.peer_cache.lock().await.clear();
    }

    async fn send_login_code(&self, phone: &str) -> Result<(), DomainError> {
        let (client, api_hash) = self.ensure_connected().await?;
        let token = client
            .request_login_code(phone, &api_hash)
            .await
            .map_err(|e| DomainError::Auth(e.to_string()))?;
        *self.login_token.lock().await = Some(token);
        *self.password_token.lock().await = None;
        info!("login code requested");
        Ok(())
    }

    async fn sign_in(&self, credentials: SignInCredentials) -> Result<SignInResult, DomainError> {
        match credentials {
            SignInCredentials::Code(code) => self.sign_in_with_code(&code).await,
            SignInCredentials::Password(password) => self.sign_in_with_password(&password).await,
        }
    }

    async fn list_unread_conversations(
        &self,
        limit: usize,
    ) -> Result<Vec<Conversation>, DomainError> {
        let client = self.client().await?;
        let mut dialogs = client.iter_dialogs();
        let mut scanned = 0usize;
        let mut out = Vec::new();
        while scanned < limit {
            let Some(dialog) = dialogs
                .next()
                .await
                .map_err(|e| DomainError::ChatBackend(e.to_string()))?
            else {
                break;
            };
            let Some(unread_count) = mapper::unread_count_if_visible(&dialog.raw) else {
                continue;
            };
            scanned += 1;
            if unread_count == 0 {
                continue;
            }

            let peer = dialog.peer();
            let id = peer.id().bot_api_dialog_id();
            if let Some(peer_ref) = peer.to_ref().await {
                self.peer_cache.lock().await.insert(id, peer_ref.into());
            }
            out.push(Conversation {
                id,
                title: peer
                    .name()
                    .map(String::from)
                    .unwrap_or_else(|| peer.id().to_string()),
                kind: mapper::conversation_kind_from_peer(peer),
                unread_count,
            });
        }
        info!(scanned, unread = out.len(), "dialogs listed");
        Ok(out)
    }

    async fn fetch_history(
        &self,
        conversation: &Conversation,
        context: u32,
    ) -> Result<ChatHistory, DomainError> {
        let input_peer = self.resolve_input_peer(conversation.id).await?;
        let client = self.client().await?;
        let wanted = conversation.unread_count.saturating_add(context);

        let fetched = collect_history(wanted, |offset_id, limit| {
            let client = client.clone();
            let req = tl::functions::messages::GetHistory {
                peer: input_peer.clone(),
                offset_id,
                offset_date: 0,
                add_offset: 0,
                limit,
                max_id: 0,
                min_id: 0,
                hash: 0,
            };
            async move { history_page(&client, &req).await }
        })
        .await?;
        debug!(
            chat_id = conversation.id,
            requested = wanted,
            fetched = fetched.len(),
            "history fetched"
        );
        Ok(ChatHistory::split_newest_first(
            fetched,
            conversation.unread_count,
        ))
    }
}

/// One GetHistory call mapped to domain messages, newest first.
async fn history_page(
    client: &Client,
    req: &tl::functions::messages::GetHistory,
) -> Result<Vec<Message>, DomainError> {
    use tl::enums::messages::Messages;

    let raw = client
        .invoke(req)
        .await
        .map_err(|e| DomainError::ChatBackend(e.to_string()))?;
    let (messages, users, chats) = match raw {
        Messages::Messages(m) => (m.messages, m.users, m.chats),
        Messages::Slice(m) => (m.messages, m.users, m.chats),
        Messages::ChannelMessages(m) => (m.messages, m.users, m.chats),
        Messages::NotModified(_) => (Vec::new(), Vec::new(), Vec::new()),
    };
    let names = mapper::SenderNames::from_raw(&users, &chats);
    Ok(messages
        .iter()
        .map(|m| mapper::message_to_domain(m, &names))
        .collect())
}

/// Page backwards from the newest message until `wanted` messages are
/// collected or the history runs out.
///
/// `fetch_page(offset_id, limit)` returns messages older than `offset_id`
/// (0 = newest), newest first, at most `limit` of them.
async fn collect_history<F, Fut>(wanted: u32, mut fetch_page: F) -> Result<Vec<Message>, DomainError>
where
    F: FnMut(i32, i32) -> Fut,
    Fut: Future<Output = Result<Vec<Message>, DomainError>>,
{
    let wanted = wanted as usize;
    let mut out: Vec<Message> = Vec::with_capacity(wanted.min(HISTORY_PAGE_SIZE * 4));
    let mut offset_id = 0;
    while out.len() < wanted {
        let limit = (wanted - out.len()).min(HISTORY_PAGE_SIZE);
        let page = fetch_page(offset_id, limit as i32).await?;
        let Some(oldest) = page.last().map(|m| m.id) else {
            break;
        };
        // Ids only decrease while paging back; anything else would loop forever.
        if offset_id != 0 && oldest >= offset_id {
            break;
        }
        offset_id = oldest;
        out.extend(page.into_iter().take(limit));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: i32) -> Message {
        Message {
            id,
            sender: "Alice".into(),
            text: Some(format!("m{id}")),
            reply_to_msg_id: None,
        }
    }

    /// Fake server: ids `total..=1`, capped at HISTORY_PAGE_SIZE per call.
    fn server(total: i32) -> impl FnMut(i32, i32) -> std::future::Ready<Result<Vec<Message>, DomainError>> {
        move |offset_id, limit| {
            let start = if offset_id == 0 { total } else { offset_id - 1 };
            let limit = (limit as usize).min(HISTORY_PAGE_SIZE);
            let page = (1..=start).rev().take(limit).map(msg).collect();
            std::future::ready(Ok(page))
        }
    }

    #[tokio::test]
    async fn pages_past_the_per_call_cap() {
        let fetched = collect_history(230, server(500)).await.unwrap();
        assert_eq!(fetched.len(), 230);
        assert_eq!(fetched.first().map(|m| m.id), Some(500));
        assert_eq!(fetched.last().map(|m| m.id), Some(271));

        let history = ChatHistory::split_newest_first(fetched, 200);
        assert_eq!(history.new_messages.len(), 200);
        assert_eq!(history.old_messages.len(), 30);
        assert_eq!(history.new_messages.first().map(|m| m.id), Some(301));
        assert_eq!(history.old_messages.last().map(|m| m.id), Some(300));
    }

    #[tokio::test]
    async fn stops_when_history_runs_out() {
        let fetched = collect_history(130, server(42)).await.unwrap();
        assert_eq!(fetched.len(), 42);
    }

    #[tokio::test]
    async fn page_error_is_returned() {
        let err = collect_history(10, |_, _| {
            std::future::ready(Err::<Vec<Message>, _>(DomainError::ChatBackend(
                "CHANNEL_PRIVATE".into(),
            )))
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("CHANNEL_PRIVATE"));
    }

    #[tokio::test]
    async fn non_decreasing_offset_ends_paging() {
        // A server that ignores offset_id would otherwise be polled forever.
        let fetched = collect_history(300, |_, _| {
            std::future::ready(Ok::<_, DomainError>((1..=100).rev().map(msg).collect()))
        })
        .await
        .unwrap();
        assert_eq!(fetched.len(), 100);
    }
}
