//! Map Grammers types to domain entities.

use crate::domain::{ConversationKind, Message};
use grammers_client::peer::Peer;
use grammers_client::tl;
use std::collections::HashMap;

/// Folder id Telegram uses for the archive.
const ARCHIVE_FOLDER_ID: i32 = 1;

const UNKNOWN_SENDER: &str = "Unknown";

/// Map a grammers Peer to domain ConversationKind.
///
/// * `Peer::User` → Direct.
/// * `Peer::Group` → Group (basic groups and megagroups).
/// * `Peer::Channel` → Broadcast.
pub fn conversation_kind_from_peer(peer: &Peer) -> ConversationKind {
    match peer {
        Peer::User(_) => ConversationKind::Direct,
        Peer::Group(_) => ConversationKind::Group,
        Peer::Channel(_) => ConversationKind::Broadcast,
    }
}

/// Unread count of a raw dialog, or `None` for archived dialogs and folders.
pub fn unread_count_if_visible(raw: &tl::enums::Dialog) -> Option<u32> {
    match raw {
        tl::enums::Dialog::Dialog(d) => visible_unread(d.folder_id, d.unread_count),
        tl::enums::Dialog::Folder(_) => None,
    }
}

/// `None` inside the archive folder, else the unread count (never negative).
fn visible_unread(folder_id: Option<i32>, unread_count: i32) -> Option<u32> {
    if folder_id == Some(ARCHIVE_FOLDER_ID) {
        None
    } else {
        Some(unread_count.max(0) as u32)
    }
}

/// Display names of users and chats returned alongside a history batch.
#[derive(Debug, Default)]
pub struct SenderNames {
    users: HashMap<i64, String>,
    chats: HashMap<i64, String>,
}

impl SenderNames {
    pub fn from_raw(users: &[tl::enums::User], chats: &[tl::enums::Chat]) -> Self {
        let mut names = Self::default();
        for user in users {
            if let tl::enums::User::User(u) = user {
                if let Some(first) = u.first_name.as_ref().filter(|s| !s.is_empty()) {
                    names.users.insert(u.id, first.clone());
                }
            }
        }
        for chat in chats {
            let (id, title) = match chat {
                tl::enums::Chat::Chat(c) => (c.id, &c.title),
                tl::enums::Chat::Forbidden(c) => (c.id, &c.title),
                tl::enums::Chat::Channel(c) => (c.id, &c.title),
                tl::enums::Chat::ChannelForbidden(c) => (c.id, &c.title),
                tl::enums::Chat::Empty(_) => continue,
            };
            names.chats.insert(id, title.clone());
        }
        names
    }

    /// First name for users, title for groups/channels, else "Unknown".
    pub fn resolve(&self, peer: &tl::enums::Peer) -> String {
        let found = match peer {
            tl::enums::Peer::User(p) => self.users.get(&p.user_id),
            tl::enums::Peer::Chat(p) => self.chats.get(&p.chat_id),
            tl::enums::Peer::Channel(p) => self.chats.get(&p.channel_id),
        };
        found.cloned().unwrap_or_else(|| UNKNOWN_SENDER.to_string())
    }
}

/// Empty text (media-only message) becomes `None`.
pub fn message_text(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Map a raw history message to a domain Message.
///
/// Every raw message becomes one domain message so the unread boundary
/// stays where Telegram counts it. Service and empty messages carry no text
/// and show up as the media placeholder.
pub fn message_to_domain(msg: &tl::enums::Message, names: &SenderNames) -> Message {
    match msg {
        tl::enums::Message::Message(m) => Message {
            id: m.id,
            // Incoming private messages and channel posts carry no from_id.
            sender: names.resolve(m.from_id.as_ref().unwrap_or(&m.peer_id)),
            text: message_text(&m.message),
            reply_to_msg_id: reply_to(m.reply_to.as_ref()),
        },
        tl::enums::Message::Service(m) => Message {
            id: m.id,
            sender: names.resolve(m.from_id.as_ref().unwrap_or(&m.peer_id)),
            text: None,
            reply_to_msg_id: reply_to(m.reply_to.as_ref()),
        },
        tl::enums::Message::Empty(m) => Message {
            id: m.id,
            sender: UNKNOWN_SENDER.to_string(),
            text: None,
            reply_to_msg_id: None,
        },
    }
}

fn reply_to(header: Option<&tl::enums::MessageReplyHeader>) -> Option<i32> {
    match header? {
        tl::enums::MessageReplyHeader::Header(h) => h.reply_to_msg_id,
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_media() {
        assert_eq!(message_text(""), None);
        assert_eq!(message_text("hi").as_deref(), Some("hi"));
    }

    #[test]
    fn archived_dialogs_are_hidden() {
        assert_eq!(visible_unread(Some(ARCHIVE_FOLDER_ID), 5), None);
        assert_eq!(visible_unread(None, 5), Some(5));
        // Other folder ids are user-made chat folders, not the archive.
        assert_eq!(visible_unread(Some(2), 3), Some(3));
        assert_eq!(visible_unread(None, 0), Some(0));
        assert_eq!(visible_unread(None, -1), Some(0));
    }

    #[test]
    fn empty_message_keeps_its_slot() {
        let raw = tl::enums::Message::Empty(tl::types::MessageEmpty {
            id: 9,
            peer_id: None,
        });
        let msg = message_to_domain(&raw, &SenderNames::default());
        assert_eq!(msg.id, 9);
        assert_eq!(msg.sender, "Unknown");
        assert_eq!(msg.text, None);
    }

    #[test]
    fn unknown_sender_falls_back() {
        let names = SenderNames::default();
        let peer = tl::enums::Peer::User(tl::types::PeerUser { user_id: 7 });
        assert_eq!(names.resolve(&peer), "Unknown");
    }
}
