//! Prompt construction for chat summaries.

use crate::domain::{ChatHistory, Message, MEDIA_PLACEHOLDER};

/// One line per message: `[ID:<id>] [ReplyTo:<id>] <sender>: <text>`.
///
/// The ReplyTo tag is omitted for messages that are not replies.
pub fn format_message(msg: &Message) -> String {
    let mut meta = format!("[ID:{}]", msg.id);
    if let Some(reply_to) = msg.reply_to_msg_id {
        meta.push_str(&format!(" [ReplyTo:{}]", reply_to));
    }
    let text = msg.text.as_deref().unwrap_or(MEDIA_PLACEHOLDER);
    format!("{} {}: {}", meta, msg.sender, text)
}

pub fn format_messages(messages: &[Message]) -> String {
    messages
        .iter()
        .map(format_message)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full prompt: role, reply-format explanation, read context, then the new messages.
pub fn build_prompt(chat_title: &str, history: &ChatHistory) -> String {
    format!(
        "Role: Personal Assistant. Analyze the correspondence in chat '{title}'.\n\
         IMPORTANT: Messages have format '[ID:...] [ReplyTo:...] Name: Text'. \
         Use ReplyTo to understand who is replying to whom.\n\n\
         --- CONTEXT (already read) ---\n{context}\n\
         ================================\n\
         --- NEW MESSAGES (summarize these) ---\n{new}\n\n\
         TASK: Write a brief summary of the NEW messages.",
        title = chat_title,
        context = format_messages(&history.old_messages),
        new = format_messages(&history.new_messages),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: i32, text: Option<&str>, reply: Option<i32>) -> Message {
        Message {
            id,
            sender: "Bob".into(),
            text: text.map(String::from),
            reply_to_msg_id: reply,
        }
    }

    #[test]
    fn line_with_reply() {
        assert_eq!(
            format_message(&msg(5, Some("ok"), Some(3))),
            "[ID:5] [ReplyTo:3] Bob: ok"
        );
    }

    #[test]
    fn line_without_reply_or_text() {
        assert_eq!(
            format_message(&msg(6, None, None)),
            "[ID:6] Bob: [Media/Sticker]"
        );
    }

    #[test]
    fn prompt_places_context_before_new() {
        let history = ChatHistory {
            new_messages: vec![msg(10, Some("fresh"), None)],
            old_messages: vec![msg(1, Some("stale"), None)],
        };
        let prompt = build_prompt("Team", &history);
        assert!(prompt.starts_with("Role: Personal Assistant. Analyze the correspondence in chat 'Team'."));
        let ctx = prompt.find("[ID:1] Bob: stale").unwrap();
        let new_header = prompt.find("--- NEW MESSAGES").unwrap();
        let fresh = prompt.find("[ID:10] Bob: fresh").unwrap();
        assert!(ctx < new_header && new_header < fresh);
        assert!(prompt.ends_with("TASK: Write a brief summary of the NEW messages."));
    }
}
