//! HTML rendering for the results view.
//!
//! Generated text is Markdown; raw HTML inside it is escaped, never passed through.

use crate::domain::{Conversation, ResultBlock};
use chrono::Local;
use pulldown_cmark::{html, Event, Options, Parser};

/// Render model output (Markdown) to an HTML fragment.
pub fn render_markdown(text: &str) -> String {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(text, opts).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut buf = String::new();
    html::push_html(&mut buf, parser);
    buf
}

/// Escaped plain text in an error-styled container. Newlines become `<br>`.
pub fn render_notice(text: &str) -> String {
    let safe = html_escape::encode_text(text).replace('\n', "<br>");
    format!("<div style='color: #ffcccc;'>{}</div>", safe)
}

/// Titled card for one conversation around an already rendered body.
pub fn conversation_card(conversation: &Conversation, body_html: &str) -> String {
    format!(
        r#"<div style="background-color: #262626; padding: 15px; margin-bottom: 15px; border-radius: 10px; border-left: 4px solid #0078d4;">
    <h2 style="color: #4da6ff; margin: 0 0 10px 0; font-size: 18px;">
        {title} <span style="font-size: 14px; color: #aaa; font-weight: normal;">(+{unread})</span>
    </h2>
    <div style="color: #dddddd; line-height: 1.5; font-size: 15px;">
        {body}
    </div>
</div>
"#,
        title = html_escape::encode_text(&conversation.title),
        unread = conversation.unread_count,
        body = body_html,
    )
}

/// Inline error block for a conversation that could not be processed.
pub fn error_block(conversation: &Conversation, error: &str) -> String {
    format!(
        "<div style='color:red; padding:10px;'>Error with {}: {}</div>\n",
        html_escape::encode_text(&conversation.title),
        html_escape::encode_text(error)
    )
}

/// Accumulated results page. Append-only, in processing order.
#[derive(Debug, Default)]
pub struct ResultsDocument {
    body: String,
    blocks: usize,
}

impl ResultsDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, block: &ResultBlock) {
        self.body.push_str(&block.html);
        self.blocks += 1;
    }

    pub fn len(&self) -> usize {
        self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks == 0
    }

    /// Full standalone page.
    pub fn to_html(&self) -> String {
        let body = if self.is_empty() {
            "<h3 style='color:#888'>Generating summary...</h3>"
        } else {
            self.body.as_str()
        };
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Telegram AI Summarizer</title>
</head>
<body style="background-color: #1e1e1e; color: #e0e0e0; font-family: 'Segoe UI', sans-serif; font-size: 14px; padding: 10px;">
{body}
<p style="color: #666; font-size: 12px;">Generated {at}</p>
</body>
</html>
"#,
            body = body,
            at = Local::now().format("%Y-%m-%d %H:%M"),
        )
    }
}
