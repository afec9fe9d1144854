//! Message records and the per-export aggregate

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// Who sent a message. Binary by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    /// CSS-facing name, also used as the class prefix of a message block.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        }
    }

    /// Label shown in the exported document.
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Assistant => "Assistant",
        }
    }
}

/// One extracted message. Immutable once the extractor produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRecord {
    /// Stable id from the page; empty when the element had none.
    pub id: String,
    pub sender: Sender,
    /// Sanitized inner HTML of the message body.
    pub content: String,
    /// Markup-free projection of `content`.
    pub raw_text: String,
    /// Position in conversation order.
    pub index: usize,
    /// Send time, when the page exposes one.
    pub sent_at: Option<DateTime<FixedOffset>>,
}

/// Message counts shown in the document header and footer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConversationStats {
    pub total: usize,
    pub user: usize,
    pub assistant: usize,
}

impl ConversationStats {
    pub fn from_messages(messages: &[MessageRecord]) -> Self {
        let user = messages.iter().filter(|m| m.sender == Sender::User).count();
        let assistant = messages
            .iter()
            .filter(|m| m.sender == Sender::Assistant)
            .count();
        ConversationStats {
            total: messages.len(),
            user,
            assistant,
        }
    }
}

/// Everything the composer needs for one document.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationExport {
    pub title: String,
    pub generated_at: DateTime<FixedOffset>,
    pub messages: Vec<MessageRecord>,
    pub stats: ConversationStats,
}

impl ConversationExport {
    /// Derive the title and counts from `messages`.
    pub fn new(messages: Vec<MessageRecord>, generated_at: DateTime<FixedOffset>) -> Self {
        let title = crate::compose::derive_title(&messages);
        let stats = ConversationStats::from_messages(&messages);
        ConversationExport {
            title,
            generated_at,
            messages,
            stats,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn record(index: usize, sender: Sender, text: &str) -> MessageRecord {
        MessageRecord {
            id: format!("msg-{}", index),
            sender,
            content: format!("<p>{}</p>", text),
            raw_text: text.to_string(),
            index,
            sent_at: None,
        }
    }
}
