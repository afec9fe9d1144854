//! Document Composer: message records → self-contained HTML document
//!
//!     Pipeline: records → RcDom body (header, message blocks, stats) → HTML string →
//!     wrapped in the static document shell (see [`template`]).
//!
//!     Building the body as a DOM instead of pasting strings means every piece of page
//!     text is escaped by the html5ever serializer, and message content is re-parsed and
//!     re-serialized, so a stray unclosed tag in one message cannot swallow the next.
//!
//!     | Part              | Markup                                                      |
//!     |-------------------|-------------------------------------------------------------|
//!     | header            | `div.header` with title, subtitle, date, time, count        |
//!     | message block     | `div.message-container.{user,assistant}-message`            |
//!     | message content   | `div.message-content#message-content-{index}`               |
//!     | code region       | `div.enhanced-code-block` > `div.code-header` + `pre#code-…` |
//!     | footer            | `div.stats` with total / user / assistant counts            |
//!
//!     Composition is deterministic: the same export (including its timestamp) always
//!     yields the same string.

pub mod code_blocks;
mod icons;
pub mod template;

use crate::dom::{append, create_element, create_text, outer_html, parse_fragment_nodes};
use crate::error::ExportError;
use crate::record::{ConversationExport, MessageRecord, Sender};
use chrono::{DateTime, FixedOffset};
use code_blocks::{enhance_code_blocks, CodeIdRegistry};
use icons::copy_button;
use markup5ever_rcdom::Handle;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// Title used when no user message yields one.
pub const DEFAULT_TITLE: &str = "T3 Chat Conversation";

/// Maximum visible characters (grapheme clusters) kept from the first user message.
pub const TITLE_MAX_CHARS: usize = 50;

pub const TITLE_ELLIPSIS: &str = "...";

pub const FILENAME_SUFFIX: &str = "-t3-chat-export.html";

const SUBTITLE: &str = "T3 Chat Conversation Export";

static NON_ALPHANUMERIC_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("valid regex"));

/// Title from the first user message, truncated to [`TITLE_MAX_CHARS`].
pub fn derive_title(messages: &[MessageRecord]) -> String {
    messages
        .iter()
        .find(|m| m.sender == Sender::User)
        .map(|m| truncate_title(&m.raw_text))
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

/// Trim, keep at most [`TITLE_MAX_CHARS`] graphemes, mark truncation with an ellipsis.
pub fn truncate_title(text: &str) -> String {
    let mut graphemes = text.trim().graphemes(true);
    let head: String = graphemes.by_ref().take(TITLE_MAX_CHARS).collect();
    if graphemes.next().is_some() {
        format!("{}{}", head, TITLE_ELLIPSIS)
    } else {
        head
    }
}

/// File name for an export titled `title`. Total: never panics, never empty.
pub fn derive_filename(title: &str) -> String {
    let stem = slugify(title);
    let stem = if stem.chars().any(|c| c.is_ascii_alphanumeric()) {
        stem
    } else {
        slugify(DEFAULT_TITLE)
    };
    format!("{}{}", stem, FILENAME_SUFFIX)
}

fn slugify(text: &str) -> String {
    NON_ALPHANUMERIC_RUN
        .replace_all(text, "-")
        .to_ascii_lowercase()
}

/// Compose the complete document for `export`.
pub fn compose_document(export: &ConversationExport) -> Result<String, ExportError> {
    let mut registry = CodeIdRegistry::new();

    let container = create_element("div", vec![("class", "container")]);
    append(&container, header_block(export));

    let messages = create_element("div", vec![("class", "messages")]);
    let mut code_regions = 0;
    for message in &export.messages {
        let (block, regions) = message_block(message, export.generated_at, &mut registry);
        code_regions += regions;
        append(&messages, block);
    }
    append(&container, messages);
    append(&container, stats_block(export));

    tracing::debug!(
        messages = export.messages.len(),
        code_regions,
        "composed document body"
    );

    let body_html = outer_html(&[container])?;
    template::wrap_in_document(&export.title, &body_html)
}

fn header_block(export: &ConversationExport) -> Handle {
    let header = create_element("div", vec![("class", "header")]);

    let title = create_element("h1", vec![("class", "title")]);
    append(&title, create_text(&export.title));
    append(&header, title);

    let subtitle = create_element("p", vec![("class", "subtitle")]);
    append(&subtitle, create_text(SUBTITLE));
    append(&header, subtitle);

    let info = create_element("div", vec![("class", "export-info")]);
    let date = export.generated_at.format("%Y-%m-%d").to_string();
    let time = export.generated_at.format("%H:%M:%S").to_string();
    for text in [
        format!("\u{1F4C5} {}", date),
        format!("\u{1F552} {}", time),
        format!("\u{1F4AC} {}", message_count(export.stats.total)),
    ] {
        let span = create_element("span", vec![]);
        append(&span, create_text(&text));
        append(&info, span);
    }
    append(&header, info);

    header
}

fn message_count(n: usize) -> String {
    if n == 1 {
        "1 message".to_string()
    } else {
        format!("{} messages", n)
    }
}

/// One message block, plus the number of code regions it contains.
fn message_block(
    message: &MessageRecord,
    generated_at: DateTime<FixedOffset>,
    registry: &mut CodeIdRegistry,
) -> (Handle, usize) {
    let index = message.index.to_string();
    let class = format!("message-container {}-message", message.sender.as_str());
    let block = create_element(
        "div",
        vec![
            ("class", class.as_str()),
            ("data-message-index", index.as_str()),
            ("data-message-id", message.id.as_str()),
        ],
    );

    let content_id = format!("message-content-{}", message.index);
    let header = create_element("div", vec![("class", "message-header")]);
    let sender = create_element("div", vec![("class", "message-sender")]);

    let label = create_element("span", vec![("class", "sender-label")]);
    append(&label, create_text(message.sender.label()));
    append(&sender, label);

    let shown_at = message.sent_at.unwrap_or(generated_at);
    let datetime = shown_at.to_rfc3339();
    let time = create_element(
        "time",
        vec![("class", "message-time"), ("datetime", datetime.as_str())],
    );
    append(&time, create_text(&shown_at.format("%H:%M:%S").to_string()));
    append(&sender, time);

    append(&header, sender);
    append(
        &header,
        copy_button("message-copy-btn", &content_id, "Copy message"),
    );
    append(&block, header);

    let content = create_element(
        "div",
        vec![("class", "message-content"), ("id", content_id.as_str())],
    );
    for node in parse_fragment_nodes(&message.content) {
        append(&content, node);
    }
    let regions = enhance_code_blocks(&content, message, registry);
    append(&block, content);

    (block, regions)
}

fn stats_block(export: &ConversationExport) -> Handle {
    let stats = create_element("div", vec![("class", "stats")]);
    for (number, label) in [
        (export.stats.total, "Total Messages"),
        (export.stats.user, "Your Messages"),
        (export.stats.assistant, "Assistant Replies"),
    ] {
        let item = create_element("div", vec![("class", "stat-item")]);
        let value = create_element("div", vec![("class", "stat-number")]);
        append(&value, create_text(&number.to_string()));
        let caption = create_element("div", vec![("class", "stat-label")]);
        append(&caption, create_text(label));
        append(&item, value);
        append(&item, caption);
        append(&stats, item);
    }
    stats
}
