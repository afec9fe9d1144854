//! Extractor: page tree → ordered message records
//!
//!     1. Find the conversation container. Without it there is nothing to export and the
//!        whole run fails with [`ExportError::ContainerNotFound`].
//!     2. Walk the container in document order and pick every message element. The walk
//!        order is the conversation order; `index` is the position in that walk.
//!     3. For each message, classify the sender, pick the content root, deep-copy it and
//!        strip chrome from the copy.
//!
//!     The page tree is only read. All stripping happens on detached copies, so the
//!     caller's tree is identical before and after extraction.
//!
//!     A message that lacks an id or a rich-content region still yields a record; the
//!     problem is reported as a [`MalformedMessage`] next to the records.

use crate::dom::{attr, deep_clone, descendants, inner_html, text_content};
use crate::error::ExportError;
use crate::landmarks::{any_matches, Landmarks};
use crate::record::{MessageRecord, Sender};
use chrono::DateTime;
use markup5ever_rcdom::{Handle, RcDom};
use serde::Serialize;

/// Records plus the per-message problems met on the way.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Extraction {
    pub messages: Vec<MessageRecord>,
    pub malformed: Vec<MalformedMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedMessage {
    pub index: usize,
    pub kind: MalformedKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MalformedKind {
    /// The id attribute is missing or blank.
    MissingId,
    /// No rich-content region; the whole message element was used.
    MissingContentRoot,
}

/// Extract every message of the conversation held in `dom`.
pub fn extract_messages(dom: &RcDom, landmarks: &Landmarks) -> Result<Extraction, ExportError> {
    let container = find_container(&dom.document, landmarks)?;

    let mut extraction = Extraction::default();
    let message_elements = descendants(&container)
        .into_iter()
        .filter(|node| landmarks.message.matches(node));

    for (index, element) in message_elements.enumerate() {
        let record = extract_message(&element, index, landmarks, &mut extraction.malformed)?;
        tracing::debug!(
            index,
            sender = record.sender.as_str(),
            id = %record.id,
            "extracted message"
        );
        extraction.messages.push(record);
    }

    tracing::info!(
        messages = extraction.messages.len(),
        malformed = extraction.malformed.len(),
        "extraction finished"
    );
    Ok(extraction)
}

fn find_container(root: &Handle, landmarks: &Landmarks) -> Result<Handle, ExportError> {
    descendants(root)
        .into_iter()
        .find(|node| landmarks.container.matches(node))
        .ok_or_else(|| ExportError::ContainerNotFound {
            landmark: landmarks.container.to_string(),
        })
}

fn extract_message(
    element: &Handle,
    index: usize,
    landmarks: &Landmarks,
    malformed: &mut Vec<MalformedMessage>,
) -> Result<MessageRecord, ExportError> {
    let id = attr(element, &landmarks.message_id_attribute).unwrap_or_default();
    if id.trim().is_empty() {
        tracing::warn!(index, "message element has no id");
        malformed.push(MalformedMessage {
            index,
            kind: MalformedKind::MissingId,
        });
    }

    let inner = descendants(element);
    let sender = if inner.iter().any(|node| landmarks.own_message.matches(node)) {
        Sender::User
    } else {
        Sender::Assistant
    };

    let content_root = match inner.iter().find(|node| landmarks.rich_content.matches(node)) {
        Some(root) => root.clone(),
        None => {
            tracing::warn!(index, "message has no rich content region, using whole element");
            malformed.push(MalformedMessage {
                index,
                kind: MalformedKind::MissingContentRoot,
            });
            element.clone()
        }
    };

    let copy = deep_clone(&content_root);
    strip_chrome(&copy, landmarks);

    Ok(MessageRecord {
        id,
        sender,
        content: inner_html(&copy)?,
        raw_text: text_content(&copy),
        index,
        sent_at: read_timestamp(element, landmarks, index),
    })
}

/// Remove chrome below `root`, leaving anything inside a code region untouched.
fn strip_chrome(root: &Handle, landmarks: &Landmarks) {
    let is_code = |node: &Handle| any_matches(&landmarks.code_regions, node);
    let mut pending = vec![root.clone()];

    while let Some(node) = pending.pop() {
        let mut children = node.children.borrow_mut();
        children.retain(|child| is_code(child) || !any_matches(&landmarks.chrome, child));
        pending.extend(children.iter().filter(|child| !is_code(*child)).cloned());
    }
}

fn read_timestamp(
    element: &Handle,
    landmarks: &Landmarks,
    index: usize,
) -> Option<chrono::DateTime<chrono::FixedOffset>> {
    let raw = attr(element, landmarks.timestamp_attribute.as_deref()?)?;
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(ts) => Some(ts),
        Err(err) => {
            tracing::debug!(index, value = %raw, error = %err, "ignoring unparseable timestamp");
            None
        }
    }
}
