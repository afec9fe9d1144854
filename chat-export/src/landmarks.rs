//! Page landmarks
//!
//!     The extractor only relies on a handful of structural conventions of the chat page:
//!     where the conversation lives, what a message looks like, how the user's own messages
//!     are marked, and what counts as chrome. Each convention is a [`Landmark`], a small
//!     declarative matcher over one element.
//!
//!     The defaults describe the T3 chat markup. They are serde-deserializable so the
//!     configuration layer can follow the page when its markup changes.
//!
//!     | Landmark        | Default                                          |
//!     |-----------------|--------------------------------------------------|
//!     | container       | `div[role="log"][aria-label="Chat messages"]`    |
//!     | message         | `[data-message-id]`                              |
//!     | own message     | `[aria-label="Your message"]`                    |
//!     | rich content    | `.prose`                                         |
//!     | chrome          | `button`, `[role="button"]`, `.sr-only`, ...     |
//!     | code regions    | `pre`, `code`                                    |

use crate::dom::{attr, tag_name};
use markup5ever_rcdom::Handle;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Matches a single element. Every constraint that is set must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Landmark {
    /// Local tag name, e.g. `div`.
    pub tag: Option<String>,
    /// Classes that must all be present in the `class` attribute.
    pub classes: Vec<String>,
    /// Attributes that must be present with exactly this value.
    pub attributes: BTreeMap<String, String>,
    /// Attributes that must be present, any value.
    pub has_attributes: Vec<String>,
}

impl Landmark {
    pub fn tag(tag: &str) -> Self {
        Landmark {
            tag: Some(tag.to_string()),
            ..Default::default()
        }
    }

    pub fn class(class: &str) -> Self {
        Landmark {
            classes: vec![class.to_string()],
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_has_attribute(mut self, key: &str) -> Self {
        self.has_attributes.push(key.to_string());
        self
    }

    /// Whether `node` is an element satisfying every constraint.
    pub fn matches(&self, node: &Handle) -> bool {
        let Some(tag) = tag_name(node) else {
            return false;
        };
        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class_attr = attr(node, "class").unwrap_or_default();
            let present: Vec<&str> = class_attr.split_ascii_whitespace().collect();
            if !self.classes.iter().all(|c| present.contains(&c.as_str())) {
                return false;
            }
        }
        let values_match = self
            .attributes
            .iter()
            .all(|(key, value)| attr(node, key).as_deref() == Some(value.as_str()));
        values_match && self.has_attributes.iter().all(|key| attr(node, key).is_some())
    }
}

impl fmt::Display for Landmark {
    /// Renders the landmark in CSS selector notation, for diagnostics.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote = false;
        if let Some(tag) = &self.tag {
            write!(f, "{}", tag)?;
            wrote = true;
        }
        for class in &self.classes {
            write!(f, ".{}", class)?;
            wrote = true;
        }
        for (key, value) in &self.attributes {
            write!(f, "[{}=\"{}\"]", key, value)?;
            wrote = true;
        }
        for key in &self.has_attributes {
            write!(f, "[{}]", key)?;
            wrote = true;
        }
        if !wrote {
            write!(f, "*")?;
        }
        Ok(())
    }
}

/// True if any landmark in `set` matches `node`.
pub fn any_matches(set: &[Landmark], node: &Handle) -> bool {
    set.iter().any(|landmark| landmark.matches(node))
}

/// The full set of page conventions the extractor depends on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Landmarks {
    pub container: Landmark,
    pub message: Landmark,
    /// Attribute carrying the stable message id.
    pub message_id_attribute: String,
    /// Present inside a message iff the user sent it.
    pub own_message: Landmark,
    pub rich_content: Landmark,
    pub chrome: Vec<Landmark>,
    pub code_regions: Vec<Landmark>,
    /// Optional RFC 3339 send time on the message element.
    pub timestamp_attribute: Option<String>,
}

impl Default for Landmarks {
    fn default() -> Self {
        Landmarks {
            container: Landmark::tag("div")
                .with_attribute("role", "log")
                .with_attribute("aria-label", "Chat messages"),
            message: Landmark::default().with_has_attribute("data-message-id"),
            message_id_attribute: "data-message-id".to_string(),
            own_message: Landmark::default().with_attribute("aria-label", "Your message"),
            rich_content: Landmark::class("prose"),
            chrome: vec![
                Landmark::tag("button"),
                Landmark::default().with_attribute("role", "button"),
                Landmark::class("sr-only"),
                Landmark::class("opacity-0"),
                Landmark::tag("input"),
                Landmark::tag("select"),
                Landmark::tag("textarea"),
                Landmark::tag("script"),
            ],
            code_regions: vec![Landmark::tag("pre"), Landmark::tag("code")],
            timestamp_attribute: Some("data-message-timestamp".to_string()),
        }
    }
}
