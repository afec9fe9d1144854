//! Code-block enhancement
//!
//! Every `<pre>` with a `<code>` element anywhere inside it is a code region. Each region
//! gets an id derived from the message id and its ordinal within the message, and is
//! wrapped together with a header holding a copy button:
//!
//! ```text
//! <div class="enhanced-code-block">
//!   <div class="code-header"><button data-copy-target="code-m1-0">…Copy</button></div>
//!   <pre id="code-m1-0" class="code-content"><code>…untouched…</code></pre>
//! </div>
//! ```
//!
//! Only the `<pre>` element is moved; its descendants are never rewritten.

use super::icons::copy_button;
use crate::dom::{add_class, append, create_element, descendants, is_element, set_attr};
use crate::record::MessageRecord;
use markup5ever_rcdom::Handle;
use std::collections::HashSet;
use std::rc::Rc;

/// Hands out code ids, keeping them unique across a whole document.
#[derive(Debug, Default)]
pub struct CodeIdRegistry {
    used: HashSet<String>,
}

impl CodeIdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `base`, or the first free `base-N` (N ≥ 2) if it is taken.
    pub fn claim(&mut self, base: String) -> String {
        if self.used.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}-{}", base, n);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Deterministic id for the `ordinal`-th code region of `message`.
pub fn code_block_id(message: &MessageRecord, ordinal: usize) -> String {
    let key: String = message
        .id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    let key = if key.is_empty() {
        format!("m{}", message.index)
    } else {
        key
    };
    format!("code-{}-{}", key, ordinal)
}

/// Wrap every code region below `root`. Returns the number of regions found.
pub fn enhance_code_blocks(
    root: &Handle,
    message: &MessageRecord,
    registry: &mut CodeIdRegistry,
) -> usize {
    let regions = find_code_regions(root);
    for (ordinal, (parent, pre)) in regions.iter().enumerate() {
        let id = registry.claim(code_block_id(message, ordinal));
        let wrapper = wrap_code_block(pre.clone(), &id);
        let mut siblings = parent.children.borrow_mut();
        if let Some(position) = siblings.iter().position(|child| Rc::ptr_eq(child, pre)) {
            siblings[position] = wrapper;
        }
    }
    regions.len()
}

/// Code regions below `root` in document order, each with its parent.
/// The inside of a region is not searched.
fn find_code_regions(root: &Handle) -> Vec<(Handle, Handle)> {
    let mut found = Vec::new();
    let mut pending: Vec<(Handle, Handle)> = root
        .children
        .borrow()
        .iter()
        .rev()
        .map(|child| (root.clone(), child.clone()))
        .collect();

    while let Some((parent, node)) = pending.pop() {
        if is_code_region(&node) {
            found.push((parent, node));
            continue;
        }
        pending.extend(
            node.children
                .borrow()
                .iter()
                .rev()
                .map(|child| (node.clone(), child.clone())),
        );
    }
    found
}

fn is_code_region(node: &Handle) -> bool {
    is_element(node, "pre")
        && descendants(node)
            .iter()
            .any(|inner| is_element(inner, "code"))
}

fn wrap_code_block(pre: Handle, id: &str) -> Handle {
    set_attr(&pre, "id", id);
    add_class(&pre, "code-content");

    let wrapper = create_element("div", vec![("class", "enhanced-code-block")]);
    let header = create_element("div", vec![("class", "code-header")]);
    append(&header, copy_button("code-copy-btn", id, "Copy code"));
    append(&wrapper, header);
    append(&wrapper, pre);
    wrapper
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{attr, descendants, inner_html, parse_fragment_nodes, text_content};
    use crate::record::fixtures::record;
    use crate::record::Sender;

    fn content_root(html: &str) -> Handle {
        let root = create_element("div", vec![]);
        for node in parse_fragment_nodes(html) {
            append(&root, node);
        }
        root
    }

    #[test]
    fn test_ids_are_keyed_by_message_and_ordinal() {
        let message = record(3, Sender::Assistant, "x");
        assert_eq!(code_block_id(&message, 0), "code-msg-3-0");
        assert_eq!(code_block_id(&message, 1), "code-msg-3-1");
    }

    #[test]
    fn test_unsafe_or_empty_ids_are_slugged() {
        let mut message = record(4, Sender::Assistant, "x");
        message.id = "a'b\"c d".to_string();
        assert_eq!(code_block_id(&message, 0), "code-abcd-0");

        message.id = String::new();
        assert_eq!(code_block_id(&message, 2), "code-m4-2");
    }

    #[test]
    fn test_registry_disambiguates_collisions() {
        let mut registry = CodeIdRegistry::new();
        assert_eq!(registry.claim("code-a-0".into()), "code-a-0");
        assert_eq!(registry.claim("code-a-0".into()), "code-a-0-2");
        assert_eq!(registry.claim("code-a-0".into()), "code-a-0-3");
    }

    #[test]
    fn test_two_regions_get_distinct_ids_and_keep_text() {
        let message = record(0, Sender::Assistant, "x");
        let root = content_root(
            "<p>Two snippets:</p>\
             <pre><code class=\"language-rust\">fn main() {}</code></pre>\
             <div><pre><code>let x = a &lt; b;</code></pre></div>",
        );
        let mut registry = CodeIdRegistry::new();

        assert_eq!(enhance_code_blocks(&root, &message, &mut registry), 2);

        let pres: Vec<_> = descendants(&root)
            .into_iter()
            .filter(|n| is_element(n, "pre"))
            .collect();
        let ids: Vec<_> = pres.iter().filter_map(|p| attr(p, "id")).collect();
        assert_eq!(ids, vec!["code-msg-0-0", "code-msg-0-1"]);
        assert_eq!(text_content(&pres[0]), "fn main() {}");
        assert_eq!(text_content(&pres[1]), "let x = a < b;");

        let html = inner_html(&root).unwrap();
        assert!(html.contains(r#"<code class="language-rust">fn main() {}</code>"#));
        assert!(html.contains(r#"data-copy-target="code-msg-0-1""#));
    }

    #[test]
    fn test_pre_without_code_is_left_alone() {
        let message = record(0, Sender::Assistant, "x");
        let root = content_root("<pre>plain preformatted</pre>");
        let mut registry = CodeIdRegistry::new();

        assert_eq!(enhance_code_blocks(&root, &message, &mut registry), 0);
        assert_eq!(inner_html(&root).unwrap(), "<pre>plain preformatted</pre>");
    }

    #[test]
    fn test_code_nested_below_pre_is_a_region() {
        let message = record(0, Sender::Assistant, "x");
        let root = content_root(
            "<div><pre><span class=\"line\"><code>first</code></span></pre></div>\
             <pre><code>second</code></pre>",
        );
        let mut registry = CodeIdRegistry::new();

        assert_eq!(enhance_code_blocks(&root, &message, &mut registry), 2);

        let pres: Vec<_> = descendants(&root)
            .into_iter()
            .filter(|n| is_element(n, "pre"))
            .collect();
        let summary: Vec<_> = pres
            .iter()
            .map(|p| (attr(p, "id").unwrap_or_default(), text_content(p)))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("code-msg-0-0".to_string(), "first".to_string()),
                ("code-msg-0-1".to_string(), "second".to_string()),
            ]
        );
        let html = inner_html(&root).unwrap();
        assert!(html.contains(r#"<span class="line"><code>first</code></span>"#));
        assert_eq!(html.matches("enhanced-code-block").count(), 2);
    }
}
