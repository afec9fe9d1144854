//! Small toolkit over `markup5ever_rcdom`
//!
//! Parsing, node construction, detached deep copies, text projection and
//! serialization. Everything the extractor and the composer do to a tree goes
//! through these helpers.
//!
//! Nodes built here are detached: `parent` is never set, so traversals that need
//! ancestry carry it explicitly instead of walking parent links.
//!
//! Pages nest arbitrarily deep, so every walk here uses an explicit stack.

use crate::error::ExportError;
use html5ever::serialize::{Serialize, SerializeOpts, Serializer, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::{ns, parse_document, serialize, Attribute, LocalName, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};
use std::cell::{Cell, RefCell};
use std::default::Default;
use std::io;
use std::rc::Rc;

/// Parse a complete HTML page. html5ever recovers from any input, so this never fails.
pub fn parse_page(html: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(html)
}

/// Parse a markup fragment and return its top-level nodes.
///
/// The fragment is parsed as a document body; nodes the parser hoists into
/// `<head>` (a leading `<style>` or `<link>`) are kept too, in front.
///
/// The returned nodes are deep copies: dropping an `RcDom` empties the child lists
/// of every node it reaches, shared or not.
pub fn parse_fragment_nodes(fragment: &str) -> Vec<Handle> {
    let dom = parse_page(fragment);
    let mut nodes = Vec::new();
    let html = dom
        .document
        .children
        .borrow()
        .iter()
        .find(|child| is_element(child, "html"))
        .cloned();
    if let Some(html) = html {
        for section in html.children.borrow().iter() {
            if is_element(section, "head") || is_element(section, "body") {
                nodes.extend(section.children.borrow().iter().map(deep_clone));
            }
        }
    }
    nodes
}

/// Create an HTML element with attributes
pub fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    element_node(qual_name, attrs)
}

/// Create an SVG element (used for the inline button icons)
pub fn create_svg_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(svg), LocalName::from(tag));
    element_node(qual_name, attrs)
}

fn element_node(name: QualName, attrs: Vec<(&str, &str)>) -> Handle {
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node
pub fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

/// Append `child` to `parent`'s children.
pub fn append(parent: &Handle, child: Handle) {
    parent.children.borrow_mut().push(child);
}

/// Copy a subtree into fresh, detached nodes.
///
/// Mutating the copy never reaches the source tree.
pub fn deep_clone(node: &Handle) -> Handle {
    let root = shallow_clone(node);
    let mut pending = vec![(node.clone(), root.clone())];

    while let Some((source, copy)) = pending.pop() {
        if let (
            NodeData::Element {
                template_contents: source_contents,
                ..
            },
            NodeData::Element {
                template_contents: copy_contents,
                ..
            },
        ) = (&source.data, &copy.data)
        {
            if let Some(contents) = source_contents.borrow().as_ref() {
                let contents_copy = shallow_clone(contents);
                *copy_contents.borrow_mut() = Some(contents_copy.clone());
                pending.push((contents.clone(), contents_copy));
            }
        }

        let mut children = copy.children.borrow_mut();
        for child in source.children.borrow().iter() {
            let child_copy = shallow_clone(child);
            children.push(child_copy.clone());
            pending.push((child.clone(), child_copy));
        }
    }

    root
}

/// Copy one node without its children or template contents.
fn shallow_clone(node: &Handle) -> Handle {
    let data = match &node.data {
        NodeData::Document => NodeData::Document,
        NodeData::Doctype {
            name,
            public_id,
            system_id,
        } => NodeData::Doctype {
            name: name.clone(),
            public_id: public_id.clone(),
            system_id: system_id.clone(),
        },
        NodeData::Text { contents } => NodeData::Text {
            contents: RefCell::new(contents.borrow().clone()),
        },
        NodeData::Comment { contents } => NodeData::Comment {
            contents: contents.clone(),
        },
        NodeData::Element {
            name,
            attrs,
            mathml_annotation_xml_integration_point,
            ..
        } => NodeData::Element {
            name: name.clone(),
            attrs: RefCell::new(attrs.borrow().clone()),
            template_contents: RefCell::new(None),
            mathml_annotation_xml_integration_point: *mathml_annotation_xml_integration_point,
        },
        NodeData::ProcessingInstruction { target, contents } => {
            NodeData::ProcessingInstruction {
                target: target.clone(),
                contents: contents.clone(),
            }
        }
    };

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data,
    })
}

/// Local tag name of an element, `None` for any other node kind.
pub fn tag_name(node: &Handle) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

pub fn is_element(node: &Handle, tag: &str) -> bool {
    tag_name(node) == Some(tag)
}

/// Value of an attribute on an element.
pub fn attr(node: &Handle, key: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == key)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

/// Set (or replace) an attribute on an element. No-op for non-elements.
pub fn set_attr(node: &Handle, key: &str, value: &str) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let mut attrs = attrs.borrow_mut();
        match attrs.iter_mut().find(|a| &*a.name.local == key) {
            Some(existing) => existing.value = value.to_string().into(),
            None => attrs.push(Attribute {
                name: QualName::new(None, ns!(), LocalName::from(key)),
                value: value.to_string().into(),
            }),
        }
    }
}

/// Add a class to an element's class list unless already present.
pub fn add_class(node: &Handle, class: &str) {
    let current = attr(node, "class").unwrap_or_default();
    if current.split_ascii_whitespace().any(|c| c == class) {
        return;
    }
    let updated = if current.trim().is_empty() {
        class.to_string()
    } else {
        format!("{} {}", current.trim(), class)
    };
    set_attr(node, "class", &updated);
}

/// Text-only projection of a subtree (the DOM `textContent`).
pub fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    let mut pending = vec![node.clone()];
    while let Some(current) = pending.pop() {
        if let NodeData::Text { contents } = &current.data {
            out.push_str(&contents.borrow());
        }
        pending.extend(current.children.borrow().iter().rev().cloned());
    }
    out
}

/// Pre-order walk over every element below `root` (excluding `root` itself).
pub fn descendants(root: &Handle) -> Vec<Handle> {
    let mut found = Vec::new();
    let mut pending: Vec<Handle> = root.children.borrow().iter().rev().cloned().collect();
    while let Some(node) = pending.pop() {
        pending.extend(node.children.borrow().iter().rev().cloned());
        if tag_name(&node).is_some() {
            found.push(node);
        }
    }
    found
}

/// Serialize the children of `node` (the DOM `innerHTML`).
pub fn inner_html(node: &Handle) -> Result<String, ExportError> {
    serialize_with(node, TraversalScope::ChildrenOnly(None))
}

/// Serialize a list of nodes, each including itself.
pub fn outer_html(nodes: &[Handle]) -> Result<String, ExportError> {
    let mut html = String::new();
    for node in nodes {
        html.push_str(&serialize_with(node, TraversalScope::IncludeNode)?);
    }
    Ok(html)
}

fn serialize_with(node: &Handle, scope: TraversalScope) -> Result<String, ExportError> {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: scope,
        ..Default::default()
    };
    let serializable = SerializableTree(node.clone());
    serialize(&mut output, &serializable, opts).map_err(|e| {
        ExportError::Serialization(format!("HTML serialization failed: {}", e))
    })?;

    String::from_utf8(output)
        .map_err(|e| ExportError::Serialization(format!("UTF-8 conversion failed: {}", e)))
}

/// Serializable view of a subtree.
///
/// Walks like rcdom's `SerializableHandle`, and also writes the extra line feed that
/// must follow `<pre>`, `<textarea>` and `<listing>` when their text starts with one.
/// The parser swallows that first line feed, so without it every round trip loses one.
struct SerializableTree(Handle);

enum SerializeOp {
    Open(Handle),
    Close(QualName),
}

impl Serialize for SerializableTree {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        let mut ops = Vec::new();
        match traversal_scope {
            TraversalScope::IncludeNode => ops.push(SerializeOp::Open(self.0.clone())),
            TraversalScope::ChildrenOnly(_) => push_children(&mut ops, &self.0),
        }

        while let Some(op) = ops.pop() {
            match op {
                SerializeOp::Open(handle) => match &handle.data {
                    NodeData::Element { name, attrs, .. } => {
                        serializer.start_elem(
                            name.clone(),
                            attrs.borrow().iter().map(|a| (&a.name, &a.value[..])),
                        )?;
                        if swallows_leading_newline(name) && starts_with_newline(&handle) {
                            serializer.write_text("\n")?;
                        }
                        ops.push(SerializeOp::Close(name.clone()));
                        push_children(&mut ops, &handle);
                    }
                    NodeData::Document => push_children(&mut ops, &handle),
                    NodeData::Doctype { name, .. } => serializer.write_doctype(name)?,
                    NodeData::Text { contents } => serializer.write_text(&contents.borrow())?,
                    NodeData::Comment { contents } => serializer.write_comment(contents)?,
                    NodeData::ProcessingInstruction { target, contents } => {
                        serializer.write_processing_instruction(target, contents)?
                    }
                },
                SerializeOp::Close(name) => serializer.end_elem(name)?,
            }
        }

        Ok(())
    }
}

fn push_children(ops: &mut Vec<SerializeOp>, node: &Handle) {
    ops.extend(
        node.children
            .borrow()
            .iter()
            .rev()
            .map(|child| SerializeOp::Open(child.clone())),
    );
}

fn swallows_leading_newline(name: &QualName) -> bool {
    name.ns == ns!(html) && matches!(&*name.local, "pre" | "textarea" | "listing")
}

fn starts_with_newline(node: &Handle) -> bool {
    let children = node.children.borrow();
    let starts = match children.first().map(|child| &child.data) {
        Some(NodeData::Text { contents }) => contents.borrow().starts_with('\n'),
        _ => false,
    };
    starts
}
