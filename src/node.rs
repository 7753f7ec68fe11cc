/// Attributed tree node, the unit of the Arbor wire protocol.
/// Byte-level encoding and decoding of this tree lives in the transport;
/// this module only models the tree and gives decoding code typed accessors
/// so traversal stays declarative.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Attribute map of a node. Unordered, keys unique.
pub type Attrs = HashMap<String, String>;

/// Build an attribute map from string pairs.
pub fn attrs(pairs: &[(&str, &str)]) -> Attrs {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// What a node carries below its attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeContent {
    /// No payload at all. Presence of the node itself is often the signal.
    #[default]
    Empty,
    /// Raw byte payload, used for free text that may contain structurally
    /// special characters.
    Bytes(Vec<u8>),
    /// Ordered child nodes.
    Children(Vec<Node>),
}

/// A single node of the attributed tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub tag: String,
    pub attrs: Attrs,
    pub content: NodeContent,
}

impl Node {
    /// Node with no attributes and no content.
    pub fn new(tag: impl Into<String>) -> Self {
        Node {
            tag: tag.into(),
            attrs: Attrs::new(),
            content: NodeContent::Empty,
        }
    }

    /// Node with attributes only.
    pub fn with_attrs(tag: impl Into<String>, attrs: Attrs) -> Self {
        Node {
            tag: tag.into(),
            attrs,
            content: NodeContent::Empty,
        }
    }

    /// Node with attributes and ordered child nodes.
    pub fn with_children(tag: impl Into<String>, attrs: Attrs, children: Vec<Node>) -> Self {
        Node {
            tag: tag.into(),
            attrs,
            content: NodeContent::Children(children),
        }
    }

    /// Node with attributes and a raw byte payload.
    pub fn with_bytes(tag: impl Into<String>, attrs: Attrs, payload: impl Into<Vec<u8>>) -> Self {
        Node {
            tag: tag.into(),
            attrs,
            content: NodeContent::Bytes(payload.into()),
        }
    }

    /// Look up an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// All direct children, regardless of tag. Empty for byte or empty
    /// content.
    pub fn child_nodes(&self) -> &[Node] {
        match &self.content {
            NodeContent::Children(children) => children,
            _ => &[],
        }
    }

    /// First direct child with the given tag. Duplicate tags at one level are
    /// abnormal but not rejected; the first match wins.
    pub fn child(&self, tag: &str) -> Option<&Node> {
        self.child_nodes().iter().find(|n| n.tag == tag)
    }

    /// All direct children with the given tag, in document order.
    pub fn children(&self, tag: &str) -> Vec<&Node> {
        self.child_nodes().iter().filter(|n| n.tag == tag).collect()
    }

    /// The node's own byte payload, if it carries one.
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.content {
            NodeContent::Bytes(payload) => Some(payload),
            _ => None,
        }
    }

    /// Byte payload of the first child with the given tag, decoded as text.
    /// `None` when the child is absent or carries no byte payload.
    pub fn child_text(&self, tag: &str) -> Option<String> {
        self.child(tag)
            .and_then(Node::bytes)
            .map(|payload| String::from_utf8_lossy(payload).into_owned())
    }
}
