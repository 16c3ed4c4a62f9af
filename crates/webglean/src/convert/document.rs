//! Immutable, arena-backed HTML document tree
//!
//! Parsing goes through html5ever (via `scraper`), which follows the HTML5
//! tree construction algorithm: unclosed tags are closed, misnested markup is
//! repaired and stray text is kept. The resulting tree is copied into a flat
//! arena so that every later pass can walk it with an explicit stack.

use scraper::{Html, Node as HtmlNode};

/// Index of a node inside a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

/// An element node: lower-cased tag name and attributes in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
}

impl Element {
    /// Create an element (used by tests and by the parser)
    pub fn new(name: impl Into<String>, attrs: Vec<(String, String)>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            attrs,
        }
    }

    /// Tag name, always lower case
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value by (case-insensitive) name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// True if the attribute is present, whatever its value
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }
}

/// Node payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// Synthetic root holding the top-level nodes
    Root,
    Element(Element),
    /// Character data with entities already decoded
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    children: Vec<NodeId>,
}

/// Immutable document tree
///
/// Nodes live in a `Vec` and refer to their children by [`NodeId`]. A
/// document is never edited after construction; passes such as
/// [`sanitize`](super::sanitize) build a new one.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Parse an HTML string leniently. Never fails.
    pub fn parse(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let mut doc = Self::empty();

        let mut stack = vec![(parsed.tree.root(), doc.root())];
        while let Some((node, parent)) = stack.pop() {
            let target = match node.value() {
                HtmlNode::Document | HtmlNode::Fragment => parent,
                HtmlNode::Element(el) => {
                    let attrs = el
                        .attrs()
                        .map(|(key, value)| (key.to_string(), value.to_string()))
                        .collect();
                    doc.append(parent, NodeData::Element(Element::new(el.name(), attrs)))
                }
                HtmlNode::Text(text) => {
                    doc.append(parent, NodeData::Text(String::from(&**text)));
                    continue;
                }
                // Comments, doctypes and processing instructions carry no content
                _ => continue,
            };

            let children: Vec<_> = node.children().collect();
            for child in children.into_iter().rev() {
                stack.push((child, target));
            }
        }

        doc
    }

    /// A document holding only the root node
    pub fn empty() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Root,
                children: Vec::new(),
            }],
        }
    }

    /// The synthetic root node
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Payload of a node
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    /// Element payload, if the node is an element
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.data(id) {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Children of a node in document order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the document has nothing but its root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// First element with the given tag name, in document order
    pub fn find(&self, name: &str) -> Option<NodeId> {
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            if self.element(id).is_some_and(|el| el.name() == name) {
                return Some(id);
            }
            stack.extend(self.children(id).iter().rev().copied());
        }
        None
    }

    /// Concatenated text of a subtree
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let NodeData::Text(text) = self.data(id) {
                out.push_str(text);
            }
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Copy of this document without the subtrees for which `drop` is true
    ///
    /// The root is always kept.
    pub fn filtered<F>(&self, mut drop: F) -> Self
    where
        F: FnMut(&NodeData) -> bool,
    {
        let mut out = Self::empty();
        let mut stack: Vec<(NodeId, NodeId)> = self
            .children(self.root())
            .iter()
            .rev()
            .map(|&child| (child, out.root()))
            .collect();

        while let Some((id, parent)) = stack.pop() {
            let data = self.data(id);
            if drop(data) {
                continue;
            }
            let copy = out.append(parent, data.clone());
            stack.extend(self.children(id).iter().rev().map(|&child| (child, copy)));
        }

        out
    }

    /// Append a node under `parent` and return its id
    fn append(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }
}
