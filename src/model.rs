//! Tree-shaped document model: elements, text, positions, ranges and the
//! selection, plus the schema and the mutation scope that edits them.
//!
//! Nodes are addressed by paths of offsets. An element occupies one offset in
//! its parent, a text node one offset per `char`. Adjacent text nodes that
//! carry the same attributes are always merged, and empty text nodes are
//! never kept, so every offset inside an element resolves to exactly one
//! child.

use std::collections::BTreeMap;

mod import;
mod markup;
mod position;
mod range;
mod schema;
mod selection;
mod writer;

pub use import::import_tdoc;
pub use markup::{parse_markup, stringify};
pub use position::Position;
pub use range::{Range, WalkItem};
pub use schema::{DEFAULT_BLOCK, ROOT, Schema, SchemaItem, TEXT};
pub use selection::Selection;
pub use writer::{Operation, Writer};

use crate::text::char_to_byte_idx;

pub type Attributes = BTreeMap<String, String>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(Text),
}

impl Node {
    /// Number of offsets the node occupies in its parent.
    pub fn offset_size(&self) -> usize {
        match self {
            Node::Element(_) => 1,
            Node::Text(text) => text.len(),
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }

    /// Name used for schema checks: the element name or [`TEXT`].
    pub fn schema_name(&self) -> &str {
        match self {
            Node::Element(element) => element.name(),
            Node::Text(_) => TEXT,
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Text {
    data: String,
    attributes: Attributes,
}

impl Text {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Length in chars, which is also the offset size.
    pub fn len(&self) -> usize {
        self.data.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn split_off(&mut self, char_offset: usize) -> Text {
        let byte_idx = char_to_byte_idx(&self.data, char_offset);
        Text {
            data: self.data.split_off(byte_idx),
            attributes: self.attributes.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Attributes,
    children: Vec<Node>,
}

/// A child of an element together with the offset it starts at.
#[derive(Clone, Copy, Debug)]
pub enum ChildRef<'a> {
    Element { element: &'a Element, offset: usize },
    Text { text: &'a Text, start: usize },
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self.normalize();
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.push_child(child.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn max_offset(&self) -> usize {
        self.children.iter().map(Node::offset_size).sum()
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// The child covering `offset..offset + 1`.
    pub fn child_at(&self, offset: usize) -> Option<ChildRef<'_>> {
        let mut start = 0;
        for child in &self.children {
            let size = child.offset_size();
            if offset < start + size {
                return Some(match child {
                    Node::Element(element) => ChildRef::Element {
                        element,
                        offset: start,
                    },
                    Node::Text(text) => ChildRef::Text { text, start },
                });
            }
            start += size;
        }
        None
    }

    /// The child right after `offset`, if any.
    pub fn item_after(&self, offset: usize) -> Option<ChildRef<'_>> {
        self.child_at(offset)
    }

    /// The child right before `offset`, if any.
    pub fn item_before(&self, offset: usize) -> Option<ChildRef<'_>> {
        offset.checked_sub(1).and_then(|prev| self.child_at(prev))
    }

    /// Maximal run of adjacent text children around `offset`, as the offset
    /// the run starts at and its concatenated data.
    pub fn text_run_at(&self, offset: usize) -> Option<(usize, String)> {
        let mut run_start = 0;
        let mut run = String::new();
        let mut start = 0;
        for child in &self.children {
            match child {
                Node::Text(text) => {
                    if run.is_empty() {
                        run_start = start;
                    }
                    run.push_str(text.data());
                }
                Node::Element(_) => {
                    if !run.is_empty() && offset <= start {
                        return (offset >= run_start).then_some((run_start, run));
                    }
                    run.clear();
                }
            }
            start += child.offset_size();
        }
        (!run.is_empty() && offset >= run_start && offset <= start).then_some((run_start, run))
    }

    /// Element addressed by `path`, each entry being the offset of an element
    /// child in the previous one. The empty path is `self`.
    pub fn descendant(&self, path: &[usize]) -> Option<&Element> {
        let mut current = self;
        for &offset in path {
            current = match current.child_at(offset)? {
                ChildRef::Element { element, .. } => element,
                ChildRef::Text { .. } => return None,
            };
        }
        Some(current)
    }

    pub fn descendant_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = self;
        for &offset in path {
            let index = current.child_index_at(offset)?;
            current = match current.children.get_mut(index)? {
                Node::Element(element) => element,
                Node::Text(_) => return None,
            };
        }
        Some(current)
    }

    fn child_index_at(&self, offset: usize) -> Option<usize> {
        let mut start = 0;
        for (index, child) in self.children.iter().enumerate() {
            let size = child.offset_size();
            if offset < start + size {
                return Some(index);
            }
            start += size;
        }
        None
    }

    /// Splits a text child if needed so that a child boundary sits at
    /// `offset`. Returns the index of the first child at or after it.
    fn split_at(&mut self, offset: usize) -> usize {
        let mut start = 0;
        for index in 0..self.children.len() {
            if start == offset {
                return index;
            }
            let size = self.children[index].offset_size();
            if offset < start + size {
                if let Node::Text(text) = &mut self.children[index] {
                    let tail = text.split_off(offset - start);
                    self.children.insert(index + 1, Node::Text(tail));
                    return index + 1;
                }
            }
            start += size;
        }
        self.children.len()
    }

    pub(crate) fn remove_range(&mut self, start: usize, end: usize) -> Vec<Node> {
        let first = self.split_at(start);
        let last = self.split_at(end);
        let removed = self.children.drain(first..last).collect();
        self.normalize();
        removed
    }

    pub(crate) fn insert_at(&mut self, offset: usize, nodes: Vec<Node>) {
        let index = self.split_at(offset);
        self.children.splice(index..index, nodes);
        self.normalize();
    }

    pub(crate) fn push_child(&mut self, node: Node) {
        self.children.push(node);
        self.normalize();
    }

    fn normalize(&mut self) {
        let mut merged: Vec<Node> = Vec::with_capacity(self.children.len());
        for node in self.children.drain(..) {
            match node {
                Node::Text(text) if text.is_empty() => {}
                Node::Text(text) => match merged.last_mut() {
                    Some(Node::Text(prev)) if prev.attributes == text.attributes => {
                        prev.data.push_str(&text.data);
                    }
                    _ => merged.push(Node::Text(text)),
                },
                element => merged.push(element),
            }
        }
        self.children = merged;
    }
}

fn collect_text(children: &[Node], out: &mut String) {
    for child in children {
        match child {
            Node::Text(text) => out.push_str(text.data()),
            Node::Element(element) => collect_text(element.children(), out),
        }
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod model_tests;
