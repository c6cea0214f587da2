//! The attributed output tree.
//!
//! Nodes live in an arena owned by [`Document`]. A node's `children` vector is
//! the only ownership path; `parent` is a plain index kept for upward
//! traversal. Sibling names are unique at all times: [`Document::create_child`]
//! coerces the requested name and suffixes it on collision.

use indexmap::IndexMap;

use crate::merge::MergePolicy;
use crate::naming::{FALLBACK_NODE_NAME, unique_name, valid_node_name};
use crate::node_path::NodePath;
use crate::render::DocumentSink;
use crate::value::AttributeValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
struct NodeData {
    name: String,
    attributes: IndexMap<String, String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl NodeData {
    fn new(name: String, parent: Option<NodeId>) -> Self {
        Self {
            name,
            attributes: IndexMap::new(),
            children: Vec::new(),
            parent,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Document {
    pub fn new(root_name: &str) -> Self {
        let name = valid_node_name(root_name, FALLBACK_NODE_NAME);
        Self {
            nodes: vec![NodeData::new(name, None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.node(id).name
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Names of the direct children, in order.
    pub fn list_children(&self, id: NodeId) -> Vec<&str> {
        self.children(id).iter().map(|c| self.name(*c)).collect()
    }

    pub fn child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|c| self.name(*c) == name)
    }

    /// Append a new child, renaming it when the name is invalid or taken.
    pub fn create_child(&mut self, parent: NodeId, name: &str) -> NodeId {
        let base = valid_node_name(name, FALLBACK_NODE_NAME);
        let name = unique_name(&base, |candidate| self.child(parent, candidate).is_some());
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData::new(name, Some(parent)));
        self.node_mut(parent).children.push(id);
        id
    }

    pub fn get_or_create_child(&mut self, parent: NodeId, name: &str) -> NodeId {
        match self.child(parent, name) {
            Some(existing) => existing,
            None => self.create_child(parent, name),
        }
    }

    /// Resolve a relative path, returning `None` when any segment is missing.
    pub fn get(&self, from: NodeId, path: &str) -> Option<NodeId> {
        self.resolve(from, &NodePath::parse(path))
    }

    pub fn resolve(&self, from: NodeId, path: &NodePath) -> Option<NodeId> {
        let mut current = from;
        for segment in path.segments() {
            current = match segment {
                ".." => self.parent(current)?,
                name => self.child(current, name)?,
            };
        }
        Some(current)
    }

    /// Resolve a relative path, creating missing segments on the way.
    pub fn get_or_create(&mut self, from: NodeId, path: &str) -> NodeId {
        self.resolve_or_create(from, &NodePath::parse(path))
    }

    pub fn resolve_or_create(&mut self, from: NodeId, path: &NodePath) -> NodeId {
        let mut current = from;
        for segment in path.segments() {
            current = match segment {
                ".." => self.parent(current).unwrap_or(current),
                name => self.get_or_create_child(current, name),
            };
        }
        current
    }

    pub fn attribute(&self, id: NodeId, key: &str) -> Option<&str> {
        self.node(id).attributes.get(key).map(String::as_str)
    }

    pub fn attributes(&self, id: NodeId) -> &IndexMap<String, String> {
        &self.node(id).attributes
    }

    pub fn has_attribute(&self, id: NodeId, key: &str) -> bool {
        self.node(id).attributes.contains_key(key)
    }

    pub fn remove_attribute(&mut self, id: NodeId, key: &str) -> Option<String> {
        self.node_mut(id).attributes.shift_remove(key)
    }

    pub fn take_attributes(&mut self, id: NodeId) -> IndexMap<String, String> {
        std::mem::take(&mut self.node_mut(id).attributes)
    }

    /// Strict overwrite with the literal-type prefix of `value`'s type.
    pub fn set_attribute(&mut self, id: NodeId, key: impl Into<String>, value: impl AttributeValue) {
        let rendered = value.to_attribute();
        self.node_mut(id).attributes.insert(key.into(), rendered);
    }

    pub fn merge_attribute(&mut self, id: NodeId, key: &str, value: &str, policy: MergePolicy) {
        self.merge_attribute_with(id, key, value, |existing, incoming| {
            policy.apply(existing, incoming)
        });
    }

    /// Write `value` through a caller-supplied merge of (existing, incoming).
    pub fn merge_attribute_with<F>(&mut self, id: NodeId, key: &str, value: &str, merge: F)
    where
        F: FnOnce(Option<&str>, &str) -> String,
    {
        let attributes = &mut self.node_mut(id).attributes;
        let merged = merge(attributes.get(key).map(String::as_str), value);
        match attributes.get_mut(key) {
            Some(slot) => *slot = merged,
            None => {
                attributes.insert(key.to_string(), merged);
            }
        }
    }

    /// Rename `id`, suffixing the new name if a sibling already holds it.
    pub fn rename(&mut self, id: NodeId, name: &str) {
        let base = valid_node_name(name, FALLBACK_NODE_NAME);
        if self.name(id) == base {
            return;
        }
        let name = match self.parent(id) {
            Some(parent) => unique_name(&base, |candidate| self.child(parent, candidate).is_some()),
            None => base,
        };
        self.node_mut(id).name = name;
    }

    /// Unlink `id` from its parent. The subtree stays addressable but is no
    /// longer reachable from the root.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node_mut(id).parent.take() {
            self.node_mut(parent).children.retain(|c| *c != id);
        }
    }

    /// Move `id` under `new_parent`, renaming it on collision.
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId) {
        if id == new_parent || self.is_ancestor(id, new_parent) {
            return;
        }
        self.detach(id);
        let base = self.name(id).to_string();
        let name = unique_name(&base, |candidate| self.child(new_parent, candidate).is_some());
        let node = self.node_mut(id);
        node.name = name;
        node.parent = Some(new_parent);
        self.node_mut(new_parent).children.push(id);
    }

    fn is_ancestor(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        while let Some(parent) = self.parent(id) {
            if parent == ancestor {
                return true;
            }
            id = parent;
        }
        false
    }

    /// Deep-copy `source` as a new child of `parent` named `name`.
    ///
    /// The children of `source` are read before the copy is inserted, so
    /// copying a node into itself does not recurse into the copy.
    pub fn copy_subtree(&mut self, source: NodeId, parent: NodeId, name: &str) -> NodeId {
        let attributes = self.attributes(source).clone();
        let children = self.children(source).to_vec();
        let copy = self.create_child(parent, name);
        self.node_mut(copy).attributes = attributes;
        for child in children {
            let child_name = self.name(child).to_string();
            self.copy_subtree(child, copy, &child_name);
        }
        copy
    }

    /// Pre-order traversal starting at `from`.
    pub fn walk(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Serialize the tree reachable from the root, depth first.
    pub fn render<S: DocumentSink>(&self, sink: &mut S) -> Result<(), S::Error> {
        self.render_node(self.root(), sink)
    }

    fn render_node<S: DocumentSink>(&self, id: NodeId, sink: &mut S) -> Result<(), S::Error> {
        let node = self.node(id);
        let attributes: Vec<(&str, &str)> = node
            .attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        sink.start_node(&node.name, &attributes, !node.children.is_empty())?;
        for child in &node.children {
            self.render_node(*child, sink)?;
        }
        sink.end_node(&node.name)
    }
}
