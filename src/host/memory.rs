//! In-memory host tree.
//!
//! Nodes live in a flat `Vec` addressed by [`NodeId`], parent/children links are
//! indices. Every adapter call is appended to a mutation log so callers can
//! assert exactly what a commit did.
//!
//! Node 0 is the container created by [`MemoryHost::new`]; its creation is not
//! logged.

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

use crate::types::{Callback, Event, TEXT_KIND, TEXT_VALUE_KEY, Value};

use super::{HostAdapter, HostError};

/// Handle to a node of a [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One adapter call, as recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Create { node: NodeId, kind: String },
    SetAttribute { node: NodeId, key: String, value: Value },
    ClearAttribute { node: NodeId, key: String },
    Bind { node: NodeId, event: String },
    Unbind { node: NodeId, event: String },
    Insert { parent: NodeId, child: NodeId, before: Option<NodeId> },
    Remove { parent: NodeId, child: NodeId },
}

impl Mutation {
    /// Check if this mutation changes attributes or bindings.
    pub fn is_attribute_change(&self) -> bool {
        matches!(
            self,
            Mutation::SetAttribute { .. }
                | Mutation::ClearAttribute { .. }
                | Mutation::Bind { .. }
                | Mutation::Unbind { .. }
        )
    }
}

/// A node of the in-memory tree.
#[derive(Debug, Clone, Default)]
pub struct HostNode {
    pub kind: String,
    pub attributes: BTreeMap<String, Value>,
    pub handlers: BTreeMap<String, Vec<Callback>>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

/// In-memory [`HostAdapter`].
#[derive(Debug)]
pub struct MemoryHost {
    nodes: Vec<HostNode>,
    log: Vec<Mutation>,
    fail_on: Option<&'static str>,
}

impl MemoryHost {
    /// Create a host holding one empty container node.
    pub fn new() -> Self {
        Self {
            nodes: vec![HostNode {
                kind: "root".to_string(),
                ..HostNode::default()
            }],
            log: Vec::new(),
            fail_on: None,
        }
    }

    /// The container node.
    pub fn container(&self) -> NodeId {
        NodeId(0)
    }

    /// Get a node.
    pub fn node(&self, id: NodeId) -> Option<&HostNode> {
        self.nodes.get(id.0)
    }

    /// Children of a node (empty for unknown ids).
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Total nodes ever created, including the container.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Recorded mutations, oldest first.
    pub fn mutations(&self) -> &[Mutation] {
        &self.log
    }

    /// Drain the mutation log.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.log)
    }

    /// Make the next call of `operation` fail (e.g. "remove child").
    pub fn fail_on(&mut self, operation: &'static str) {
        self.fail_on = Some(operation);
    }

    /// Concatenated text of all text nodes under `id`, in tree order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else { return };
        if node.kind == TEXT_KIND {
            if let Some(value) = node.attributes.get(TEXT_VALUE_KEY) {
                let _ = write!(out, "{value}");
            }
        }
        for &child in &node.children {
            self.collect_text(child, out);
        }
    }

    /// Serialize the subtree under `id` (exclusive) as compact markup.
    ///
    /// Plain attributes are printed, handlers are not. Text nodes print their
    /// value. `<div id="a"><h1>Hello</h1></div>`
    pub fn markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_markup(child, &mut out);
        }
        out
    }

    fn write_markup(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else { return };
        if node.kind == TEXT_KIND {
            if let Some(value) = node.attributes.get(TEXT_VALUE_KEY) {
                let _ = write!(out, "{value}");
            }
            return;
        }
        let _ = write!(out, "<{}", node.kind);
        for (key, value) in &node.attributes {
            let _ = write!(out, " {key}=\"{value}\"");
        }
        out.push('>');
        for &child in &node.children {
            self.write_markup(child, out);
        }
        let _ = write!(out, "</{}>", node.kind);
    }

    /// First attached node of `kind` in pre-order under the container.
    pub fn find(&self, kind: &str) -> Option<NodeId> {
        self.find_all(kind).into_iter().next()
    }

    /// All attached nodes of `kind` in pre-order under the container.
    pub fn find_all(&self, kind: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![self.container()];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else { continue };
            if node.kind == kind {
                found.push(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        found
    }

    /// Deliver `event` to every handler bound on `node` for its name.
    ///
    /// Returns how many handlers ran.
    pub fn dispatch(&self, node: NodeId, event: &Event) -> usize {
        let handlers: Vec<Callback> = self
            .node(node)
            .and_then(|n| n.handlers.get(&event.name))
            .cloned()
            .unwrap_or_default();
        for handler in &handlers {
            handler.call(event);
        }
        handlers.len()
    }

    fn check(&mut self, operation: &'static str) -> Result<(), HostError> {
        if self.fail_on == Some(operation) {
            self.fail_on = None;
            return Err(HostError::new(operation, "injected failure"));
        }
        Ok(())
    }

    fn node_mut(
        &mut self,
        id: NodeId,
        operation: &'static str,
    ) -> Result<&mut HostNode, HostError> {
        self.nodes
            .get_mut(id.0)
            .ok_or_else(|| HostError::new(operation, format!("unknown node {id}")))
    }

    fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.nodes.get(child.0).and_then(|n| n.parent) else { return };
        if let Some(p) = self.nodes.get_mut(parent.0) {
            p.children.retain(|&c| c != child);
        }
        if let Some(c) = self.nodes.get_mut(child.0) {
            c.parent = None;
        }
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostAdapter for MemoryHost {
    type Node = NodeId;

    fn create_node(&mut self, kind: &str) -> Result<NodeId, HostError> {
        self.check("create node")?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(HostNode {
            kind: kind.to_string(),
            ..HostNode::default()
        });
        self.log.push(Mutation::Create {
            node: id,
            kind: kind.to_string(),
        });
        Ok(id)
    }

    fn set_attribute(&mut self, node: &NodeId, key: &str, value: &Value) -> Result<(), HostError> {
        self.check("set attribute")?;
        self.node_mut(*node, "set attribute")?
            .attributes
            .insert(key.to_string(), value.clone());
        self.log.push(Mutation::SetAttribute {
            node: *node,
            key: key.to_string(),
            value: value.clone(),
        });
        Ok(())
    }

    fn clear_attribute(&mut self, node: &NodeId, key: &str) -> Result<(), HostError> {
        self.check("clear attribute")?;
        // Reset to empty rather than remove, like assigning "" to a DOM property.
        self.node_mut(*node, "clear attribute")?
            .attributes
            .insert(key.to_string(), Value::Text(String::new()));
        self.log.push(Mutation::ClearAttribute {
            node: *node,
            key: key.to_string(),
        });
        Ok(())
    }

    fn bind_event(
        &mut self,
        node: &NodeId,
        event: &str,
        handler: &Callback,
    ) -> Result<(), HostError> {
        self.check("bind event")?;
        self.node_mut(*node, "bind event")?
            .handlers
            .entry(event.to_string())
            .or_default()
            .push(handler.clone());
        self.log.push(Mutation::Bind {
            node: *node,
            event: event.to_string(),
        });
        Ok(())
    }

    fn unbind_event(
        &mut self,
        node: &NodeId,
        event: &str,
        handler: &Callback,
    ) -> Result<(), HostError> {
        self.check("unbind event")?;
        let target = self.node_mut(*node, "unbind event")?;
        if let Some(bound) = target.handlers.get_mut(event) {
            bound.retain(|h| !h.ptr_eq(handler));
            if bound.is_empty() {
                target.handlers.remove(event);
            }
        }
        self.log.push(Mutation::Unbind {
            node: *node,
            event: event.to_string(),
        });
        Ok(())
    }

    fn insert_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), HostError> {
        self.check("insert child")?;
        self.node_mut(*child, "insert child")?;
        self.detach(*child);
        self.node_mut(*parent, "insert child")?.children.push(*child);
        self.node_mut(*child, "insert child")?.parent = Some(*parent);
        self.log.push(Mutation::Insert {
            parent: *parent,
            child: *child,
            before: None,
        });
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: &NodeId,
        child: &NodeId,
        anchor: &NodeId,
    ) -> Result<(), HostError> {
        self.check("insert child")?;
        self.node_mut(*child, "insert child")?;
        self.detach(*child);
        let siblings = &mut self.node_mut(*parent, "insert child")?.children;
        let Some(position) = siblings.iter().position(|c| c == anchor) else {
            return Err(HostError::new(
                "insert child",
                format!("anchor {anchor} is not a child of {parent}"),
            ));
        };
        siblings.insert(position, *child);
        self.node_mut(*child, "insert child")?.parent = Some(*parent);
        self.log.push(Mutation::Insert {
            parent: *parent,
            child: *child,
            before: Some(*anchor),
        });
        Ok(())
    }

    fn remove_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), HostError> {
        self.check("remove child")?;
        let attached = self.node(*child).and_then(|n| n.parent) == Some(*parent);
        if !attached {
            return Err(HostError::new(
                "remove child",
                format!("{child} is not a child of {parent}"),
            ));
        }
        self.detach(*child);
        self.log.push(Mutation::Remove {
            parent: *parent,
            child: *child,
        });
        Ok(())
    }
}
