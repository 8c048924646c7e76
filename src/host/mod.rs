//! Host-tree adapter - the side-effecting sink the reconciler drives.
//!
//! The reconciler never owns host nodes' storage. It holds [`HostAdapter::Node`]
//! handles and asks the adapter to create, mutate, attach and detach them.
//!
//! Adapters are touched in exactly two places:
//! - node creation for placed fibers, during the work loop
//! - attribute deltas, insertions and removals, during commit
//!
//! # Implementations
//!
//! - [`MemoryHost`] - in-memory node tree with a mutation log
//! - [`terminal::paint`] - draws a `MemoryHost` tree to a terminal writer

pub mod memory;
pub mod terminal;

use std::fmt;

use thiserror::Error;

use crate::types::{Callback, Value};

pub use memory::{MemoryHost, Mutation, NodeId};

/// A failure reported by a host adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("host adapter failed to {operation}: {reason}")]
pub struct HostError {
    pub operation: &'static str,
    pub reason: String,
}

impl HostError {
    pub fn new(operation: &'static str, reason: impl Into<String>) -> Self {
        Self {
            operation,
            reason: reason.into(),
        }
    }
}

/// Operations the reconciler needs from a host tree.
pub trait HostAdapter {
    /// Handle to one host node.
    type Node: Clone + PartialEq + fmt::Debug;

    /// Create a detached node of `kind` (a tag name or [`TEXT_KIND`](crate::TEXT_KIND)).
    fn create_node(&mut self, kind: &str) -> Result<Self::Node, HostError>;

    /// Set a plain attribute.
    fn set_attribute(
        &mut self,
        node: &Self::Node,
        key: &str,
        value: &Value,
    ) -> Result<(), HostError>;

    /// Reset a plain attribute to its empty/default value.
    fn clear_attribute(&mut self, node: &Self::Node, key: &str) -> Result<(), HostError>;

    /// Bind `handler` to `event`.
    fn bind_event(
        &mut self,
        node: &Self::Node,
        event: &str,
        handler: &Callback,
    ) -> Result<(), HostError>;

    /// Unbind a handler previously bound with [`bind_event`](Self::bind_event).
    fn unbind_event(
        &mut self,
        node: &Self::Node,
        event: &str,
        handler: &Callback,
    ) -> Result<(), HostError>;

    /// Append `child` to `parent`'s children.
    fn insert_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), HostError>;

    /// Insert `child` before `anchor` among `parent`'s children.
    ///
    /// Adapters that can only append may keep the default.
    fn insert_before(
        &mut self,
        parent: &Self::Node,
        child: &Self::Node,
        anchor: &Self::Node,
    ) -> Result<(), HostError> {
        let _ = anchor;
        self.insert_child(parent, child)
    }

    /// Detach `child` from `parent`.
    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), HostError>;
}
