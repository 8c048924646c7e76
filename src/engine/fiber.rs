//! Fiber - one tree position within one generation.
//!
//! Links are [`FiberId`]s into the owning [`FiberArena`](super::FiberArena):
//!
//! ```text
//! parent
//!   └─ child ── sibling ── sibling
//!        └─ child
//! ```
//!
//! `alternate` points at the fiber holding the same position in the last
//! committed generation. It is lookup-only and cleared once the generation it
//! points into is released.

use std::fmt;

use crate::element::{Element, ElementKind, Props};
use crate::state::StateSlot;

/// Index of a fiber in a [`FiberArena`](super::FiberArena).
///
/// The generation makes ids of released fibers detectably stale once their slot
/// is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FiberId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for FiberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}v{}", self.index, self.generation)
    }
}

/// Operation a fiber requires at commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EffectTag {
    #[default]
    None,
    /// Insert the (new) host node.
    Place,
    /// Apply the attribute delta against the alternate.
    Update,
    /// Remove the host nodes of this (old) fiber's subtree.
    Delete,
}

/// Work/record unit of the reconciler.
#[derive(Debug)]
pub struct Fiber<N> {
    pub kind: ElementKind,
    pub props: Props,
    /// Owned host node. Always `None` for component fibers.
    pub host_node: Option<N>,
    pub parent: Option<FiberId>,
    pub child: Option<FiberId>,
    pub sibling: Option<FiberId>,
    pub alternate: Option<FiberId>,
    pub effect: EffectTag,
    pub state_slots: Vec<StateSlot>,
}

impl<N> Fiber<N> {
    /// Root fiber of a generation, bound to the host container.
    pub fn root(container: N, props: Props, alternate: Option<FiberId>) -> Self {
        Self {
            kind: ElementKind::from("root"),
            props,
            host_node: Some(container),
            parent: None,
            child: None,
            sibling: None,
            alternate,
            effect: EffectTag::None,
            state_slots: Vec::new(),
        }
    }

    /// New fiber for an element with no reusable counterpart.
    pub fn placement(element: &Element, parent: FiberId) -> Self {
        Self {
            kind: element.kind.clone(),
            props: element.props.clone(),
            host_node: None,
            parent: Some(parent),
            child: None,
            sibling: None,
            alternate: None,
            effect: EffectTag::Place,
            state_slots: Vec::new(),
        }
    }

    /// Fiber reusing `old`'s host node with `element`'s props.
    pub fn update(element: &Element, parent: FiberId, old: FiberId, host_node: Option<N>) -> Self {
        Self {
            kind: element.kind.clone(),
            props: element.props.clone(),
            host_node,
            parent: Some(parent),
            child: None,
            sibling: None,
            alternate: Some(old),
            effect: EffectTag::Update,
            state_slots: Vec::new(),
        }
    }

    /// Check if this fiber is a component (owns no host node).
    pub fn is_component(&self) -> bool {
        self.kind.is_component()
    }
}
