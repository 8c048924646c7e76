//! Commit phase - apply a completed generation to the host tree.
//!
//! Runs to completion in one call. Order:
//!
//! 1. deletions: remove the host nodes of every fiber marked DELETE
//! 2. pre-order walk of the new tree: PLACE inserts, UPDATE applies the
//!    attribute delta, anything else is only traversed
//! 3. promotion: the new tree becomes current, the old one is released
//!
//! Deletions go first so a replaced position never holds two host nodes.
//!
//! # Failure
//!
//! The first adapter error stops the commit. Steps already applied are
//! rolled back so the host tree agrees with the current tree again:
//!
//! ```text
//! inserted node       -> removed again
//! attribute delta     -> reversed (next -> previous)
//! removed host nodes  -> fiber unlinked from the current tree
//! ```
//!
//! A delta that fails halfway is not reversed.
//!
//! # Attribute delta
//!
//! ```text
//! prev handler removed or changed -> unbind
//! prev plain key removed          -> clear (reset, not delete)
//! next plain key added or changed -> set
//! next handler added or changed   -> bind
//! ```

use bitflags::bitflags;
use tracing::{debug, warn};

use crate::engine::{Children, EffectTag, FiberArena, FiberId, next_in_subtree};
use crate::error::Result;
use crate::host::{HostAdapter, HostError};
use crate::types::{Attributes, event_name, is_event_key, is_plain_key};

use super::context::WorkContext;

bitflags! {
    /// Classes of host mutation a delta or commit performed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DeltaFlags: u8 {
        const SET = 1 << 0;
        const CLEARED = 1 << 1;
        const BOUND = 1 << 2;
        const UNBOUND = 1 << 3;
        const INSERTED = 1 << 4;
        const REMOVED = 1 << 5;
    }
}

/// What one commit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitSummary {
    pub generation: u64,
    /// Fibers tagged PLACE.
    pub placed: usize,
    /// Fibers tagged UPDATE.
    pub updated: usize,
    /// Fibers tagged DELETE (subtree roots).
    pub deleted: usize,
    /// Host nodes inserted into an attached or detached parent.
    pub inserted_nodes: usize,
    /// Host nodes detached by deletions.
    pub removed_nodes: usize,
    pub delta: DeltaFlags,
}

impl CommitSummary {
    /// Check if the commit changed nothing on the host.
    pub fn is_noop(&self) -> bool {
        self.delta.is_empty()
    }
}

/// Host-side step of a commit, kept until the commit completes.
enum Applied<N> {
    /// All (or some) host nodes of a deleted fiber were removed.
    Removed(FiberId),
    Inserted { parent: N, node: N },
    /// The attribute delta of an UPDATE fiber was applied.
    Updated(FiberId),
}

/// Commit the work-in-progress generation and promote it.
///
/// On error the applied steps are rolled back and the context is otherwise
/// left as is; the caller abandons the generation.
pub fn commit_root<H: HostAdapter>(
    ctx: &mut WorkContext<H::Node>,
    host: &mut H,
) -> Result<CommitSummary> {
    let mut summary = CommitSummary {
        generation: ctx.generation,
        ..CommitSummary::default()
    };
    let Some(root) = ctx.wip_root else {
        return Ok(summary);
    };

    let mut journal = Vec::new();
    if let Err(err) = apply_effects(ctx, host, root, &mut summary, &mut journal) {
        roll_back(ctx, host, journal);
        return Err(err);
    }

    ctx.promote();
    debug!(
        generation = summary.generation,
        placed = summary.placed,
        updated = summary.updated,
        deleted = summary.deleted,
        delta = ?summary.delta,
        "generation committed"
    );
    Ok(summary)
}

fn apply_effects<H: HostAdapter>(
    ctx: &WorkContext<H::Node>,
    host: &mut H,
    root: FiberId,
    summary: &mut CommitSummary,
    journal: &mut Vec<Applied<H::Node>>,
) -> Result<()> {
    for &id in &ctx.deletions {
        summary.removed_nodes += commit_deletion(&ctx.arena, host, id, journal)?;
        summary.deleted += 1;
    }
    if summary.removed_nodes > 0 {
        summary.delta |= DeltaFlags::REMOVED;
    }

    let mut cursor = ctx.arena[root].child;
    while let Some(id) = cursor {
        let fiber = &ctx.arena[id];
        match fiber.effect {
            EffectTag::Place => {
                summary.placed += 1;
                if let Some(node) = &fiber.host_node {
                    let parent = host_parent(&ctx.arena, id)?;
                    match placement_anchor(&ctx.arena, id) {
                        Some(anchor) => host.insert_before(&parent, node, &anchor)?,
                        None => host.insert_child(&parent, node)?,
                    }
                    journal.push(Applied::Inserted {
                        parent,
                        node: node.clone(),
                    });
                    summary.inserted_nodes += 1;
                    summary.delta |= DeltaFlags::INSERTED;
                }
            }
            EffectTag::Update => {
                summary.updated += 1;
                if let (Some(node), Some(alternate)) = (&fiber.host_node, fiber.alternate) {
                    let previous = &ctx.arena[alternate].props.attributes;
                    let next = &fiber.props.attributes;
                    let flags = apply_attribute_delta(host, node, previous, next)?;
                    if !flags.is_empty() {
                        journal.push(Applied::Updated(id));
                    }
                    summary.delta |= flags;
                }
            }
            EffectTag::None | EffectTag::Delete => {}
        }
        cursor = next_in_subtree(&ctx.arena, id, root);
    }
    Ok(())
}

/// Remove the host nodes of a deleted fiber's subtree. Returns how many.
fn commit_deletion<H: HostAdapter>(
    arena: &FiberArena<H::Node>,
    host: &mut H,
    id: FiberId,
    journal: &mut Vec<Applied<H::Node>>,
) -> Result<usize> {
    let parent = host_parent(arena, id)?;
    let nodes = host_roots(arena, id);
    for (removed, node) in nodes.iter().enumerate() {
        if let Err(err) = host.remove_child(&parent, node) {
            if removed > 0 {
                journal.push(Applied::Removed(id));
            }
            return Err(err.into());
        }
    }
    journal.push(Applied::Removed(id));
    Ok(nodes.len())
}

/// Undo `journal` newest first. Failures are logged and skipped.
fn roll_back<H: HostAdapter>(
    ctx: &mut WorkContext<H::Node>,
    host: &mut H,
    journal: Vec<Applied<H::Node>>,
) {
    let steps = journal.len();
    for applied in journal.into_iter().rev() {
        let undone = match applied {
            Applied::Inserted { parent, node } => host.remove_child(&parent, &node),
            Applied::Updated(id) => reverse_delta(&ctx.arena, host, id),
            Applied::Removed(id) => {
                ctx.detach_committed(id);
                Ok(())
            }
        };
        if let Err(err) = undone {
            warn!(error = %err, "commit rollback step failed");
        }
    }
    debug!(generation = ctx.generation, steps, "commit rolled back");
}

fn reverse_delta<H: HostAdapter>(
    arena: &FiberArena<H::Node>,
    host: &mut H,
    id: FiberId,
) -> Result<(), HostError> {
    let fiber = &arena[id];
    match (&fiber.host_node, fiber.alternate) {
        (Some(node), Some(alternate)) => {
            let previous = &arena[alternate].props.attributes;
            apply_attribute_delta(host, node, &fiber.props.attributes, previous).map(|_| ())
        }
        _ => Ok(()),
    }
}

/// Host node of the nearest ancestor that owns one.
fn host_parent<N: Clone>(arena: &FiberArena<N>, id: FiberId) -> Result<N, HostError> {
    let mut cursor = arena[id].parent;
    while let Some(ancestor) = cursor {
        let fiber = &arena[ancestor];
        if let Some(node) = &fiber.host_node {
            return Ok(node.clone());
        }
        cursor = fiber.parent;
    }
    Err(HostError::new("find host parent", format!("fiber {id} has no host ancestor")))
}

/// Topmost host nodes of a subtree, descending through component fibers.
fn host_roots<N: Clone>(arena: &FiberArena<N>, id: FiberId) -> Vec<N> {
    match &arena[id].host_node {
        Some(node) => vec![node.clone()],
        None => Children::new(arena, id)
            .flat_map(|child| host_roots(arena, child))
            .collect(),
    }
}

/// First host node already in the host tree that follows `id` under the same
/// host parent. `None` means append.
fn placement_anchor<N: Clone>(arena: &FiberArena<N>, id: FiberId) -> Option<N> {
    let mut cursor = id;
    loop {
        let mut sibling = arena[cursor].sibling;
        while let Some(next) = sibling {
            if let Some(node) = first_attached(arena, next) {
                return Some(node);
            }
            sibling = arena[next].sibling;
        }
        // Climb only through component fibers; a host parent ends the search.
        let parent = arena[cursor].parent?;
        if arena[parent].host_node.is_some() {
            return None;
        }
        cursor = parent;
    }
}

/// First host node of the subtree that is already attached. Placed fibers are
/// attached later in the walk, so they and their descendants are skipped.
fn first_attached<N: Clone>(arena: &FiberArena<N>, id: FiberId) -> Option<N> {
    let fiber = &arena[id];
    if fiber.effect == EffectTag::Place {
        return None;
    }
    if let Some(node) = &fiber.host_node {
        return Some(node.clone());
    }
    Children::new(arena, id).find_map(|child| first_attached(arena, child))
}

/// Apply the difference between two attribute maps to one host node.
pub fn apply_attribute_delta<H: HostAdapter>(
    host: &mut H,
    node: &H::Node,
    previous: &Attributes,
    next: &Attributes,
) -> Result<DeltaFlags, HostError> {
    let mut flags = DeltaFlags::empty();

    for (key, value) in previous.iter().filter(|(k, _)| is_event_key(k)) {
        if next.get(key) == Some(value) {
            continue;
        }
        if let Some(handler) = value.as_handler() {
            host.unbind_event(node, &event_name(key), handler)?;
            flags |= DeltaFlags::UNBOUND;
        }
    }

    for key in previous.keys().filter(|k| is_plain_key(k)) {
        if !next.contains_key(key) {
            host.clear_attribute(node, key)?;
            flags |= DeltaFlags::CLEARED;
        }
    }

    for (key, value) in next.iter().filter(|(k, _)| is_plain_key(k)) {
        if previous.get(key) != Some(value) {
            host.set_attribute(node, key, value)?;
            flags |= DeltaFlags::SET;
        }
    }

    for (key, value) in next.iter().filter(|(k, _)| is_event_key(k)) {
        if previous.get(key) == Some(value) {
            continue;
        }
        match value.as_handler() {
            Some(handler) => {
                host.bind_event(node, &event_name(key), handler)?;
                flags |= DeltaFlags::BOUND;
            }
            None => warn!(
                key = %key,
                value = %value,
                "non-handler value under an event key ignored"
            ),
        }
    }

    Ok(flags)
}
