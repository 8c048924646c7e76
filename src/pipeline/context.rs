//! Work context - the state shared by the work loop, reconciler and commit.
//!
//! Owned by one [`Renderer`](super::Renderer) and never read from outside the
//! pipeline. At any time it holds at most:
//! - one current tree (last committed, read-only to the work loop)
//! - one work-in-progress tree (being built)
//! - the next-unit pointer into the work-in-progress tree
//! - the deletions collected for the work-in-progress generation

use tracing::debug;

use crate::element::Props;
use crate::engine::{EffectTag, Fiber, FiberArena, FiberId, descendants};

pub struct WorkContext<N> {
    pub arena: FiberArena<N>,
    pub current_root: Option<FiberId>,
    pub wip_root: Option<FiberId>,
    pub next_unit: Option<FiberId>,
    /// Fibers of the current tree marked DELETE by this generation.
    pub deletions: Vec<FiberId>,
    /// Number of generations started so far.
    pub generation: u64,
}

impl<N: Clone> WorkContext<N> {
    pub fn new() -> Self {
        Self {
            arena: FiberArena::new(),
            current_root: None,
            wip_root: None,
            next_unit: None,
            deletions: Vec::new(),
            generation: 0,
        }
    }

    /// Start a generation rooted at `container`, diffed against the current tree.
    ///
    /// A generation still in progress is abandoned first.
    pub fn begin_generation(&mut self, container: N, props: Props) -> FiberId {
        if self.wip_root.is_some() {
            self.abandon();
        }
        let root = self.arena.insert(Fiber::root(container, props, self.current_root));
        self.wip_root = Some(root);
        self.next_unit = Some(root);
        self.generation += 1;
        debug!(generation = self.generation, root = %root, "generation started");
        root
    }

    /// Start a generation that re-renders the current tree with its own
    /// container and props. Returns `None` if nothing was committed yet.
    pub fn restart_from_current(&mut self) -> Option<FiberId> {
        let current = &self.arena[self.current_root?];
        let container = current.host_node.clone()?;
        let props = current.props.clone();
        Some(self.begin_generation(container, props))
    }

    /// Drop the generation in progress.
    ///
    /// DELETE marks it placed on current fibers are reset and its fibers are
    /// released. Nothing was committed, so the current tree is untouched.
    pub fn abandon(&mut self) {
        for id in self.deletions.drain(..) {
            if let Some(fiber) = self.arena.get_mut(id) {
                fiber.effect = EffectTag::None;
            }
        }
        if let Some(root) = self.wip_root.take() {
            let released = self.arena.remove_tree(root);
            debug!(generation = self.generation, released, "generation abandoned");
        }
        self.next_unit = None;
    }

    /// Make the work-in-progress tree current after its commit.
    ///
    /// The previous current tree (deleted fibers included) is released, and
    /// `alternate`/`effect` are cleared on the promoted tree so nothing points
    /// into released slots.
    pub fn promote(&mut self) {
        let Some(root) = self.wip_root.take() else { return };
        if let Some(old) = self.current_root.replace(root) {
            self.arena.remove_tree(old);
        }
        let mut promoted = descendants(&self.arena, root);
        promoted.push(root);
        for id in promoted {
            let fiber = &mut self.arena[id];
            fiber.alternate = None;
            fiber.effect = EffectTag::None;
        }
        self.deletions.clear();
        self.next_unit = None;
    }

    /// Unlink a fiber of the current tree from its parent's child chain and
    /// release its subtree.
    ///
    /// Used when a failed commit already removed the fiber's host nodes, so the
    /// current tree keeps describing the host tree.
    pub fn detach_committed(&mut self, id: FiberId) {
        let Some(fiber) = self.arena.get(id) else { return };
        let (parent, sibling) = (fiber.parent, fiber.sibling);

        if let Some(parent) = parent {
            if self.arena[parent].child == Some(id) {
                self.arena[parent].child = sibling;
            } else {
                let mut cursor = self.arena[parent].child;
                while let Some(prev) = cursor {
                    if self.arena[prev].sibling == Some(id) {
                        self.arena[prev].sibling = sibling;
                        break;
                    }
                    cursor = self.arena[prev].sibling;
                }
            }
        }

        let released = self.arena.remove_tree(id);
        debug!(fiber = %id, released, "committed fiber detached");
    }

    /// Check if a generation is in progress.
    pub fn in_progress(&self) -> bool {
        self.wip_root.is_some()
    }
}

impl<N: Clone> Default for WorkContext<N> {
    fn default() -> Self {
        Self::new()
    }
}
