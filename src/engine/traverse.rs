//! Tree traversal over child/sibling links.

use super::arena::FiberArena;
use super::fiber::FiberId;

/// Iterator over the direct children of a fiber.
pub struct Children<'a, N> {
    arena: &'a FiberArena<N>,
    current: Option<FiberId>,
}

impl<'a, N> Children<'a, N> {
    pub fn new(arena: &'a FiberArena<N>, parent: FiberId) -> Self {
        Self {
            arena,
            current: arena.get(parent).and_then(|f| f.child),
        }
    }
}

impl<N> Iterator for Children<'_, N> {
    type Item = FiberId;

    fn next(&mut self) -> Option<FiberId> {
        let id = self.current?;
        self.current = self.arena.get(id).and_then(|f| f.sibling);
        Some(id)
    }
}

/// Pre-order successor of `id` within the subtree of `root`.
///
/// Child first, else the nearest sibling found walking up through parents.
/// Returns `None` once the walk climbs back to `root`.
pub fn next_in_subtree<N>(arena: &FiberArena<N>, id: FiberId, root: FiberId) -> Option<FiberId> {
    if let Some(child) = arena[id].child {
        return Some(child);
    }
    let mut cursor = id;
    while cursor != root {
        let fiber = &arena[cursor];
        if let Some(sibling) = fiber.sibling {
            return Some(sibling);
        }
        cursor = fiber.parent?;
    }
    None
}

/// Pre-order walk of `root`'s descendants (root excluded).
pub fn descendants<N>(arena: &FiberArena<N>, root: FiberId) -> Vec<FiberId> {
    let mut order = Vec::new();
    let mut cursor = arena[root].child;
    while let Some(id) = cursor {
        order.push(id);
        cursor = next_in_subtree(arena, id, root);
    }
    order
}
