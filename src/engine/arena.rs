//! Fiber arena - index allocation with slot reuse.
//!
//! - Freed slots go to a pool and are reused first
//! - Each slot carries a generation, bumped on release, so a stale [`FiberId`]
//!   never aliases the fiber that reused its slot
//! - Indexing with a stale id is a programmer error and panics

use std::ops::{Index, IndexMut};

use super::fiber::{Fiber, FiberId};

struct Slot<N> {
    generation: u32,
    fiber: Option<Fiber<N>>,
}

/// Storage for every live fiber of the current and work-in-progress trees.
pub struct FiberArena<N> {
    slots: Vec<Slot<N>>,
    free: Vec<u32>,
    live: usize,
}

impl<N> FiberArena<N> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Store a fiber, reusing a free slot if one exists.
    pub fn insert(&mut self, fiber: Fiber<N>) -> FiberId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.fiber = Some(fiber);
            return FiberId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            fiber: Some(fiber),
        });
        FiberId {
            index,
            generation: 0,
        }
    }

    /// Release a fiber. Returns it if `id` was live.
    pub fn remove(&mut self, id: FiberId) -> Option<Fiber<N>> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let fiber = slot.fiber.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(fiber)
    }

    pub fn get(&self, id: FiberId) -> Option<&Fiber<N>> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.fiber.as_ref())
    }

    pub fn get_mut(&mut self, id: FiberId) -> Option<&mut Fiber<N>> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.fiber.as_mut())
    }

    pub fn contains(&self, id: FiberId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live fibers.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Release `root` and every fiber reachable through its child/sibling
    /// links. Returns how many fibers were released.
    pub fn remove_tree(&mut self, root: FiberId) -> usize {
        let mut released = 0;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(fiber) = self.remove(id) else { continue };
            released += 1;
            stack.extend(fiber.child);
            // Siblings of the root belong to someone else's chain.
            if id != root {
                stack.extend(fiber.sibling);
            }
        }
        released
    }
}

impl<N> Default for FiberArena<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> Index<FiberId> for FiberArena<N> {
    type Output = Fiber<N>;

    fn index(&self, id: FiberId) -> &Fiber<N> {
        match self.get(id) {
            Some(fiber) => fiber,
            None => panic!("stale fiber id {id}"),
        }
    }
}

impl<N> IndexMut<FiberId> for FiberArena<N> {
    fn index_mut(&mut self, id: FiberId) -> &mut Fiber<N> {
        match self.get_mut(id) {
            Some(fiber) => fiber,
            None => panic!("stale fiber id {id}"),
        }
    }
}
