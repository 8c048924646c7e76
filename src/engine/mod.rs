//! Fiber engine - the data model every pipeline stage works on.
//!
//! - Fiber: one tree position within one generation
//! - FiberArena: index allocation, slot reuse, stale-id detection
//! - Traverse: pre-order walks over child/sibling links
//!
//! # Architecture
//!
//! Fibers are NOT linked objects. They are slots in one arena and refer to each
//! other by [`FiberId`]:
//!
//! ```text
//! f0: root (child=f1)
//! f1: div  (parent=f0, child=f2, alternate=f7)
//! f2: h1   (parent=f1, sibling=f3)
//! f3: h2   (parent=f1)
//! ```
//!
//! The current and work-in-progress trees share the arena. Releasing a
//! generation returns its slots to the pool.

mod arena;
mod fiber;
mod traverse;

pub use arena::FiberArena;
pub use fiber::{EffectTag, Fiber, FiberId};
pub use traverse::{Children, descendants, next_in_subtree};
