//! Render Pipeline
//!
//! Turns element trees into host mutations, one generation at a time.
//!
//! # Pipeline Architecture
//!
//! ```text
//! render()/setter -> work loop (reconcile per unit, yieldable) -> commit (atomic) -> current tree
//! ```
//!
//! ## Data Flow
//!
//! 1. **work_loop** - one fiber per unit; evaluates components, creates host nodes
//! 2. **reconcile** - positional diff of a fiber's children, tags PLACE/UPDATE/DELETE
//! 3. **commit** - applies deletions, placements and attribute deltas to the host
//! 4. **mount** - [`Renderer`], the entry point that drives all of the above
//!
//! ## Key Design Principles
//!
//! - **Interruptible render**: the loop only yields between units and never touches
//!   the attached host tree
//! - **Atomic commit**: a generation is either fully applied or not at all
//! - **Two trees**: current (committed) and work-in-progress, linked by `alternate`

pub mod commit;
pub mod context;
pub mod mount;
pub mod reconcile;
pub mod work_loop;

// Re-exports
pub use commit::{CommitSummary, DeltaFlags, apply_attribute_delta, commit_root};
pub use context::WorkContext;
pub use mount::{Renderer, WorkStatus};
pub use reconcile::reconcile_children;
pub use work_loop::perform_unit_of_work;
