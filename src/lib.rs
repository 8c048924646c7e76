//! # spark-fiber
//!
//! Incremental tree reconciliation with a cooperative, resumable work loop.
//!
//! ## Architecture
//!
//! Applications describe their UI as immutable [`Element`] trees. Each render
//! produces a new generation of fibers, diffed position by position against the
//! last committed one. The diff runs as small units of work that can yield to a
//! [`Deadline`] between units; the resulting host mutations are applied in a
//! single uninterrupted commit.
//!
//! ```text
//! Element tree -> fibers (work loop, yieldable) -> effects -> commit -> host tree
//! ```
//!
//! Components are plain functions of [`Props`] that can keep local state
//! through [`Hooks::use_state`]. Setters queue an update and raise a render
//! request; the next [`Renderer::resume`] re-renders from the committed root.
//!
//! ## Modules
//!
//! - [`types`] - Attribute values, callbacks, reserved keys
//! - [`element`] - Element model and constructors
//! - [`engine`] - Fiber arena and tree traversal
//! - [`pipeline`] - Reconciler, work loop, commit phase, [`Renderer`]
//! - [`state`] - Local state hooks
//! - [`scheduler`] - Deadlines and idle schedulers
//! - [`host`] - Host adapter trait, in-memory and terminal hosts

pub mod config;
pub mod element;
pub mod engine;
pub mod error;
pub mod host;
pub mod pipeline;
pub mod scheduler;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::{
    Attributes, CHILDREN_KEY, Callback, EVENT_PREFIX, Event, TEXT_KIND, TEXT_VALUE_KEY, Value,
    attrs,
};

pub use element::{Component, Element, ElementKind, Props, build, text};

pub use config::RendererConfig;

pub use error::{Error, HookError, Result};

pub use host::{HostAdapter, HostError, MemoryHost, Mutation, NodeId};

pub use pipeline::{CommitSummary, DeltaFlags, Renderer, WorkStatus};

pub use scheduler::{Deadline, FrameScheduler, IdleScheduler, TimeSlice, Unbounded, UnitBudget};

pub use state::{Hooks, RenderRequest, StateSetter};
