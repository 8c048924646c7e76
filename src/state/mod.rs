//! Local state - per-component slots that survive across generations.
//!
//! - [`Hooks`] - handed to every component evaluation
//! - [`StateSetter`] - queues an update and requests a new generation
//! - [`RenderRequest`] - the shared flag the work loop polls

mod hooks;

pub use hooks::{Hooks, RenderRequest, StateSetter, StateSlot};
