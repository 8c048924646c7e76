//! Renderer configuration.

use std::time::Duration;

/// Tuning knobs of the work loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererConfig {
    /// The loop yields once a deadline reports less than this remaining.
    pub yield_threshold: Duration,
    /// Slice length used by [`Renderer::resume_slice`](crate::Renderer::resume_slice).
    pub slice_budget: Duration,
}

impl RendererConfig {
    pub const DEFAULT_YIELD_THRESHOLD: Duration = Duration::from_millis(1);
    /// ~60fps.
    pub const DEFAULT_SLICE_BUDGET: Duration = Duration::from_millis(16);

    pub fn with_yield_threshold(mut self, threshold: Duration) -> Self {
        self.yield_threshold = threshold;
        self
    }

    pub fn with_slice_budget(mut self, budget: Duration) -> Self {
        self.slice_budget = budget;
        self
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            yield_threshold: Self::DEFAULT_YIELD_THRESHOLD,
            slice_budget: Self::DEFAULT_SLICE_BUDGET,
        }
    }
}
