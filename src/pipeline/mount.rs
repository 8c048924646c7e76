//! Renderer - render entry point and the resumable work loop.
//!
//! # Example
//!
//! ```ignore
//! use spark_fiber::{Renderer, MemoryHost, UnitBudget, WorkStatus};
//!
//! let host = MemoryHost::new();
//! let container = host.container();
//! let mut renderer = Renderer::new(host);
//! renderer.render(app(), container);
//!
//! // Option 1: drive slices yourself
//! while renderer.resume(UnitBudget::new(32))? == WorkStatus::Yielded {
//!     // Other work between slices
//! }
//!
//! // Option 2: hand the loop to an idle scheduler
//! renderer.run(&mut FrameScheduler::new(Duration::from_millis(16)))?;
//! ```
//!
//! # Generations
//!
//! ```text
//! render()/setter -> root fiber (alternate = current) -> units ... -> commit -> current
//! ```
//!
//! Only one generation is in progress at a time. A new render, or a state
//! update picked up by `resume`, abandons the one in progress; nothing of it
//! was committed, so nothing needs unwinding.

use tracing::{debug, error};

use crate::config::RendererConfig;
use crate::element::Element;
use crate::engine::FiberId;
use crate::error::{Error, Result};
use crate::host::HostAdapter;
use crate::scheduler::{Deadline, IdleScheduler, TimeSlice, Unbounded};
use crate::state::RenderRequest;

use super::commit::{CommitSummary, commit_root};
use super::context::WorkContext;
use super::work_loop::{perform_unit_of_work, root_props};

/// Outcome of one [`Renderer::resume`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkStatus {
    /// Nothing left to do until the next render or state update.
    Idle,
    /// Work remains; call `resume` again.
    Yielded,
}

/// Owns the host adapter and every generation rendered into it.
pub struct Renderer<H: HostAdapter> {
    host: H,
    ctx: WorkContext<H::Node>,
    config: RendererConfig,
    request: RenderRequest,
    last_commit: Option<CommitSummary>,
    commits: u64,
}

impl<H: HostAdapter> Renderer<H> {
    /// Create a renderer with the default configuration.
    pub fn new(host: H) -> Self {
        Self::with_config(host, RendererConfig::default())
    }

    pub fn with_config(host: H, config: RendererConfig) -> Self {
        Self {
            host,
            ctx: WorkContext::new(),
            config,
            request: RenderRequest::new(),
            last_commit: None,
            commits: 0,
        }
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Queue `element` to be rendered into `container`.
    ///
    /// Nothing touches the host until [`resume`](Self::resume) runs. A
    /// generation in progress is abandoned.
    pub fn render(&mut self, element: Element, container: H::Node) {
        debug!(kind = %element.kind, ?container, "render requested");
        // This generation diffs against the current tree, so it also picks up
        // every queued state update.
        self.request.take();
        self.ctx.begin_generation(container, root_props(element));
    }

    /// Run units until the generation completes or `deadline` runs low.
    ///
    /// The deadline is polled after every unit. A completed generation is
    /// committed in the same call regardless of the remaining budget.
    pub fn resume<D: Deadline>(&mut self, mut deadline: D) -> Result<WorkStatus> {
        if self.request.is_pending() && self.ctx.current_root.is_some() {
            self.request.take();
            if self.ctx.in_progress() {
                debug!(
                    generation = self.ctx.generation,
                    "state update supersedes generation in progress"
                );
            }
            self.ctx.restart_from_current();
        }

        while let Some(unit) = self.ctx.next_unit {
            match perform_unit_of_work(&mut self.ctx, &mut self.host, &self.request, unit) {
                Ok(next) => self.ctx.next_unit = next,
                Err(err) => return Err(self.abort(err)),
            }
            if deadline.time_remaining() < self.config.yield_threshold {
                break;
            }
        }

        if self.ctx.next_unit.is_none() && self.ctx.in_progress() {
            match commit_root(&mut self.ctx, &mut self.host) {
                Ok(summary) => {
                    self.commits += 1;
                    self.last_commit = Some(summary);
                }
                Err(err) => return Err(self.abort(err)),
            }
        }

        Ok(self.status())
    }

    /// Resume for one slice of the configured `slice_budget`.
    pub fn resume_slice(&mut self) -> Result<WorkStatus> {
        self.resume(TimeSlice::new(self.config.slice_budget))
    }

    /// Resume without a time limit until idle.
    ///
    /// Does not return while components keep requesting updates during their
    /// own evaluation.
    pub fn flush(&mut self) -> Result<()> {
        while self.resume(Unbounded)? == WorkStatus::Yielded {}
        Ok(())
    }

    /// Self-perpetuating loop: resume once per granted slice until the
    /// scheduler stops granting them.
    pub fn run<S: IdleScheduler>(&mut self, scheduler: &mut S) -> Result<()> {
        while let Some(deadline) = scheduler.request_slice() {
            self.resume(deadline)?;
        }
        Ok(())
    }

    fn abort(&mut self, err: Error) -> Error {
        error!(generation = self.ctx.generation, error = %err, "generation aborted");
        self.ctx.abandon();
        err
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Current status without doing any work.
    pub fn status(&self) -> WorkStatus {
        let pending_update = self.request.is_pending() && self.ctx.current_root.is_some();
        if self.ctx.next_unit.is_some() || pending_update {
            WorkStatus::Yielded
        } else {
            WorkStatus::Idle
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host access, e.g. to drain a mutation log between commits.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Handle to the shared render request; raising it schedules a re-render
    /// of the current tree.
    pub fn render_request(&self) -> RenderRequest {
        self.request.clone()
    }

    pub fn last_commit(&self) -> Option<&CommitSummary> {
        self.last_commit.as_ref()
    }

    /// Number of generations committed.
    pub fn commits(&self) -> u64 {
        self.commits
    }

    /// Number of generations started.
    pub fn generation(&self) -> u64 {
        self.ctx.generation
    }

    pub fn current_root(&self) -> Option<FiberId> {
        self.ctx.current_root
    }

    /// Number of live fibers (current plus work-in-progress).
    pub fn fiber_count(&self) -> usize {
        self.ctx.arena.len()
    }

    /// Read-only view of the pipeline state.
    pub fn context(&self) -> &WorkContext<H::Node> {
        &self.ctx
    }
}

impl<H: HostAdapter + std::fmt::Debug> std::fmt::Debug for Renderer<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("host", &self.host)
            .field("generation", &self.ctx.generation)
            .field("commits", &self.commits)
            .field("status", &self.status())
            .finish()
    }
}
