//! Time budgets for the cooperative work loop.
//!
//! The work loop never decides on its own how long to run. After every unit it
//! asks a [`Deadline`] how much time is left and yields below the configured
//! threshold. An [`IdleScheduler`] hands out one deadline per slice;
//! [`Renderer::run`](crate::Renderer::run) keeps asking for slices until the
//! scheduler returns `None`.
//!
//! # Deadlines
//!
//! - [`Unbounded`] - never yields
//! - [`TimeSlice`] - wall-clock budget from creation
//! - [`UnitBudget`] - yields after a fixed number of units (deterministic, for tests)

use std::thread;
use std::time::{Duration, Instant};

// =============================================================================
// Deadline
// =============================================================================

/// Opaque "time remaining" query, polled after each unit of work.
pub trait Deadline {
    fn time_remaining(&mut self) -> Duration;
}

impl<D: Deadline + ?Sized> Deadline for &mut D {
    fn time_remaining(&mut self) -> Duration {
        (**self).time_remaining()
    }
}

/// Deadline that never expires.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl Deadline for Unbounded {
    fn time_remaining(&mut self) -> Duration {
        Duration::MAX
    }
}

/// Wall-clock budget starting at construction.
#[derive(Debug, Clone, Copy)]
pub struct TimeSlice {
    end: Instant,
}

impl TimeSlice {
    pub fn new(budget: Duration) -> Self {
        Self {
            end: Instant::now() + budget,
        }
    }
}

impl Deadline for TimeSlice {
    fn time_remaining(&mut self) -> Duration {
        self.end.saturating_duration_since(Instant::now())
    }
}

/// Allows `units` units of work, then reports no time left.
#[derive(Debug, Clone, Copy)]
pub struct UnitBudget {
    remaining: usize,
}

impl UnitBudget {
    pub fn new(units: usize) -> Self {
        Self { remaining: units }
    }
}

impl Deadline for UnitBudget {
    fn time_remaining(&mut self) -> Duration {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            Duration::ZERO
        } else {
            Duration::MAX
        }
    }
}

// =============================================================================
// Idle scheduler
// =============================================================================

/// Source of work slices, the idle-callback of the host environment.
pub trait IdleScheduler {
    type Deadline: Deadline;

    /// Block until the next slice is granted. `None` stops the loop.
    fn request_slice(&mut self) -> Option<Self::Deadline>;
}

/// Grants a fixed budget per frame, optionally pacing frames.
///
/// ```ignore
/// let mut frames = FrameScheduler::new(Duration::from_millis(16)).with_frame_limit(600);
/// renderer.run(&mut frames)?;
/// ```
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    budget: Duration,
    pace: Option<Duration>,
    frames_left: Option<usize>,
    last_frame: Option<Instant>,
}

impl FrameScheduler {
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            pace: None,
            frames_left: None,
            last_frame: None,
        }
    }

    /// Stop after `frames` slices.
    pub fn with_frame_limit(mut self, frames: usize) -> Self {
        self.frames_left = Some(frames);
        self
    }

    /// Start a new slice at most once per `interval`, sleeping in between.
    pub fn with_pacing(mut self, interval: Duration) -> Self {
        self.pace = Some(interval);
        self
    }
}

impl IdleScheduler for FrameScheduler {
    type Deadline = TimeSlice;

    fn request_slice(&mut self) -> Option<TimeSlice> {
        if let Some(left) = self.frames_left.as_mut() {
            if *left == 0 {
                return None;
            }
            *left -= 1;
        }
        if let (Some(interval), Some(last)) = (self.pace, self.last_frame) {
            let elapsed = last.elapsed();
            if elapsed < interval {
                thread::sleep(interval - elapsed);
            }
        }
        self.last_frame = Some(Instant::now());
        Some(TimeSlice::new(self.budget))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_budget_counts_down() {
        let mut budget = UnitBudget::new(2);
        assert_eq!(budget.time_remaining(), Duration::MAX);
        assert_eq!(budget.time_remaining(), Duration::ZERO);
        assert_eq!(budget.time_remaining(), Duration::ZERO);
    }

    #[test]
    fn test_time_slice_expires() {
        let mut slice = TimeSlice::new(Duration::ZERO);
        assert_eq!(slice.time_remaining(), Duration::ZERO);
        let mut long = TimeSlice::new(Duration::from_secs(60));
        assert!(long.time_remaining() > Duration::from_secs(1));
    }

    #[test]
    fn test_frame_limit() {
        let mut frames = FrameScheduler::new(Duration::from_millis(1)).with_frame_limit(2);
        assert!(frames.request_slice().is_some());
        assert!(frames.request_slice().is_some());
        assert!(frames.request_slice().is_none());
    }
}
