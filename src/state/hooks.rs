//! State slots indexed by call order.
//!
//! The nth `use_state` call of an evaluation always maps to the nth slot of the
//! previous generation. Declarations must therefore be unconditional; a change
//! in the number of declared slots is reported as [`HookError::SlotCountChanged`].
//!
//! # Update flow
//!
//! ```text
//! handler -> StateSetter::update(f) -> slot queue += f, RenderRequest raised
//!         -> Renderer::resume sees the request -> new root (alternate = current)
//!         -> component re-evaluated -> seed from alternate slot, fold queue
//! ```
//!
//! The queue lives in the slot of the generation that created the setter. It is
//! read, not drained, by the next evaluation, so re-running an abandoned
//! generation from the same current tree folds the same updates again.

use std::any::{Any, type_name};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::error::HookError;

type Update<T> = Rc<dyn Fn(&T) -> T>;
type UpdateQueue<T> = RefCell<Vec<Update<T>>>;

// =============================================================================
// Render request
// =============================================================================

/// Shared "a new generation is wanted" flag.
///
/// Setters only touch this cell and their own slot queue, never the renderer,
/// so they are safe to call from a handler at any point.
#[derive(Clone, Default)]
pub struct RenderRequest(Rc<Cell<bool>>);

impl RenderRequest {
    /// Create a lowered flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag.
    pub fn raise(&self) {
        self.0.set(true);
    }

    /// Check without lowering.
    pub fn is_pending(&self) -> bool {
        self.0.get()
    }

    /// Lower the flag, returning whether it was raised.
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }
}

impl fmt::Debug for RenderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RenderRequest").field(&self.0.get()).finish()
    }
}

// =============================================================================
// Slots
// =============================================================================

/// One declared state slot: the value and the updates queued against it.
#[derive(Clone)]
pub struct StateSlot {
    value: Rc<dyn Any>,
    queue: Rc<dyn Any>,
}

impl StateSlot {
    /// Read the stored value (without pending updates applied).
    pub fn value<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Number of updates queued since this slot was created.
    pub fn pending<T: 'static>(&self) -> usize {
        self.queue
            .downcast_ref::<UpdateQueue<T>>()
            .map_or(0, |queue| queue.borrow().len())
    }

    /// Seed value for the next evaluation: stored value with every queued
    /// update folded left to right. `None` if `T` is not the stored type.
    fn resolve<T: Clone + 'static>(&self) -> Option<T> {
        let value = self.value.downcast_ref::<T>()?;
        let queue = self.queue.downcast_ref::<UpdateQueue<T>>()?;
        // Copy first: an update may queue another update on this slot.
        let updates: Vec<Update<T>> = queue.borrow().clone();
        Some(updates.iter().fold(value.clone(), |acc, update| update(&acc)))
    }
}

impl fmt::Debug for StateSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSlot").finish_non_exhaustive()
    }
}

// =============================================================================
// Setter
// =============================================================================

/// Update function returned by [`Hooks::use_state`].
pub struct StateSetter<T> {
    queue: Rc<UpdateQueue<T>>,
    request: RenderRequest,
}

impl<T: 'static> StateSetter<T> {
    /// Queue `f` against the slot and request a new generation.
    pub fn update(&self, f: impl Fn(&T) -> T + 'static) {
        self.queue.borrow_mut().push(Rc::new(f));
        self.request.raise();
    }
}

impl<T: Clone + 'static> StateSetter<T> {
    /// Replace the value.
    pub fn set(&self, value: T) {
        self.update(move |_| value.clone());
    }
}

impl<T> Clone for StateSetter<T> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            request: self.request.clone(),
        }
    }
}

impl<T> fmt::Debug for StateSetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSetter")
            .field("pending", &self.queue.borrow().len())
            .finish()
    }
}

// =============================================================================
// Hooks
// =============================================================================

/// Evaluation context of one component fiber.
pub struct Hooks {
    component: String,
    previous: Option<Vec<StateSlot>>,
    slots: Vec<StateSlot>,
    request: RenderRequest,
    error: Option<HookError>,
}

impl Hooks {
    /// Start an evaluation. `previous` is the alternate fiber's slots, `None`
    /// for a freshly placed component.
    pub(crate) fn new(
        component: impl Into<String>,
        previous: Option<Vec<StateSlot>>,
        request: RenderRequest,
    ) -> Self {
        Self {
            component: component.into(),
            previous,
            slots: Vec::new(),
            request,
            error: None,
        }
    }

    /// Declare a state slot.
    ///
    /// Returns the current value and a setter. The value is the previous
    /// generation's value with queued updates applied, or `initial` on the
    /// first evaluation.
    pub fn use_state<T: Clone + 'static>(&mut self, initial: T) -> (T, StateSetter<T>) {
        let index = self.slots.len();
        let seeded = match self.previous.as_ref().and_then(|prev| prev.get(index)) {
            Some(slot) => {
                let resolved = slot.resolve::<T>();
                if resolved.is_none() {
                    self.fail(HookError::TypeMismatch {
                        component: self.component.clone(),
                        index,
                        requested: type_name::<T>(),
                    });
                }
                resolved
            }
            None => None,
        };
        let value = seeded.unwrap_or(initial);

        let queue: Rc<UpdateQueue<T>> = Rc::new(RefCell::new(Vec::new()));
        self.slots.push(StateSlot {
            value: Rc::new(value.clone()),
            queue: queue.clone(),
        });

        let setter = StateSetter {
            queue,
            request: self.request.clone(),
        };
        (value, setter)
    }

    /// Number of slots declared so far in this evaluation.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn fail(&mut self, error: HookError) {
        // Keep the first misuse; later ones are usually consequences of it.
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// End the evaluation, returning the slots for the new fiber.
    pub(crate) fn finish(self) -> Result<Vec<StateSlot>, HookError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if let Some(previous) = &self.previous {
            if previous.len() != self.slots.len() {
                return Err(HookError::SlotCountChanged {
                    component: self.component,
                    expected: previous.len(),
                    found: self.slots.len(),
                });
            }
        }
        Ok(self.slots)
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("component", &self.component)
            .field("slots", &self.slots.len())
            .finish()
    }
}
