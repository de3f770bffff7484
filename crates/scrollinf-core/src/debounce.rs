//! Trailing-edge rate limiter backed by host timers.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::platform::ScrollHost;

struct TimerSlot<T> {
    pending: RefCell<Option<T>>,
    /// Bumped on every schedule/cancel so a timer that fires after being
    /// superseded does nothing.
    generation: Cell<u64>,
}

/// Runs the most recently scheduled task once `delay_ms` has elapsed without
/// another call to [`schedule`](Debouncer::schedule).
///
/// Dropping the debouncer cancels the pending task.
pub struct Debouncer<H: ScrollHost> {
    host: Rc<H>,
    delay_ms: u32,
    slot: Rc<TimerSlot<H::Timer>>,
}

impl<H: ScrollHost> Debouncer<H> {
    pub fn new(host: Rc<H>, delay_ms: u32) -> Self {
        Self {
            host,
            delay_ms,
            slot: Rc::new(TimerSlot {
                pending: RefCell::new(None),
                generation: Cell::new(0),
            }),
        }
    }

    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    /// Replaces any pending task with `task` and restarts the delay window.
    pub fn schedule(&self, task: impl FnOnce() + 'static) {
        self.cancel();
        let generation = self.slot.generation.get();
        let slot = Rc::downgrade(&self.slot);
        let callback = Box::new(move || {
            let Some(slot) = slot.upgrade() else {
                return;
            };
            if slot.generation.get() != generation {
                return;
            }
            // Fired timers are released, not cleared.
            let fired = slot.pending.borrow_mut().take();
            drop(fired);
            task();
        });

        match self.host.set_timeout(self.delay_ms, callback) {
            Ok(timer) => {
                *self.slot.pending.borrow_mut() = Some(timer);
            }
            Err(err) => {
                log::warn!("debounced task dropped: {err}");
            }
        }
    }

    /// Invalidates the pending task, if any.
    pub fn cancel(&self) {
        self.slot
            .generation
            .set(self.slot.generation.get().wrapping_add(1));
        let pending = self.slot.pending.borrow_mut().take();
        if let Some(timer) = pending {
            self.host.clear_timeout(timer);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.slot.pending.borrow().is_some()
    }
}

impl<H: ScrollHost> Drop for Debouncer<H> {
    fn drop(&mut self) {
        self.cancel();
    }
}
