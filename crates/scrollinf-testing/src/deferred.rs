//! Load callbacks whose completion is controlled by the test.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use scrollinf_core::{EngineCallbacks, LoadError, LoadFuture};

#[derive(Default)]
struct DeferredState {
    outcome: Option<Result<(), LoadError>>,
    settled: bool,
    waker: Option<Waker>,
}

/// A one-shot completion the test settles by hand.
#[derive(Clone, Default)]
pub struct Deferred {
    state: Rc<RefCell<DeferredState>>,
}

impl Deferred {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self) {
        self.settle(Ok(()));
    }

    pub fn reject(&self, error: impl Into<LoadError>) {
        self.settle(Err(error.into()));
    }

    pub fn is_settled(&self) -> bool {
        self.state.borrow().settled
    }

    /// Future resolving with the outcome once settled.
    pub fn future(&self) -> DeferredFuture {
        DeferredFuture {
            state: Rc::clone(&self.state),
        }
    }

    fn settle(&self, outcome: Result<(), LoadError>) {
        let waker = {
            let mut state = self.state.borrow_mut();
            if state.settled {
                return;
            }
            state.settled = true;
            state.outcome = Some(outcome);
            state.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

pub struct DeferredFuture {
    state: Rc<RefCell<DeferredState>>,
}

impl Future for DeferredFuture {
    type Output = Result<(), LoadError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.state.borrow_mut();
        match state.outcome.take() {
            Some(outcome) => Poll::Ready(outcome),
            None => {
                state.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

/// Hands out one [`Deferred`] per load callback invocation and counts calls.
#[derive(Clone, Default)]
pub struct ScriptedLoader {
    calls: Rc<Cell<usize>>,
    pending: Rc<RefCell<VecDeque<Deferred>>>,
}

impl ScriptedLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine callbacks whose load callback is this loader.
    pub fn callbacks(&self) -> EngineCallbacks {
        let loader = self.clone();
        EngineCallbacks::from_boxed(Rc::new(move || loader.next_load()))
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// Loads started and not yet settled.
    pub fn in_flight(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Resolves the oldest pending load. Returns false if none is pending.
    pub fn resolve_next(&self) -> bool {
        let next = self.pending.borrow_mut().pop_front();
        next.map(|deferred| deferred.resolve()).is_some()
    }

    /// Rejects the oldest pending load. Returns false if none is pending.
    pub fn reject_next(&self, error: impl Into<LoadError>) -> bool {
        let next = self.pending.borrow_mut().pop_front();
        next.map(|deferred| deferred.reject(error)).is_some()
    }

    fn next_load(&self) -> LoadFuture {
        self.calls.set(self.calls.get() + 1);
        let deferred = Deferred::new();
        let future = deferred.future();
        self.pending.borrow_mut().push_back(deferred);
        Box::pin(future)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_only_once() {
        let deferred = Deferred::new();
        deferred.reject("first");
        deferred.resolve();
        assert!(deferred.is_settled());
        assert_eq!(
            deferred.state.borrow().outcome,
            Some(Err(LoadError::new("first")))
        );
    }

    #[test]
    fn test_loader_tracks_pending_loads() {
        let loader = ScriptedLoader::new();
        let _first = loader.next_load();
        let _second = loader.next_load();
        assert_eq!(loader.calls(), 2);
        assert_eq!(loader.in_flight(), 2);

        assert!(loader.resolve_next());
        assert!(loader.reject_next("boom"));
        assert!(!loader.resolve_next());
        assert_eq!(loader.in_flight(), 0);
    }
}
