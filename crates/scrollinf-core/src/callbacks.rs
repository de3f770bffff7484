//! Caller-supplied callbacks.

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use crate::error::LoadError;
use crate::state::LoadingState;

/// Future returned by a load callback, already normalized to [`LoadError`].
pub type LoadFuture = Pin<Box<dyn Future<Output = Result<(), LoadError>>>>;

type LoadMoreFn = Rc<dyn Fn() -> LoadFuture>;
type StateChangeFn = Rc<dyn Fn(LoadingState)>;
type ErrorFn = Rc<dyn Fn(&LoadError)>;

/// The load callback plus optional state and error notifications.
#[derive(Clone)]
pub struct EngineCallbacks {
    on_load_more: LoadMoreFn,
    on_state_change: Option<StateChangeFn>,
    on_error: Option<ErrorFn>,
}

impl EngineCallbacks {
    /// Uses an asynchronous load callback. Any error type convertible into
    /// [`LoadError`] is accepted.
    pub fn new<F, Fut, E>(on_load_more: F) -> Self
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<(), E>> + 'static,
        E: Into<LoadError> + 'static,
    {
        Self::from_boxed(Rc::new(move || {
            let load = on_load_more();
            Box::pin(async move { load.await.map_err(Into::into) }) as LoadFuture
        }))
    }

    /// Uses a load callback that completes synchronously. The engine still
    /// records the outcome on the next turn of the host's executor.
    pub fn new_sync<F, E>(on_load_more: F) -> Self
    where
        F: Fn() -> Result<(), E> + 'static,
        E: Into<LoadError> + 'static,
    {
        Self::from_boxed(Rc::new(move || {
            let outcome = on_load_more().map_err(Into::into);
            Box::pin(std::future::ready(outcome)) as LoadFuture
        }))
    }

    pub fn from_boxed(on_load_more: Rc<dyn Fn() -> LoadFuture>) -> Self {
        Self {
            on_load_more,
            on_state_change: None,
            on_error: None,
        }
    }

    pub fn on_state_change(mut self, callback: impl Fn(LoadingState) + 'static) -> Self {
        self.on_state_change = Some(Rc::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl Fn(&LoadError) + 'static) -> Self {
        self.on_error = Some(Rc::new(callback));
        self
    }

    pub(crate) fn load_more(&self) -> LoadFuture {
        (self.on_load_more)()
    }

    pub(crate) fn notify_state(&self, state: LoadingState) {
        if let Some(callback) = &self.on_state_change {
            callback(state);
        }
    }

    /// Returns false when no error callback is registered.
    pub(crate) fn notify_error(&self, error: &LoadError) -> bool {
        match &self.on_error {
            Some(callback) => {
                callback(error);
                true
            }
            None => false,
        }
    }
}
