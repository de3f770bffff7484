//! The infinite scroll engine.
//!
//! [`Engine`] owns the configuration, the loading state machine and at most
//! one attached detector. Proximity signals from the detector go through the
//! load dispatcher, which guarantees that at most one load callback runs at a
//! time:
//!
//! ```text
//! idle | loaded | error --(signal, enabled, nothing in flight)--> loading
//! loading --(callback Ok)--> loaded
//! loading --(callback Err)--> error
//! any --(reset)--> initial state
//! ```
//!
//! No borrow is held while a caller callback runs, so every operation may be
//! invoked from inside `on_state_change`, `on_error` or the load callback.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures_task::LocalFutureObj;

use crate::callbacks::EngineCallbacks;
use crate::config::EngineConfig;
use crate::detector::{ActiveDetector, ProximitySignal};
use crate::error::{ConfigError, EngineError, HostError, LoadError};
use crate::platform::ScrollHost;
use crate::state::LoadingState;

/// Handle to an infinite scroll engine.
///
/// Cloning the handle shares the same engine. Dropping the last handle
/// detaches the detector; a load that is still in flight keeps the engine
/// alive until it completes.
pub struct Engine<H: ScrollHost> {
    inner: Rc<EngineInner<H>>,
}

impl<H: ScrollHost> Clone for Engine<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

struct EngineInner<H: ScrollHost> {
    host: Rc<H>,
    config: RefCell<EngineConfig<H::Element>>,
    callbacks: EngineCallbacks,
    state: Cell<LoadingState>,
    enabled: Cell<bool>,
    destroyed: Cell<bool>,
    in_flight: Cell<bool>,
    detector: RefCell<Option<ActiveDetector<H>>>,
}

impl<H: ScrollHost> Engine<H> {
    pub fn new(
        host: Rc<H>,
        config: EngineConfig<H::Element>,
        callbacks: EngineCallbacks,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = config.initial_state;
        let enabled = config.enabled;
        Ok(Self {
            inner: Rc::new(EngineInner {
                host,
                config: RefCell::new(config),
                callbacks,
                state: Cell::new(state),
                enabled: Cell::new(enabled),
                destroyed: Cell::new(false),
                in_flight: Cell::new(false),
                detector: RefCell::new(None),
            }),
        })
    }

    /// Attaches the configured detector.
    ///
    /// Does nothing when already observing, when disabled, or after
    /// [`destroy`](Self::destroy) until the next [`reset`](Self::reset).
    pub fn start(&self) -> Result<(), HostError> {
        self.inner.start()
    }

    /// Alias of [`start`](Self::start).
    pub fn observe(&self) -> Result<(), HostError> {
        self.start()
    }

    /// Detaches the detector and releases its platform resources.
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Alias of [`stop`](Self::stop).
    pub fn disconnect(&self) {
        self.stop();
    }

    pub fn state(&self) -> LoadingState {
        self.inner.state.get()
    }

    /// Overrides the loading state. Notifies only when the value changes.
    pub fn set_state(&self, state: LoadingState) {
        self.inner.set_state(state);
    }

    pub fn is_loading(&self) -> bool {
        self.state().is_loading()
    }

    pub fn is_observing(&self) -> bool {
        self.inner.detector.borrow().is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.get()
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    /// Detaches and returns to the configured initial state.
    ///
    /// Also lifts a previous [`destroy`](Self::destroy), so `start` or
    /// `enable` can resume observation afterwards.
    pub fn reset(&self) {
        self.inner.stop();
        self.inner.destroyed.set(false);
        let initial = self.inner.config.borrow().initial_state;
        self.inner.set_state(initial);
    }

    /// Enables signals and starts observing if not already.
    pub fn enable(&self) -> Result<(), HostError> {
        self.inner.enabled.set(true);
        self.inner.start()
    }

    /// Disables signals and detaches. The loading state is kept.
    pub fn disable(&self) {
        self.inner.enabled.set(false);
        self.inner.stop();
    }

    /// Terminal teardown. Idempotent.
    pub fn destroy(&self) {
        if self.inner.destroyed.replace(true) {
            return;
        }
        self.inner.stop();
        log::debug!("scroll engine destroyed");
    }

    /// Current configuration, with `enabled` reflecting enable/disable calls.
    pub fn config(&self) -> EngineConfig<H::Element> {
        let mut config = self.inner.config.borrow().clone();
        config.enabled = self.inner.enabled.get();
        config
    }

    /// Replaces the configuration.
    ///
    /// An attached detector is rebuilt from the new configuration; the
    /// loading state is left alone.
    pub fn set_config(&self, config: EngineConfig<H::Element>) -> Result<(), EngineError> {
        config.validate()?;
        let was_observing = self.is_observing();
        self.inner.stop();
        self.inner.enabled.set(config.enabled);
        *self.inner.config.borrow_mut() = config;
        if was_observing {
            self.inner.start()?;
        }
        Ok(())
    }

    pub fn host(&self) -> &Rc<H> {
        &self.inner.host
    }
}

impl<H: ScrollHost> EngineInner<H> {
    fn start(self: &Rc<Self>) -> Result<(), HostError> {
        if self.detector.borrow().is_some() || !self.enabled.get() {
            return Ok(());
        }
        if self.destroyed.get() {
            log::warn!("start ignored: scroll engine was destroyed; reset it first");
            return Ok(());
        }

        let signal: ProximitySignal = {
            let engine = Rc::downgrade(self);
            Rc::new(move || {
                if let Some(engine) = engine.upgrade() {
                    engine.dispatch_load();
                }
            })
        };

        // Attach from a snapshot so callbacks fired during attach can touch the config.
        let config = self.config.borrow().clone();
        let mut detector = ActiveDetector::attach(&self.host, &config, signal)?;

        let mut slot = self.detector.borrow_mut();
        if slot.is_some() {
            drop(slot);
            detector.detach();
            return Ok(());
        }
        log::debug!("scroll engine observing ({:?})", detector.strategy());
        *slot = Some(detector);
        Ok(())
    }

    fn stop(&self) {
        let detached = self.detector.borrow_mut().take();
        if let Some(mut detector) = detached {
            detector.detach();
            log::debug!("scroll engine stopped observing");
        }
    }

    fn set_state(&self, state: LoadingState) {
        let previous = self.state.replace(state);
        if previous == state {
            return;
        }
        log::trace!("loading state {previous} -> {state}");
        self.callbacks.notify_state(state);
    }

    fn dispatch_load(self: &Rc<Self>) {
        if !self.enabled.get() {
            log::trace!("proximity signal ignored: disabled");
            return;
        }
        if self.in_flight.get() || self.state.get().is_loading() {
            log::trace!("proximity signal ignored: load in flight");
            return;
        }

        self.in_flight.set(true);
        self.set_state(LoadingState::Loading);

        let load = self.callbacks.load_more();
        let engine = Rc::clone(self);
        let task = async move {
            let outcome = load.await;
            engine.finish_load(outcome);
        };
        if let Err(err) = self.host.spawn_local_obj(LocalFutureObj::new(Box::pin(task))) {
            self.finish_load(Err(LoadError::new(format!(
                "could not schedule load callback: {err}"
            ))));
        }
    }

    /// Records the outcome of a load. Runs even if the engine was stopped or
    /// destroyed while the load was in flight.
    fn finish_load(&self, outcome: Result<(), LoadError>) {
        self.in_flight.set(false);
        match outcome {
            Ok(()) => self.set_state(LoadingState::Loaded),
            Err(error) => {
                self.set_state(LoadingState::Error);
                if !self.callbacks.notify_error(&error) {
                    log::debug!("load callback failed: {error}");
                }
            }
        }
    }
}
