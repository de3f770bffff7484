//! Near-end detection strategies.
//!
//! Both strategies expose the same capability: attach to a container and
//! call a [`ProximitySignal`] when the end is near, then release every
//! platform resource on [`detach`](ProximityDetector::detach). The engine
//! owns at most one [`ActiveDetector`] at a time.

mod observer;
mod polling;

use std::rc::Rc;

pub use observer::ObserverDetector;
pub use polling::PollingDetector;

use crate::config::{DetectionStrategy, EngineConfig};
use crate::error::HostError;
use crate::platform::ScrollHost;

/// Called by a detector each time it sees the end of the region.
pub type ProximitySignal = Rc<dyn Fn()>;

pub trait ProximityDetector<H: ScrollHost>: Sized {
    /// Acquires the platform resources for this strategy.
    ///
    /// On error nothing stays attached.
    fn attach(
        host: &Rc<H>,
        config: &EngineConfig<H::Element>,
        on_proximity: ProximitySignal,
    ) -> Result<Self, HostError>;

    /// Releases every platform resource. Safe to call more than once.
    fn detach(&mut self);

    fn is_attached(&self) -> bool;
}

/// The single detector an engine holds while observing.
pub enum ActiveDetector<H: ScrollHost> {
    Observer(ObserverDetector<H>),
    Polling(PollingDetector<H>),
}

impl<H: ScrollHost> ActiveDetector<H> {
    /// Attaches the strategy selected by `config.strategy`.
    pub fn attach(
        host: &Rc<H>,
        config: &EngineConfig<H::Element>,
        on_proximity: ProximitySignal,
    ) -> Result<Self, HostError> {
        match config.strategy {
            DetectionStrategy::Observer => {
                ObserverDetector::attach(host, config, on_proximity).map(ActiveDetector::Observer)
            }
            DetectionStrategy::Polling => {
                PollingDetector::attach(host, config, on_proximity).map(ActiveDetector::Polling)
            }
        }
    }

    pub fn strategy(&self) -> DetectionStrategy {
        match self {
            ActiveDetector::Observer(_) => DetectionStrategy::Observer,
            ActiveDetector::Polling(_) => DetectionStrategy::Polling,
        }
    }

    pub fn detach(&mut self) {
        match self {
            ActiveDetector::Observer(detector) => detector.detach(),
            ActiveDetector::Polling(detector) => detector.detach(),
        }
    }

    pub fn is_attached(&self) -> bool {
        match self {
            ActiveDetector::Observer(detector) => detector.is_attached(),
            ActiveDetector::Polling(detector) => detector.is_attached(),
        }
    }
}
