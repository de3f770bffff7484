//! Core engine for infinite scrolling.
//!
//! An [`Engine`] watches a scrollable region through one of two detection
//! strategies and calls an asynchronous load callback when the region nears
//! its end, making sure at most one load is in flight at a time.
//!
//! The crate has no browser dependency. Every platform effect (geometry
//! queries, marker nodes, intersection observers, scroll listeners, timers,
//! task spawning) goes through the [`ScrollHost`] trait, implemented by
//! `scrollinf-platform-web` for browsers and by `scrollinf-testing` for tests.

pub mod callbacks;
pub mod config;
pub mod debounce;
pub mod detector;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod margin;
pub mod platform;
pub mod state;

pub use callbacks::{EngineCallbacks, LoadFuture};
pub use config::{DetectionStrategy, EngineConfig, ScrollAxis, ScrollContainer};
pub use debounce::Debouncer;
pub use detector::{
    ActiveDetector, ObserverDetector, PollingDetector, ProximityDetector, ProximitySignal,
};
pub use engine::Engine;
pub use error::{ConfigError, EngineError, HostError, LoadError};
pub use geometry::{is_near_end, ScrollMetrics};
pub use margin::RootMargin;
pub use platform::{MarkerVisibility, ScrollHost, VisibilityCallback};
pub use state::LoadingState;

pub mod prelude {
    pub use crate::{
        DetectionStrategy, Engine, EngineCallbacks, EngineConfig, LoadError, LoadingState,
        ScrollAxis, ScrollContainer, ScrollHost,
    };
}
