//! Testing utilities and harness for scrollinf
//!
//! [`FakeHost`] implements the engine's host abstraction entirely in memory:
//! fake elements with adjustable geometry, a virtual millisecond clock,
//! recorded markers, observers and listeners, and a single-threaded executor
//! that only runs when the test says so.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use scrollinf_core::{Engine, EngineConfig, LoadingState};
//! use scrollinf_testing::{FakeHost, ScriptedLoader};
//!
//! let host = Rc::new(FakeHost::new());
//! let loader = ScriptedLoader::new();
//! let engine = Engine::new(Rc::clone(&host), EngineConfig::new(), loader.callbacks()).unwrap();
//!
//! engine.start().unwrap();
//! host.reveal_markers();
//! assert_eq!(engine.state(), LoadingState::Loading);
//!
//! loader.resolve_next();
//! host.run_until_stalled();
//! assert_eq!(engine.state(), LoadingState::Loaded);
//! ```

pub mod deferred;
pub mod element;
pub mod executor;
pub mod host;
pub mod recorder;

pub use deferred::{Deferred, DeferredFuture, ScriptedLoader};
pub use element::FakeElement;
pub use executor::LocalExecutor;
pub use host::{FakeHost, HostStats};
pub use recorder::Recorder;

/// Routes `log` output through `env_logger` in test mode. Safe to call from
/// every test.
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub mod prelude {
    pub use crate::{
        init_test_logging, Deferred, FakeElement, FakeHost, HostStats, Recorder, ScriptedLoader,
    };
}
