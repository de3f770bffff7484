//! Browser host for the scrollinf engine.
//!
//! [`WebHost`] implements [`ScrollHost`](scrollinf_core::ScrollHost) on top of
//! `web-sys`: an `IntersectionObserver` over a marker `div` for the observer
//! strategy, passive `scroll` listeners and `setTimeout` for the polling
//! strategy, and `wasm-bindgen-futures` for running load callbacks.
//!
//! ```ignore
//! let host = Rc::new(WebHost::new()?);
//! let callbacks = scrollinf_platform_web::promise_callbacks(move || fetch_page());
//! let engine = Engine::new(host, EngineConfig::new(), callbacks)?;
//! engine.start()?;
//! ```

mod host;
mod interop;
mod retained;

pub use host::{WebHost, WebListener, WebMarker, WebObserver, WebTimer, MARKER_ATTRIBUTE};
pub use interop::{load_error_from_js, promise_callbacks};
