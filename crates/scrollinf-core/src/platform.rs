//! Platform abstraction for the scroll engine.
//!
//! The engine never reaches for an ambient window or document. Everything it
//! needs from the host environment goes through [`ScrollHost`]: geometry
//! queries, the marker node and intersection observer used by the observer
//! strategy, scroll listeners and timers used by the polling strategy, and a
//! local spawner for load callbacks.
//!
//! Resource handles returned by the host are owned by exactly one detector
//! and handed back to the host for release. Hosts must accept a release that
//! happens from inside the resource's own callback.

use std::rc::Rc;

use futures_task::LocalSpawn;

use crate::config::{ScrollAxis, ScrollContainer};
use crate::error::HostError;
use crate::geometry::ScrollMetrics;

/// One entry of an intersection notification batch.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MarkerVisibility {
    pub is_intersecting: bool,
    pub intersection_ratio: f64,
}

impl MarkerVisibility {
    pub fn visible() -> Self {
        Self {
            is_intersecting: true,
            intersection_ratio: 1.0,
        }
    }

    pub fn hidden() -> Self {
        Self::default()
    }
}

/// Receives every notification batch of an observer registration.
pub type VisibilityCallback = Box<dyn FnMut(&[MarkerVisibility])>;

/// Host environment for scroll detection.
///
/// Implementations are single-threaded; every callback runs on a turn of the
/// host's event loop.
pub trait ScrollHost: LocalSpawn + 'static {
    /// Handle to a scrollable element.
    type Element: Clone + 'static;
    /// Invisible marker node placed at the trailing edge of a container.
    type Marker: 'static;
    /// Active intersection observer watching a marker.
    type Observer: 'static;
    /// Registered scroll listener.
    type Listener: 'static;
    /// Pending one-shot timer.
    type Timer: 'static;

    /// Reads offset, visible extent and total extent of `container` along `axis`.
    ///
    /// For the viewport this is the page scroll offset, the window's inner
    /// size and the document's scroll size.
    fn scroll_metrics(
        &self,
        container: &ScrollContainer<Self::Element>,
        axis: ScrollAxis,
    ) -> ScrollMetrics;

    /// Creates a 1x1, absolutely positioned, non-visible marker and appends it
    /// to `container`, or to the document body for the viewport.
    fn insert_marker(
        &self,
        container: &ScrollContainer<Self::Element>,
    ) -> Result<Self::Marker, HostError>;

    /// Detaches the marker from its parent.
    fn remove_marker(&self, marker: Self::Marker);

    /// Starts watching `marker` with a zero visibility threshold.
    ///
    /// `root` scopes the observer: `Viewport` maps to a null root.
    fn observe_marker(
        &self,
        marker: &Self::Marker,
        root: &ScrollContainer<Self::Element>,
        margin: &str,
        callback: VisibilityCallback,
    ) -> Result<Self::Observer, HostError>;

    fn disconnect_observer(&self, observer: Self::Observer);

    /// Registers a passive scroll listener on `container` (the window for the
    /// viewport).
    fn listen_scroll(
        &self,
        container: &ScrollContainer<Self::Element>,
        handler: Rc<dyn Fn()>,
    ) -> Result<Self::Listener, HostError>;

    fn unlisten_scroll(&self, container: &ScrollContainer<Self::Element>, listener: Self::Listener);

    /// Runs `callback` once after `delay_ms` unless cleared first.
    fn set_timeout(
        &self,
        delay_ms: u32,
        callback: Box<dyn FnOnce()>,
    ) -> Result<Self::Timer, HostError>;

    fn clear_timeout(&self, timer: Self::Timer);
}
