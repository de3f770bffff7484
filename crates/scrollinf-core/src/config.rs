//! Engine configuration.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::margin::RootMargin;
use crate::state::LoadingState;

pub const DEFAULT_THRESHOLD: f64 = 200.0;
pub const DEFAULT_MARGIN: &str = "200px";
pub const DEFAULT_RATE_LIMIT_DELAY_MS: u32 = 100;

/// The region whose end is being watched.
#[derive(Clone, Debug, PartialEq)]
pub enum ScrollContainer<E> {
    /// The top-level viewport (window scrolling). Resolved by the host when
    /// observation starts.
    Viewport,
    /// A scrollable element.
    Element(E),
}

impl<E> Default for ScrollContainer<E> {
    fn default() -> Self {
        ScrollContainer::Viewport
    }
}

impl<E> ScrollContainer<E> {
    #[inline]
    pub fn is_viewport(&self) -> bool {
        matches!(self, ScrollContainer::Viewport)
    }

    pub fn element(&self) -> Option<&E> {
        match self {
            ScrollContainer::Viewport => None,
            ScrollContainer::Element(element) => Some(element),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScrollAxis {
    #[default]
    Vertical,
    Horizontal,
}

impl ScrollAxis {
    pub fn as_str(self) -> &'static str {
        match self {
            ScrollAxis::Vertical => "vertical",
            ScrollAxis::Horizontal => "horizontal",
        }
    }
}

impl fmt::Display for ScrollAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScrollAxis {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vertical" => Ok(ScrollAxis::Vertical),
            "horizontal" => Ok(ScrollAxis::Horizontal),
            other => Err(ConfigError::UnknownAxis(other.to_string())),
        }
    }
}

/// How the engine detects that the end of the region is near.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DetectionStrategy {
    /// Watch an invisible marker at the trailing edge with an intersection observer.
    #[default]
    Observer,
    /// Listen to scroll events and compare geometry against the threshold.
    Polling,
}

/// Configuration for an [`Engine`](crate::Engine).
///
/// `margin` only applies to [`DetectionStrategy::Observer`];
/// `threshold` and `rate_limit_delay_ms` only apply to
/// [`DetectionStrategy::Polling`].
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig<E> {
    pub container: ScrollContainer<E>,
    /// Distance from the end, in pixels, at which a load is requested.
    pub threshold: f64,
    pub axis: ScrollAxis,
    pub strategy: DetectionStrategy,
    /// CSS-style root margin handed to the intersection observer.
    pub margin: String,
    pub enabled: bool,
    /// Trailing-edge debounce delay for scroll events.
    pub rate_limit_delay_ms: u32,
    pub initial_state: LoadingState,
}

impl<E> Default for EngineConfig<E> {
    fn default() -> Self {
        Self {
            container: ScrollContainer::Viewport,
            threshold: DEFAULT_THRESHOLD,
            axis: ScrollAxis::Vertical,
            strategy: DetectionStrategy::Observer,
            margin: DEFAULT_MARGIN.to_string(),
            enabled: true,
            rate_limit_delay_ms: DEFAULT_RATE_LIMIT_DELAY_MS,
            initial_state: LoadingState::Idle,
        }
    }
}

impl<E> EngineConfig<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(mut self, container: ScrollContainer<E>) -> Self {
        self.container = container;
        self
    }

    pub fn with_element(self, element: E) -> Self {
        self.with_container(ScrollContainer::Element(element))
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_axis(mut self, axis: ScrollAxis) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_strategy(mut self, strategy: DetectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// `true` selects the observer strategy, `false` the polling one.
    pub fn with_proximity_observer(self, use_observer: bool) -> Self {
        self.with_strategy(if use_observer {
            DetectionStrategy::Observer
        } else {
            DetectionStrategy::Polling
        })
    }

    pub fn with_margin(mut self, margin: impl Into<String>) -> Self {
        self.margin = margin.into();
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_rate_limit_delay_ms(mut self, delay_ms: u32) -> Self {
        self.rate_limit_delay_ms = delay_ms;
        self
    }

    pub fn with_initial_state(mut self, state: LoadingState) -> Self {
        self.initial_state = state;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        if self.strategy == DetectionStrategy::Observer {
            RootMargin::parse(&self.margin)?;
        }
        Ok(())
    }
}
