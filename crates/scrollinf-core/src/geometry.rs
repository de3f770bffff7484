//! Scroll geometry along a single axis.

/// Offset and extents of a scroll region, measured along one axis in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    /// Current scroll offset from the leading edge.
    pub offset: f64,
    /// Size of the visible part of the region.
    pub visible_extent: f64,
    /// Total scrollable size of the content.
    pub total_extent: f64,
}

impl ScrollMetrics {
    pub fn new(offset: f64, visible_extent: f64, total_extent: f64) -> Self {
        Self {
            offset,
            visible_extent,
            total_extent,
        }
    }

    /// Distance between the trailing edge of the visible area and the end of
    /// the content. Negative when overscrolled.
    #[inline]
    pub fn remaining(&self) -> f64 {
        self.total_extent - (self.offset + self.visible_extent)
    }
}

/// Returns true when the visible area ends within `threshold` pixels of the
/// content end: `offset + visible_extent >= total_extent - threshold`.
#[inline]
pub fn is_near_end(metrics: &ScrollMetrics, threshold: f64) -> bool {
    metrics.offset + metrics.visible_extent >= metrics.total_extent - threshold
}
