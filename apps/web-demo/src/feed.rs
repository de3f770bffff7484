use std::cell::Cell;

use scrollinf_core::{DetectionStrategy, EngineConfig, ScrollContainer};

/// Photo listing endpoint.
pub const LIST_ENDPOINT: &str = "https://picsum.photos/v2/list";
pub const PAGE_SIZE: u32 = 30;
pub const THRESHOLD_PX: f64 = 1000.0;
pub const ROOT_MARGIN: &str = "200px";

/// Engine settings for the feed: observer strategy over the page viewport.
pub fn feed_config<E>() -> EngineConfig<E> {
    EngineConfig::new()
        .with_container(ScrollContainer::Viewport)
        .with_strategy(DetectionStrategy::Observer)
        .with_threshold(THRESHOLD_PX)
        .with_margin(ROOT_MARGIN)
}

/// Sized rendition of a listed photo.
pub fn image_url(id: &str, width: u32, height: u32) -> String {
    format!("https://picsum.photos/id/{id}/{width}/{height}")
}

/// Tracks the next listing page. A page is only consumed once it loaded, so
/// a failed page is requested again on the next signal.
#[derive(Debug)]
pub struct Pager {
    next: Cell<u32>,
    page_size: u32,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl Pager {
    pub fn new(page_size: u32) -> Self {
        Self {
            next: Cell::new(1),
            page_size,
        }
    }

    pub fn next_page(&self) -> u32 {
        self.next.get()
    }

    pub fn page_url(&self, page: u32) -> String {
        format!("{LIST_ENDPOINT}?page={page}&limit={}", self.page_size)
    }

    /// Marks `page` as loaded.
    pub fn commit(&self, page: u32) {
        if page >= self.next.get() {
            self.next.set(page + 1);
        }
    }
}
