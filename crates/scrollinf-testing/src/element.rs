use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use scrollinf_core::{ScrollAxis, ScrollMetrics};

static NEXT_ELEMENT_ID: AtomicUsize = AtomicUsize::new(1);

struct ElementState {
    id: usize,
    scroll_top: Cell<f64>,
    scroll_left: Cell<f64>,
    scroll_width: Cell<f64>,
    scroll_height: Cell<f64>,
    client_width: Cell<f64>,
    client_height: Cell<f64>,
}

/// In-memory scrollable element.
///
/// Clones share the same element; equality is identity. The fake viewport is
/// also a `FakeElement`, where scroll offsets stand for the page offset,
/// client sizes for the window's inner size and scroll sizes for the
/// document's size.
#[derive(Clone)]
pub struct FakeElement {
    state: Rc<ElementState>,
}

impl FakeElement {
    /// Element with the given visible size and content of the same size.
    pub fn new(client_width: f64, client_height: f64) -> Self {
        Self {
            state: Rc::new(ElementState {
                id: NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed),
                scroll_top: Cell::new(0.0),
                scroll_left: Cell::new(0.0),
                scroll_width: Cell::new(client_width),
                scroll_height: Cell::new(client_height),
                client_width: Cell::new(client_width),
                client_height: Cell::new(client_height),
            }),
        }
    }

    pub fn with_content_size(self, scroll_width: f64, scroll_height: f64) -> Self {
        self.set_content_size(scroll_width, scroll_height);
        self
    }

    pub fn id(&self) -> usize {
        self.state.id
    }

    pub fn set_content_size(&self, scroll_width: f64, scroll_height: f64) {
        self.state.scroll_width.set(scroll_width);
        self.state.scroll_height.set(scroll_height);
    }

    pub fn set_scroll_offset(&self, axis: ScrollAxis, offset: f64) {
        match axis {
            ScrollAxis::Vertical => self.state.scroll_top.set(offset),
            ScrollAxis::Horizontal => self.state.scroll_left.set(offset),
        }
    }

    pub fn metrics(&self, axis: ScrollAxis) -> ScrollMetrics {
        let s = &self.state;
        match axis {
            ScrollAxis::Vertical => ScrollMetrics::new(
                s.scroll_top.get(),
                s.client_height.get(),
                s.scroll_height.get(),
            ),
            ScrollAxis::Horizontal => ScrollMetrics::new(
                s.scroll_left.get(),
                s.client_width.get(),
                s.scroll_width.get(),
            ),
        }
    }
}

impl PartialEq for FakeElement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for FakeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeElement")
            .field("id", &self.state.id)
            .finish_non_exhaustive()
    }
}
