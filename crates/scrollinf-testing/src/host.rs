//! In-memory [`ScrollHost`] with a virtual clock.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use futures_task::{LocalFutureObj, LocalSpawn, SpawnError};
use scrollinf_core::{
    HostError, MarkerVisibility, ScrollAxis, ScrollContainer, ScrollHost, ScrollMetrics,
    VisibilityCallback,
};

use crate::element::FakeElement;
use crate::executor::LocalExecutor;

/// Counters of resources acquired and released through the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HostStats {
    pub markers_inserted: usize,
    pub markers_removed: usize,
    pub observers_created: usize,
    pub observers_disconnected: usize,
    pub listeners_added: usize,
    pub listeners_removed: usize,
    pub timers_set: usize,
    pub timers_cleared: usize,
}

#[derive(Debug)]
pub struct FakeMarker {
    id: usize,
}

#[derive(Debug)]
pub struct FakeObserver {
    id: usize,
}

#[derive(Debug)]
pub struct FakeListener {
    id: usize,
}

#[derive(Debug)]
pub struct FakeTimer {
    key: (u64, usize),
}

struct MarkerRecord {
    id: usize,
    /// `None` is the document body.
    parent: Option<usize>,
}

struct ObserverRecord {
    id: usize,
    marker: usize,
    /// `None` is the null (viewport) root.
    root: Option<usize>,
    margin: String,
    callback: Rc<RefCell<VisibilityCallback>>,
}

struct ListenerRecord {
    id: usize,
    /// `None` is the window.
    target: Option<usize>,
    handler: Rc<dyn Fn()>,
}

#[derive(Default)]
struct FailurePlan {
    markers: Cell<bool>,
    observers: Cell<bool>,
    listeners: Cell<bool>,
    timers: Cell<bool>,
}

/// Deterministic host for engine tests.
///
/// Nothing happens on its own: tests move the clock with
/// [`advance_time`](Self::advance_time), scroll with
/// [`scroll_to`](Self::scroll_to), deliver intersection batches with
/// [`reveal_markers`](Self::reveal_markers) and run spawned loads with
/// [`run_until_stalled`](Self::run_until_stalled).
pub struct FakeHost {
    viewport: FakeElement,
    executor: LocalExecutor,
    now_ms: Cell<u64>,
    next_id: Cell<usize>,
    markers: RefCell<Vec<MarkerRecord>>,
    observers: RefCell<Vec<ObserverRecord>>,
    listeners: RefCell<Vec<ListenerRecord>>,
    timers: RefCell<BTreeMap<(u64, usize), Box<dyn FnOnce()>>>,
    failures: FailurePlan,
    stats: Cell<HostStats>,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::new()
    }
}

fn target_of(container: &ScrollContainer<FakeElement>) -> Option<usize> {
    container.element().map(FakeElement::id)
}

impl FakeHost {
    /// Host with an 800x600 window over an 800x600 document.
    pub fn new() -> Self {
        Self::with_viewport(FakeElement::new(800.0, 600.0))
    }

    pub fn with_viewport(viewport: FakeElement) -> Self {
        Self {
            viewport,
            executor: LocalExecutor::new(),
            now_ms: Cell::new(0),
            next_id: Cell::new(1),
            markers: RefCell::new(Vec::new()),
            observers: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            timers: RefCell::new(BTreeMap::new()),
            failures: FailurePlan::default(),
            stats: Cell::new(HostStats::default()),
        }
    }

    pub fn viewport(&self) -> &FakeElement {
        &self.viewport
    }

    pub fn now(&self) -> u64 {
        self.now_ms.get()
    }

    pub fn stats(&self) -> HostStats {
        self.stats.get()
    }

    // --- driving ---

    /// Runs spawned tasks until none can make progress.
    pub fn run_until_stalled(&self) -> usize {
        self.executor.run_until_stalled()
    }

    /// Moves the clock forward, firing due timers in order and running
    /// spawned tasks after each one.
    pub fn advance_time(&self, ms: u64) {
        let target = self.now_ms.get() + ms;
        loop {
            let next = {
                let mut timers = self.timers.borrow_mut();
                match timers.keys().next().copied() {
                    Some(key) if key.0 <= target => timers.remove(&key).map(|task| (key, task)),
                    _ => None,
                }
            };
            let Some(((due, _), task)) = next else {
                break;
            };
            self.now_ms.set(due);
            task();
            self.executor.run_until_stalled();
        }
        self.now_ms.set(target);
        self.executor.run_until_stalled();
    }

    /// Sets the scroll offset of `container` and dispatches a scroll event.
    pub fn scroll_to(&self, container: &ScrollContainer<FakeElement>, axis: ScrollAxis, offset: f64) {
        match container {
            ScrollContainer::Viewport => self.viewport.set_scroll_offset(axis, offset),
            ScrollContainer::Element(element) => element.set_scroll_offset(axis, offset),
        }
        self.dispatch_scroll(container);
    }

    /// Dispatches a scroll event to the listeners of `container`.
    pub fn dispatch_scroll(&self, container: &ScrollContainer<FakeElement>) {
        let target = target_of(container);
        let handlers: Vec<(usize, Rc<dyn Fn()>)> = self
            .listeners
            .borrow()
            .iter()
            .filter(|listener| listener.target == target)
            .map(|listener| (listener.id, Rc::clone(&listener.handler)))
            .collect();
        for (id, handler) in handlers {
            if self.listeners.borrow().iter().any(|listener| listener.id == id) {
                handler();
            }
        }
    }

    /// Delivers one notification batch to every live observer.
    pub fn deliver_entries(&self, entries: &[MarkerVisibility]) {
        let callbacks: Vec<(usize, Rc<RefCell<VisibilityCallback>>)> = self
            .observers
            .borrow()
            .iter()
            .map(|observer| (observer.id, Rc::clone(&observer.callback)))
            .collect();
        for (id, callback) in callbacks {
            if !self.observers.borrow().iter().any(|observer| observer.id == id) {
                continue;
            }
            if let Ok(mut callback) = callback.try_borrow_mut() {
                (*callback)(entries);
            }
        }
    }

    /// Reports every watched marker as intersecting.
    pub fn reveal_markers(&self) {
        self.deliver_entries(&[MarkerVisibility::visible()]);
    }

    /// Reports every watched marker as not intersecting.
    pub fn hide_markers(&self) {
        self.deliver_entries(&[MarkerVisibility::hidden()]);
    }

    // --- inspection ---

    pub fn marker_count(&self) -> usize {
        self.markers.borrow().len()
    }

    /// Markers appended to `container`; for the viewport, markers in the body.
    pub fn markers_in(&self, container: &ScrollContainer<FakeElement>) -> usize {
        let parent = target_of(container);
        self.markers
            .borrow()
            .iter()
            .filter(|marker| marker.parent == parent)
            .count()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    pub fn observer_margins(&self) -> Vec<String> {
        self.observers
            .borrow()
            .iter()
            .map(|observer| observer.margin.clone())
            .collect()
    }

    /// Root element id of each observer; `None` for a viewport root.
    pub fn observer_roots(&self) -> Vec<Option<usize>> {
        self.observers
            .borrow()
            .iter()
            .map(|observer| observer.root)
            .collect()
    }

    /// True if every observer watches a marker that is still inserted.
    pub fn observers_watch_live_markers(&self) -> bool {
        let markers = self.markers.borrow();
        self.observers
            .borrow()
            .iter()
            .all(|observer| markers.iter().any(|marker| marker.id == observer.marker))
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn listeners_on(&self, container: &ScrollContainer<FakeElement>) -> usize {
        let target = target_of(container);
        self.listeners
            .borrow()
            .iter()
            .filter(|listener| listener.target == target)
            .count()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn pending_tasks(&self) -> usize {
        self.executor.pending_tasks()
    }

    // --- failure injection ---

    pub fn fail_marker_insertion(&self, fail: bool) {
        self.failures.markers.set(fail);
    }

    pub fn fail_observers(&self, fail: bool) {
        self.failures.observers.set(fail);
    }

    pub fn fail_listeners(&self, fail: bool) {
        self.failures.listeners.set(fail);
    }

    pub fn fail_timers(&self, fail: bool) {
        self.failures.timers.set(fail);
    }

    pub fn shut_down_executor(&self) {
        self.executor.shut_down();
    }

    fn allocate_id(&self) -> usize {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    fn record(&self, update: impl FnOnce(&mut HostStats)) {
        let mut stats = self.stats.get();
        update(&mut stats);
        self.stats.set(stats);
    }
}

impl ScrollHost for FakeHost {
    type Element = FakeElement;
    type Marker = FakeMarker;
    type Observer = FakeObserver;
    type Listener = FakeListener;
    type Timer = FakeTimer;

    fn scroll_metrics(
        &self,
        container: &ScrollContainer<FakeElement>,
        axis: ScrollAxis,
    ) -> ScrollMetrics {
        match container {
            ScrollContainer::Viewport => self.viewport.metrics(axis),
            ScrollContainer::Element(element) => element.metrics(axis),
        }
    }

    fn insert_marker(&self, container: &ScrollContainer<FakeElement>) -> Result<FakeMarker, HostError> {
        if self.failures.markers.get() {
            return Err(HostError::new("marker insertion failed"));
        }
        let id = self.allocate_id();
        self.markers.borrow_mut().push(MarkerRecord {
            id,
            parent: target_of(container),
        });
        self.record(|stats| stats.markers_inserted += 1);
        Ok(FakeMarker { id })
    }

    fn remove_marker(&self, marker: FakeMarker) {
        let mut markers = self.markers.borrow_mut();
        let before = markers.len();
        markers.retain(|record| record.id != marker.id);
        if markers.len() != before {
            drop(markers);
            self.record(|stats| stats.markers_removed += 1);
        }
    }

    fn observe_marker(
        &self,
        marker: &FakeMarker,
        root: &ScrollContainer<FakeElement>,
        margin: &str,
        callback: VisibilityCallback,
    ) -> Result<FakeObserver, HostError> {
        if self.failures.observers.get() {
            return Err(HostError::new("observer construction failed"));
        }
        let id = self.allocate_id();
        self.observers.borrow_mut().push(ObserverRecord {
            id,
            marker: marker.id,
            root: target_of(root),
            margin: margin.to_string(),
            callback: Rc::new(RefCell::new(callback)),
        });
        self.record(|stats| stats.observers_created += 1);
        Ok(FakeObserver { id })
    }

    fn disconnect_observer(&self, observer: FakeObserver) {
        // The record may be dropped while its callback is running; the
        // delivering loop holds its own reference.
        let removed = {
            let mut observers = self.observers.borrow_mut();
            let before = observers.len();
            observers.retain(|record| record.id != observer.id);
            observers.len() != before
        };
        if removed {
            self.record(|stats| stats.observers_disconnected += 1);
        }
    }

    fn listen_scroll(
        &self,
        container: &ScrollContainer<FakeElement>,
        handler: Rc<dyn Fn()>,
    ) -> Result<FakeListener, HostError> {
        if self.failures.listeners.get() {
            return Err(HostError::new("listener registration failed"));
        }
        let id = self.allocate_id();
        self.listeners.borrow_mut().push(ListenerRecord {
            id,
            target: target_of(container),
            handler,
        });
        self.record(|stats| stats.listeners_added += 1);
        Ok(FakeListener { id })
    }

    fn unlisten_scroll(&self, _container: &ScrollContainer<FakeElement>, listener: FakeListener) {
        let removed = {
            let mut listeners = self.listeners.borrow_mut();
            let before = listeners.len();
            listeners.retain(|record| record.id != listener.id);
            listeners.len() != before
        };
        if removed {
            self.record(|stats| stats.listeners_removed += 1);
        }
    }

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Result<FakeTimer, HostError> {
        if self.failures.timers.get() {
            return Err(HostError::new("timer registration failed"));
        }
        let key = (self.now_ms.get() + u64::from(delay_ms), self.allocate_id());
        self.timers.borrow_mut().insert(key, callback);
        self.record(|stats| stats.timers_set += 1);
        Ok(FakeTimer { key })
    }

    fn clear_timeout(&self, timer: FakeTimer) {
        let removed = self.timers.borrow_mut().remove(&timer.key);
        if removed.is_some() {
            self.record(|stats| stats.timers_cleared += 1);
        }
    }
}

impl LocalSpawn for FakeHost {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        self.executor.spawn_local_obj(future)
    }

    fn status_local(&self) -> Result<(), SpawnError> {
        self.executor.status_local()
    }
}
