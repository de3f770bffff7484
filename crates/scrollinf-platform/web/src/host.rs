use std::rc::Rc;

use futures_task::{LocalFutureObj, LocalSpawn, SpawnError};
use scrollinf_core::{
    HostError, MarkerVisibility, ScrollAxis, ScrollContainer, ScrollHost, ScrollMetrics,
    VisibilityCallback,
};
use smallvec::SmallVec;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, EventTarget, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, Window,
};

use crate::interop::describe_js;
use crate::retained::Retained;

/// Attribute set on every marker node.
pub const MARKER_ATTRIBUTE: &str = "data-scrollinf-marker";

const MARKER_STYLE: &str = "position:absolute;bottom:0;width:1px;height:1px;pointer-events:none";

fn host_error(context: &str, value: &JsValue) -> HostError {
    HostError::new(format!("{context}: {}", describe_js(value)))
}

pub struct WebMarker {
    node: Element,
}

pub struct WebObserver {
    observer: IntersectionObserver,
    _callback: Retained<dyn FnMut(js_sys::Array, IntersectionObserver)>,
}

pub struct WebListener {
    callback: Retained<dyn FnMut(Event)>,
}

pub struct WebTimer {
    handle: i32,
    _callback: Retained<dyn FnMut()>,
}

/// [`ScrollHost`] for the browser main thread.
pub struct WebHost {
    window: Window,
    document: Document,
}

impl WebHost {
    /// Binds to the global window and its document.
    pub fn new() -> Result<Self, HostError> {
        let window = web_sys::window().ok_or_else(|| HostError::new("no global window"))?;
        let document = window
            .document()
            .ok_or_else(|| HostError::new("window has no document"))?;
        Ok(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn event_target<'a>(&'a self, container: &'a ScrollContainer<Element>) -> &'a EventTarget {
        match container {
            ScrollContainer::Viewport => self.window.as_ref(),
            ScrollContainer::Element(element) => element.as_ref(),
        }
    }

    fn viewport_metrics(&self, axis: ScrollAxis) -> ScrollMetrics {
        let root = self.document.document_element();
        let inner = |size: Result<JsValue, JsValue>| size.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        match axis {
            ScrollAxis::Vertical => ScrollMetrics::new(
                self.window.scroll_y().unwrap_or(0.0),
                inner(self.window.inner_height()),
                root.map_or(0.0, |root| f64::from(root.scroll_height())),
            ),
            ScrollAxis::Horizontal => ScrollMetrics::new(
                self.window.scroll_x().unwrap_or(0.0),
                inner(self.window.inner_width()),
                root.map_or(0.0, |root| f64::from(root.scroll_width())),
            ),
        }
    }
}

fn element_metrics(element: &Element, axis: ScrollAxis) -> ScrollMetrics {
    match axis {
        ScrollAxis::Vertical => ScrollMetrics::new(
            f64::from(element.scroll_top()),
            f64::from(element.client_height()),
            f64::from(element.scroll_height()),
        ),
        ScrollAxis::Horizontal => ScrollMetrics::new(
            f64::from(element.scroll_left()),
            f64::from(element.client_width()),
            f64::from(element.scroll_width()),
        ),
    }
}

fn visibility_batch(entries: &js_sys::Array) -> SmallVec<[MarkerVisibility; 4]> {
    entries
        .iter()
        .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
        .map(|entry| MarkerVisibility {
            is_intersecting: entry.is_intersecting(),
            intersection_ratio: entry.intersection_ratio(),
        })
        .collect()
}

impl ScrollHost for WebHost {
    type Element = Element;
    type Marker = WebMarker;
    type Observer = WebObserver;
    type Listener = WebListener;
    type Timer = WebTimer;

    fn scroll_metrics(&self, container: &ScrollContainer<Element>, axis: ScrollAxis) -> ScrollMetrics {
        match container {
            ScrollContainer::Viewport => self.viewport_metrics(axis),
            ScrollContainer::Element(element) => element_metrics(element, axis),
        }
    }

    fn insert_marker(&self, container: &ScrollContainer<Element>) -> Result<WebMarker, HostError> {
        let node = self
            .document
            .create_element("div")
            .map_err(|err| host_error("could not create marker", &err))?;
        node.set_attribute(MARKER_ATTRIBUTE, "true")
            .and_then(|()| node.set_attribute("style", MARKER_STYLE))
            .map_err(|err| host_error("could not style marker", &err))?;

        let appended = match container {
            ScrollContainer::Viewport => {
                let body = self
                    .document
                    .body()
                    .ok_or_else(|| HostError::new("document has no body"))?;
                body.append_child(&node)
            }
            ScrollContainer::Element(element) => element.append_child(&node),
        };
        appended.map_err(|err| host_error("could not append marker", &err))?;
        Ok(WebMarker { node })
    }

    fn remove_marker(&self, marker: WebMarker) {
        marker.node.remove();
    }

    fn observe_marker(
        &self,
        marker: &WebMarker,
        root: &ScrollContainer<Element>,
        margin: &str,
        mut callback: VisibilityCallback,
    ) -> Result<WebObserver, HostError> {
        let closure = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                let batch = visibility_batch(&entries);
                callback(batch.as_slice());
            },
        );

        let init = IntersectionObserverInit::new();
        if let ScrollContainer::Element(element) = root {
            // `root` is typed as Element-or-Document, so set it reflectively.
            js_sys::Reflect::set(&init, &JsValue::from_str("root"), element)
                .map_err(|err| host_error("could not set observer root", &err))?;
        }
        init.set_root_margin(margin);
        init.set_threshold(&JsValue::from_f64(0.0));

        let observer = IntersectionObserver::new_with_options(closure.as_ref().unchecked_ref(), &init)
            .map_err(|err| host_error("could not create intersection observer", &err))?;
        observer.observe(&marker.node);

        Ok(WebObserver {
            observer,
            _callback: Retained::new(closure),
        })
    }

    fn disconnect_observer(&self, observer: WebObserver) {
        observer.observer.disconnect();
    }

    fn listen_scroll(
        &self,
        container: &ScrollContainer<Element>,
        handler: Rc<dyn Fn()>,
    ) -> Result<WebListener, HostError> {
        let callback = Retained::new(Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            handler();
        }));
        let options = AddEventListenerOptions::new();
        options.set_passive(true);
        self.event_target(container)
            .add_event_listener_with_callback_and_add_event_listener_options(
                "scroll",
                callback.function(),
                &options,
            )
            .map_err(|err| host_error("could not add scroll listener", &err))?;
        Ok(WebListener { callback })
    }

    fn unlisten_scroll(&self, container: &ScrollContainer<Element>, listener: WebListener) {
        if let Err(err) = self
            .event_target(container)
            .remove_event_listener_with_callback("scroll", listener.callback.function())
        {
            log::warn!("could not remove scroll listener: {}", describe_js(&err));
        }
    }

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Result<WebTimer, HostError> {
        let callback = Retained::new(Closure::once(move || callback()));
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        let handle = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.function(), delay)
            .map_err(|err| host_error("could not set timeout", &err))?;
        Ok(WebTimer {
            handle,
            _callback: callback,
        })
    }

    fn clear_timeout(&self, timer: WebTimer) {
        self.window.clear_timeout_with_handle(timer.handle);
    }
}

impl LocalSpawn for WebHost {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        wasm_bindgen_futures::spawn_local(future);
        Ok(())
    }
}
