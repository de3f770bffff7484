//! Browser entry point.

use std::cell::RefCell;
use std::rc::Rc;

use scrollinf_core::{Engine, EngineCallbacks, LoadError, LoadingState};
use scrollinf_platform_web::{load_error_from_js, WebHost};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, HtmlElement, Request, RequestInit, RequestMode, Response, Window};

use crate::feed::{feed_config, image_url, Pager};

const CARD_WIDTH: u32 = 600;
const CARD_HEIGHT: u32 = 400;

thread_local! {
    static FEED_ENGINE: RefCell<Option<Engine<WebHost>>> = RefCell::new(None);
}

struct Feed {
    window: Window,
    document: Document,
    container: Element,
    pager: Pager,
}

impl Feed {
    async fn load_next_page(&self) -> Result<(), LoadError> {
        let page = self.pager.next_page();
        let url = self.pager.page_url(page);
        log::info!("loading page {page}");

        let photos = self.fetch_list(&url).await?;
        for photo in photos.iter() {
            self.append_card(&photo).map_err(load_error_from_js)?;
        }
        self.pager.commit(page);
        Ok(())
    }

    async fn fetch_list(&self, url: &str) -> Result<js_sys::Array, LoadError> {
        let opts = RequestInit::new();
        opts.set_method("GET");
        opts.set_mode(RequestMode::Cors);

        let request = Request::new_with_str_and_init(url, &opts).map_err(load_error_from_js)?;
        let response: Response = JsFuture::from(self.window.fetch_with_request(&request))
            .await
            .map_err(load_error_from_js)?
            .dyn_into()
            .map_err(|_| LoadError::new("fetch did not resolve to a Response"))?;
        if !response.ok() {
            return Err(LoadError::new(format!(
                "photo list request failed with status {}",
                response.status()
            )));
        }

        let body = JsFuture::from(response.json().map_err(load_error_from_js)?)
            .await
            .map_err(load_error_from_js)?;
        body.dyn_into::<js_sys::Array>()
            .map_err(|_| LoadError::new("photo list is not an array"))
    }

    fn append_card(&self, photo: &JsValue) -> Result<(), JsValue> {
        let field = |name: &str| -> Result<String, JsValue> {
            Ok(js_sys::Reflect::get(photo, &JsValue::from_str(name))?
                .as_string()
                .unwrap_or_default())
        };
        let author = field("author")?;

        let link = self.document.create_element("a")?;
        link.set_attribute("href", &field("url")?)?;
        link.set_attribute("target", "_blank")?;

        let img = self.document.create_element("img")?;
        img.set_attribute("src", &image_url(&field("id")?, CARD_WIDTH, CARD_HEIGHT))?;
        img.set_attribute("alt", &author)?;
        img.set_attribute("title", &author)?;
        img.set_attribute("loading", "lazy")?;

        link.append_child(&img)?;
        self.container.append_child(&link)?;
        Ok(())
    }
}

fn show_error(window: &Window, error: &LoadError) {
    log::error!("feed load failed: {error}");
    if window
        .alert_with_message("Failed to load more photos. Please try again.")
        .is_err()
    {
        log::warn!("could not show alert");
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Debug));

    let window = web_sys::window().ok_or("no global window exists")?;
    let document = window.document().ok_or("should have a document on window")?;
    let container = document
        .get_element_by_id("feed")
        .ok_or("element with id 'feed' not found")?;
    let loader = document
        .get_element_by_id("loader")
        .ok_or("element with id 'loader' not found")?
        .dyn_into::<HtmlElement>()?;

    let feed = Rc::new(Feed {
        window: window.clone(),
        document,
        container,
        pager: Pager::default(),
    });

    let callbacks = {
        let feed = Rc::clone(&feed);
        EngineCallbacks::new(move || {
            let feed = Rc::clone(&feed);
            async move { feed.load_next_page().await }
        })
    }
    .on_state_change(move |state| {
        log::debug!("feed state: {state}");
        loader.set_hidden(state != LoadingState::Loading);
    })
    .on_error(move |error| show_error(&window, error));

    let host = Rc::new(WebHost::new().map_err(|err| JsValue::from_str(&err.to_string()))?);
    let engine = Engine::new(host, feed_config(), callbacks)
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    engine
        .start()
        .map_err(|err| JsValue::from_str(&err.to_string()))?;

    // The first page is fetched directly; signals wait until it is in.
    engine.set_state(LoadingState::Loading);
    {
        let engine = engine.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match feed.load_next_page().await {
                Ok(()) => engine.set_state(LoadingState::Loaded),
                Err(error) => {
                    engine.set_state(LoadingState::Error);
                    show_error(&feed.window, &error);
                }
            }
        });
    }

    FEED_ENGINE.with(|slot| *slot.borrow_mut() = Some(engine));
    Ok(())
}
