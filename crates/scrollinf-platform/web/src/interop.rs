//! Conversions between JS values and engine types.

use scrollinf_core::{EngineCallbacks, LoadError};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// Renders a thrown JS value as a message.
///
/// An `Error` contributes its `message`, a string is used as is and anything
/// else falls back to its debug rendering.
pub(crate) fn describe_js(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    if let Some(text) = value.as_string() {
        return text;
    }
    format!("{value:?}")
}

/// Normalizes a rejection value into a [`LoadError`].
pub fn load_error_from_js(value: JsValue) -> LoadError {
    if value.is_instance_of::<js_sys::Error>() || value.is_string() {
        LoadError::new(describe_js(&value))
    } else {
        LoadError::from_value(&value)
    }
}

/// Engine callbacks whose load callback returns a JS `Promise`.
///
/// Fulfillment counts as success whatever the value; a rejection becomes a
/// [`LoadError`].
pub fn promise_callbacks(on_load_more: impl Fn() -> js_sys::Promise + 'static) -> EngineCallbacks {
    EngineCallbacks::new(move || {
        let promise = JsFuture::from(on_load_more());
        async move {
            promise
                .await
                .map(|_| ())
                .map_err(load_error_from_js)
        }
    })
}
