//! Infinite image feed demo.
//!
//! The paging and engine setup in [`feed`] are platform independent; the
//! browser entry point lives in `web` and only builds for `wasm32`.

pub mod feed;

#[cfg(target_arch = "wasm32")]
mod web;
