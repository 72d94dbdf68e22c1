pub mod api;
pub mod app;
mod components;
pub mod config;
pub mod error;
pub mod filters;
pub mod logging;
pub mod map;
pub mod models;
pub mod notes;
pub mod pages;
pub mod panel;
pub mod router;
pub mod session;
pub mod state;
pub mod storage;
pub mod text;
pub mod validation;

use crate::app::App;
use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    logging::init();
    tracing::info!("starting geonotes");
    mount_to_body(App);
}
