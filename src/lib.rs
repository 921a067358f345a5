//! Valentine page core crate.
//!
//! A linear run of screens (intro → question → verification → loading → puzzle → success) with
//! two gags: a "No" button that jumps away from the pointer and a fake image "verification"
//! puzzle. The state machines (`screen`, `evasive`, `puzzle`, `checkbox`, `easter`) are plain
//! Rust and testable on the host; `page` wires them to the browser document.

use wasm_bindgen::prelude::*;

pub mod checkbox;
pub mod config;
pub mod easter;
pub mod error;
pub mod evasive;
pub mod logging;
mod page;
pub mod puzzle;
pub mod rng;
pub mod screen;

pub use config::PageConfig;
pub use error::{PageError, VerifyError};
pub use page::overlay::{CUE_EVENT, Cue};
pub use page::{GRID_VERIFIED_EVENT, show_screen};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// -----------------------------------------------------------------------------
// Entrypoints
// -----------------------------------------------------------------------------

/// Wire the page with the stock configuration.
#[wasm_bindgen]
pub fn start_page() -> Result<(), JsValue> {
    page::start(PageConfig::default()).map_err(JsValue::from)
}

/// Wire the page with a JSON configuration; missing keys keep their defaults.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_page_with_config(json: &str) -> Result<(), JsValue> {
    let cfg = PageConfig::from_json(json)?;
    page::start(cfg).map_err(JsValue::from)
}
