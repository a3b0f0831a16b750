//! Audio Classification Dashboard
//!
//! WASM frontend for a remote audio CNN classifier: upload a clip, send it
//! to the inference endpoint, and render the predictions, mel spectrogram,
//! per-layer feature maps and waveform it returns. Panels share one
//! high-detail render context, arbitrated by priority.

mod panels;
mod surfaces;
mod viz;

use wasm_bindgen::prelude::*;

/// Initialize the dashboard
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    // Set up panic hook for better error messages in WASM
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    viz::init()
}
