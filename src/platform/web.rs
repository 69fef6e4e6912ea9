//! Browser adapter
//!
//! Exposes the banner to JavaScript. The page owns the canvas and the
//! `requestAnimationFrame` loop; it calls `frame` with the rAF timestamp and
//! draws whatever `snapshotJson` returns.

use wasm_bindgen::prelude::*;

use super::BannerDriver;
use crate::config::BannerConfig;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"kart-banner: logger already installed".into());
    }
}

/// Is the page currently hidden (background tab, minimized window)?
fn page_hidden() -> bool {
    web_sys::window()
        .and_then(|w| w.document())
        .map(|d| d.visibility_state() == web_sys::VisibilityState::Hidden)
        .unwrap_or(false)
}

#[wasm_bindgen]
pub struct BannerSim {
    driver: BannerDriver,
}

#[wasm_bindgen]
impl BannerSim {
    /// Build a banner. `config_json` overrides the shipped tuning.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u32, config_json: Option<String>) -> Result<BannerSim, JsValue> {
        let config = match config_json {
            Some(json) => {
                BannerConfig::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?
            }
            None => BannerConfig::default(),
        };
        log::info!("Kart banner starting with seed {}", seed);
        Ok(Self {
            driver: BannerDriver::new(config, seed as u64),
        })
    }

    /// Advance one animation frame. Returns false while hidden.
    pub fn frame(&mut self, timestamp_ms: f64) -> bool {
        self.driver.frame(timestamp_ms)
    }

    #[wasm_bindgen(js_name = setHidden)]
    pub fn set_hidden(&mut self, hidden: bool, timestamp_ms: f64) {
        self.driver.set_hidden(hidden, timestamp_ms);
    }

    /// Read `document.visibilityState` and pause or resume to match.
    /// Meant for a `visibilitychange` listener.
    #[wasm_bindgen(js_name = syncVisibility)]
    pub fn sync_visibility(&mut self, timestamp_ms: f64) {
        let hidden = page_hidden();
        if hidden != self.driver.is_hidden() {
            log::info!("Banner {}", if hidden { "hidden" } else { "visible" });
        }
        self.driver.set_hidden(hidden, timestamp_ms);
    }

    pub fn reset(&mut self) {
        self.driver.reset();
    }

    #[wasm_bindgen(js_name = snapshotJson)]
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        self.driver
            .snapshot()
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
