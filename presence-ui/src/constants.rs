// SPDX-License-Identifier: MIT OR Apache-2.0

use log::warn;
use presence_client::{PresenceConfig, PresenceError, Result};
use serde_wasm_bindgen::from_value as from_js_value;
use wasm_bindgen::JsValue;

pub const CONFIG_GLOBAL: &str = "__APP_CONFIG";

/// Reads the runtime configuration the page injected as `window.__APP_CONFIG`.
///
/// A missing object means the defaults; a malformed one is an error.
pub fn app_config() -> Result<PresenceConfig> {
    let config = js_sys::Reflect::get(&gloo_utils::window(), &JsValue::from_str(CONFIG_GLOBAL))
        .unwrap_or(JsValue::UNDEFINED);
    if config.is_undefined() || config.is_null() {
        warn!("Runtime configuration not found (window.{CONFIG_GLOBAL} missing), using defaults");
        return Ok(PresenceConfig::default());
    }
    from_js_value::<PresenceConfig>(config)
        .map_err(|e| PresenceError::Config(format!("Failed to parse {CONFIG_GLOBAL}: {e}")))
}
