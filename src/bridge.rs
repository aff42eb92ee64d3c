/// JS bridge to the extension host (chrome.tabs, chrome.storage)

use wasm_bindgen::prelude::*;

use crate::video::TabLocation;

#[wasm_bindgen(module = "/popup.js")]
extern "C" {
    /// Whether chrome.storage.local is reachable from this page
    pub fn hasExtensionStorage() -> bool;

    /// URL of the active tab; undefined without a tabs API, null when the
    /// tab has no URL
    #[wasm_bindgen(catch)]
    pub async fn getActiveTabUrl() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    pub async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    pub async fn setStorage(key: &str, value: JsValue) -> Result<(), JsValue>;
}

/// Ask the host where the active tab is
pub async fn active_tab_location() -> TabLocation {
    match getActiveTabUrl().await {
        Ok(url) if url.is_undefined() => TabLocation::NoHost,
        Ok(url) => url.as_string().map_or(TabLocation::Unknown, TabLocation::Url),
        Err(e) => {
            log::warn!("Failed to query active tab: {:?}", e);
            TabLocation::Unknown
        }
    }
}
