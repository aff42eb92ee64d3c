/// Comment Guard - moderation report popup for YouTube comments
/// Built with Rust + WASM + Yew

pub mod analysis;
mod bridge;
pub mod config;
pub mod error;
pub mod query;
pub mod report;
pub mod settings;
pub mod source;
pub mod storage;
pub mod ui;
pub mod video;

use wasm_bindgen::prelude::*;

use crate::config::AppConfig;

fn load_config() -> (AppConfig, Option<config::ConfigError>) {
    match AppConfig::from_build_env() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    }
}

// Set up panic hook and logging before anything else runs
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();

    let (config, error) = load_config();
    wasm_logger::init(wasm_logger::Config::new(config.log_level));
    if let Some(e) = error {
        log::error!("Invalid build configuration, using defaults: {}", e);
    }
}

// Re-export video id parsing for JavaScript access
#[wasm_bindgen]
pub fn extract_video_id(url: &str) -> Option<String> {
    video::video_id_from_url(url)
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    let (config, _) = load_config();
    yew::Renderer::<ui::popup::App>::with_props(ui::popup::AppProps { config }).render();
}
