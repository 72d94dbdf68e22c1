use crate::models::LatLng;
use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_API_URL: &str = "http://localhost:8000";
pub(crate) const DEFAULT_LOCALE: &str = "en";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MapConfig {
    pub center: LatLng,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub tile_url: String,
    pub attribution: String,
    /// Screen pixels the side panel covers above the bottom of the map.
    pub panel_offset_px: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: LatLng::new(32.0, 52.0),
            zoom: 5.0,
            min_zoom: 2.0,
            max_zoom: 8.0,
            tile_url: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution:
                "&copy; <a href=\"http://www.openstreetmap.org/copyright\">OpenStreetMap</a>"
                    .to_string(),
            panel_offset_px: 120.0,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EnvConfig {
    pub api_url: String,
    /// Sent as `Accept-Language`.
    pub locale: String,
    pub map: MapConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            map: MapConfig::default(),
        }
    }
}

fn env_string(env: &wasm_bindgen::JsValue, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| {
        js_sys::Reflect::get(env, &(*k).into())
            .ok()
            .and_then(|v| v.as_string())
            .filter(|s| !s.trim().is_empty())
    })
}

/// `"fa-IR"` -> `"fa"`.
pub(crate) fn primary_language(tag: &str) -> Option<String> {
    let lang = tag.split(['-', '_']).next()?.trim().to_ascii_lowercase();
    (!lang.is_empty()).then_some(lang)
}

impl EnvConfig {
    /// Read `window.ENV` (`API_URL` or `api_url`, `LOCALE` or `locale`),
    /// falling back to the browser language and the defaults.
    pub fn from_window() -> Self {
        let mut config = Self::default();
        let Some(window) = web_sys::window() else {
            return config;
        };

        if let Some(lang) = window
            .navigator()
            .language()
            .as_deref()
            .and_then(primary_language)
        {
            config.locale = lang;
        }

        if let Some(env) = window.get("ENV") {
            if !env.is_undefined() && env.is_object() {
                let env: wasm_bindgen::JsValue = env.into();
                if let Some(url) = env_string(&env, &["API_URL", "api_url"]) {
                    config.api_url = url.trim_end_matches('/').to_string();
                }
                if let Some(locale) = env_string(&env, &["LOCALE", "locale"]) {
                    config.locale = locale;
                }
            }
        }

        config
    }
}
