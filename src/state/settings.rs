//! Map configuration.
//!
//! Defaults describe the campus deployment. On WASM they can be overridden
//! from the page URL; on native from environment variables and an optional
//! JSON config file.

use super::url_state::UrlParams;
use crate::geo::TileLayerDescriptor;
use crate::layers::LayerSource;
use crate::readiness::ReadinessGate;
use crate::style::{parse_css_color, StyleMode};
use eframe::egui::Color32;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where overlay data is served from in the web build.
#[cfg(target_arch = "wasm32")]
const DEFAULT_DATA_PATH: &str = "/Campus-Navigation-App/data/outdoors";

/// Where overlay data lives relative to the working directory in native builds.
#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_DATA_PATH: &str = "assets/data/outdoors";

/// Settings for the stylesheet readiness gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Delay between probes
    pub poll_interval_ms: u64,
    /// Give up waiting (and show layers anyway) after this long
    pub budget_ms: u64,
    /// Class attached to the probe element
    pub probe_class: String,
    /// Stroke color the probe class resolves to once the stylesheet is active
    pub expected_stroke: String,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            budget_ms: 2000,
            probe_class: "layer-buildings".to_string(),
            expected_stroke: "rgb(255, 0, 0)".to_string(),
        }
    }
}

impl ReadinessConfig {
    pub fn gate(&self) -> ReadinessGate {
        ReadinessGate::new(
            Duration::from_millis(self.poll_interval_ms),
            Duration::from_millis(self.budget_ms),
        )
    }

    /// Parsed expected stroke. `None` means any resolved stroke counts.
    pub fn expected_stroke_color(&self) -> Option<Color32> {
        let color = parse_css_color(&self.expected_stroke);
        if color.is_none() && !self.expected_stroke.trim().is_empty() {
            log::warn!(
                "Unrecognized probe stroke {:?}, accepting any stroke",
                self.expected_stroke
            );
        }
        color
    }
}

/// Complete configuration of the map view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Base path (URL prefix or directory) holding the manifest and layers
    pub data_base_path: String,
    /// Manifest file name under `data_base_path`
    pub manifest_file: String,
    /// Initial view center latitude
    pub center_lat: f64,
    /// Initial view center longitude
    pub center_lon: f64,
    /// Initial fractional zoom level
    pub initial_zoom: f64,
    /// Scroll distance (points) corresponding to one zoom level
    pub wheel_px_per_zoom_level: f32,
    /// Draw feature names next to features
    pub show_labels: bool,
    pub tiles: TileLayerDescriptor,
    pub style_mode: StyleMode,
    pub readiness: ReadinessConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            data_base_path: DEFAULT_DATA_PATH.to_string(),
            manifest_file: "index.json".to_string(),
            center_lat: 28.1477,
            center_lon: -81.8485,
            initial_zoom: 16.25,
            wheel_px_per_zoom_level: 5.0,
            show_labels: false,
            tiles: TileLayerDescriptor::default(),
            style_mode: StyleMode::default(),
            readiness: ReadinessConfig::default(),
        }
    }
}

impl MapConfig {
    /// Loads the configuration for this platform.
    pub fn load() -> Self {
        let mut config = Self::default();

        #[cfg(not(target_arch = "wasm32"))]
        config.apply_env();

        config.apply_url_params(&super::url_state::parse_from_url());
        if let Err(e) = config.validate() {
            log::warn!("Ignoring map config overrides: {}", e);
            return Self::default();
        }
        config
    }

    /// Parses a (possibly partial) JSON configuration over the defaults.
    #[cfg_attr(target_arch = "wasm32", allow(dead_code))] // Config files are native only
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| format!("Invalid map config: {}", e))?;
        config
            .validate()
            .map_err(|e| format!("Invalid map config: {}", e))?;
        Ok(config)
    }

    /// Rejects values the view cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        self.tiles.validate()?;
        if !self.center_lat.is_finite() || !self.center_lon.is_finite() {
            return Err("center must be finite".to_string());
        }
        if !self.initial_zoom.is_finite() {
            return Err("initial_zoom must be finite".to_string());
        }
        if !(self.wheel_px_per_zoom_level.is_finite() && self.wheel_px_per_zoom_level > 0.0) {
            return Err(format!(
                "wheel_px_per_zoom_level must be positive, got {}",
                self.wheel_px_per_zoom_level
            ));
        }
        if self.readiness.poll_interval_ms == 0 {
            return Err("readiness.poll_interval_ms must be positive".to_string());
        }
        Ok(())
    }

    pub fn layer_source(&self) -> LayerSource {
        LayerSource {
            base_path: self.data_base_path.clone(),
            manifest_file: self.manifest_file.clone(),
        }
    }

    /// Applies query-string overrides.
    pub fn apply_url_params(&mut self, params: &UrlParams) {
        if let Some(ref data) = params.data {
            self.data_base_path = data.clone();
        }
        if let Some(lat) = params.lat {
            self.center_lat = lat;
        }
        if let Some(lon) = params.lon {
            self.center_lon = lon;
        }
        if let Some(zoom) = params.zoom {
            self.initial_zoom = self.tiles.constrain_zoom(zoom);
        }
        if let Some(mode) = params.style {
            self.style_mode = mode;
        }
    }

    /// Applies `CAMPUS_MAP_CONFIG` (JSON file), then `CAMPUS_MAP_DATA` and
    /// `CAMPUS_MAP_STYLE`.
    #[cfg(not(target_arch = "wasm32"))]
    fn apply_env(&mut self) {
        if let Ok(path) = std::env::var("CAMPUS_MAP_CONFIG") {
            match std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|json| Self::from_json(&json))
            {
                Ok(config) => {
                    log::info!("Loaded map config from {}", path);
                    *self = config;
                }
                Err(e) => log::warn!("Ignoring config file {}: {}", path, e),
            }
        }

        if let Ok(data) = std::env::var("CAMPUS_MAP_DATA") {
            self.data_base_path = data;
        }

        if let Ok(style) = std::env::var("CAMPUS_MAP_STYLE") {
            match StyleMode::parse(&style) {
                Some(mode) => self.style_mode = mode,
                None => log::warn!("Unknown CAMPUS_MAP_STYLE {:?}", style),
            }
        }
    }
}
