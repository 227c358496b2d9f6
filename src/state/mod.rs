//! Application state management.
//!
//! Configuration, the current view and the status line. Overlay data lives
//! in [`crate::session::MapSession`].

mod layer;
mod settings;
pub mod url_state;

pub use layer::LayerToggles;
pub use settings::MapConfig;

use crate::geo::MapProjection;
use geo_types::Coord;

/// The visible part of the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    /// View center as (lon, lat)
    pub center: Coord<f64>,
    /// Fractional zoom level
    pub zoom: f64,
}

impl MapView {
    /// Copies center and zoom from a projection the user has moved.
    pub fn update_from(&mut self, projection: &MapProjection) {
        self.center = projection.center();
        self.zoom = projection.zoom();
    }
}

/// Root application state.
pub struct AppState {
    pub config: MapConfig,

    /// Current view, reset to the configured initial view on double-click
    pub view: MapView,

    /// Draw feature labels
    pub show_labels: bool,

    /// Application status message displayed in top bar
    pub status_message: String,
}

impl AppState {
    pub fn new(config: MapConfig) -> Self {
        Self {
            view: Self::initial_view(&config),
            show_labels: config.show_labels,
            config,
            status_message: "Ready".to_string(),
        }
    }

    pub fn initial_view(config: &MapConfig) -> MapView {
        MapView {
            center: Coord {
                x: config.center_lon,
                y: config.center_lat,
            },
            zoom: config.tiles.constrain_zoom(config.initial_zoom),
        }
    }

    pub fn reset_view(&mut self) {
        self.view = Self::initial_view(&self.config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_view_from_config() {
        let mut state = AppState::new(MapConfig::default());
        assert_eq!(state.view.center.y, 28.1477);
        assert_eq!(state.view.center.x, -81.8485);
        assert_eq!(state.view.zoom, 16.25);

        state.view.zoom = 19.0;
        state.reset_view();
        assert_eq!(state.view.zoom, 16.25);
    }
}
