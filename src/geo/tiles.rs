//! Base tile layer description and tile coverage.

use super::projection::MapProjection;
use eframe::egui::{Pos2, Rect};
use geo_types::Coord;
use serde::{Deserialize, Serialize};

/// Deepest zoom with addressable tiles (`x` and `y` fit in `u32`).
pub const MAX_TILE_ZOOM: u8 = 30;

/// The always-on raster base layer handed to the map canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayerDescriptor {
    /// Name shown in the layer control
    pub name: String,
    /// URL with `{z}`, `{x}`, `{y}` placeholders
    pub url_template: String,
    /// Attribution text drawn on the map
    pub attribution: String,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom increments the view snaps to; 0 allows any fractional zoom
    pub zoom_snap: f64,
}

impl Default for TileLayerDescriptor {
    fn default() -> Self {
        Self {
            name: "Map".to_string(),
            url_template:
                "https://cartodb-basemaps-a.global.ssl.fastly.net/rastertiles/voyager/{z}/{x}/{y}.png"
                    .to_string(),
            attribution: "© CARTO".to_string(),
            min_zoom: 16.0,
            max_zoom: 20.0,
            zoom_snap: 0.0,
        }
    }
}

impl TileLayerDescriptor {
    pub fn tile_url(&self, tile: TileId) -> String {
        self.url_template
            .replace("{z}", &tile.zoom.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }

    /// Checks the zoom range is usable: finite, ordered, within tile limits.
    pub fn validate(&self) -> Result<(), String> {
        if !self.min_zoom.is_finite() || !self.max_zoom.is_finite() {
            return Err(format!(
                "tile zoom range must be finite, got {}..{}",
                self.min_zoom, self.max_zoom
            ));
        }
        if self.min_zoom < 0.0 || self.min_zoom > self.max_zoom {
            return Err(format!(
                "invalid tile zoom range {}..{}",
                self.min_zoom, self.max_zoom
            ));
        }
        if self.max_zoom > MAX_TILE_ZOOM as f64 {
            return Err(format!(
                "max_zoom {} exceeds the tile limit of {}",
                self.max_zoom, MAX_TILE_ZOOM
            ));
        }
        if !self.zoom_snap.is_finite() || self.zoom_snap < 0.0 {
            return Err(format!("invalid zoom_snap {}", self.zoom_snap));
        }
        Ok(())
    }

    /// Clamps a zoom level to the layer's bounds and applies snapping.
    pub fn constrain_zoom(&self, zoom: f64) -> f64 {
        let snapped = if self.zoom_snap > 0.0 {
            (zoom / self.zoom_snap).round() * self.zoom_snap
        } else {
            zoom
        };
        snapped.clamp(self.min_zoom, self.max_zoom)
    }
}

/// Slippy-map tile address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

/// Tiles covering the view, with the screen rectangle each one occupies.
///
/// Tiles come from the integer zoom level at or below the view zoom and are
/// scaled up for the fractional remainder.
pub fn visible_tiles(projection: &MapProjection, max_zoom: f64) -> Vec<(TileId, Rect)> {
    let zoom = projection
        .zoom()
        .clamp(0.0, max_zoom.min(MAX_TILE_ZOOM as f64).max(0.0))
        .floor() as u8;
    let tiles_per_side = 1u32 << zoom;
    let n = tiles_per_side as f64;

    let (min, max) = projection.visible_world_bounds();
    let index = |v: f64| (v * n).floor().clamp(0.0, n - 1.0) as u32;
    let (x0, x1) = (index(min.x), index(max.x));
    let (y0, y1) = (index(min.y), index(max.y));

    let mut tiles = Vec::new();
    for y in y0..=y1 {
        for x in x0..=x1 {
            let top_left = projection.world_to_screen(Coord {
                x: x as f64 / n,
                y: y as f64 / n,
            });
            let bottom_right = projection.world_to_screen(Coord {
                x: (x + 1) as f64 / n,
                y: (y + 1) as f64 / n,
            });
            tiles.push((
                TileId { zoom, x, y },
                Rect::from_min_max(
                    Pos2::new(top_left.x, top_left.y),
                    Pos2::new(bottom_right.x, bottom_right.y),
                ),
            ));
        }
    }
    tiles
}
