//! Web Mercator map projection.
//!
//! Geographic coordinates are first mapped to "world" coordinates in the unit
//! square (x east, y south, both 0.0 - 1.0), the same space slippy-map tiles
//! are addressed in. Screen placement is then a scale and offset, which is
//! what lets overlay geometry be projected once and cached.

use eframe::egui::{Pos2, Rect, Vec2};
use geo_types::Coord;
use std::f64::consts::PI;

/// Pixel size of one tile; the world is `TILE_SIZE * 2^zoom` pixels wide.
pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the Web Mercator square.
const MAX_LATITUDE: f64 = 85.051_128_78;

/// Converts (lon, lat) degrees to world coordinates.
pub fn geo_to_world(coord: Coord<f64>) -> Coord<f64> {
    let lat = coord.y.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    Coord {
        x: (coord.x + 180.0) / 360.0,
        y: (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0,
    }
}

/// Converts world coordinates back to (lon, lat) degrees.
pub fn world_to_geo(world: Coord<f64>) -> Coord<f64> {
    let lat = (PI * (1.0 - 2.0 * world.y)).sinh().atan();
    Coord {
        x: world.x * 360.0 - 180.0,
        y: lat.to_degrees(),
    }
}

/// The current view: a center point and a fractional zoom level fitted to a
/// screen rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct MapProjection {
    /// View center in world coordinates
    center: Coord<f64>,
    /// Fractional zoom level
    zoom: f64,
    /// Screen rectangle of the canvas
    screen_rect: Rect,
}

impl MapProjection {
    /// Creates a projection centered on (lon, lat).
    pub fn new(center: Coord<f64>, zoom: f64, screen_rect: Rect) -> Self {
        Self {
            center: geo_to_world(center),
            zoom,
            screen_rect,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn screen_rect(&self) -> Rect {
        self.screen_rect
    }

    /// View center as (lon, lat).
    pub fn center(&self) -> Coord<f64> {
        world_to_geo(self.center)
    }

    /// World width in screen points at the current zoom.
    pub fn world_size(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom)
    }

    pub fn world_to_screen(&self, world: Coord<f64>) -> Pos2 {
        let scale = self.world_size();
        let origin = self.screen_rect.center();
        Pos2::new(
            origin.x + ((world.x - self.center.x) * scale) as f32,
            origin.y + ((world.y - self.center.y) * scale) as f32,
        )
    }

    pub fn screen_to_world(&self, pos: Pos2) -> Coord<f64> {
        let scale = self.world_size();
        let origin = self.screen_rect.center();
        Coord {
            x: self.center.x + (pos.x - origin.x) as f64 / scale,
            y: self.center.y + (pos.y - origin.y) as f64 / scale,
        }
    }

    #[cfg(test)]
    pub fn geo_to_screen(&self, coord: Coord<f64>) -> Pos2 {
        self.world_to_screen(geo_to_world(coord))
    }

    pub fn screen_to_geo(&self, pos: Pos2) -> Coord<f64> {
        world_to_geo(self.screen_to_world(pos))
    }

    /// Visible area in world coordinates as (min, max).
    pub fn visible_world_bounds(&self) -> (Coord<f64>, Coord<f64>) {
        (
            self.screen_to_world(self.screen_rect.left_top()),
            self.screen_to_world(self.screen_rect.right_bottom()),
        )
    }

    /// Moves the view so content follows a drag of `delta` screen points.
    pub fn pan_by(&mut self, delta: Vec2) {
        let scale = self.world_size();
        self.center.x -= delta.x as f64 / scale;
        self.center.y = (self.center.y - delta.y as f64 / scale).clamp(0.0, 1.0);
    }

    /// Changes zoom keeping the point under `anchor` fixed on screen.
    pub fn zoom_around(&mut self, new_zoom: f64, anchor: Pos2) {
        let anchored = self.screen_to_world(anchor);
        self.zoom = new_zoom;
        let moved = self.screen_to_world(anchor);
        self.center.x += anchored.x - moved.x;
        self.center.y += anchored.y - moved.y;
    }
}
