//! Geographic data and map drawing.
//!
//! This module provides functionality for parsing overlay geometry,
//! projecting it onto the canvas, and drawing the base tiles and overlays.

mod layer;
mod projection;
mod renderer;
mod tessellate;
mod tiles;

pub use layer::GeometryCollection;
pub use projection::MapProjection;
pub use renderer::{render_overlays, NodeCache};
pub use tiles::{visible_tiles, TileLayerDescriptor};
