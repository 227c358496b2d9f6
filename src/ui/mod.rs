//! UI modules for the campus map.
//!
//! The UI is split into distinct panels:
//! - Top bar: Title and load status
//! - Central canvas: Base tiles and overlays
//! - Right panel: Layer control

mod canvas;
mod layer_panel;
mod top_bar;

pub use canvas::render_canvas;
pub use layer_panel::render_layer_panel;
pub use top_bar::render_top_bar;
