//! Central canvas UI: base tiles, overlays and map interaction.

use crate::geo::{visible_tiles, MapProjection, TileLayerDescriptor};
use crate::session::MapSession;
use crate::state::AppState;
use eframe::egui::{self, Align2, Color32, FontId, Painter, Pos2, Rect, Sense, Vec2};
use std::f64::consts::LN_2;

/// Shown where tiles have not arrived yet.
const BACKGROUND: Color32 = Color32::from_rgb(242, 239, 233);

pub fn render_canvas(ctx: &egui::Context, state: &mut AppState, session: &mut MapSession) {
    egui::CentralPanel::default()
        .frame(egui::Frame::NONE)
        .show(ctx, |ui| {
            let available_size = ui.available_size();
            let (response, painter) =
                ui.allocate_painter(available_size, Sense::click_and_drag());
            let rect = response.rect;

            painter.rect_filled(rect, 0.0, BACKGROUND);

            let mut projection = MapProjection::new(state.view.center, state.view.zoom, rect);
            handle_canvas_interaction(&response, &mut projection, state);

            render_base_layer(ui, &projection, &state.config.tiles);
            session.render(&painter, &projection, state.show_labels);
            draw_attribution(&painter, rect, &state.config.tiles.attribution);

            if let Some(pos) = response.hover_pos() {
                draw_cursor_position(&painter, rect, &projection, pos);
            }
        });
}

fn handle_canvas_interaction(
    response: &egui::Response,
    projection: &mut MapProjection,
    state: &mut AppState,
) {
    if response.double_clicked() {
        state.reset_view();
        return;
    }

    if response.dragged() {
        projection.pan_by(response.drag_delta());
    }

    // Zoom about the cursor so the point under it stays put
    if response.hovered() {
        let scroll_delta = response.ctx.input(|i| i.raw_scroll_delta);
        if scroll_delta.y != 0.0 {
            let delta = wheel_zoom_delta(scroll_delta.y, state.config.wheel_px_per_zoom_level);
            let new_zoom = state.config.tiles.constrain_zoom(projection.zoom() + delta);
            let anchor = response
                .hover_pos()
                .unwrap_or(projection.screen_rect().center());
            projection.zoom_around(new_zoom, anchor);
        }
    }

    state.view.update_from(projection);
}

/// Zoom change for a scroll of `scroll_px` points.
///
/// Smoothly saturating: small scrolls give proportional changes, large ones
/// approach four zoom levels.
fn wheel_zoom_delta(scroll_px: f32, px_per_zoom_level: f32) -> f64 {
    let scaled = (scroll_px / (px_per_zoom_level.max(f32::EPSILON) * 4.0)) as f64;
    let magnitude = 4.0 * (2.0 / (1.0 + (-scaled.abs()).exp())).ln() / LN_2;
    magnitude.copysign(scaled)
}

/// Draws the raster tiles under the overlays. Tiles load in the background
/// and appear once fetched.
fn render_base_layer(ui: &egui::Ui, projection: &MapProjection, tiles: &TileLayerDescriptor) {
    for (tile, rect) in visible_tiles(projection, tiles.max_zoom) {
        egui::Image::new(tiles.tile_url(tile)).paint_at(ui, rect);
    }
}

fn draw_cursor_position(painter: &Painter, rect: Rect, projection: &MapProjection, pos: Pos2) {
    let coord = projection.screen_to_geo(pos);
    painter.text(
        rect.left_bottom() + Vec2::new(6.0, -4.0),
        Align2::LEFT_BOTTOM,
        format!("{:.5}, {:.5}", coord.y, coord.x),
        FontId::monospace(11.0),
        Color32::from_rgb(60, 60, 60),
    );
}

fn draw_attribution(painter: &Painter, rect: Rect, attribution: &str) {
    if attribution.is_empty() {
        return;
    }
    let galley = painter.layout_no_wrap(
        attribution.to_string(),
        FontId::proportional(11.0),
        Color32::from_rgb(60, 60, 60),
    );
    let padding = Vec2::new(4.0, 2.0);
    let bg = Align2::RIGHT_BOTTOM.anchor_size(rect.right_bottom(), galley.size() + padding * 2.0);
    painter.rect_filled(bg, 0.0, Color32::from_white_alpha(200));
    painter.galley(bg.min + padding, galley, Color32::from_rgb(60, 60, 60));
}
