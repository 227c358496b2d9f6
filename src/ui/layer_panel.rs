//! Right panel UI: base layer and overlay toggles.

use crate::session::{LoadStatus, MapSession};
use crate::state::AppState;
use eframe::egui::{self, Color32, RichText, ScrollArea};

pub fn render_layer_panel(ctx: &egui::Context, state: &mut AppState, session: &mut MapSession) {
    egui::SidePanel::right("layer_panel")
        .resizable(true)
        .default_width(200.0)
        .min_width(160.0)
        .max_width(320.0)
        .show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Layers");
                ui.separator();

                render_base_section(ui, state);
                ui.add_space(5.0);

                render_overlay_section(ui, session);
                ui.add_space(5.0);

                render_options_section(ui, ctx, state, session);
            });
        });
}

fn render_base_section(ui: &mut egui::Ui, state: &AppState) {
    egui::CollapsingHeader::new(RichText::new("Base Layer").strong())
        .default_open(true)
        .show(ui, |ui| {
            // The single base layer is always on
            let _ = ui.radio(true, state.config.tiles.name.as_str());
        });
}

fn render_overlay_section(ui: &mut egui::Ui, session: &mut MapSession) {
    egui::CollapsingHeader::new(RichText::new("Overlays").strong())
        .default_open(true)
        .show(ui, |ui| {
            if let LoadStatus::Failed(_) = session.status() {
                ui.label(
                    RichText::new("Overlays could not be loaded")
                        .small()
                        .color(Color32::from_rgb(200, 80, 80)),
                );
                return;
            }

            if session.overlays().is_empty() {
                ui.label(RichText::new("None").small().color(Color32::GRAY));
                return;
            }

            let entries: Vec<(String, String)> = session
                .overlays()
                .iter()
                .map(|o| (o.layer_id().to_string(), o.name.clone()))
                .collect();
            for (id, name) in entries {
                if let Some(visible) = session.toggles_mut().visible_mut(&id) {
                    ui.checkbox(visible, name);
                }
            }
        });
}

fn render_options_section(
    ui: &mut egui::Ui,
    ctx: &egui::Context,
    state: &mut AppState,
    session: &mut MapSession,
) {
    egui::CollapsingHeader::new(RichText::new("Options").strong())
        .default_open(false)
        .show(ui, |ui| {
            ui.checkbox(&mut state.show_labels, "Labels");

            ui.horizontal(|ui| {
                if ui.button("Defaults").clicked() {
                    session.reset_toggles();
                }
                let reload = ui.add_enabled(!session.is_loading(), egui::Button::new("Reload"));
                if reload.clicked() {
                    session.reload(ctx);
                }
            });
        });
}
