//! Top bar UI: app title and status.

use crate::readiness::ReadinessPhase;
use crate::session::MapSession;
use crate::state::AppState;
use eframe::egui::{self, Color32, RichText};

pub fn render_top_bar(ctx: &egui::Context, state: &AppState, session: &MapSession) {
    egui::TopBottomPanel::top("top_bar")
        .exact_height(36.0)
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                ui.label(RichText::new("Campus Map").strong().size(16.0));

                ui.separator();

                if session.is_loading() {
                    ui.spinner();
                }
                ui.label(
                    RichText::new(&state.status_message)
                        .size(13.0)
                        .color(Color32::GRAY),
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        RichText::new(format!("z {:.2}", state.view.zoom))
                            .monospace()
                            .size(12.0)
                            .color(Color32::GRAY),
                    );
                    if let ReadinessPhase::Polling { .. } = session.readiness().phase() {
                        ui.label(RichText::new("Styling...").size(12.0).color(Color32::GRAY));
                    }
                });
            });
        });
}
