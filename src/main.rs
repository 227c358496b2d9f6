#![warn(clippy::all)]

//! Campus Map - an interactive campus map with toggleable overlays.
//!
//! Overlay layers (buildings, paths, parking lots, ...) are discovered from a
//! manifest, fetched as GeoJSON, styled from the hosting page's stylesheet
//! and drawn over a raster base map.

mod geo;
mod layers;
mod presenter;
mod readiness;
mod session;
mod state;
mod style;
mod ui;

use eframe::egui;
use session::MapSession;
use state::{AppState, MapConfig};
use style::StyleSource;
use web_time::Instant;

// Native entry point
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    env_logger::init();

    let native_options = eframe::NativeOptions::default();

    eframe::run_native(
        "Campus Map",
        native_options,
        Box::new(|cc| Ok(Box::new(CampusMapApp::new(cc)))),
    )
}

// WASM entry point - main is not called on wasm32
#[cfg(target_arch = "wasm32")]
fn main() {}

/// Entry point for the WASM application.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub async fn start() {
    use eframe::wasm_bindgen::JsCast as _;

    // Redirect `log` messages to `console.log`:
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let document = web_sys::window()
            .expect("No window")
            .document()
            .expect("No document");

        let canvas = document
            .get_element_by_id("app_canvas")
            .expect("Failed to find app_canvas")
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .expect("app_canvas was not a HtmlCanvasElement");

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(CampusMapApp::new(cc)))),
            )
            .await;

        // Remove the loading text once the app has loaded:
        if let Some(loading_text) = document.get_element_by_id("loading_text") {
            match start_result {
                Ok(_) => {
                    loading_text.remove();
                }
                Err(e) => {
                    loading_text.set_inner_html(
                        "<p>The map has crashed. See the developer console for details.</p>",
                    );
                    panic!("Failed to start eframe: {e:?}");
                }
            }
        }
    });
}

/// Main application state and logic.
pub struct CampusMapApp {
    /// Configuration, view and status line
    state: AppState,

    /// Overlay pipeline for the map view
    session: MapSession,

    /// The page stylesheet (WASM) or built-in styles (native)
    styles: Box<dyn StyleSource>,
}

impl CampusMapApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Tiles are fetched through egui's image loaders
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let config = MapConfig::load();
        log::info!(
            "Campus map starting: data at {}, {:?} styling",
            config.data_base_path,
            config.style_mode
        );

        let mut session = MapSession::new(&config);
        session.reload(&cc.egui_ctx);

        Self {
            state: AppState::new(config),
            session,
            styles: style::platform_style_source(),
        }
    }
}

impl eframe::App for CampusMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(delay) = self.session.update(Instant::now(), self.styles.as_ref()) {
            ctx.request_repaint_after(delay);
        }
        self.state.status_message = self.session.status_message();

        ui::render_top_bar(ctx, &self.state, &self.session);
        ui::render_layer_panel(ctx, &mut self.state, &mut self.session);
        ui::render_canvas(ctx, &mut self.state, &mut self.session);
    }
}
