//! Per-view map session.
//!
//! Owns everything tied to one map view: the load channel, the loaded
//! layers, the readiness gate, the presented overlays, the user's toggles and
//! the render-node cache. Dropping the session cancels any outstanding load.

use crate::geo::{render_overlays, MapProjection, NodeCache};
use crate::layers::{LayerError, LayerLoadChannel, LayerSource, LoadedLayer};
use crate::presenter::{present_overlays, Overlay};
use crate::readiness::{GateStep, ReadinessGate};
use crate::state::{LayerToggles, MapConfig};
use crate::style::{StyleResolver, StyleSource};
use eframe::egui::{self, Color32, Painter};
use std::rc::Rc;
use std::time::Duration;
use web_time::Instant;

/// Outcome of the most recent layer load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Loaded(usize),
    Failed(String),
}

pub struct MapSession {
    source: LayerSource,
    resolver: StyleResolver,
    gate: ReadinessGate,
    probe_class: String,
    expected_stroke: Option<Color32>,
    loader: LayerLoadChannel,
    layers: Vec<Rc<LoadedLayer>>,
    overlays: Vec<Overlay>,
    toggles: LayerToggles,
    nodes: NodeCache,
    status: LoadStatus,
}

impl MapSession {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            source: config.layer_source(),
            resolver: StyleResolver::new(config.style_mode),
            gate: config.readiness.gate(),
            probe_class: config.readiness.probe_class.clone(),
            expected_stroke: config.readiness.expected_stroke_color(),
            loader: LayerLoadChannel::new(),
            layers: Vec::new(),
            overlays: Vec::new(),
            toggles: LayerToggles::default(),
            nodes: NodeCache::new(),
            status: LoadStatus::Idle,
        }
    }

    /// Starts (or restarts) loading the manifest and its layers.
    pub fn reload(&mut self, ctx: &egui::Context) {
        let request_id = self.loader.request(ctx.clone(), self.source.clone());
        log::info!(
            "Loading layers from {} (request #{})",
            self.source.base_path,
            request_id
        );
        self.status = LoadStatus::Loading;
    }

    /// Per-frame update. Returns how long until the session next needs a
    /// frame, if it is waiting on the stylesheet.
    pub fn update(&mut self, now: Instant, styles: &dyn StyleSource) -> Option<Duration> {
        if let Some(outcome) = self.loader.try_recv() {
            self.apply_load_outcome(outcome, now, styles);
        }

        let probe_class = &self.probe_class;
        let expected = self.expected_stroke;
        let step = self.gate.tick(now, || {
            styles
                .computed_style(probe_class)
                .is_some_and(|style| expected.map_or(true, |color| style.stroke == color))
        });

        match step {
            GateStep::Idle => None,
            GateStep::Waiting(delay) => Some(delay),
            GateStep::Transitioned(_) => {
                self.nodes.invalidate();
                self.present(styles);
                None
            }
        }
    }

    /// Takes in the result of a load.
    ///
    /// A failure leaves only the base layer; a non-empty success starts the
    /// readiness gate if it has not run yet.
    pub fn apply_load_outcome(
        &mut self,
        outcome: Result<Vec<LoadedLayer>, LayerError>,
        now: Instant,
        styles: &dyn StyleSource,
    ) {
        self.nodes.invalidate();
        match outcome {
            Ok(layers) => {
                log::info!("Loaded {} layer(s)", layers.len());
                self.status = LoadStatus::Loaded(layers.len());
                self.layers = layers.into_iter().map(Rc::new).collect();
                self.present(styles);
                if !self.layers.is_empty() {
                    self.gate.begin(now);
                }
            }
            Err(e) => {
                log::error!("Error loading layers: {}", e);
                self.status = LoadStatus::Failed(e.to_string());
                self.layers.clear();
                self.present(styles);
            }
        }
    }

    fn present(&mut self, styles: &dyn StyleSource) {
        self.overlays = present_overlays(
            &self.layers,
            self.gate.generation(),
            &self.resolver,
            styles,
        );
        self.toggles.sync(&self.overlays);
        self.nodes.retain_overlays(&self.overlays);
    }

    /// Draws the overlays the user has switched on.
    pub fn render(&mut self, painter: &Painter, projection: &MapProjection, show_labels: bool) {
        let toggles = &self.toggles;
        let visible = self
            .overlays
            .iter()
            .filter(|o| toggles.is_visible(o.layer_id()));
        render_overlays(painter, projection, visible, &mut self.nodes, show_labels);
    }

    /// Presented overlays in manifest order.
    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    #[cfg(test)]
    pub fn toggles(&self) -> &LayerToggles {
        &self.toggles
    }

    pub fn toggles_mut(&mut self) -> &mut LayerToggles {
        &mut self.toggles
    }

    /// Puts every overlay back to its manifest default.
    pub fn reset_toggles(&mut self) {
        self.toggles.reset(&self.overlays);
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn readiness(&self) -> &ReadinessGate {
        &self.gate
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    /// One-line summary for the status bar.
    pub fn status_message(&self) -> String {
        match &self.status {
            LoadStatus::Idle => "Ready".to_string(),
            LoadStatus::Loading => "Loading layers...".to_string(),
            LoadStatus::Loaded(0) => "No overlay layers".to_string(),
            LoadStatus::Loaded(n) if self.gate.is_ready() => format!("{} layer(s) loaded", n),
            LoadStatus::Loaded(n) => format!("{} layer(s) loaded, waiting for styles", n),
            LoadStatus::Failed(e) => format!("Overlays unavailable: {}", e),
        }
    }

    #[cfg(test)]
    fn nodes_mut(&mut self) -> &mut NodeCache {
        &mut self.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::testing::MemoryFetcher;
    use crate::layers::{fetch_layers, load_manifest};
    use crate::readiness::ReadyReason;
    use crate::style::{BuiltinStyleSheet, ComputedStyle, StyleMode};
    use std::cell::Cell;

    const INDEX: &str = r#"{"layers": [
        {"id": "buildings", "file": "buildings.json", "type": "polygon", "defaultShown": true},
        {"id": "paths", "file": "paths.json", "type": "line", "defaultShown": false}
    ]}"#;
    const BUILDINGS: &str = r#"{"type": "FeatureCollection", "features": [{
        "type": "Feature",
        "properties": {"name": "Library"},
        "geometry": {"type": "Polygon", "coordinates": [[
            [-81.849, 28.147], [-81.848, 28.147], [-81.848, 28.148], [-81.849, 28.147]
        ]]}
    }]}"#;
    const PATHS: &str = r#"{"type": "LineString", "coordinates": [[-81.849, 28.147], [-81.848, 28.148]]}"#;

    /// A stylesheet that only takes effect once switched on.
    struct LateSheet {
        active: Cell<bool>,
        sheet: BuiltinStyleSheet,
    }

    impl StyleSource for LateSheet {
        fn computed_style(&self, class_name: &str) -> Option<ComputedStyle> {
            if self.active.get() {
                self.sheet.computed_style(class_name)
            } else {
                None
            }
        }
    }

    fn load(fetcher: &MemoryFetcher) -> Result<Vec<LoadedLayer>, LayerError> {
        pollster::block_on(async {
            let manifest = load_manifest(fetcher, "/d", "index.json").await?;
            fetch_layers(fetcher, "/d", &manifest).await
        })
    }

    fn campus_fetcher() -> MemoryFetcher {
        MemoryFetcher::new()
            .with("/d/index.json", 200, INDEX, 0)
            .with("/d/buildings.json", 200, BUILDINGS, 3)
            .with("/d/paths.json", 200, PATHS, 0)
    }

    fn session() -> MapSession {
        MapSession::new(&MapConfig::default())
    }

    #[test]
    fn test_load_presents_overlays_in_manifest_order() {
        let mut session = session();
        let styles = BuiltinStyleSheet::campus();
        session.apply_load_outcome(load(&campus_fetcher()), Instant::now(), &styles);

        let names: Vec<&str> = session.overlays().iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Buildings", "Paths"]);
        assert!(session.toggles().is_visible("buildings"));
        assert!(!session.toggles().is_visible("paths"));
        assert_eq!(session.overlays()[0].paint.stroke, Color32::RED);
        assert_eq!(session.status(), &LoadStatus::Loaded(2));
    }

    #[test]
    fn test_failed_load_leaves_base_layer_only() {
        let mut session = session();
        let styles = BuiltinStyleSheet::campus();
        session.apply_load_outcome(load(&campus_fetcher()), Instant::now(), &styles);

        let fetcher = MemoryFetcher::new()
            .with("/d/index.json", 200, INDEX, 0)
            .with("/d/buildings.json", 200, BUILDINGS, 0);
        session.apply_load_outcome(load(&fetcher), Instant::now(), &styles);

        assert!(session.overlays().is_empty());
        assert!(matches!(session.status(), LoadStatus::Failed(_)));
        assert!(session.status_message().contains("paths"));
    }

    #[test]
    fn test_regeneration_after_stylesheet_activates() {
        let mut session = session();
        let styles = LateSheet {
            active: Cell::new(false),
            sheet: BuiltinStyleSheet::campus(),
        };
        let start = Instant::now();
        session.apply_load_outcome(load(&campus_fetcher()), start, &styles);

        // Unstyled classes fall back to the default paint
        assert_eq!(session.overlays()[0].paint.stroke, Color32::BLACK);
        let before: Vec<Overlay> = session.overlays().to_vec();
        session.toggles_mut().set_visible("paths", true);
        session.nodes_mut().get_or_build(&before[0]);

        assert_eq!(session.update(start, &styles), Some(Duration::from_millis(100)));
        assert_eq!(session.readiness().generation(), 0);

        styles.active.set(true);
        let later = start + Duration::from_millis(100);
        assert_eq!(session.update(later, &styles), None);
        assert_eq!(
            session.readiness().phase(),
            crate::readiness::ReadinessPhase::Ready(ReadyReason::Confirmed)
        );
        assert_eq!(session.readiness().generation(), 1);

        let after = session.overlays();
        assert_eq!(before.len(), after.len());
        for (old, new) in before.iter().zip(after) {
            assert_ne!(old.key, new.key);
            assert_eq!(old.name, new.name);
            assert_eq!(old.default_visible, new.default_visible);
        }
        assert_eq!(after[0].paint.stroke, Color32::RED);
        assert!(!session.nodes_mut().contains(&before[0].key));
        assert!(session.toggles().is_visible("paths"));

        // The gate never fires again
        session.apply_load_outcome(load(&campus_fetcher()), later, &styles);
        assert_eq!(session.update(later + Duration::from_secs(5), &styles), None);
        assert_eq!(session.readiness().generation(), 1);
        assert_eq!(session.overlays()[0].key.generation, 1);
    }

    #[test]
    fn test_stylesheet_never_loads() {
        let mut config = MapConfig::default();
        config.style_mode = StyleMode::Inline;
        let mut session = MapSession::new(&config);
        let styles = BuiltinStyleSheet::empty();
        let start = Instant::now();
        session.apply_load_outcome(load(&campus_fetcher()), start, &styles);

        let mut now = start;
        while session.update(now, &styles).is_some() {
            now += Duration::from_millis(100);
        }
        assert_eq!(
            session.readiness().phase(),
            crate::readiness::ReadinessPhase::Ready(ReadyReason::TimedOut)
        );
        assert!(now.duration_since(start) >= Duration::from_secs(2));
        assert_eq!(session.readiness().generation(), 1);
        assert_eq!(session.overlays()[0].paint.stroke, Color32::RED);
    }

    #[test]
    fn test_empty_manifest_skips_gate() {
        let mut session = session();
        let styles = BuiltinStyleSheet::campus();
        session.apply_load_outcome(Ok(Vec::new()), Instant::now(), &styles);
        assert!(session.overlays().is_empty());
        assert_eq!(session.update(Instant::now(), &styles), None);
        assert_eq!(session.readiness().generation(), 0);
        assert_eq!(session.status_message(), "No overlay layers");
    }
}
