//! Overlay visibility state.

use crate::presenter::Overlay;
use std::collections::HashMap;

/// User visibility choices, keyed by layer id.
///
/// Keys are layer ids rather than overlay keys so a choice survives the
/// regeneration that follows stylesheet readiness.
#[derive(Debug, Default, Clone)]
pub struct LayerToggles {
    visible: HashMap<String, bool>,
}

impl LayerToggles {
    /// Seeds unseen layers with their default visibility and forgets layers
    /// that are no longer presented.
    pub fn sync(&mut self, overlays: &[Overlay]) {
        self.visible
            .retain(|id, _| overlays.iter().any(|o| o.layer_id() == id));
        for overlay in overlays {
            self.visible
                .entry(overlay.layer_id().to_string())
                .or_insert(overlay.default_visible);
        }
    }

    /// Restores every presented layer to its default visibility.
    pub fn reset(&mut self, overlays: &[Overlay]) {
        self.visible.clear();
        self.sync(overlays);
    }

    pub fn is_visible(&self, layer_id: &str) -> bool {
        self.visible.get(layer_id).copied().unwrap_or(false)
    }

    pub fn visible_mut(&mut self, layer_id: &str) -> Option<&mut bool> {
        self.visible.get_mut(layer_id)
    }

    #[cfg(test)]
    pub fn set_visible(&mut self, layer_id: &str, visible: bool) {
        if let Some(v) = self.visible.get_mut(layer_id) {
            *v = visible;
        }
    }
}
