//! Overlay presentation.
//!
//! Turns the loaded layer set into the overlays shown on the map: one named,
//! independently toggleable overlay per layer, in manifest order, each with
//! resolved paint and a render-node key tied to the readiness generation.

use crate::layers::LoadedLayer;
use crate::style::{PaintStyle, StyleResolver, StyleSource};
use std::fmt;
use std::rc::Rc;

/// Identity of an overlay's render node.
///
/// Includes the generation so that a readiness transition yields new keys for
/// every overlay and no node built with pre-stylesheet paint survives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OverlayKey {
    pub layer_id: String,
    pub generation: u64,
}

impl fmt::Display for OverlayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.layer_id, self.generation)
    }
}

/// A toggleable overlay ready for the map canvas.
#[derive(Debug, Clone)]
pub struct Overlay {
    pub key: OverlayKey,
    /// Human-readable label for the layer control
    pub name: String,
    pub default_visible: bool,
    pub paint: PaintStyle,
    pub layer: Rc<LoadedLayer>,
}

impl Overlay {
    pub fn layer_id(&self) -> &str {
        &self.key.layer_id
    }
}

/// `parking_lots` -> `Parking Lots`.
pub fn format_layer_name(id: &str) -> String {
    id.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds overlays for the given layers at the given generation.
pub fn present_overlays(
    layers: &[Rc<LoadedLayer>],
    generation: u64,
    resolver: &StyleResolver,
    styles: &dyn StyleSource,
) -> Vec<Overlay> {
    layers
        .iter()
        .map(|layer| Overlay {
            key: OverlayKey {
                layer_id: layer.id.clone(),
                generation,
            },
            name: format_layer_name(&layer.id),
            default_visible: layer.default_shown,
            paint: resolver.resolve(&layer.id).to_paint(styles),
            layer: Rc::clone(layer),
        })
        .collect()
}
