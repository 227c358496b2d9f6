//! Layer id to style resolution.
//!
//! Two modes are supported:
//! - `Inline`: visual parameters come from a built-in table keyed by layer id.
//! - `ClassName`: the layer id maps to a stylesheet class (`parking_lots` ->
//!   `layer-parking-lots`) whose computed paint is read from the style source.
//!
//! Both are total: an unknown id always yields a usable style.

use super::source::StyleSource;
use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

/// Prefix of every layer class in the hosting stylesheet.
pub const LAYER_CLASS_PREFIX: &str = "layer-";

/// How layer styles are resolved.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleMode {
    /// Built-in color table
    Inline,
    /// External stylesheet classes
    #[default]
    ClassName,
}

impl StyleMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "inline" => Some(StyleMode::Inline),
            "class" | "class_name" | "classname" => Some(StyleMode::ClassName),
            _ => None,
        }
    }
}

/// Concrete paint parameters for an overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintStyle {
    /// Outline color
    pub stroke: Color32,
    /// Outline width in points
    pub weight: f32,
    /// Area fill color (before opacity)
    pub fill: Color32,
    /// Area fill opacity (0.0 - 1.0)
    pub fill_opacity: f32,
}

impl PaintStyle {
    /// Low-emphasis fallback: unknown layers stay visible but subordinate.
    pub const DEFAULT: PaintStyle = PaintStyle {
        stroke: Color32::BLACK,
        weight: 1.0,
        fill: Color32::BLACK,
        fill_opacity: 0.3,
    };

    pub const fn new(stroke: Color32, weight: f32, fill: Color32, fill_opacity: f32) -> Self {
        Self {
            stroke,
            weight,
            fill,
            fill_opacity,
        }
    }

    /// Fill color with the opacity applied, transparent when opacity is zero.
    pub fn effective_fill(&self) -> Color32 {
        let alpha = (self.fill_opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        let [r, g, b, _] = self.fill.to_array();
        Color32::from_rgba_unmultiplied(r, g, b, alpha)
    }

    pub fn has_fill(&self) -> bool {
        self.fill_opacity > 0.0
    }
}

/// Style assigned to a layer id.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleSpec {
    /// Paint computed locally
    Paint(PaintStyle),
    /// Paint supplied by the external stylesheet under this class
    Class(String),
}

impl StyleSpec {
    /// Resolves to concrete paint. A class without effective rules in the
    /// style source paints with [`PaintStyle::DEFAULT`].
    pub fn to_paint(&self, styles: &dyn StyleSource) -> PaintStyle {
        match self {
            StyleSpec::Paint(paint) => *paint,
            StyleSpec::Class(class_name) => styles
                .computed_style(class_name)
                .map(|computed| computed.to_paint(PaintStyle::DEFAULT))
                .unwrap_or(PaintStyle::DEFAULT),
        }
    }
}

/// Maps layer ids to styles.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StyleResolver {
    mode: StyleMode,
}

impl StyleResolver {
    pub fn new(mode: StyleMode) -> Self {
        Self { mode }
    }

    pub fn resolve(&self, id: &str) -> StyleSpec {
        match self.mode {
            StyleMode::Inline => StyleSpec::Paint(inline_style(id)),
            StyleMode::ClassName => StyleSpec::Class(class_name_for(id)),
        }
    }
}

/// Built-in paint table. Unmatched ids get [`PaintStyle::DEFAULT`].
pub fn inline_style(id: &str) -> PaintStyle {
    let purple = Color32::from_rgb(128, 0, 128);
    match id {
        "buildings" => PaintStyle::new(Color32::RED, 2.0, Color32::RED, 0.6),
        "paths" => PaintStyle::new(Color32::BLUE, 3.0, Color32::BLUE, 0.0),
        "parking_lots" => PaintStyle::new(purple, 2.0, purple, 0.6),
        _ => PaintStyle::DEFAULT,
    }
}

/// Stylesheet class for a layer id: word separators become `-`.
pub fn class_name_for(id: &str) -> String {
    let token: String = id
        .trim()
        .chars()
        .map(|c| if c == '_' || c.is_whitespace() { '-' } else { c })
        .collect();
    format!("{}{}", LAYER_CLASS_PREFIX, token)
}
