//! Access to the external style system.
//!
//! Layer paint in class mode, and the readiness probe, both read the
//! *effect* of the stylesheet: what a class actually resolves to right now.
//! On WASM that is the computed style of a hidden probe element in the page;
//! on native there is no page, so a built-in stylesheet stands in.

use super::resolver::{class_name_for, inline_style, PaintStyle};
use eframe::egui::Color32;
use std::collections::HashMap;

/// Paint properties a class resolves to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputedStyle {
    pub stroke: Color32,
    pub stroke_width: Option<f32>,
    pub fill: Option<Color32>,
    pub fill_opacity: Option<f32>,
}

impl ComputedStyle {
    /// Converts to paint, taking missing properties from `fallback`.
    ///
    /// A missing fill takes the stroke color.
    pub fn to_paint(&self, fallback: PaintStyle) -> PaintStyle {
        PaintStyle {
            stroke: self.stroke,
            weight: self.stroke_width.unwrap_or(fallback.weight),
            fill: self.fill.unwrap_or(self.stroke),
            fill_opacity: self.fill_opacity.unwrap_or(fallback.fill_opacity),
        }
    }
}

impl From<PaintStyle> for ComputedStyle {
    fn from(paint: PaintStyle) -> Self {
        Self {
            stroke: paint.stroke,
            stroke_width: Some(paint.weight),
            fill: Some(paint.fill),
            fill_opacity: Some(paint.fill_opacity),
        }
    }
}

/// Reads what a style class currently resolves to.
pub trait StyleSource {
    /// Returns `None` when no rule for the class is in effect (yet).
    fn computed_style(&self, class_name: &str) -> Option<ComputedStyle>;
}

/// A fixed in-memory stylesheet, active from the start.
#[derive(Debug, Clone, Default)]
pub struct BuiltinStyleSheet {
    rules: HashMap<String, ComputedStyle>,
}

impl BuiltinStyleSheet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rules for the campus layers, matching the inline table.
    pub fn campus() -> Self {
        ["buildings", "paths", "parking_lots"]
            .into_iter()
            .fold(Self::empty(), |sheet, id| {
                sheet.with_rule(&class_name_for(id), inline_style(id).into())
            })
    }

    pub fn with_rule(mut self, class_name: &str, style: ComputedStyle) -> Self {
        self.rules.insert(class_name.to_string(), style);
        self
    }
}

impl StyleSource for BuiltinStyleSheet {
    fn computed_style(&self, class_name: &str) -> Option<ComputedStyle> {
        self.rules.get(class_name).copied()
    }
}

/// Reads computed styles from the hosting page.
///
/// Each query attaches a zero-size, hidden, absolutely positioned element
/// carrying the class, reads `getComputedStyle`, and removes it again.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct DomStyleSource;

#[cfg(target_arch = "wasm32")]
impl DomStyleSource {
    const PROBE_STYLE: &'static str = "position:absolute;left:0;top:0;width:0;height:0;\
        overflow:hidden;visibility:hidden;pointer-events:none;contain:strict;";
}

#[cfg(target_arch = "wasm32")]
impl StyleSource for DomStyleSource {
    fn computed_style(&self, class_name: &str) -> Option<ComputedStyle> {
        use super::css::{parse_css_color, parse_css_length, parse_css_opacity};

        let window = web_sys::window()?;
        let document = window.document()?;
        let body = document.body()?;

        let probe = document.create_element("div").ok()?;
        probe.set_attribute("class", class_name).ok()?;
        probe.set_attribute("style", Self::PROBE_STYLE).ok()?;
        probe.set_attribute("aria-hidden", "true").ok()?;
        body.append_child(&probe).ok()?;

        let declaration = window.get_computed_style(&probe).ok().flatten();
        let computed = declaration.and_then(|decl| {
            let read = |name: &str| decl.get_property_value(name).ok();
            let stroke = read("stroke").as_deref().and_then(parse_css_color)?;
            Some(ComputedStyle {
                stroke,
                stroke_width: read("stroke-width").as_deref().and_then(parse_css_length),
                fill: read("fill").as_deref().and_then(parse_css_color),
                fill_opacity: read("fill-opacity").as_deref().and_then(parse_css_opacity),
            })
        });

        probe.remove();
        computed
    }
}

/// The style source of the running application on this platform.
#[cfg(target_arch = "wasm32")]
pub fn platform_style_source() -> Box<dyn StyleSource> {
    Box::new(DomStyleSource)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn platform_style_source() -> Box<dyn StyleSource> {
    Box::new(BuiltinStyleSheet::campus())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_sheet_lookup() {
        let sheet = BuiltinStyleSheet::campus();
        let style = sheet.computed_style("layer-buildings").unwrap();
        assert_eq!(style.stroke, Color32::RED);
        assert!(sheet.computed_style("layer-unknown").is_none());
        assert!(sheet.computed_style("buildings").is_none());
    }

    #[test]
    fn test_to_paint_fills_gaps_from_fallback() {
        let computed = ComputedStyle {
            stroke: Color32::BLUE,
            stroke_width: None,
            fill: None,
            fill_opacity: None,
        };
        let paint = computed.to_paint(PaintStyle::DEFAULT);
        assert_eq!(paint.stroke, Color32::BLUE);
        assert_eq!(paint.fill, Color32::BLUE);
        assert_eq!(paint.weight, PaintStyle::DEFAULT.weight);
        assert_eq!(paint.fill_opacity, PaintStyle::DEFAULT.fill_opacity);
    }
}
