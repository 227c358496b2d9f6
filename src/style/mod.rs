//! Overlay styling.
//!
//! Resolves layer ids to paint, either from a built-in table or from classes
//! of the hosting page's stylesheet.

mod css;
mod resolver;
mod source;

pub use css::parse_css_color;
pub use resolver::{PaintStyle, StyleMode, StyleResolver};
pub use source::{platform_style_source, StyleSource};

#[cfg(test)]
pub use source::{BuiltinStyleSheet, ComputedStyle};
