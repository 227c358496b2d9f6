//! Parsing of computed CSS values.
//!
//! Browsers normalize computed colors to `rgb()`/`rgba()` and lengths to
//! pixels, so only those forms (plus hex for configuration values) are
//! handled.

use eframe::egui::Color32;

/// Parses a CSS color. `none`, `transparent` and unparseable values are `None`.
pub fn parse_css_color(value: &str) -> Option<Color32> {
    let value = value.trim().to_ascii_lowercase();

    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }

    let args = value
        .strip_prefix("rgba(")
        .or_else(|| value.strip_prefix("rgb("))?
        .strip_suffix(')')?;

    let parts: Vec<&str> = args
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();

    let channel = |s: &str| -> Option<u8> {
        s.parse::<f32>()
            .ok()
            .map(|v| v.round().clamp(0.0, 255.0) as u8)
    };

    match parts[..] {
        [r, g, b] => Some(Color32::from_rgb(channel(r)?, channel(g)?, channel(b)?)),
        [r, g, b, a] => {
            let alpha = parse_css_opacity(a)?;
            if alpha <= 0.0 {
                return None;
            }
            Some(Color32::from_rgba_unmultiplied(
                channel(r)?,
                channel(g)?,
                channel(b)?,
                (alpha * 255.0).round() as u8,
            ))
        }
        _ => None,
    }
}

/// Parses an opacity (`0.6` or `60%`) into 0.0 - 1.0.
pub fn parse_css_opacity(value: &str) -> Option<f32> {
    let value = value.trim();
    let parsed = match value.strip_suffix('%') {
        Some(percent) => percent.trim().parse::<f32>().ok()? / 100.0,
        None => value.parse::<f32>().ok()?,
    };
    Some(parsed.clamp(0.0, 1.0))
}

/// Parses a pixel length (`2px` or `2`).
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))] // Read from the DOM only
pub fn parse_css_length(value: &str) -> Option<f32> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    number.parse::<f32>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

fn parse_hex(hex: &str) -> Option<Color32> {
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let byte = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
    Some(Color32::from_rgb(byte(0)?, byte(2)?, byte(4)?))
}
