//! URL query overrides for the map view.
//!
//! Recognized parameters: `data` (layer base path), `lat`, `lon`, `z`
//! (zoom) and `style` (`inline` or `class`).

use crate::style::StyleMode;

/// Parsed URL parameters.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UrlParams {
    pub data: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub zoom: Option<f64>,
    pub style: Option<StyleMode>,
}

/// Parses a query string with or without the leading `?`, running each value
/// through `decode` (percent-decoding in the browser).
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))] // Only the web build has a URL
pub fn parse_query(query: &str, decode: impl Fn(&str) -> String) -> UrlParams {
    let mut params = UrlParams::default();

    let query = query.trim_start_matches('?');
    if query.is_empty() {
        return params;
    }

    for pair in query.split('&') {
        let mut kv = pair.splitn(2, '=');
        let key = kv.next().unwrap_or("");
        let value = decode(kv.next().unwrap_or(""));
        let value = value.as_str();
        match key {
            "data" if !value.is_empty() => params.data = Some(value.to_string()),
            "lat" => params.lat = value.parse().ok().filter(|v: &f64| v.is_finite()),
            "lon" => params.lon = value.parse().ok().filter(|v: &f64| v.is_finite()),
            "z" => params.zoom = value.parse().ok().filter(|v: &f64| v.is_finite()),
            "style" => params.style = StyleMode::parse(value),
            _ => {}
        }
    }

    params
}

/// Parse URL query parameters from the current browser URL.
#[cfg(target_arch = "wasm32")]
pub fn parse_from_url() -> UrlParams {
    let search = web_sys::window().and_then(|w| w.location().search().ok());
    match search {
        Some(search) => parse_query(&search, decode_component),
        None => UrlParams::default(),
    }
}

/// `decodeURIComponent`, leaving malformed input as it was.
#[cfg(target_arch = "wasm32")]
fn decode_component(value: &str) -> String {
    match js_sys::decode_uri_component(value) {
        Ok(decoded) => decoded.into(),
        Err(_) => {
            log::warn!("Malformed URL parameter {:?}", value);
            value.to_string()
        }
    }
}

/// No-op stub for native builds.
#[cfg(not(target_arch = "wasm32"))]
pub fn parse_from_url() -> UrlParams {
    UrlParams::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verbatim(value: &str) -> String {
        value.to_string()
    }

    #[test]
    fn test_parse_query() {
        let params = parse_query(
            "?data=/maps/outdoors&lat=28.15&lon=-81.85&z=17.5&style=inline",
            verbatim,
        );
        assert_eq!(params.data.as_deref(), Some("/maps/outdoors"));
        assert_eq!(params.lat, Some(28.15));
        assert_eq!(params.lon, Some(-81.85));
        assert_eq!(params.zoom, Some(17.5));
        assert_eq!(params.style, Some(StyleMode::Inline));
    }

    #[test]
    fn test_bad_values_are_ignored() {
        let params = parse_query("lat=abc&z=NaN&data=&unknown=1&style=neon", verbatim);
        assert_eq!(params, UrlParams::default());
        assert_eq!(parse_query("", verbatim), UrlParams::default());
    }

    #[test]
    fn test_values_are_decoded() {
        let decode = |value: &str| value.replace("%2F", "/");
        let params = parse_query("?data=%2Fmaps%2Foutdoors&z=17", decode);
        assert_eq!(params.data.as_deref(), Some("/maps/outdoors"));
        assert_eq!(params.zoom, Some(17.0));
    }
}
