//! Layer manifest: the index of overlays available for the map.

use super::error::LayerError;
use super::fetch::{resource_path, ResourceFetcher};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One overlay listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerManifestEntry {
    /// Unique layer identifier, e.g. `parking_lots`
    pub id: String,
    /// Payload path relative to the manifest's base path
    pub file: String,
    /// Geometry kind (informational only)
    #[serde(rename = "type", default)]
    pub layer_type: String,
    /// Whether the overlay starts switched on
    #[serde(rename = "defaultShown", default)]
    pub default_shown: bool,
}

/// Ordered list of overlays. Order is presentation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerManifest {
    pub layers: Vec<LayerManifestEntry>,
}

impl LayerManifest {
    /// Parses and validates a manifest document.
    pub fn parse(json: &str) -> Result<Self, LayerError> {
        let manifest: LayerManifest =
            serde_json::from_str(json).map_err(|e| LayerError::ManifestMalformed(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Checks that ids are present and unique and every entry names a file.
    pub fn validate(&self) -> Result<(), LayerError> {
        let mut seen = HashSet::new();
        for entry in &self.layers {
            if entry.id.trim().is_empty() {
                return Err(LayerError::ManifestMalformed(
                    "layer entry with empty id".to_string(),
                ));
            }
            if entry.file.trim().is_empty() {
                return Err(LayerError::ManifestMalformed(format!(
                    "layer {} has no file",
                    entry.id
                )));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(LayerError::ManifestMalformed(format!(
                    "duplicate layer id {}",
                    entry.id
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// Fetches `{base_path}/{manifest_file}` and parses it.
///
/// A transport failure is reported as `ManifestUnavailable` with status 0.
pub async fn load_manifest<F: ResourceFetcher>(
    fetcher: &F,
    base_path: &str,
    manifest_file: &str,
) -> Result<LayerManifest, LayerError> {
    let path = resource_path(base_path, manifest_file);
    log::debug!("Fetching layer index: {}", path);

    let response = match fetcher.fetch(&path).await {
        Ok(response) => response,
        Err(e) => {
            log::warn!("Layer index request failed: {}", e);
            return Err(LayerError::ManifestUnavailable { status: 0 });
        }
    };

    if !response.is_success() {
        return Err(LayerError::ManifestUnavailable {
            status: response.status,
        });
    }

    let manifest = LayerManifest::parse(&response.body)?;
    if manifest.is_empty() {
        log::warn!("Layer index {} lists no layers", path);
    } else {
        log::info!("Layer index lists {} layer(s)", manifest.len());
    }
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::fetch::testing::MemoryFetcher;

    const CAMPUS_INDEX: &str = r#"{
        "layers": [
            {"id": "buildings", "file": "buildings.json", "type": "polygon", "defaultShown": true},
            {"id": "paths", "file": "paths.json", "type": "line", "defaultShown": false}
        ]
    }"#;

    #[test]
    fn test_parse_preserves_order_and_fields() {
        let manifest = LayerManifest::parse(CAMPUS_INDEX).unwrap();
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.layers[0].id, "buildings");
        assert_eq!(manifest.layers[0].layer_type, "polygon");
        assert!(manifest.layers[0].default_shown);
        assert_eq!(manifest.layers[1].id, "paths");
        assert_eq!(manifest.layers[1].file, "paths.json");
        assert!(!manifest.layers[1].default_shown);
    }

    #[test]
    fn test_parse_rejects_duplicate_ids() {
        let json = r#"{"layers": [
            {"id": "paths", "file": "a.json", "type": "line", "defaultShown": true},
            {"id": "paths", "file": "b.json", "type": "line", "defaultShown": false}
        ]}"#;
        match LayerManifest::parse(json) {
            Err(LayerError::ManifestMalformed(msg)) => assert!(msg.contains("duplicate")),
            other => panic!("expected malformed manifest, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_non_manifest_json() {
        assert!(matches!(
            LayerManifest::parse(r#"{"layer": []}"#),
            Err(LayerError::ManifestMalformed(_))
        ));
        assert!(matches!(
            LayerManifest::parse("not json"),
            Err(LayerError::ManifestMalformed(_))
        ));
    }

    #[test]
    fn test_optional_fields_default() {
        let manifest =
            LayerManifest::parse(r#"{"layers": [{"id": "trees", "file": "trees.json"}]}"#)
                .unwrap();
        assert_eq!(manifest.layers[0].layer_type, "");
        assert!(!manifest.layers[0].default_shown);
    }

    #[test]
    fn test_load_manifest_fetches_once() {
        let fetcher = MemoryFetcher::new().with("/data/index.json", 200, CAMPUS_INDEX, 0);
        let manifest = pollster::block_on(load_manifest(&fetcher, "/data", "index.json")).unwrap();
        assert_eq!(manifest.len(), 2);
        assert_eq!(fetcher.requests(), vec!["/data/index.json".to_string()]);
    }

    #[test]
    fn test_load_manifest_reports_status() {
        let fetcher = MemoryFetcher::new().with("/data/index.json", 503, "", 0);
        let result = pollster::block_on(load_manifest(&fetcher, "/data", "index.json"));
        assert_eq!(result, Err(LayerError::ManifestUnavailable { status: 503 }));
    }

    #[test]
    fn test_load_manifest_transport_failure_is_status_zero() {
        let fetcher = MemoryFetcher::new().with_transport_error("/data/index.json", "offline");
        let result = pollster::block_on(load_manifest(&fetcher, "/data", "index.json"));
        assert_eq!(result, Err(LayerError::ManifestUnavailable { status: 0 }));
    }
}
