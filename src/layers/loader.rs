//! Concurrent layer fetching.
//!
//! Every manifest entry is fetched at once and the batch is all-or-nothing:
//! the first failing entry aborts the load so a partial layer set is never
//! presented.

use super::error::LayerError;
use super::fetch::{resource_path, ResourceFetcher};
use super::manifest::{LayerManifest, LayerManifestEntry};
use crate::geo::GeometryCollection;
use futures_util::future::try_join_all;

/// A manifest entry together with its parsed geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedLayer {
    pub id: String,
    pub data: GeometryCollection,
    pub layer_type: String,
    pub default_shown: bool,
}

/// Fetches and parses the payload of a single entry.
pub async fn fetch_layer<F: ResourceFetcher>(
    fetcher: &F,
    base_path: &str,
    entry: &LayerManifestEntry,
) -> Result<LoadedLayer, LayerError> {
    let path = resource_path(base_path, &entry.file);

    let response = fetcher
        .fetch(&path)
        .await
        .map_err(|e| LayerError::LayerUnavailable {
            id: entry.id.clone(),
            status: 0,
            reason: e,
        })?;

    if !response.is_success() {
        return Err(LayerError::LayerUnavailable {
            id: entry.id.clone(),
            status: response.status,
            reason: format!("{} returned an error status", path),
        });
    }

    let data = GeometryCollection::parse(&response.body).map_err(|e| {
        LayerError::LayerUnavailable {
            id: entry.id.clone(),
            status: response.status,
            reason: e,
        }
    })?;

    if data.is_empty() {
        log::warn!("Layer {} has no drawable features", entry.id);
    } else {
        log::debug!(
            "Loaded layer {} ({} features, bounds {:?})",
            entry.id,
            data.len(),
            data.bounds()
        );
    }

    Ok(LoadedLayer {
        id: entry.id.clone(),
        data,
        layer_type: entry.layer_type.clone(),
        default_shown: entry.default_shown,
    })
}

/// Fetches every layer of the manifest concurrently.
///
/// The result mirrors manifest order regardless of completion order. No
/// retries happen here; a failure is surfaced so the caller can offer a reload.
pub async fn fetch_layers<F: ResourceFetcher>(
    fetcher: &F,
    base_path: &str,
    manifest: &LayerManifest,
) -> Result<Vec<LoadedLayer>, LayerError> {
    try_join_all(
        manifest
            .layers
            .iter()
            .map(|entry| fetch_layer(fetcher, base_path, entry)),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::fetch::testing::MemoryFetcher;

    const POLYGON: &str = r#"{"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]}"#;
    const LINE: &str = r#"{"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]}"#;

    fn manifest(ids: &[&str]) -> LayerManifest {
        LayerManifest {
            layers: ids
                .iter()
                .enumerate()
                .map(|(i, id)| LayerManifestEntry {
                    id: id.to_string(),
                    file: format!("{}.json", id),
                    layer_type: "polygon".to_string(),
                    default_shown: i % 2 == 0,
                })
                .collect(),
        }
    }

    #[test]
    fn test_result_follows_manifest_order_not_completion_order() {
        // Earlier entries are slower, so they complete last
        let fetcher = MemoryFetcher::new()
            .with("/d/buildings.json", 200, POLYGON, 6)
            .with("/d/paths.json", 200, LINE, 3)
            .with("/d/parking_lots.json", 200, POLYGON, 0);
        let manifest = manifest(&["buildings", "paths", "parking_lots"]);

        let layers = pollster::block_on(fetch_layers(&fetcher, "/d", &manifest)).unwrap();

        assert_eq!(
            fetcher.completions(),
            vec!["/d/parking_lots.json", "/d/paths.json", "/d/buildings.json"]
        );
        let ids: Vec<&str> = layers.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["buildings", "paths", "parking_lots"]);
        assert!(layers[0].default_shown);
        assert!(!layers[1].default_shown);
        assert_eq!(layers[1].data.len(), 1);
    }

    #[test]
    fn test_all_fetches_start_before_any_completes() {
        let fetcher = MemoryFetcher::new()
            .with("/d/a.json", 200, LINE, 2)
            .with("/d/b.json", 200, LINE, 2);
        pollster::block_on(fetch_layers(&fetcher, "/d", &manifest(&["a", "b"]))).unwrap();
        assert_eq!(fetcher.requests(), vec!["/d/a.json", "/d/b.json"]);
    }

    #[test]
    fn test_single_failure_fails_batch() {
        let fetcher = MemoryFetcher::new()
            .with("/d/buildings.json", 200, POLYGON, 0)
            .with("/d/paths.json", 404, "", 0)
            .with("/d/parking_lots.json", 200, POLYGON, 0);

        let result = pollster::block_on(fetch_layers(
            &fetcher,
            "/d",
            &manifest(&["buildings", "paths", "parking_lots"]),
        ));

        match result {
            Err(LayerError::LayerUnavailable { id, status, .. }) => {
                assert_eq!(id, "paths");
                assert_eq!(status, 404);
            }
            other => panic!("expected layer failure, got {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_payload_is_layer_unavailable() {
        let fetcher = MemoryFetcher::new().with("/d/paths.json", 200, "{ broken", 0);
        let result = pollster::block_on(fetch_layers(&fetcher, "/d", &manifest(&["paths"])));
        assert!(matches!(
            result,
            Err(LayerError::LayerUnavailable { ref id, status: 200, .. }) if id == "paths"
        ));
    }

    #[test]
    fn test_empty_manifest_yields_empty_set() {
        let fetcher = MemoryFetcher::new();
        let layers =
            pollster::block_on(fetch_layers(&fetcher, "/d", &LayerManifest::default())).unwrap();
        assert!(layers.is_empty());
        assert!(fetcher.requests().is_empty());
    }
}
