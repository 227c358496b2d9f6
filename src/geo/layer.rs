//! Overlay geometry parsed from GeoJSON payloads.

use geo_types::Coord;
use geojson::{Feature, GeoJson, Geometry, Value};

/// A single drawable feature.
///
/// Multi-geometries are flattened into one feature per part so the renderer
/// only deals with three shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoFeature {
    /// A marker (building entrance, bus stop, ...)
    Point(Coord<f64>, Option<String>),
    /// An open path (walkway, road centerline, ...)
    LineString(Vec<Coord<f64>>, Option<String>),
    /// A closed area. `rings[0]` is the exterior, the rest are holes.
    Polygon {
        rings: Vec<Vec<Coord<f64>>>,
        label: Option<String>,
    },
}

/// The geometry payload of one layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryCollection {
    pub features: Vec<GeoFeature>,
}

impl GeometryCollection {
    /// Parses a GeoJSON document (FeatureCollection, Feature or bare Geometry).
    pub fn parse(geojson_str: &str) -> Result<Self, String> {
        let geojson: GeoJson = geojson_str
            .parse()
            .map_err(|e| format!("Failed to parse GeoJSON: {}", e))?;

        let mut collection = Self::default();
        match geojson {
            GeoJson::FeatureCollection(fc) => {
                for feature in &fc.features {
                    collection.push_feature(feature);
                }
            }
            GeoJson::Feature(f) => collection.push_feature(&f),
            GeoJson::Geometry(g) => collection.push_geometry(&g, None),
        }

        Ok(collection)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Bounding box as (min_lon, min_lat, max_lon, max_lat), `None` if empty.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        let mut extend = |c: &Coord<f64>| {
            bounds = Some(match bounds {
                None => (c.x, c.y, c.x, c.y),
                Some((min_x, min_y, max_x, max_y)) => {
                    (min_x.min(c.x), min_y.min(c.y), max_x.max(c.x), max_y.max(c.y))
                }
            });
        };

        for feature in &self.features {
            match feature {
                GeoFeature::Point(c, _) => extend(c),
                GeoFeature::LineString(line, _) => line.iter().for_each(&mut extend),
                GeoFeature::Polygon { rings, .. } => rings.iter().flatten().for_each(&mut extend),
            }
        }

        bounds
    }

    fn push_feature(&mut self, feature: &Feature) {
        let label = feature
            .properties
            .as_ref()
            .and_then(|p| p.get("name").or_else(|| p.get("NAME")))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        if let Some(geometry) = &feature.geometry {
            self.push_geometry(geometry, label);
        }
    }

    fn push_geometry(&mut self, geometry: &Geometry, label: Option<String>) {
        match &geometry.value {
            Value::Point(position) => {
                if let Some(coord) = to_coord(position) {
                    self.features.push(GeoFeature::Point(coord, label));
                }
            }
            Value::MultiPoint(positions) => {
                for coord in positions.iter().filter_map(|p| to_coord(p)) {
                    self.features.push(GeoFeature::Point(coord, label.clone()));
                }
            }
            Value::LineString(positions) => self.push_line(positions, label),
            Value::MultiLineString(lines) => {
                for positions in lines {
                    self.push_line(positions, label.clone());
                }
            }
            Value::Polygon(rings) => self.push_polygon(rings, label),
            Value::MultiPolygon(polygons) => {
                for rings in polygons {
                    self.push_polygon(rings, label.clone());
                }
            }
            Value::GeometryCollection(geometries) => {
                for g in geometries {
                    self.push_geometry(g, label.clone());
                }
            }
        }
    }

    fn push_line(&mut self, positions: &[Vec<f64>], label: Option<String>) {
        let line = to_coords(positions);
        if line.len() >= 2 {
            self.features.push(GeoFeature::LineString(line, label));
        }
    }

    fn push_polygon(&mut self, rings: &[Vec<Vec<f64>>], label: Option<String>) {
        let rings: Vec<Vec<Coord<f64>>> = rings
            .iter()
            .map(|ring| to_coords(ring))
            .filter(|ring| ring.len() >= 3)
            .collect();
        if !rings.is_empty() {
            self.features.push(GeoFeature::Polygon { rings, label });
        }
    }
}

fn to_coord(position: &[f64]) -> Option<Coord<f64>> {
    match position {
        [x, y, ..] => Some(Coord { x: *x, y: *y }),
        _ => None,
    }
}

fn to_coords(positions: &[Vec<f64>]) -> Vec<Coord<f64>> {
    positions.iter().filter_map(|p| to_coord(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_collection_with_labels() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"name": "Library"},
                 "geometry": {"type": "Polygon", "coordinates": [[[-81.85, 28.14], [-81.84, 28.14], [-81.84, 28.15], [-81.85, 28.14]]]}},
                {"type": "Feature", "properties": null,
                 "geometry": {"type": "LineString", "coordinates": [[-81.85, 28.14], [-81.84, 28.15]]}}
            ]
        }"#;

        let collection = GeometryCollection::parse(json).unwrap();
        assert_eq!(collection.len(), 2);
        match &collection.features[0] {
            GeoFeature::Polygon { rings, label } => {
                assert_eq!(rings.len(), 1);
                assert_eq!(label.as_deref(), Some("Library"));
            }
            other => panic!("expected polygon, got {:?}", other),
        }
        assert!(matches!(collection.features[1], GeoFeature::LineString(_, None)));
    }

    #[test]
    fn test_named_paths_keep_labels() {
        let json = r#"{"type": "Feature", "properties": {"name": "Main Walk"},
            "geometry": {"type": "MultiLineString", "coordinates": [
                [[-81.85, 28.14], [-81.84, 28.15]],
                [[-81.84, 28.15], [-81.83, 28.15]]
            ]}}"#;
        let collection = GeometryCollection::parse(json).unwrap();
        assert_eq!(collection.len(), 2);
        for feature in &collection.features {
            match feature {
                GeoFeature::LineString(_, label) => {
                    assert_eq!(label.as_deref(), Some("Main Walk"))
                }
                other => panic!("expected line, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_multi_geometries_are_flattened() {
        let json = r#"{"type": "MultiLineString", "coordinates": [
            [[0.0, 0.0], [1.0, 1.0]],
            [[2.0, 2.0], [3.0, 3.0]],
            [[4.0, 4.0]]
        ]}"#;
        let collection = GeometryCollection::parse(json).unwrap();
        // The single-position line is dropped
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_bounds() {
        let json = r#"{"type": "MultiPoint", "coordinates": [[-81.85, 28.14], [-81.84, 28.15]]}"#;
        let collection = GeometryCollection::parse(json).unwrap();
        assert_eq!(collection.bounds(), Some((-81.85, 28.14, -81.84, 28.15)));
        assert_eq!(GeometryCollection::default().bounds(), None);
    }

    #[test]
    fn test_invalid_payload() {
        assert!(GeometryCollection::parse("{\"type\": \"Nope\"}").is_err());
        assert!(GeometryCollection::parse("<html>").is_err());
    }
}
