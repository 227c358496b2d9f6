//! Overlay rendering.
//!
//! Overlay geometry is projected into world coordinates once and kept in a
//! [`NodeCache`] keyed by overlay identity. Each frame only the cheap
//! world-to-screen transform runs.

use super::layer::{GeoFeature, GeometryCollection};
use super::projection::{geo_to_world, MapProjection};
use super::tessellate::FillTriangles;
use crate::presenter::{Overlay, OverlayKey};
use crate::style::PaintStyle;
use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Shape, Stroke};
use geo_types::Coord;
use std::collections::HashMap;

/// A feature in world coordinates.
#[derive(Debug, Clone)]
enum NodeShape {
    Point(Coord<f64>, Option<String>),
    Line(Vec<Coord<f64>>, Option<String>),
    Polygon {
        rings: Vec<Vec<Coord<f64>>>,
        /// Absent when the paint has no fill
        fill: Option<FillTriangles>,
        label: Option<String>,
    },
}

/// Pre-projected, styled geometry of one overlay.
#[derive(Debug, Clone)]
pub struct RenderNode {
    paint: PaintStyle,
    shapes: Vec<NodeShape>,
}

impl RenderNode {
    pub fn build(data: &GeometryCollection, paint: PaintStyle) -> Self {
        let shapes = data
            .features
            .iter()
            .map(|feature| match feature {
                GeoFeature::Point(c, label) => NodeShape::Point(geo_to_world(*c), label.clone()),
                GeoFeature::LineString(line, label) => {
                    NodeShape::Line(project(line), label.clone())
                }
                GeoFeature::Polygon { rings, label } => {
                    let rings: Vec<Vec<Coord<f64>>> = rings.iter().map(|r| project(r)).collect();
                    let fill = if paint.has_fill() {
                        FillTriangles::tessellate(&rings)
                    } else {
                        None
                    };
                    NodeShape::Polygon {
                        rings,
                        fill,
                        label: label.clone(),
                    }
                }
            })
            .collect();

        Self { paint, shapes }
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }
}

fn project(coords: &[Coord<f64>]) -> Vec<Coord<f64>> {
    coords.iter().map(|c| geo_to_world(*c)).collect()
}

/// Render nodes keyed by overlay identity.
#[derive(Debug, Default)]
pub struct NodeCache {
    nodes: HashMap<OverlayKey, RenderNode>,
}

impl NodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node for `overlay`, building it on first use.
    pub fn get_or_build(&mut self, overlay: &Overlay) -> &RenderNode {
        self.nodes.entry(overlay.key.clone()).or_insert_with(|| {
            let node = RenderNode::build(&overlay.layer.data, overlay.paint);
            log::debug!("Built render node {} ({} shapes)", overlay.key, node.shape_count());
            node
        })
    }

    /// Drops every cached node.
    pub fn invalidate(&mut self) {
        if !self.is_empty() {
            log::debug!("Invalidating {} render node(s)", self.len());
        }
        self.nodes.clear();
    }

    /// Drops nodes whose overlay is no longer presented.
    pub fn retain_overlays(&mut self, overlays: &[Overlay]) {
        self.nodes
            .retain(|key, _| overlays.iter().any(|o| &o.key == key));
    }

    #[cfg(test)]
    pub fn contains(&self, key: &OverlayKey) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Renders the visible overlays in order (first overlay at the bottom).
pub fn render_overlays<'a>(
    painter: &Painter,
    projection: &MapProjection,
    overlays: impl IntoIterator<Item = &'a Overlay>,
    cache: &mut NodeCache,
    show_labels: bool,
) {
    for overlay in overlays {
        let node = cache.get_or_build(overlay);
        render_node(painter, node, projection, show_labels);
    }
}

fn render_node(painter: &Painter, node: &RenderNode, projection: &MapProjection, labels: bool) {
    let stroke = Stroke::new(node.paint.weight, node.paint.stroke);
    let fill = node.paint.effective_fill();
    let clip = painter.clip_rect().expand(node.paint.weight + 8.0);

    for shape in &node.shapes {
        match shape {
            NodeShape::Point(world, label) => {
                let pos = projection.world_to_screen(*world);
                if !clip.contains(pos) {
                    continue;
                }
                painter.circle(pos, 4.0, fill_or_stroke(fill, node.paint), stroke);
                if labels {
                    draw_label(painter, pos, label.as_deref(), node.paint.stroke);
                }
            }
            NodeShape::Line(world, label) => {
                let points = to_screen(projection, world);
                if !intersects(&clip, &points) {
                    continue;
                }
                let mid = midpoint(&points);
                painter.add(Shape::line(points, stroke));
                if labels {
                    draw_label(painter, mid, label.as_deref(), node.paint.stroke);
                }
            }
            NodeShape::Polygon {
                rings,
                fill: triangles,
                label,
            } => {
                let Some(exterior) = rings.first() else {
                    continue;
                };
                let exterior = to_screen(projection, exterior);
                if !intersects(&clip, &exterior) {
                    continue;
                }

                if let Some(triangles) = triangles {
                    painter.add(Shape::mesh(triangles.to_mesh(projection, fill)));
                }
                painter.add(Shape::closed_line(exterior.clone(), stroke));
                for hole in &rings[1..] {
                    painter.add(Shape::closed_line(to_screen(projection, hole), stroke));
                }

                if labels {
                    draw_label(painter, centroid(&exterior), label.as_deref(), node.paint.stroke);
                }
            }
        }
    }
}

fn to_screen(projection: &MapProjection, world: &[Coord<f64>]) -> Vec<Pos2> {
    world.iter().map(|c| projection.world_to_screen(*c)).collect()
}

fn intersects(clip: &eframe::egui::Rect, points: &[Pos2]) -> bool {
    let bounds = eframe::egui::Rect::from_points(points);
    clip.intersects(bounds)
}

fn fill_or_stroke(fill: Color32, paint: PaintStyle) -> Color32 {
    if paint.has_fill() {
        fill
    } else {
        paint.stroke
    }
}

fn centroid(points: &[Pos2]) -> Pos2 {
    let sum = points
        .iter()
        .fold(eframe::egui::Vec2::ZERO, |acc, p| acc + p.to_vec2());
    (sum / points.len().max(1) as f32).to_pos2()
}

/// Point halfway along a polyline, by length.
fn midpoint(points: &[Pos2]) -> Pos2 {
    let total: f32 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
    let mut remaining = total / 2.0;
    for w in points.windows(2) {
        let length = w[0].distance(w[1]);
        if length >= remaining && length > 0.0 {
            return w[0].lerp(w[1], remaining / length);
        }
        remaining -= length;
    }
    points.first().copied().unwrap_or(Pos2::ZERO)
}

fn draw_label(painter: &Painter, pos: Pos2, label: Option<&str>, color: Color32) {
    if let Some(text) = label {
        painter.text(
            Pos2::new(pos.x + 5.0, pos.y - 5.0),
            Align2::LEFT_BOTTOM,
            text,
            FontId::proportional(11.0),
            color,
        );
    }
}
