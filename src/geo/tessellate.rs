//! Polygon fill triangulation.
//!
//! Fills are tessellated once per render node, in a local frame anchored at
//! the polygon's first vertex. The local frame keeps `f32` vertices precise
//! at any zoom; each frame the vertices are mapped to screen space.

use super::projection::{MapProjection, TILE_SIZE};
use eframe::egui::epaint::{Vertex, WHITE_UV};
use eframe::egui::{Color32, Mesh};
use geo_types::Coord;
use lyon::math::point;
use lyon::path::Path;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers,
};

/// Local units per world unit: pixels at zoom 22.
const LOCAL_SCALE: f64 = TILE_SIZE * (1u64 << 22) as f64;

/// Triangles covering a polygon with holes (even-odd rule).
#[derive(Debug, Clone)]
pub struct FillTriangles {
    /// Anchor of the local frame, in world coordinates
    origin: Coord<f64>,
    vertices: Vec<[f32; 2]>,
    indices: Vec<u32>,
}

impl FillTriangles {
    /// Triangulates world-space rings; `rings[0]` is the exterior.
    ///
    /// Returns `None` for degenerate input or when tessellation fails.
    pub fn tessellate(rings: &[Vec<Coord<f64>>]) -> Option<Self> {
        let origin = *rings.first()?.first()?;
        let local = |c: &Coord<f64>| {
            point(
                ((c.x - origin.x) * LOCAL_SCALE) as f32,
                ((c.y - origin.y) * LOCAL_SCALE) as f32,
            )
        };

        let mut builder = Path::builder();
        for ring in rings {
            let ring = open_ring(ring);
            let Some((first, rest)) = ring.split_first() else {
                continue;
            };
            if rest.len() < 2 {
                continue;
            }
            builder.begin(local(first));
            for c in rest {
                builder.line_to(local(c));
            }
            builder.end(true);
        }
        let path = builder.build();

        let mut buffers: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
        let result = FillTessellator::new().tessellate_path(
            &path,
            &FillOptions::default().with_fill_rule(FillRule::EvenOdd),
            &mut BuffersBuilder::new(&mut buffers, |vertex: FillVertex| {
                let p = vertex.position();
                [p.x, p.y]
            }),
        );
        if let Err(e) = result {
            log::warn!("Failed to tessellate polygon fill: {:?}", e);
            return None;
        }
        if buffers.indices.is_empty() {
            return None;
        }

        Some(Self {
            origin,
            vertices: buffers.vertices,
            indices: buffers.indices,
        })
    }

    #[cfg(test)]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Places the triangles on screen in a single color.
    pub fn to_mesh(&self, projection: &MapProjection, color: Color32) -> Mesh {
        let vertices = self
            .vertices
            .iter()
            .map(|[x, y]| Vertex {
                pos: projection.world_to_screen(Coord {
                    x: self.origin.x + *x as f64 / LOCAL_SCALE,
                    y: self.origin.y + *y as f64 / LOCAL_SCALE,
                }),
                uv: WHITE_UV,
                color,
            })
            .collect();

        Mesh {
            indices: self.indices.clone(),
            vertices,
            ..Default::default()
        }
    }
}

/// GeoJSON rings repeat the first vertex at the end; the path closes itself.
fn open_ring(ring: &[Coord<f64>]) -> &[Coord<f64>] {
    match ring {
        [first, .., last] if first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::projection::geo_to_world;
    use eframe::egui::{Pos2, Rect, Vec2};

    fn world_ring(lonlat: &[(f64, f64)]) -> Vec<Coord<f64>> {
        lonlat
            .iter()
            .map(|&(x, y)| geo_to_world(Coord { x, y }))
            .collect()
    }

    fn view() -> MapProjection {
        MapProjection::new(
            Coord {
                x: -81.848,
                y: 28.148,
            },
            18.0,
            Rect::from_min_size(Pos2::ZERO, Vec2::new(1000.0, 800.0)),
        )
    }

    fn covers(mesh: &Mesh, p: Pos2) -> bool {
        let cross = |a: Pos2, b: Pos2| (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
        mesh.indices.chunks_exact(3).any(|tri| {
            let [a, b, c] = [0, 1, 2].map(|i| mesh.vertices[tri[i] as usize].pos);
            let (d1, d2, d3) = (cross(a, b), cross(b, c), cross(c, a));
            let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
            let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
            !(has_neg && has_pos)
        })
    }

    #[test]
    fn test_concave_fill_stays_inside_outline() {
        // L-shape with the upper-right quadrant cut out, starting at the
        // inner corner
        let ring = world_ring(&[
            (-81.848, 28.148),
            (-81.847, 28.148),
            (-81.847, 28.147),
            (-81.849, 28.147),
            (-81.849, 28.149),
            (-81.848, 28.149),
            (-81.848, 28.148),
        ]);
        let fill = FillTriangles::tessellate(&[ring]).unwrap();
        let projection = view();
        let mesh = fill.to_mesh(&projection, Color32::RED);

        let notch = projection.geo_to_screen(Coord {
            x: -81.8475,
            y: 28.1485,
        });
        let inside = projection.geo_to_screen(Coord {
            x: -81.8485,
            y: 28.1485,
        });
        assert!(!covers(&mesh, notch));
        assert!(covers(&mesh, inside));
        assert!(fill.triangle_count() >= 4);
    }

    #[test]
    fn test_holes_are_not_filled() {
        let exterior = world_ring(&[
            (-81.850, 28.146),
            (-81.846, 28.146),
            (-81.846, 28.150),
            (-81.850, 28.150),
            (-81.850, 28.146),
        ]);
        let hole = world_ring(&[
            (-81.849, 28.147),
            (-81.847, 28.147),
            (-81.847, 28.149),
            (-81.849, 28.149),
            (-81.849, 28.147),
        ]);
        let fill = FillTriangles::tessellate(&[exterior, hole]).unwrap();
        let projection = view();
        let mesh = fill.to_mesh(&projection, Color32::RED);

        let center = projection.geo_to_screen(Coord {
            x: -81.848,
            y: 28.148,
        });
        let band = projection.geo_to_screen(Coord {
            x: -81.8495,
            y: 28.148,
        });
        assert!(!covers(&mesh, center));
        assert!(covers(&mesh, band));
    }

    #[test]
    fn test_degenerate_rings() {
        assert!(FillTriangles::tessellate(&[]).is_none());
        let sliver = world_ring(&[(-81.848, 28.148), (-81.847, 28.148), (-81.848, 28.148)]);
        assert!(FillTriangles::tessellate(&[sliver]).is_none());
    }
}
