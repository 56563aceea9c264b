//! Point-in-polygon membership over normalized camera coordinates.

use serde::{Deserialize, Serialize};

use crate::error::GeometryConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Closed polygon with at least three vertices. The last vertex connects back
/// to the first.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    /// Validates vertex count and finiteness. `zone` is only used for error
    /// messages.
    pub fn new(zone: &str, vertices: Vec<Point>) -> Result<Self, GeometryConfigError> {
        if vertices.len() < 3 {
            return Err(GeometryConfigError::TooFewVertices {
                zone: zone.to_string(),
                count: vertices.len(),
            });
        }

        if let Some(index) = vertices
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(GeometryConfigError::NonFiniteVertex {
                zone: zone.to_string(),
                index,
            });
        }

        Ok(Self { vertices })
    }

    /// Builds a polygon from `[x1, y1, x2, y2, ...]`.
    pub fn from_flat(zone: &str, coords: &[f64]) -> Result<Self, GeometryConfigError> {
        if coords.len() % 2 != 0 {
            return Err(GeometryConfigError::OddCoordinateList {
                zone: zone.to_string(),
                len: coords.len(),
            });
        }

        let vertices = coords
            .chunks_exact(2)
            .map(|pair| Point::new(pair[0], pair[1]))
            .collect();
        Self::new(zone, vertices)
    }

    /// Iterates edges as `(start, end)`, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Ray casting towards +x. Horizontal edges never count, and an edge is
    /// crossed only when `min_y < y <= max_y`, so a point level with a vertex
    /// is attributed to exactly one of the two edges meeting there.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let mut inside = false;

        for (a, b) in self.edges() {
            if a.y == b.y {
                continue;
            }

            let (min_y, max_y) = if a.y < b.y { (a.y, b.y) } else { (b.y, a.y) };
            if y <= min_y || y > max_y {
                continue;
            }

            let x_cross = if a.x == b.x {
                a.x
            } else {
                (y - a.y) * (b.x - a.x) / (b.y - a.y) + a.x
            };

            if x <= x_cross {
                inside = !inside;
            }
        }

        inside
    }

    pub fn contains_point(&self, point: Point) -> bool {
        self.contains(point.x, point.y)
    }
}

pub fn contains(polygon: &Polygon, x: f64, y: f64) -> bool {
    polygon.contains(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(points: &[(f64, f64)]) -> Polygon {
        Polygon::new("test", points.iter().copied().map(Point::from).collect()).unwrap()
    }

    fn unit_square() -> Polygon {
        poly(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])
    }

    /// Non-zero winding number. For simple polygons this agrees with the
    /// parity rule everywhere off the boundary.
    fn winding_number(polygon: &Polygon, x: f64, y: f64) -> i32 {
        let mut wn = 0;
        for (a, b) in polygon.edges() {
            let cross = (b.x - a.x) * (y - a.y) - (x - a.x) * (b.y - a.y);
            if a.y <= y {
                if b.y > y && cross > 0.0 {
                    wn += 1;
                }
            } else if b.y <= y && cross < 0.0 {
                wn -= 1;
            }
        }
        wn
    }

    fn grid() -> impl Iterator<Item = (f64, f64)> {
        (0..80).flat_map(|i| {
            (0..80).map(move |j| (0.0031 + i as f64 * 0.0127, 0.0047 + j as f64 * 0.0131))
        })
    }

    #[test]
    fn rejects_degenerate_polygons() {
        let err = Polygon::new("desk", vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)])
            .unwrap_err();
        assert_eq!(
            err,
            GeometryConfigError::TooFewVertices {
                zone: "desk".into(),
                count: 2
            }
        );

        assert!(matches!(
            Polygon::from_flat("bed", &[0.1, 0.2, 0.3]),
            Err(GeometryConfigError::OddCoordinateList { len: 3, .. })
        ));

        assert!(matches!(
            Polygon::new(
                "bed",
                vec![Point::new(0.0, 0.0), Point::new(f64::NAN, 1.0), Point::new(1.0, 1.0)]
            ),
            Err(GeometryConfigError::NonFiniteVertex { index: 1, .. })
        ));
    }

    #[test]
    fn flat_list_matches_pairs() {
        let flat = Polygon::from_flat("desk", &[0.0, 0.0, 1.0, 0.0, 1.0, 1.0]).unwrap();
        let pairs = poly(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        assert_eq!(flat, pairs);
    }

    #[test]
    fn convex_polygon_agrees_with_winding_number() {
        let hexagon = poly(&[
            (0.3, 0.1),
            (0.7, 0.1),
            (0.9, 0.5),
            (0.7, 0.9),
            (0.3, 0.9),
            (0.1, 0.5),
        ]);
        for (x, y) in grid() {
            assert_eq!(
                hexagon.contains(x, y),
                winding_number(&hexagon, x, y) != 0,
                "mismatch at ({x}, {y})"
            );
        }
    }

    #[test]
    fn non_convex_polygon_agrees_with_winding_number() {
        // U shape opening upwards.
        let u_shape = poly(&[
            (0.1, 0.1),
            (0.9, 0.1),
            (0.9, 0.9),
            (0.7, 0.9),
            (0.7, 0.3),
            (0.3, 0.3),
            (0.3, 0.9),
            (0.1, 0.9),
        ]);
        for (x, y) in grid() {
            assert_eq!(
                u_shape.contains(x, y),
                winding_number(&u_shape, x, y) != 0,
                "mismatch at ({x}, {y})"
            );
        }
        assert!(!u_shape.contains(0.5, 0.6));
        assert!(u_shape.contains(0.2, 0.6));
        assert!(u_shape.contains(0.8, 0.6));
    }

    #[test]
    fn boundary_points_use_half_open_rule() {
        let square = unit_square();

        // Left edge out, right edge in.
        assert!(!square.contains(0.0, 0.5));
        assert!(square.contains(1.0, 0.5));
        // Bottom edge out (y must exceed the edge minimum), top edge in.
        assert!(!square.contains(0.5, 0.0));
        assert!(square.contains(0.5, 1.0));

        for _ in 0..10 {
            assert!(!square.contains(0.0, 0.5));
            assert!(square.contains(1.0, 0.5));
        }
    }

    #[test]
    fn ray_through_vertex_counts_once() {
        let diamond = poly(&[(0.5, 0.0), (1.0, 0.5), (0.5, 1.0), (0.0, 0.5)]);
        // The ray from (0.25, 0.5) passes exactly through the vertex (1.0, 0.5).
        assert!(diamond.contains(0.25, 0.5));
        assert!(diamond.contains(0.5, 0.5));
        assert!(!diamond.contains(-0.1, 0.5));
        assert!(!diamond.contains(1.1, 0.5));
    }

    #[test]
    fn free_function_matches_method() {
        let square = unit_square();
        assert_eq!(contains(&square, 0.5, 0.5), square.contains(0.5, 0.5));
        assert!(square.contains_point(Point::new(0.25, 0.75)));
    }
}
