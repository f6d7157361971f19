use crate::domain::agent::Position;
use serde::Serialize;
use std::str::FromStr;

const EPSILON: f64 = 1e-9;

/// Convex polygon in field coordinates
///
/// Construction through [`FromStr`] enforces convexity; [`Polygon::new`]
/// does not, and is meant for vertices that were already validated.
/// Polygons with fewer than three vertices are degenerate and contain no
/// points.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Polygon {
    vertices: Vec<Position>,
}

impl Polygon {
    pub fn new(vertices: Vec<Position>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Position] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Point-in-convex-polygon test, inclusive of edges and vertices
    ///
    /// The point is inside when it lies on the same side of every edge,
    /// which holds for either winding order.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        if self.vertices.len() < 3 {
            return false;
        }

        let mut sign = 0.0;
        for (a, b) in self.edges() {
            let cross = (b.x - a.x) * (y - a.y) - (b.y - a.y) * (x - a.x);
            if cross.abs() <= EPSILON {
                continue;
            }
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return false;
            }
        }
        true
    }

    /// True when every turn along the boundary goes the same way and the
    /// turns add up to a single revolution
    ///
    /// A self-intersecting star turns the same way at every vertex but
    /// winds around more than once.
    pub fn is_convex(&self) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }

        let mut sign = 0.0;
        let mut turning = 0.0;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let c = self.vertices[(i + 2) % n];
            let (ux, uy) = (b.x - a.x, b.y - a.y);
            let (vx, vy) = (c.x - b.x, c.y - b.y);
            let cross = ux * vy - uy * vx;
            turning += cross.atan2(ux * vx + uy * vy);
            if cross.abs() <= EPSILON {
                continue;
            }
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return false;
            }
        }
        sign != 0.0 && (turning.abs() - std::f64::consts::TAU).abs() < 1e-6
    }

    /// Vertex list in the `pts={x,y:x,y:...}` form
    pub fn pts_spec(&self) -> String {
        let pts: Vec<String> = self
            .vertices
            .iter()
            .map(|v| format!("{},{}", v.x, v.y))
            .collect();
        format!("pts={{{}}}", pts.join(":"))
    }

    fn edges(&self) -> impl Iterator<Item = (Position, Position)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

impl FromStr for Polygon {
    type Err = String;

    /// Parses `pts={0,-20:120,-20:120,-100:0,-100}`; the `pts=` prefix and
    /// the braces are optional. The polygon must be convex.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.trim();
        let body = body
            .strip_prefix("pts")
            .map(|rest| rest.trim_start().trim_start_matches('=').trim_start())
            .unwrap_or(body);
        let body = match (body.find('{'), body.rfind('}')) {
            (Some(open), Some(close)) if open < close => &body[open + 1..close],
            (None, None) => body,
            _ => return Err(format!("Unbalanced braces in polygon: {}", s)),
        };

        let mut vertices = Vec::new();
        for point in body.split(':').map(str::trim).filter(|p| !p.is_empty()) {
            let mut coords = point.split(',').map(str::trim);
            let (Some(x), Some(y)) = (coords.next(), coords.next()) else {
                return Err(format!("Bad polygon vertex: {}", point));
            };
            let x: f64 = x.parse().map_err(|_| format!("Bad polygon vertex: {}", point))?;
            let y: f64 = y.parse().map_err(|_| format!("Bad polygon vertex: {}", point))?;
            vertices.push(Position::new(x, y));
        }

        let polygon = Polygon::new(vertices);
        if !polygon.is_convex() {
            return Err(format!("Polygon is not convex: {}", s));
        }
        Ok(polygon)
    }
}
