use super::{tol, LineSegment, Point};
use crate::error::GeometryError;

/// Closed ring of points, read counter-clockwise.
///
/// A repeated closing point is dropped. Clockwise input is stored reversed;
/// `is_clockwise` and `signed_area` still describe the input orientation.
#[derive(Clone, Debug, PartialEq)]
pub struct Ring {
    points: Vec<Point>,
    reversed: bool,
}

impl Ring {
    pub fn new(mut points: Vec<Point>) -> Self {
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        let reversed = shoelace(&points) < 0.0;
        if reversed {
            points.reverse();
        }
        Self { points, reversed }
    }

    pub fn from_coordinates(coords: &[[f64; 2]]) -> Self {
        Self::new(coords.iter().copied().map(Point::from).collect())
    }

    /// Points in counter-clockwise order.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Orientation of the points as given to `new`.
    #[inline]
    pub fn is_clockwise(&self) -> bool {
        self.reversed
    }

    /// Shoelace area of the input orientation (negative for clockwise input).
    pub fn signed_area(&self) -> f64 {
        let a = shoelace(&self.points);
        if self.reversed {
            -a
        } else {
            a
        }
    }

    #[inline]
    pub fn area(&self) -> f64 {
        shoelace(&self.points).abs()
    }

    pub fn centroid(&self) -> Result<Point, GeometryError> {
        let area = shoelace(&self.points);
        if area.abs() < tol::AREA_EPS {
            return Err(GeometryError::DegenerateRing { area });
        }
        let (mut cx, mut cy) = (0.0, 0.0);
        for (p, q) in self.edges() {
            let w = p.x * q.y - q.x * p.y;
            cx += (p.x + q.x) * w;
            cy += (p.y + q.y) * w;
        }
        Ok(Point::new(cx / (6.0 * area), cy / (6.0 * area)))
    }

    /// Boundary segments, closing segment included.
    pub fn segments(&self) -> Vec<LineSegment> {
        self.edges().map(|(p, q)| LineSegment::new(p, q)).collect()
    }

    fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }
}

fn shoelace(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| {
            let (p, q) = (points[i], points[(i + 1) % n]);
            p.x * q.y - q.x * p.y
        })
        .sum();
    0.5 * twice
}
