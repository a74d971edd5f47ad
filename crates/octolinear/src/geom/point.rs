use std::ops::{Add, Sub};

use nalgebra::Vector2;

use super::{tol, LineSegment, Polygon, Vector2D};

/// Location in the plane. Equality is tolerance-based (`tol::POINT_EPS` per coordinate).
#[derive(Clone, Copy, Debug, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    #[inline]
    pub fn from_vector(v: Vector2<f64>) -> Self {
        Self::new(v.x, v.y)
    }

    #[inline]
    pub fn approx_eq(&self, other: &Point, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
    }

    #[inline]
    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.to_vector() - other.to_vector()).norm()
    }

    /// Euclidean distance to the closest point of `seg` (endpoints included).
    pub fn distance_to_segment(&self, seg: &LineSegment) -> f64 {
        let ab = seg.vector();
        let len2 = ab.dot(&ab);
        if len2 == 0.0 {
            return self.distance_to(&seg.a);
        }
        let t = (Vector2D::between(seg.a, *self).dot(&ab) / len2).clamp(0.0, 1.0);
        self.distance_to(&(seg.a + ab * t))
    }

    /// Point at `distance` along direction `angle`.
    pub fn offset(&self, distance: f64, angle: f64) -> Point {
        Point::new(self.x + distance * angle.cos(), self.y + distance * angle.sin())
    }

    #[inline]
    pub fn is_on_segment(&self, seg: &LineSegment) -> bool {
        self.distance_to_segment(seg) <= tol::ON_SEGMENT_EPS
    }

    pub fn is_on_any_segment(&self, segs: &[LineSegment]) -> bool {
        segs.iter().any(|s| self.is_on_segment(s))
    }

    /// Inside `poly` or on its boundary.
    #[inline]
    pub fn is_in_polygon(&self, poly: &Polygon) -> bool {
        poly.contains(*self)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other, tol::POINT_EPS)
    }
}

impl From<(f64, f64)> for Point {
    #[inline]
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

impl From<[f64; 2]> for Point {
    #[inline]
    fn from([x, y]: [f64; 2]) -> Self {
        Point::new(x, y)
    }
}

impl Sub for Point {
    type Output = Vector2D;
    #[inline]
    fn sub(self, rhs: Point) -> Vector2D {
        Vector2D::between(rhs, self)
    }
}

impl Add<Vector2D> for Point {
    type Output = Point;
    #[inline]
    fn add(self, v: Vector2D) -> Point {
        Point::new(self.x + v.dx(), self.y + v.dy())
    }
}
