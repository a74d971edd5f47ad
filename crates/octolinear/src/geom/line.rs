use super::{tol, Point, Vector2D};

/// Infinite line through `anchor` with direction `angle` (radians).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    pub anchor: Point,
    pub angle: f64,
}

impl Line {
    #[inline]
    pub fn new(anchor: Point, angle: f64) -> Self {
        Self { anchor, angle }
    }

    /// Line through two distinct points; `None` if they coincide.
    pub fn through(a: Point, b: Point) -> Option<Self> {
        let d = b - a;
        if d.is_zero() {
            return None;
        }
        Some(Self::new(a, d.angle()))
    }

    #[inline]
    pub fn direction(&self) -> Vector2D {
        Vector2D::new(self.angle.cos(), self.angle.sin())
    }

    #[inline]
    pub fn point_on_line(&self, distance: f64) -> Point {
        self.anchor.offset(distance, self.angle)
    }

    /// Implicit form `A x + B y = C` with `(A, B)` of unit length.
    pub fn abc(&self) -> (f64, f64, f64) {
        let p1 = self.anchor;
        let p2 = self.point_on_line(1.0);
        let a = p2.y - p1.y;
        let b = p1.x - p2.x;
        (a, b, a * p1.x + b * p1.y)
    }

    /// Intersection point, or `None` when the lines are parallel (or identical).
    pub fn intersects_line(&self, other: &Line) -> Option<Point> {
        let (a1, b1, c1) = self.abc();
        let (a2, b2, c2) = other.abc();
        let det = a1 * b2 - a2 * b1;
        if det.abs() <= tol::PARALLEL_EPS {
            return None;
        }
        Some(Point::new(
            (b2 * c1 - b1 * c2) / det,
            (a1 * c2 - a2 * c1) / det,
        ))
    }

    pub fn distance_to_point(&self, p: &Point) -> f64 {
        let (a, b, c) = self.abc();
        (a * p.x + b * p.y - c).abs()
    }

    pub fn is_parallel_to(&self, other: &Line) -> bool {
        self.direction().cross(&other.direction()).abs() <= tol::PARALLEL_EPS
    }
}
