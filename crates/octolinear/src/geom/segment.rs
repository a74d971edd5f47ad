use super::{tol, Point, Polygon, Vector2D};

/// Closed segment between two endpoints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineSegment {
    pub a: Point,
    pub b: Point,
}

/// Outcome of a segment–segment intersection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SegmentIntersection {
    None,
    Point(Point),
    /// Collinear segments sharing a stretch of positive length (its two ends).
    CollinearOverlap(Point, Point),
}

impl LineSegment {
    #[inline]
    pub fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    #[inline]
    pub fn vector(&self) -> Vector2D {
        self.b - self.a
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.vector().magnitude()
    }

    /// Direction angle; `None` for a zero-length segment.
    pub fn angle(&self) -> Option<f64> {
        let v = self.vector();
        (!v.is_zero()).then(|| v.angle())
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.a == self.b
    }

    /// Intersection with `other`, endpoints included.
    ///
    /// Uses the `p + t r = q + u s` parametrization. Parallel non-collinear
    /// segments never meet; collinear ones meet in a point or an overlap.
    pub fn intersection(&self, other: &LineSegment) -> SegmentIntersection {
        let p = self.a;
        let q = other.a;
        let r = self.vector();
        let s = other.vector();
        if r.is_zero() {
            return if p.is_on_segment(other) {
                SegmentIntersection::Point(p)
            } else {
                SegmentIntersection::None
            };
        }
        if s.is_zero() {
            return if q.is_on_segment(self) {
                SegmentIntersection::Point(q)
            } else {
                SegmentIntersection::None
            };
        }
        let qp = q - p;
        let rxs = r.cross(&s);
        if rxs.abs() <= tol::PARALLEL_EPS * r.magnitude() * s.magnitude() {
            // Parallel: collinear iff q is on the carrier line of self.
            if qp.cross(&r).abs() / r.magnitude() > tol::ON_SEGMENT_EPS {
                return SegmentIntersection::None;
            }
            let rr = r.dot(&r);
            let t0 = qp.dot(&r) / rr;
            let t1 = t0 + s.dot(&r) / rr;
            let lo = t0.min(t1).max(0.0);
            let hi = t0.max(t1).min(1.0);
            let slack = tol::ON_SEGMENT_EPS / r.magnitude();
            if lo > hi + slack {
                return SegmentIntersection::None;
            }
            let start = p + r * lo;
            if (hi - lo) <= slack {
                return SegmentIntersection::Point(start);
            }
            return SegmentIntersection::CollinearOverlap(start, p + r * hi);
        }
        let t = qp.cross(&s) / rxs;
        let u = qp.cross(&r) / rxs;
        let slack = 1e-12;
        if (-slack..=1.0 + slack).contains(&t) && (-slack..=1.0 + slack).contains(&u) {
            SegmentIntersection::Point(p + r * t.clamp(0.0, 1.0))
        } else {
            SegmentIntersection::None
        }
    }

    /// Single crossing or touching point; collinear overlaps report `None`.
    pub fn intersects_line_segment(&self, other: &LineSegment) -> Option<Point> {
        match self.intersection(other) {
            SegmentIntersection::Point(p) => Some(p),
            _ => None,
        }
    }

    /// All points where this segment meets a ring of `poly`; overlaps contribute both ends.
    pub fn intersects_polygon(&self, poly: &Polygon) -> Vec<Point> {
        let mut out = Vec::new();
        for edge in poly.segments() {
            match self.intersection(&edge) {
                SegmentIntersection::None => {}
                SegmentIntersection::Point(p) => out.push(p),
                SegmentIntersection::CollinearOverlap(a, b) => {
                    out.push(a);
                    out.push(b);
                }
            }
        }
        out
    }
}
