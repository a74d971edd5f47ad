use super::{LineSegment, Point, Ring};

/// Exterior ring plus holes.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub exterior: Ring,
    pub interiors: Vec<Ring>,
}

impl Polygon {
    pub fn new(exterior: Ring, interiors: Vec<Ring>) -> Self {
        Self {
            exterior,
            interiors,
        }
    }

    /// Hole-free polygon from its boundary points.
    pub fn from_points(points: Vec<Point>) -> Self {
        Self::new(Ring::new(points), Vec::new())
    }

    pub fn from_coordinates(exterior: &[[f64; 2]], holes: &[Vec<[f64; 2]>]) -> Self {
        Self::new(
            Ring::from_coordinates(exterior),
            holes.iter().map(|h| Ring::from_coordinates(h)).collect(),
        )
    }

    /// Exterior area minus hole areas.
    pub fn area(&self) -> f64 {
        self.exterior.area() - self.interiors.iter().map(Ring::area).sum::<f64>()
    }

    pub fn exterior_segments(&self) -> Vec<LineSegment> {
        self.exterior.segments()
    }

    /// Segments of every ring, exterior first.
    pub fn segments(&self) -> Vec<LineSegment> {
        let mut out = self.exterior.segments();
        for hole in &self.interiors {
            out.extend(hole.segments());
        }
        out
    }

    /// Distinct points where `seg` meets the boundary.
    pub fn intersections_with(&self, seg: &LineSegment) -> Vec<Point> {
        let mut out: Vec<Point> = Vec::new();
        for p in seg.intersects_polygon(self) {
            if !out.contains(&p) {
                out.push(p);
            }
        }
        out
    }

    /// Boundary-inclusive containment; points strictly inside a hole are outside.
    pub fn contains(&self, p: Point) -> bool {
        if p.is_on_any_segment(&self.segments()) {
            return true;
        }
        crossing_parity(self.exterior.points(), p)
            && !self
                .interiors
                .iter()
                .any(|h| crossing_parity(h.points(), p))
    }
}

/// Even-odd ray cast towards +x.
fn crossing_parity(ring: &[Point], p: Point) -> bool {
    let n = ring.len();
    let mut inside = false;
    for i in 0..n {
        let (a, b) = (ring[i], ring[(i + 1) % n]);
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < x {
                inside = !inside;
            }
        }
    }
    inside
}
