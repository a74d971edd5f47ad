//! One-sided contraction of a configuration.
//!
//! Moving the inner edge parallel to itself, with its endpoints sliding along
//! the two tracks, until it reaches the nearest candidate point on the chosen
//! side. The swept region decides blocking; the blocking number is the count of
//! candidate edges that cross into it.

use std::cmp::Ordering;
use std::f64::consts::FRAC_PI_2;

use crate::cfg::GeomCfg;
use crate::dcel::{EdgeSegment, HalfEdgeId, InflectionType, Subdivision, TopologyDelta};
use crate::error::TopologyError;
use crate::geom::{tol, Line, LineSegment, Point, Polygon};

use super::configuration::{Configuration, OuterEdge};

/// Side of the inner edge a contraction moves towards.
///
/// `Positive` moves into the inner edge's own face (its left), `Negative` into
/// the twin's face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Sign::Positive => Sign::Negative,
            Sign::Negative => Sign::Positive,
        }
    }
}

/// Why a contraction has no target point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoPoint {
    Unbuilt,
    /// The inner edge's face has fewer than three edges.
    MissingWindow,
    /// Zero-length inner edge.
    DegenerateInner,
    /// No candidate lies on the requested side.
    NoCandidate,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointSelection {
    Found(Point),
    NotFound(NoPoint),
}

impl PointSelection {
    #[inline]
    pub fn point(&self) -> Option<Point> {
        match *self {
            PointSelection::Found(p) => Some(p),
            PointSelection::NotFound(_) => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Contraction {
    sign: Sign,
    inner: HalfEdgeId,
    window: Option<[HalfEdgeId; 3]>,
    twin_window: Option<[HalfEdgeId; 3]>,
    /// Twins of `window`, in window order.
    window_twins: Option<[HalfEdgeId; 3]>,
    /// Inflection types of `[prev, next]`.
    outer_types: [InflectionType; 2],
    point: PointSelection,
    targets: Option<(Point, Point)>,
    area_points: Vec<Point>,
    area: f64,
    swept: Option<Polygon>,
    /// Sorted; never blocking.
    claimed: Vec<HalfEdgeId>,
    /// Outer edges of both windows; crossings on them do not block.
    outer_segments: Vec<LineSegment>,
    /// Sorted edges the blocking number counts over, one half per edge.
    candidates: Vec<HalfEdgeId>,
    blocking_number: usize,
    cfg: GeomCfg,
}

impl Contraction {
    pub(crate) fn unbuilt(inner: HalfEdgeId, sign: Sign, cfg: &GeomCfg) -> Self {
        Self {
            sign,
            inner,
            window: None,
            twin_window: None,
            window_twins: None,
            outer_types: [InflectionType::B; 2],
            point: PointSelection::NotFound(NoPoint::Unbuilt),
            targets: None,
            area_points: Vec::new(),
            area: 0.0,
            swept: None,
            claimed: Vec::new(),
            outer_segments: Vec::new(),
            candidates: Vec::new(),
            blocking_number: 0,
            cfg: *cfg,
        }
    }

    /// Compute point, swept region, and blocking number for `config` and `sign`.
    pub fn build(sub: &Subdivision, config: &Configuration, sign: Sign) -> Result<Self, TopologyError> {
        let cfg = config.cfg();
        let mut c = Self::unbuilt(config.inner(), sign, cfg);
        let Some(window) = config.window() else {
            c.point = PointSelection::NotFound(NoPoint::MissingWindow);
            tracing::trace!(edge = %c.inner, ?sign, "no window");
            return Ok(c);
        };
        let [prev, inner, next] = window;
        c.window = Some(window);
        c.twin_window = config.twin_window(sub)?;
        c.window_twins = Some([sub.twin(prev)?, sub.twin(inner)?, sub.twin(next)?]);
        c.outer_types = [
            sub.inflection_type(prev, cfg.eps_angle)?,
            sub.inflection_type(next, cfg.eps_angle)?,
        ];

        let mut claimed: Vec<HalfEdgeId> = Vec::with_capacity(12);
        for e in window.into_iter().chain(c.twin_window.into_iter().flatten()) {
            claimed.push(e);
            claimed.push(sub.twin(e)?);
        }
        claimed.sort_unstable();
        claimed.dedup();
        c.claimed = claimed;

        c.point = select_point(sub, config, sign)?;
        let (Some(p), Some(inner_angle)) = (c.point.point(), sub.angle(inner)?) else {
            return Ok(c);
        };

        let mut outer = vec![prev, next];
        if let Some([tp, _, tn]) = c.twin_window {
            outer.extend([tp, tn]);
        }
        c.outer_segments = outer
            .iter()
            .map(|&e| sub.segment(e))
            .collect::<Result<_, _>>()?;

        let a = sub.tail_point(prev)?;
        let d = sub.head_point(next)?;
        let sweep = Sweep {
            p,
            a,
            b: sub.tail_point(inner)?,
            c: sub.head_point(inner)?,
            d,
            prev_segment: sub.segment(prev)?,
            inner_line: Line::new(p, inner_angle),
            track_prev: config.get_track(sub, OuterEdge::Prev)?,
            track_next: config.get_track(sub, OuterEdge::Next)?,
            eps: cfg.eps_point,
        };
        c.area_points = sweep.area_points();
        c.targets = sweep.targets();
        if c.area_points.len() >= 3 {
            let polygon = Polygon::from_points(c.area_points.clone());
            c.area = polygon.area();
            if c.area > cfg.eps_area {
                c.swept = Some(polygon);
            }
        }

        c.candidates = c.blocking_candidates(sub)?;
        c.blocking_number = c.recompute_blocking_number(sub)?;
        tracing::trace!(
            edge = %inner,
            ?sign,
            x = p.x,
            y = p.y,
            area = c.area,
            blocking = c.blocking_number,
            "built contraction"
        );
        Ok(c)
    }

    #[inline]
    pub fn sign(&self) -> Sign {
        self.sign
    }

    #[inline]
    pub fn inner(&self) -> HalfEdgeId {
        self.inner
    }

    /// `[prev, inner, next]` captured at build time.
    #[inline]
    pub fn window(&self) -> Option<[HalfEdgeId; 3]> {
        self.window
    }

    #[inline]
    pub fn twin_window(&self) -> Option<[HalfEdgeId; 3]> {
        self.twin_window
    }

    /// New positions for the tail and head of the inner edge.
    #[inline]
    pub fn targets(&self) -> Option<(Point, Point)> {
        self.targets
    }

    #[inline]
    pub fn point(&self) -> PointSelection {
        self.point
    }

    /// Boundary of the swept region, consecutive duplicates removed.
    pub fn area_points(&self) -> &[Point] {
        &self.area_points
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.area
    }

    /// The swept region, when its area exceeds `eps_area`.
    pub fn swept_polygon(&self) -> Option<&Polygon> {
        self.swept.as_ref()
    }

    #[inline]
    pub fn blocking_number(&self) -> usize {
        self.blocking_number
    }

    /// Inflection types of `[prev, next]` at build time.
    #[inline]
    pub fn outer_types(&self) -> [InflectionType; 2] {
        self.outer_types
    }

    pub fn candidates(&self) -> &[HalfEdgeId] {
        &self.candidates
    }

    /// A point exists and the move sweeps no area or nothing blocks it.
    pub fn is_feasible(&self) -> bool {
        self.point.point().is_some()
            && (self.area <= self.cfg.eps_area || self.blocking_number == 0)
    }

    /// Same inner edge, opposite sign.
    pub fn is_complementary(&self, other: &Contraction) -> bool {
        self.inner == other.inner && self.sign != other.sign
    }

    /// Whether `edge`'s current geometry obstructs this contraction.
    ///
    /// Edges of either window (and their twins) never block.
    pub fn is_blocked_by(&self, sub: &Subdivision, edge: HalfEdgeId) -> Result<bool, TopologyError> {
        if self.is_claimed(edge) {
            return Ok(false);
        }
        Ok(self.blocks(edge, &sub.segment(edge)?))
    }

    #[inline]
    fn is_claimed(&self, edge: HalfEdgeId) -> bool {
        self.claimed.binary_search(&edge).is_ok()
    }

    fn blocks(&self, edge: HalfEdgeId, seg: &LineSegment) -> bool {
        if self.is_claimed(edge) {
            return false;
        }
        let Some(poly) = &self.swept else {
            return false;
        };
        if poly.contains(seg.a) && poly.contains(seg.b) {
            return true;
        }
        seg.intersects_polygon(poly)
            .iter()
            .any(|x| !x.is_on_any_segment(&self.outer_segments))
    }

    /// Boundary edges of the faces on both sides of the inner edge, minus
    /// the claimed ones.
    ///
    /// Each undirected edge appears once, as its lower-numbered half, so an edge
    /// bounding both faces is counted once.
    pub fn blocking_candidates(&self, sub: &Subdivision) -> Result<Vec<HalfEdgeId>, TopologyError> {
        let mut faces = vec![sub.face_of(self.inner)?, sub.face_of(sub.twin(self.inner)?)?];
        faces.dedup();
        let mut out = Vec::new();
        for f in faces {
            for e in sub.face_boundary(f)? {
                if !self.is_claimed(e) {
                    out.push(e.min(sub.twin(e)?));
                }
            }
        }
        out.sort_unstable();
        out.dedup();
        Ok(out)
    }

    /// Count blocking candidates against the current geometry.
    pub fn recompute_blocking_number(&self, sub: &Subdivision) -> Result<usize, TopologyError> {
        let mut count = 0;
        for &e in &self.candidates {
            if sub.contains_half_edge(e) && self.blocks(e, &sub.segment(e)?) {
                count += 1;
            }
        }
        Ok(count)
    }

    fn count_blocking(&self, edges: &[EdgeSegment]) -> usize {
        edges
            .iter()
            .filter(|s| self.candidates.binary_search(&s.edge).is_ok())
            .filter(|s| self.blocks(s.edge, &s.segment))
            .count()
    }

    /// Subtract the blockers among `edges` (segments as they were).
    pub fn decrement_blocking_number(&mut self, edges: &[EdgeSegment]) {
        if self.blocking_number == 0 {
            return;
        }
        let n = self.count_blocking(edges);
        self.blocking_number = self.blocking_number.saturating_sub(n);
    }

    /// Add the blockers among `edges` (segments as they are now).
    pub fn increment_blocking_number(&mut self, edges: &[EdgeSegment]) {
        self.blocking_number += self.count_blocking(edges);
    }

    /// Bring the blocking number up to date after an edit outside this window.
    pub fn apply_delta(
        &mut self,
        sub: &Subdivision,
        delta: &TopologyDelta,
    ) -> Result<(), TopologyError> {
        self.decrement_blocking_number(&delta.removed);
        self.decrement_blocking_number(&delta.before);
        self.increment_blocking_number(&delta.after);
        let removed: Vec<HalfEdgeId> = delta.removed_ids().collect();
        self.candidates.retain(|e| !removed.contains(e));
        self.self_check(sub)
    }

    fn self_check(&self, sub: &Subdivision) -> Result<(), TopologyError> {
        if cfg!(debug_assertions) && self.cfg.self_check {
            let fresh = self.recompute_blocking_number(sub)?;
            if fresh != self.blocking_number {
                tracing::error!(
                    edge = %self.inner,
                    sign = ?self.sign,
                    incremental = self.blocking_number,
                    fresh,
                    "blocking number drifted"
                );
            }
            debug_assert_eq!(fresh, self.blocking_number, "blocking number of {}", self.inner);
        }
        Ok(())
    }

    /// Whether applying both `self` and `other` (opposite signs) in one round
    /// could interfere.
    ///
    /// No shared window edge: no conflict. One shared edge: safe when an outer
    /// edge of either contraction is B-type. Two or more: always a conflict.
    pub fn is_conflicting(&self, other: &Contraction) -> bool {
        let shared = self.shared_window_edges(other);
        match shared {
            0 => false,
            1 => !self
                .outer_types
                .iter()
                .chain(other.outer_types.iter())
                .any(|t| *t == InflectionType::B),
            _ => true,
        }
    }

    /// Number of half-edges (up to twins) the two windows have in common.
    pub fn shared_window_edges(&self, other: &Contraction) -> usize {
        let (Some(mine), Some(theirs), Some(twins)) = (self.window, other.window, other.window_twins)
        else {
            return 0;
        };
        mine.iter()
            .filter(|e| theirs.contains(e) || twins.contains(e))
            .count()
    }

    /// Height `h` of the trapezoid on the inner edge with area `contraction_area`
    /// whose legs follow the tracks.
    ///
    /// `None` without a window, for a zero-length inner edge, or when no
    /// non-negative height produces that area.
    pub fn get_compensation_height(
        &self,
        sub: &Subdivision,
        contraction_area: f64,
    ) -> Result<Option<f64>, TopologyError> {
        let Some([_, inner, next]) = self.window else {
            return Ok(None);
        };
        let len = sub.length(inner)?;
        if len <= self.cfg.eps_point {
            return Ok(None);
        }
        let (Some(at_tail), Some(at_head)) = (sub.exterior_angle(inner)?, sub.exterior_angle(next)?) else {
            return Ok(None);
        };
        let t = (FRAC_PI_2 - at_tail.abs()).tan() + (FRAC_PI_2 - at_head.abs()).tan();
        if t.abs() <= self.cfg.eps_angle {
            return Ok(Some(contraction_area / len));
        }
        // area = h * len + h^2 * t / 2
        let p = 2.0 * len / t;
        let q = -2.0 * contraction_area / t;
        let disc = p * p / 4.0 - q;
        if disc < 0.0 {
            tracing::debug!(edge = %inner, area = contraction_area, "no compensation height");
            return Ok(None);
        }
        let root = disc.sqrt();
        let h = [-p / 2.0 + root, -p / 2.0 - root]
            .into_iter()
            .filter(|h| *h >= 0.0)
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        Ok(h)
    }
}

/// Nearest candidate on the requested side of the inner edge.
///
/// Candidates are the track intersection (A-type inner edges only), the tail of
/// `prev`, and the head of `next`, scored by signed distance along the inner
/// edge's left normal.
fn select_point(
    sub: &Subdivision,
    config: &Configuration,
    sign: Sign,
) -> Result<PointSelection, TopologyError> {
    let cfg = config.cfg();
    let Some([prev, inner, next]) = config.window() else {
        return Ok(PointSelection::NotFound(NoPoint::MissingWindow));
    };
    let Some(normal) = sub.vector(inner)?.normal(true).unit() else {
        return Ok(PointSelection::NotFound(NoPoint::DegenerateInner));
    };
    let base = sub.tail_point(inner)?;

    let mut points = Vec::with_capacity(3);
    if sub.inflection_type(inner, cfg.eps_angle)? == InflectionType::A {
        match config.track_intersection(sub)? {
            Some(t) => points.push(t),
            None => tracing::debug!(edge = %inner, "tracks parallel; intersection skipped"),
        }
    }
    points.push(sub.tail_point(prev)?);
    points.push(sub.head_point(next)?);

    let mut scored: Vec<(f64, Point)> = points
        .into_iter()
        .map(|p| {
            let s = (p - base).dot(&normal);
            (if s.abs() <= cfg.eps_point { 0.0 } else { s }, p)
        })
        .filter(|(s, _)| s.is_finite())
        .collect();
    scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    let found = match sign {
        Sign::Positive => scored.iter().find(|(s, _)| *s >= 0.0),
        Sign::Negative => scored.iter().rev().find(|(s, _)| *s <= 0.0),
    };
    Ok(found.map_or(PointSelection::NotFound(NoPoint::NoCandidate), |&(_, p)| {
        PointSelection::Found(p)
    }))
}

/// Geometry of one contraction: the inner edge `b -> c`, the far endpoints
/// `a` (tail of prev) and `d` (head of next), and the chosen point `p`.
struct Sweep {
    p: Point,
    a: Point,
    b: Point,
    c: Point,
    d: Point,
    prev_segment: LineSegment,
    inner_line: Line,
    track_prev: Option<Line>,
    track_next: Option<Line>,
    eps: f64,
}

impl Sweep {
    fn area_points(&self) -> Vec<Point> {
        let mut pts;
        if self.p.is_on_segment(&self.prev_segment) {
            pts = vec![self.p, self.b, self.c];
            if self.p.approx_eq(&self.a, self.eps) {
                pts.extend(self.meet(self.track_next));
            }
        } else {
            pts = vec![self.p, self.c, self.b];
            if self.p.approx_eq(&self.d, self.eps) {
                pts.extend(self.meet(self.track_prev));
            }
        }
        pts.dedup_by(|x, y| x.approx_eq(y, self.eps));
        while pts.len() > 1 && pts[0].approx_eq(&pts[pts.len() - 1], self.eps) {
            pts.pop();
        }
        pts
    }

    /// Where the inner edge, moved onto `p`, crosses `track`.
    fn meet(&self, track: Option<Line>) -> Option<Point> {
        track?.intersects_line(&self.inner_line)
    }

    /// Slide target on `track`; `p` itself when `p` already lies on it.
    fn slide(&self, track: Option<Line>) -> Option<Point> {
        let line = track?;
        self.meet(track)
            .or_else(|| (line.distance_to_point(&self.p) <= tol::ON_SEGMENT_EPS).then_some(self.p))
    }

    fn targets(&self) -> Option<(Point, Point)> {
        let tail = if self.p.approx_eq(&self.a, self.eps) {
            Some(self.a)
        } else {
            self.slide(self.track_prev)
        };
        let head = if self.p.approx_eq(&self.d, self.eps) {
            Some(self.d)
        } else {
            self.slide(self.track_next)
        };
        tail.zip(head)
    }
}
