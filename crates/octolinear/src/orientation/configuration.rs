use std::f64::consts::TAU;

use crate::cfg::GeomCfg;
use crate::dcel::{HalfEdgeId, Subdivision, VertexId};
use crate::error::TopologyError;
use crate::geom::{Line, Point};

use super::contraction::{Contraction, Sign};

/// Which neighbor of the inner edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OuterEdge {
    Prev,
    Next,
}

/// Shape of a junction (degree > 2) seen from the inner edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Junction {
    /// The two following edges continue each other through the vertex.
    A,
    /// They lie on different sides of the inner edge.
    B,
    /// They lie on the same side.
    C,
}

/// Window `[prev, inner, next]` around one half-edge, with its two contractions.
#[derive(Clone, Debug)]
pub struct Configuration {
    inner: HalfEdgeId,
    prev: Option<HalfEdgeId>,
    next: Option<HalfEdgeId>,
    built_at: u64,
    cfg: GeomCfg,
    positive: Contraction,
    negative: Contraction,
}

impl Configuration {
    /// Build the window around `inner` and both contractions.
    pub fn new(sub: &Subdivision, inner: HalfEdgeId, cfg: &GeomCfg) -> Result<Self, TopologyError> {
        let (prev, next) = neighbors(sub, inner)?.unzip();
        let mut config = Self {
            inner,
            prev,
            next,
            built_at: sub.generation(),
            cfg: *cfg,
            positive: Contraction::unbuilt(inner, Sign::Positive, cfg),
            negative: Contraction::unbuilt(inner, Sign::Negative, cfg),
        };
        config.positive = Contraction::build(sub, &config, Sign::Positive)?;
        config.negative = Contraction::build(sub, &config, Sign::Negative)?;
        Ok(config)
    }

    #[inline]
    pub fn inner(&self) -> HalfEdgeId {
        self.inner
    }

    #[inline]
    pub fn cfg(&self) -> &GeomCfg {
        &self.cfg
    }

    /// Subdivision generation this configuration was last validated against.
    #[inline]
    pub fn built_at(&self) -> u64 {
        self.built_at
    }

    /// True once the subdivision changed after `built_at`.
    #[inline]
    pub fn is_stale(&self, sub: &Subdivision) -> bool {
        sub.generation() != self.built_at
    }

    pub(crate) fn mark_current(&mut self, sub: &Subdivision) {
        self.built_at = sub.generation();
    }

    /// Neighbor on `side`; `None` when the inner edge's face has fewer than 3 edges.
    pub fn get_outer_edge(&self, side: OuterEdge) -> Option<HalfEdgeId> {
        match side {
            OuterEdge::Prev => self.prev,
            OuterEdge::Next => self.next,
        }
    }

    pub fn window(&self) -> Option<[HalfEdgeId; 3]> {
        Some([self.prev?, self.inner, self.next?])
    }

    /// `[prev, inner, next]`, or empty without both neighbors.
    pub fn get_x(&self) -> Vec<HalfEdgeId> {
        self.window().map(Vec::from).unwrap_or_default()
    }

    /// The rest of the inner edge's boundary cycle.
    pub fn get_x_bar(&self, sub: &Subdivision) -> Result<Vec<HalfEdgeId>, TopologyError> {
        let claimed = self.get_x();
        let mut rest = sub.get_cycle(self.inner)?;
        rest.retain(|e| !claimed.contains(e));
        Ok(rest)
    }

    /// Window of the configuration around the twin of the inner edge.
    pub fn twin_window(&self, sub: &Subdivision) -> Result<Option<[HalfEdgeId; 3]>, TopologyError> {
        let twin = sub.twin(self.inner)?;
        Ok(neighbors(sub, twin)?.map(|(p, n)| [p, twin, n]))
    }

    /// Line through the far endpoint of the outer edge on `side`, along that edge.
    ///
    /// `None` without the neighbor or when it has zero length.
    pub fn get_track(&self, sub: &Subdivision, side: OuterEdge) -> Result<Option<Line>, TopologyError> {
        let Some(outer) = self.get_outer_edge(side) else {
            return Ok(None);
        };
        let Some(angle) = sub.angle(outer)? else {
            return Ok(None);
        };
        let anchor = match side {
            OuterEdge::Prev => sub.tail_point(outer)?,
            OuterEdge::Next => sub.head_point(outer)?,
        };
        Ok(Some(Line::new(anchor, angle)))
    }

    /// Where the two tracks meet; `None` if either is missing or they are parallel.
    pub fn track_intersection(&self, sub: &Subdivision) -> Result<Option<Point>, TopologyError> {
        let prev = self.get_track(sub, OuterEdge::Prev)?;
        let next = self.get_track(sub, OuterEdge::Next)?;
        Ok(prev.zip(next).and_then(|(p, n)| p.intersects_line(&n)))
    }

    pub fn has_junction(&self, sub: &Subdivision) -> Result<bool, TopologyError> {
        let [tail, head] = sub.get_endpoints(self.inner)?;
        Ok(sub.degree(tail)? > 2 || sub.degree(head)? > 2)
    }

    /// Classify the junction at `vertex`, an endpoint of the inner edge.
    ///
    /// Takes the two edges following the inner edge (or its twin) in the
    /// vertex's cyclic order. `None` when `vertex` is not an endpoint, has degree
    /// below 3, or a direction is undefined.
    pub fn get_junction_type(
        &self,
        sub: &Subdivision,
        vertex: VertexId,
    ) -> Result<Option<Junction>, TopologyError> {
        let twin = sub.twin(self.inner)?;
        let edges = sub.outgoing(vertex)?;
        let n = edges.len();
        let Some(idx) = edges.iter().position(|&e| e == self.inner || e == twin) else {
            return Ok(None);
        };
        if n < 3 {
            return Ok(None);
        }
        let first = edges[(idx + 1) % n];
        let second = edges[(idx + 2) % n];
        let (Some(a1), Some(a2)) = (sub.angle(first)?, sub.angle(sub.twin(second)?)?) else {
            return Ok(None);
        };
        let diff = (a1 - a2).rem_euclid(TAU);
        if diff.min(TAU - diff) <= self.cfg.eps_angle {
            return Ok(Some(Junction::A));
        }
        let Some(normal) = sub.vector(self.inner)?.normal(true).unit() else {
            return Ok(None);
        };
        let o1 = sub.vector(first)?.dot(&normal);
        let o2 = sub.vector(second)?.dot(&normal);
        Ok(Some(if o1 * o2 < 0.0 { Junction::B } else { Junction::C }))
    }

    pub fn contraction(&self, sign: Sign) -> &Contraction {
        match sign {
            Sign::Positive => &self.positive,
            Sign::Negative => &self.negative,
        }
    }

    pub fn contraction_mut(&mut self, sign: Sign) -> &mut Contraction {
        match sign {
            Sign::Positive => &mut self.positive,
            Sign::Negative => &mut self.negative,
        }
    }

    pub fn contractions(&self) -> [&Contraction; 2] {
        [&self.positive, &self.negative]
    }

    pub fn contractions_mut(&mut self) -> [&mut Contraction; 2] {
        [&mut self.positive, &mut self.negative]
    }
}

/// `(prev, next)` of `e` when its boundary cycle has at least three edges.
fn neighbors(
    sub: &Subdivision,
    e: HalfEdgeId,
) -> Result<Option<(HalfEdgeId, HalfEdgeId)>, TopologyError> {
    let prev = sub.prev(e)?;
    let next = sub.next(e)?;
    if prev == e || next == e || prev == next {
        return Ok(None);
    }
    Ok(Some((prev, next)))
}
