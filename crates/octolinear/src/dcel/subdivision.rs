//! Read-only queries over the arenas.

use crate::error::TopologyError;
use crate::geom::{LineSegment, Point, Vector2D};

use super::types::{
    EdgeSegment, Face, FaceId, HalfEdge, HalfEdgeId, InflectionType, Vertex, VertexId,
};

/// Arena-backed half-edge subdivision.
#[derive(Clone, Debug, Default)]
pub struct Subdivision {
    pub(crate) vertices: Vec<Option<Vertex>>,
    pub(crate) half_edges: Vec<Option<HalfEdge>>,
    pub(crate) faces: Vec<Face>,
    pub(crate) generation: u64,
}

impl Subdivision {
    /// Mutation counter; starts at 0 for a freshly built subdivision.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn vertex(&self, v: VertexId) -> Result<&Vertex, TopologyError> {
        self.vertices
            .get(v.0)
            .and_then(Option::as_ref)
            .ok_or(TopologyError::MissingVertex(v))
    }

    pub fn half_edge(&self, e: HalfEdgeId) -> Result<&HalfEdge, TopologyError> {
        self.half_edges
            .get(e.0)
            .and_then(Option::as_ref)
            .ok_or(TopologyError::MissingHalfEdge(e))
    }

    pub fn face(&self, f: FaceId) -> Result<&Face, TopologyError> {
        self.faces.get(f.0).ok_or(TopologyError::MissingFace(f))
    }

    #[inline]
    pub fn contains_half_edge(&self, e: HalfEdgeId) -> bool {
        self.half_edge(e).is_ok()
    }

    /// Live vertex ids in index order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_ref().map(|_| VertexId(i)))
    }

    /// Live half-edge ids in index order.
    pub fn half_edge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        self.half_edges
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|_| HalfEdgeId(i)))
    }

    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        (0..self.faces.len()).map(FaceId)
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.iter().flatten().count()
    }

    pub fn num_half_edges(&self) -> usize {
        self.half_edges.iter().flatten().count()
    }

    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn twin(&self, e: HalfEdgeId) -> Result<HalfEdgeId, TopologyError> {
        Ok(self.half_edge(e)?.twin)
    }

    #[inline]
    pub fn next(&self, e: HalfEdgeId) -> Result<HalfEdgeId, TopologyError> {
        Ok(self.half_edge(e)?.next)
    }

    #[inline]
    pub fn prev(&self, e: HalfEdgeId) -> Result<HalfEdgeId, TopologyError> {
        Ok(self.half_edge(e)?.prev)
    }

    #[inline]
    pub fn face_of(&self, e: HalfEdgeId) -> Result<FaceId, TopologyError> {
        Ok(self.half_edge(e)?.face)
    }

    #[inline]
    pub fn tail(&self, e: HalfEdgeId) -> Result<VertexId, TopologyError> {
        Ok(self.half_edge(e)?.origin)
    }

    pub fn head(&self, e: HalfEdgeId) -> Result<VertexId, TopologyError> {
        self.tail(self.twin(e)?)
    }

    /// `[tail, head]`.
    pub fn get_endpoints(&self, e: HalfEdgeId) -> Result<[VertexId; 2], TopologyError> {
        Ok([self.tail(e)?, self.head(e)?])
    }

    #[inline]
    pub fn position(&self, v: VertexId) -> Result<Point, TopologyError> {
        Ok(self.vertex(v)?.pos)
    }

    pub fn tail_point(&self, e: HalfEdgeId) -> Result<Point, TopologyError> {
        self.position(self.tail(e)?)
    }

    pub fn head_point(&self, e: HalfEdgeId) -> Result<Point, TopologyError> {
        self.position(self.head(e)?)
    }

    pub fn segment(&self, e: HalfEdgeId) -> Result<LineSegment, TopologyError> {
        Ok(LineSegment::new(self.tail_point(e)?, self.head_point(e)?))
    }

    pub fn vector(&self, e: HalfEdgeId) -> Result<Vector2D, TopologyError> {
        Ok(self.head_point(e)? - self.tail_point(e)?)
    }

    pub fn length(&self, e: HalfEdgeId) -> Result<f64, TopologyError> {
        Ok(self.vector(e)?.magnitude())
    }

    /// Direction angle, `None` for a zero-length half-edge.
    pub fn angle(&self, e: HalfEdgeId) -> Result<Option<f64>, TopologyError> {
        let v = self.vector(e)?;
        Ok((!v.is_zero()).then(|| v.angle()))
    }

    /// Snapshot of the current segments of `edges`.
    pub fn edge_segments(&self, edges: &[HalfEdgeId]) -> Result<Vec<EdgeSegment>, TopologyError> {
        edges
            .iter()
            .map(|&edge| {
                Ok(EdgeSegment {
                    edge,
                    segment: self.segment(edge)?,
                })
            })
            .collect()
    }

    /// Outgoing half-edges of `v`, clockwise.
    pub fn outgoing(&self, v: VertexId) -> Result<&[HalfEdgeId], TopologyError> {
        Ok(&self.vertex(v)?.edges)
    }

    pub fn degree(&self, v: VertexId) -> Result<usize, TopologyError> {
        Ok(self.vertex(v)?.edges.len())
    }

    /// Lazy traversal of the `next` cycle through `start`, capped by the arena size.
    pub fn cycle(&self, start: HalfEdgeId) -> Cycle<'_> {
        Cycle {
            sub: self,
            start,
            cur: Some(start),
            steps: 0,
            cap: self.half_edges.len(),
        }
    }

    /// The boundary cycle through `start`, starting at `start`.
    pub fn get_cycle(&self, start: HalfEdgeId) -> Result<Vec<HalfEdgeId>, TopologyError> {
        self.cycle(start).collect()
    }

    /// All boundary components of `f`: the outer cycle first, then the holes.
    pub fn face_boundary(&self, f: FaceId) -> Result<Vec<HalfEdgeId>, TopologyError> {
        let face = self.face(f)?;
        let mut out = Vec::new();
        for rep in face.outer.iter().chain(face.holes.iter()) {
            out.extend(self.get_cycle(*rep)?);
        }
        Ok(out)
    }

    /// Signed turn from `prev(e)` into `e` at the tail of `e`, in `(-π, π]`.
    ///
    /// Positive for a left turn. `None` if either half-edge has zero length.
    pub fn exterior_angle(&self, e: HalfEdgeId) -> Result<Option<f64>, TopologyError> {
        let u = self.vector(self.prev(e)?)?;
        let v = self.vector(e)?;
        if u.is_zero() || v.is_zero() {
            return Ok(None);
        }
        Ok(Some(u.cross(&v).atan2(u.dot(&v))))
    }

    /// Classify `e` against `prev(e)` and `next(e)` (see `InflectionType`).
    pub fn inflection_type(
        &self,
        e: HalfEdgeId,
        eps_angle: f64,
    ) -> Result<InflectionType, TopologyError> {
        let prev = self.prev(e)?;
        let next = self.next(e)?;
        if prev == e || next == e || prev == next {
            return Ok(InflectionType::B);
        }
        let units = (
            self.vector(prev)?.unit(),
            self.vector(e)?.unit(),
            self.vector(next)?.unit(),
        );
        let (Some(u), Some(v), Some(w)) = units else {
            return Ok(InflectionType::B);
        };
        let turn_in = u.cross(&v);
        let turn_out = v.cross(&w);
        let same_side = (turn_in > eps_angle && turn_out > eps_angle)
            || (turn_in < -eps_angle && turn_out < -eps_angle);
        let converging = u.cross(&w).abs() > eps_angle;
        Ok(if same_side && converging {
            InflectionType::A
        } else {
            InflectionType::B
        })
    }

    /// Check every structural invariant; the first violation is returned.
    pub fn validate(&self) -> Result<(), TopologyError> {
        let mut closed = vec![false; self.half_edges.len()];
        for e in self.half_edge_ids() {
            let he = self.half_edge(e)?;
            let twin = self.half_edge(he.twin)?;
            if twin.twin != e || he.twin == e {
                return Err(TopologyError::TwinMismatch {
                    edge: e,
                    twin: he.twin,
                    back: twin.twin,
                });
            }
            let next = self.half_edge(he.next)?;
            if next.prev != e {
                return Err(TopologyError::NextPrevMismatch {
                    edge: e,
                    next: he.next,
                    back: next.prev,
                });
            }
            let head = twin.origin;
            if next.origin != head {
                return Err(TopologyError::Disconnected {
                    edge: e,
                    head,
                    next_tail: next.origin,
                });
            }
            if next.face != he.face {
                return Err(TopologyError::FaceMismatch {
                    edge: e,
                    face: he.face,
                    next_face: next.face,
                });
            }
            self.face(he.face)?;
            if !self.vertex(he.origin)?.edges.contains(&e) {
                return Err(TopologyError::VertexOrder {
                    vertex: he.origin,
                    edge: e,
                });
            }
            if !closed[e.0] {
                for member in self.cycle(e) {
                    closed[member?.0] = true;
                }
            }
        }
        for v in self.vertex_ids() {
            let edges = &self.vertex(v)?.edges;
            for (i, &e) in edges.iter().enumerate() {
                if self.tail(e)? != v {
                    return Err(TopologyError::VertexOrder { vertex: v, edge: e });
                }
                let following = edges[(i + 1) % edges.len()];
                let arriving = self.twin(e)?;
                if self.next(arriving)? != following {
                    return Err(TopologyError::NextPrevMismatch {
                        edge: arriving,
                        next: self.next(arriving)?,
                        back: following,
                    });
                }
            }
        }
        for f in self.face_ids() {
            let face = self.face(f)?;
            for &rep in face.outer.iter().chain(face.holes.iter()) {
                let on = self.face_of(rep)?;
                if on != f {
                    return Err(TopologyError::FaceMismatch {
                        edge: rep,
                        face: f,
                        next_face: on,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Restartable walk along `next` pointers.
///
/// Yields each half-edge of the cycle once. If the walk has not returned to its
/// start after `cap` steps it yields `TopologyError::OpenCycle` and stops.
#[derive(Clone, Debug)]
pub struct Cycle<'a> {
    sub: &'a Subdivision,
    start: HalfEdgeId,
    cur: Option<HalfEdgeId>,
    steps: usize,
    cap: usize,
}

impl Cycle<'_> {
    /// Rewind to the start half-edge.
    pub fn restart(&mut self) {
        self.cur = Some(self.start);
        self.steps = 0;
    }
}

impl Iterator for Cycle<'_> {
    type Item = Result<HalfEdgeId, TopologyError>;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.cur?;
        if self.steps >= self.cap {
            self.cur = None;
            tracing::error!(start = %self.start, cap = self.cap, "open cycle");
            return Some(Err(TopologyError::OpenCycle {
                start: self.start,
                cap: self.cap,
            }));
        }
        self.steps += 1;
        match self.sub.half_edge(cur) {
            Ok(he) => {
                self.cur = (he.next != self.start).then_some(he.next);
                Some(Ok(cur))
            }
            Err(err) => {
                self.cur = None;
                Some(Err(err))
            }
        }
    }
}
