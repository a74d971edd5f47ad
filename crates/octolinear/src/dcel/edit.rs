//! Mutations: vertex moves, edge collapse, and applying a contraction.

use crate::cfg::GeomCfg;
use crate::error::TopologyError;
use crate::geom::Point;
use crate::orientation::Contraction;

use super::subdivision::Subdivision;
use super::types::{EdgeSegment, FaceId, HalfEdge, HalfEdgeId, VertexId};

/// Everything `Subdivision::apply_contraction` changed.
///
/// Drivers feed `removed`, `before`, and `after` to the blocking counters of
/// surviving contractions (`Contraction::apply_delta`) and rebuild every
/// configuration keyed by a half-edge in `stale`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TopologyDelta {
    /// Removed half-edges (both halves) with their segments before the move.
    pub removed: Vec<EdgeSegment>,
    /// Surviving half-edges whose geometry changed, as they were.
    pub before: Vec<EdgeSegment>,
    /// The same half-edges, as they are now.
    pub after: Vec<EdgeSegment>,
    pub moved: Vec<VertexId>,
    /// Vertices merged away by edge collapses.
    pub merged: Vec<VertexId>,
    /// Sorted half-edge ids whose configuration must be rebuilt: every half-edge
    /// within two `next`/`prev` steps of a changed edge, and their twins.
    pub stale: Vec<HalfEdgeId>,
}

impl TopologyDelta {
    #[inline]
    pub fn is_stale(&self, e: HalfEdgeId) -> bool {
        self.stale.binary_search(&e).is_ok()
    }

    pub fn removed_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        self.removed.iter().map(|s| s.edge)
    }
}

impl Subdivision {
    fn half_edge_mut(&mut self, e: HalfEdgeId) -> Result<&mut HalfEdge, TopologyError> {
        self.half_edges
            .get_mut(e.0)
            .and_then(Option::as_mut)
            .ok_or(TopologyError::MissingHalfEdge(e))
    }

    fn link(&mut self, a: HalfEdgeId, b: HalfEdgeId) -> Result<(), TopologyError> {
        self.half_edge_mut(a)?.next = b;
        self.half_edge_mut(b)?.prev = a;
        Ok(())
    }

    fn replace_face_rep(&mut self, f: FaceId, old: HalfEdgeId, new: HalfEdgeId) -> Result<(), TopologyError> {
        let face = self
            .faces
            .get_mut(f.0)
            .ok_or(TopologyError::MissingFace(f))?;
        if face.outer == Some(old) {
            face.outer = Some(new);
        }
        for rep in face.holes.iter_mut().filter(|r| **r == old) {
            *rep = new;
        }
        Ok(())
    }

    /// Move `v` to `to`. Topology is untouched; every incident half-edge's
    /// direction, length, and segment follow from the new position.
    pub fn move_vertex(&mut self, v: VertexId, to: Point) -> Result<(), TopologyError> {
        let vertex = self
            .vertices
            .get_mut(v.0)
            .and_then(Option::as_mut)
            .ok_or(TopologyError::MissingVertex(v))?;
        vertex.pos = to;
        self.generation += 1;
        Ok(())
    }

    /// Remove `e` and its twin, merging the head of `e` into its tail.
    ///
    /// The head's remaining edges re-anchor at the tail and take the place of `e`
    /// in the tail's clockwise order. Meant for zero-length edges; a dangling edge
    /// (or a loop) is rejected. Returns the vertex that was removed.
    pub fn collapse_edge(&mut self, e: HalfEdgeId) -> Result<VertexId, TopologyError> {
        let he = *self.half_edge(e)?;
        let t = he.twin;
        let th = *self.half_edge(t)?;
        let (u, w) = (he.origin, th.origin);
        if he.next == t || he.prev == t || u == w {
            return Err(TopologyError::DanglingEdge(e));
        }

        self.link(he.prev, he.next)?;
        self.link(th.prev, th.next)?;
        self.replace_face_rep(he.face, e, he.next)?;
        self.replace_face_rep(th.face, t, th.next)?;

        let w_edges = self.vertex(w)?.edges.clone();
        let j = w_edges
            .iter()
            .position(|&g| g == t)
            .ok_or(TopologyError::VertexOrder { vertex: w, edge: t })?;
        let spliced: Vec<HalfEdgeId> = w_edges[j + 1..]
            .iter()
            .chain(&w_edges[..j])
            .copied()
            .collect();
        for &g in &spliced {
            self.half_edge_mut(g)?.origin = u;
        }
        let u_vertex = self
            .vertices
            .get_mut(u.0)
            .and_then(Option::as_mut)
            .ok_or(TopologyError::MissingVertex(u))?;
        let i = u_vertex
            .edges
            .iter()
            .position(|&g| g == e)
            .ok_or(TopologyError::VertexOrder { vertex: u, edge: e })?;
        u_vertex.edges.splice(i..=i, spliced);

        self.vertices[w.0] = None;
        self.half_edges[e.0] = None;
        self.half_edges[t.0] = None;
        self.generation += 1;
        tracing::debug!(edge = %e, kept = %u, removed = %w, "collapsed edge");
        Ok(w)
    }

    /// Outgoing half-edges of `vs` and their twins, sorted and deduplicated.
    fn incident_pairs(&self, vs: &[VertexId]) -> Result<Vec<HalfEdgeId>, TopologyError> {
        let mut out = Vec::new();
        for &v in vs {
            for &e in self.outgoing(v)? {
                out.push(e);
                out.push(self.twin(e)?);
            }
        }
        out.sort_unstable();
        out.dedup();
        Ok(out)
    }

    /// Move the inner edge of `c` onto its targets and collapse whatever
    /// degenerated (the inner edge, `prev`, or `next`).
    ///
    /// Fails with `NotApplicable` when `c` has no target or its window no longer
    /// matches the subdivision.
    pub fn apply_contraction(
        &mut self,
        c: &Contraction,
        cfg: &GeomCfg,
    ) -> Result<TopologyDelta, TopologyError> {
        let inner = c.inner();
        let (Some([prev, _, next]), Some((tail_to, head_to))) = (c.window(), c.targets()) else {
            return Err(TopologyError::NotApplicable(inner));
        };
        if self.prev(inner)? != prev || self.next(inner)? != next {
            return Err(TopologyError::NotApplicable(inner));
        }
        let tail_v = self.tail(inner)?;
        let head_v = self.head(inner)?;
        let affected = self.incident_pairs(&[tail_v, head_v])?;
        let before_all = self.edge_segments(&affected)?;

        self.move_vertex(tail_v, tail_to)?;
        self.move_vertex(head_v, head_to)?;

        // Collapse towards the fixed far endpoints: prev keeps its tail, next its head.
        let mut removed_ids = Vec::new();
        let mut merged = Vec::new();
        for e in [inner, prev, self.twin(next)?] {
            if !self.contains_half_edge(e) || self.length(e)? > cfg.eps_point {
                continue;
            }
            // A face shrunk to a point leaves a zero-length loop behind.
            if self.tail(e)? == self.head(e)? {
                continue;
            }
            let t = self.twin(e)?;
            merged.push(self.collapse_edge(e)?);
            removed_ids.extend([e, t]);
        }

        let (removed, before): (Vec<EdgeSegment>, Vec<EdgeSegment>) = before_all
            .into_iter()
            .partition(|s| removed_ids.contains(&s.edge));
        let surviving: Vec<HalfEdgeId> = before.iter().map(|s| s.edge).collect();
        let after = self.edge_segments(&surviving)?;

        // A configuration caches the inflection types of its outer edges, which
        // read one edge further out: anything within two steps of a changed edge.
        let mut stale = removed_ids.clone();
        for &a in &surviving {
            let (p, n) = (self.prev(a)?, self.next(a)?);
            for s in [self.prev(p)?, p, a, n, self.next(n)?] {
                stale.push(s);
                stale.push(self.twin(s)?);
            }
        }
        stale.sort_unstable();
        stale.dedup();

        let moved = [tail_v, head_v]
            .into_iter()
            .filter(|v| !merged.contains(v))
            .collect();
        tracing::debug!(
            edge = %inner,
            sign = ?c.sign(),
            removed = removed.len(),
            modified = after.len(),
            stale = stale.len(),
            "applied contraction"
        );
        Ok(TopologyDelta {
            removed,
            before,
            after,
            moved,
            merged,
            stale,
        })
    }
}
