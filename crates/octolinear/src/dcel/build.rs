//! Subdivision construction from polygons.
//!
//! Model
//! - Vertices are deduplicated on a `position_tolerance` grid.
//! - Each undirected segment gets one twin pair (`e`, `e ^ 1`); polygons that share
//!   a border share the pair.
//! - Exteriors run counter-clockwise and holes clockwise, so the polygon interior
//!   is on the left of every ring half-edge it contributes.
//! - `next/prev` follow the around-vertex rule on clockwise-sorted outgoing edges;
//!   faces are then read off the `next` cycles.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::cfg::GeomCfg;
use crate::error::TopologyError;
use crate::geom::{tol, Point, Polygon};

use super::subdivision::Subdivision;
use super::types::{Face, FaceId, HalfEdge, HalfEdgeId, Vertex, VertexId, OUTER_FACE};

/// Collects polygons, then links them into a `Subdivision`.
#[derive(Clone, Debug)]
pub struct SubdivisionBuilder {
    cfg: GeomCfg,
    positions: Vec<Point>,
    snapped: HashMap<(i64, i64), VertexId>,
    /// Origin per half-edge; twins are adjacent (`e ^ 1`).
    origins: Vec<VertexId>,
    directed: HashMap<(VertexId, VertexId), HalfEdgeId>,
    left_feature: HashMap<HalfEdgeId, usize>,
    features: usize,
}

/// One `next` cycle found while assigning faces.
struct CycleInfo {
    rep: HalfEdgeId,
    members: Vec<HalfEdgeId>,
    points: Vec<Point>,
    signed_area: f64,
    feature: Option<usize>,
}

impl SubdivisionBuilder {
    pub fn new(cfg: &GeomCfg) -> Self {
        Self {
            cfg: *cfg,
            positions: Vec::new(),
            snapped: HashMap::new(),
            origins: Vec::new(),
            directed: HashMap::new(),
            left_feature: HashMap::new(),
            features: 0,
        }
    }

    /// Convenience: build directly from a polygon list (feature = list index).
    pub fn from_polygons(polygons: &[Polygon], cfg: &GeomCfg) -> Result<Subdivision, TopologyError> {
        let mut builder = Self::new(cfg);
        for poly in polygons {
            builder.add_polygon(poly)?;
        }
        builder.build()
    }

    /// Add one polygon; returns the feature index its faces will carry.
    pub fn add_polygon(&mut self, polygon: &Polygon) -> Result<usize, TopologyError> {
        let feature = self.features;
        self.features += 1;
        self.add_ring(polygon.exterior.points().iter().copied(), feature)?;
        for hole in &polygon.interiors {
            self.add_ring(hole.points().iter().rev().copied(), feature)?;
        }
        Ok(feature)
    }

    fn add_ring(
        &mut self,
        points: impl Iterator<Item = Point>,
        feature: usize,
    ) -> Result<(), TopologyError> {
        let mut ids: Vec<VertexId> = Vec::new();
        for p in points {
            let v = self.vertex_at(p)?;
            if ids.last() != Some(&v) {
                ids.push(v);
            }
        }
        while ids.len() > 1 && ids.first() == ids.last() {
            ids.pop();
        }
        if ids.len() < 3 {
            tracing::warn!(feature, vertices = ids.len(), "skipping degenerate ring");
            return Ok(());
        }
        for i in 0..ids.len() {
            let e = self.half_edge_between(ids[i], ids[(i + 1) % ids.len()])?;
            if let Some(first) = self.left_feature.insert(e, feature) {
                if first != feature {
                    tracing::warn!(edge = %e, first, second = feature, "polygons overlap along an edge");
                }
            }
        }
        Ok(())
    }

    fn vertex_at(&mut self, p: Point) -> Result<VertexId, TopologyError> {
        let q = self.cfg.position_tolerance;
        let key = match (snap(p.x, q), snap(p.y, q)) {
            (Some(kx), Some(ky)) => (kx, ky),
            _ => {
                return Err(TopologyError::UnrepresentableCoordinate {
                    x: p.x,
                    y: p.y,
                    tolerance: q,
                })
            }
        };
        if let Some(&v) = self.snapped.get(&key) {
            return Ok(v);
        }
        if self.positions.len() >= self.cfg.max_vertices {
            return Err(TopologyError::CapacityExceeded {
                kind: "vertex",
                limit: self.cfg.max_vertices,
            });
        }
        let v = VertexId(self.positions.len());
        self.positions.push(p);
        self.snapped.insert(key, v);
        Ok(v)
    }

    fn half_edge_between(&mut self, u: VertexId, v: VertexId) -> Result<HalfEdgeId, TopologyError> {
        if let Some(&e) = self.directed.get(&(u, v)) {
            return Ok(e);
        }
        if self.origins.len() + 2 > self.cfg.max_half_edges {
            return Err(TopologyError::CapacityExceeded {
                kind: "half-edge",
                limit: self.cfg.max_half_edges,
            });
        }
        let e = HalfEdgeId(self.origins.len());
        self.origins.push(u);
        self.origins.push(v);
        self.directed.insert((u, v), e);
        self.directed.insert((v, u), HalfEdgeId(e.0 ^ 1));
        Ok(e)
    }

    fn angle_of(&self, e: HalfEdgeId) -> f64 {
        let a = self.positions[self.origins[e.0].0];
        let b = self.positions[self.origins[e.0 ^ 1].0];
        (b - a).angle()
    }

    /// Link everything and assign faces.
    pub fn build(self) -> Result<Subdivision, TopologyError> {
        let n = self.origins.len();
        let mut outgoing: Vec<Vec<HalfEdgeId>> = vec![Vec::new(); self.positions.len()];
        for (e, o) in self.origins.iter().enumerate() {
            outgoing[o.0].push(HalfEdgeId(e));
        }
        for list in &mut outgoing {
            list.sort_by(|&a, &b| {
                self.angle_of(b)
                    .partial_cmp(&self.angle_of(a))
                    .unwrap_or(Ordering::Equal)
            });
        }

        let mut next: Vec<Option<HalfEdgeId>> = vec![None; n];
        let mut prev: Vec<Option<HalfEdgeId>> = vec![None; n];
        for list in &outgoing {
            for (i, &e) in list.iter().enumerate() {
                let following = list[(i + 1) % list.len()];
                let arriving = HalfEdgeId(e.0 ^ 1);
                next[arriving.0] = Some(following);
                prev[following.0] = Some(arriving);
            }
        }
        let next = resolve(next, "next")?;
        let prev = resolve(prev, "prev")?;

        let cycles = self.collect_cycles(&next)?;
        let mut faces = vec![Face::default()];
        let mut face_of = vec![OUTER_FACE; n];
        let mut feature_face: HashMap<usize, FaceId> = HashMap::new();
        let mut bounded: Vec<(FaceId, Polygon, f64)> = Vec::new();

        for c in cycles.iter().filter(|c| c.signed_area > tol::AREA_EPS) {
            let f = self.push_face(&mut faces, Some(c.rep), c.feature)?;
            if let Some(feature) = c.feature {
                feature_face.entry(feature).or_insert(f);
            }
            for &e in &c.members {
                face_of[e.0] = f;
            }
            bounded.push((f, Polygon::from_points(c.points.clone()), c.signed_area));
        }
        for c in cycles.iter().filter(|c| c.signed_area <= tol::AREA_EPS) {
            let owner = match c.feature {
                Some(feature) => feature_face.get(&feature).copied().unwrap_or_else(|| {
                    tracing::warn!(feature, "hole without an exterior; attached to the outer face");
                    OUTER_FACE
                }),
                None => containing_face(&bounded, c.points[0]),
            };
            faces[owner.0].holes.push(c.rep);
            for &e in &c.members {
                face_of[e.0] = owner;
            }
        }

        let half_edges = (0..n)
            .map(|e| {
                Some(HalfEdge {
                    origin: self.origins[e],
                    twin: HalfEdgeId(e ^ 1),
                    next: next[e],
                    prev: prev[e],
                    face: face_of[e],
                })
            })
            .collect();
        let vertices = self
            .positions
            .iter()
            .zip(outgoing)
            .map(|(&pos, edges)| Some(Vertex { pos, edges }))
            .collect();
        let sub = Subdivision {
            vertices,
            half_edges,
            faces,
            generation: 0,
        };
        sub.validate()?;
        tracing::debug!(
            vertices = sub.num_vertices(),
            half_edges = sub.num_half_edges(),
            faces = sub.num_faces(),
            features = self.features,
            "subdivision built"
        );
        Ok(sub)
    }

    fn collect_cycles(&self, next: &[HalfEdgeId]) -> Result<Vec<CycleInfo>, TopologyError> {
        let n = next.len();
        let mut seen = vec![false; n];
        let mut cycles = Vec::new();
        for start in 0..n {
            if seen[start] {
                continue;
            }
            let mut members = Vec::new();
            let mut cur = start;
            while !seen[cur] {
                seen[cur] = true;
                members.push(HalfEdgeId(cur));
                cur = next[cur].0;
            }
            if cur != start {
                return Err(TopologyError::OpenCycle {
                    start: HalfEdgeId(start),
                    cap: n,
                });
            }
            let points: Vec<Point> = members
                .iter()
                .map(|e| self.positions[self.origins[e.0].0])
                .collect();
            let feature = members
                .iter()
                .find_map(|e| self.left_feature.get(e).copied());
            cycles.push(CycleInfo {
                rep: HalfEdgeId(start),
                signed_area: signed_area(&points),
                members,
                points,
                feature,
            });
        }
        Ok(cycles)
    }

    fn push_face(
        &self,
        faces: &mut Vec<Face>,
        outer: Option<HalfEdgeId>,
        feature: Option<usize>,
    ) -> Result<FaceId, TopologyError> {
        if faces.len() >= self.cfg.max_faces {
            return Err(TopologyError::CapacityExceeded {
                kind: "face",
                limit: self.cfg.max_faces,
            });
        }
        faces.push(Face {
            outer,
            holes: Vec::new(),
            feature,
        });
        Ok(FaceId(faces.len() - 1))
    }
}

fn resolve(
    links: Vec<Option<HalfEdgeId>>,
    what: &'static str,
) -> Result<Vec<HalfEdgeId>, TopologyError> {
    links
        .into_iter()
        .enumerate()
        .map(|(e, l)| l.ok_or(TopologyError::Unlinked(HalfEdgeId(e), what)))
        .collect()
}

/// Smallest bounded face whose outer ring strictly contains `sample`.
fn containing_face(bounded: &[(FaceId, Polygon, f64)], sample: Point) -> FaceId {
    bounded
        .iter()
        .filter(|(_, poly, _)| {
            poly.contains(sample) && !sample.is_on_any_segment(&poly.exterior_segments())
        })
        .min_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(Ordering::Equal))
        .map_or(OUTER_FACE, |(f, _, _)| *f)
}

/// Grid cell of `v`; `None` when it is not finite or falls outside the `i64` range.
fn snap(v: f64, q: f64) -> Option<i64> {
    let k = (v / q).round();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    (k.is_finite() && k >= i64::MIN as f64 && k < i64::MAX as f64).then(|| k as i64)
}

fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    0.5 * (0..n)
        .map(|i| {
            let (p, q) = (points[i], points[(i + 1) % n]);
            p.x * q.y - q.x * p.y
        })
        .sum::<f64>()
}
