//! Reading polygons back out of a subdivision.

use std::collections::BTreeMap;

use crate::error::TopologyError;
use crate::geom::{Point, Polygon, Ring};

use super::subdivision::Subdivision;
use super::types::{FaceId, HalfEdgeId};

impl Subdivision {
    /// Tail positions along the cycle through `rep`, zero-length steps skipped.
    fn ring_points(&self, rep: HalfEdgeId) -> Result<Vec<Point>, TopologyError> {
        let mut points: Vec<Point> = Vec::new();
        for e in self.cycle(rep) {
            let p = self.tail_point(e?)?;
            if points.last() != Some(&p) {
                points.push(p);
            }
        }
        while points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Ok(points)
    }

    /// Current shape of bounded face `f`: its outer cycle plus one ring per hole.
    ///
    /// `None` for the unbounded face and for faces whose outer cycle has shrunk
    /// below three distinct points. Holes that shrank that far are dropped.
    pub fn face_polygon(&self, f: FaceId) -> Result<Option<Polygon>, TopologyError> {
        let face = self.face(f)?;
        let Some(outer) = face.outer else {
            return Ok(None);
        };
        let exterior = self.ring_points(outer)?;
        if exterior.len() < 3 {
            tracing::debug!(face = %f, points = exterior.len(), "face collapsed; not exported");
            return Ok(None);
        }
        let mut holes = Vec::with_capacity(face.holes.len());
        for &rep in &face.holes {
            let ring = self.ring_points(rep)?;
            if ring.len() >= 3 {
                holes.push(Ring::new(ring));
            }
        }
        Ok(Some(Polygon::new(Ring::new(exterior), holes)))
    }

    /// Polygons of every feature-tagged face, grouped by feature index.
    pub fn feature_polygons(&self) -> Result<BTreeMap<usize, Vec<Polygon>>, TopologyError> {
        let mut out: BTreeMap<usize, Vec<Polygon>> = BTreeMap::new();
        for f in self.face_ids() {
            let Some(feature) = self.face(f)?.feature else {
                continue;
            };
            if let Some(polygon) = self.face_polygon(f)? {
                out.entry(feature).or_default().push(polygon);
            }
        }
        Ok(out)
    }
}
