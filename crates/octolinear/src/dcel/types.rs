//! Ids and records stored in the subdivision arenas.

use std::fmt;

use crate::geom::{LineSegment, Point};

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub usize);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// Index into the vertex arena.
    VertexId,
    "v"
);
arena_id!(
    /// Index into the half-edge arena.
    HalfEdgeId,
    "e"
);
arena_id!(
    /// Index into the face arena.
    FaceId,
    "f"
);

/// The unbounded face always has index 0.
pub const OUTER_FACE: FaceId = FaceId(0);

/// Position plus outgoing half-edges in clockwise angular order.
#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
    pub pos: Point,
    pub edges: Vec<HalfEdgeId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HalfEdge {
    pub origin: VertexId,
    pub twin: HalfEdgeId,
    pub next: HalfEdgeId,
    pub prev: HalfEdgeId,
    pub face: FaceId,
}

/// A face: one outer boundary component (absent for the unbounded face) and
/// any number of inner components (holes, islands).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Face {
    pub outer: Option<HalfEdgeId>,
    pub holes: Vec<HalfEdgeId>,
    /// Index of the input polygon this face was built from.
    pub feature: Option<usize>,
}

/// Local classification of a half-edge against its two neighbors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InflectionType {
    /// Both neighbors turn to the same side and their tracks converge.
    A,
    /// Inflection, straight continuation, parallel neighbors, or degenerate.
    B,
}

/// A half-edge id together with the segment it had when captured.
///
/// Incremental blocking updates evaluate these snapshots, so removed edges can
/// still be reported with the geometry they had.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeSegment {
    pub edge: HalfEdgeId,
    pub segment: LineSegment,
}
