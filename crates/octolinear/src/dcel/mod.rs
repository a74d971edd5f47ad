//! Planar subdivision as a doubly-connected edge list.
//!
//! Purpose
//! - Arena storage of vertices, half-edges, and faces addressed by typed ids;
//!   every link (`twin`, `next`, `prev`, `face`, `origin`) is an index.
//! - Construction from polygons (`SubdivisionBuilder`), read-only queries used by
//!   the contraction engine, the explicit edits that apply a contraction, and
//!   export of the current faces back to polygons per input feature.
//!
//! Invariants (checked by `Subdivision::validate`)
//! - `twin(twin(e)) == e`, `prev(next(e)) == e`, `head(e) == tail(next(e))`.
//! - Every `next` cycle closes and lies on a single face; faces are on the left.
//! - `Vertex::edges` lists the outgoing half-edges in clockwise order, and
//!   `next(twin(e_i)) == e_{i+1}` around every vertex.
//!
//! Removed slots become tombstones, so ids stay stable across edits. A
//! `generation` counter increases on every mutation; derived views record the
//! generation they were built at.
//!
//! Code cross-refs: `orientation::Configuration`, `orientation::Contraction`.

mod build;
mod edit;
mod export;
mod subdivision;
mod types;

pub use build::SubdivisionBuilder;
pub use edit::TopologyDelta;
pub use subdivision::{Cycle, Subdivision};
pub use types::{
    EdgeSegment, Face, FaceId, HalfEdge, HalfEdgeId, InflectionType, Vertex, VertexId, OUTER_FACE,
};

#[cfg(test)]
mod tests;
