//! Octolinear schematization core: geometry kernel, planar subdivision, and the
//! contraction engine that simplifies a subdivision one edge move at a time.
//!
//! Layout
//! - `geom`: points, vectors, lines, segments, rings, polygons.
//! - `dcel`: the doubly-connected edge list, its builder, queries, and edits.
//! - `orientation`: configurations, contractions, blocking, and conflicts.
//! - `cfg`: the tolerance struct threaded through every engine call.
//! - `rand`: deterministic jittered-grid inputs for tests and benchmarks.
//!
//! API Policy
//! - Ids, not references, cross module boundaries; the subdivision stays the
//!   single owner of topology.
//! - Breaking changes are fine while the engine is in flux.

pub mod cfg;
pub mod dcel;
pub mod error;
pub mod geom;
pub mod orientation;
pub mod rand;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cfg::GeomCfg;
pub use error::{CfgError, GeometryError, TopologyError};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::cfg::GeomCfg;
    pub use crate::dcel::{
        FaceId, HalfEdgeId, InflectionType, Subdivision, SubdivisionBuilder, TopologyDelta,
        VertexId, OUTER_FACE,
    };
    pub use crate::error::TopologyError;
    pub use crate::geom::{Line, LineSegment, Point, Polygon, Ring, Vector2D};
    pub use crate::orientation::{
        select_independent, Configuration, Contraction, ContractionIndex, Junction, OuterEdge,
        PointSelection, Sign,
    };
    pub use crate::rand::{jittered_grid, GridCfg, ReplayToken};
}
