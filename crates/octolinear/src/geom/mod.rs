//! 2D geometry kernel.
//!
//! Purpose
//! - Value types (`Point`, `Vector2D`, `Line`, `LineSegment`, `Ring`, `Polygon`)
//!   with the intersection, containment, area, and distance queries the
//!   subdivision and the contraction engine build on.
//! - Vectors are backed by `nalgebra::Vector2<f64>`; points stay plain `(x, y)`
//!   pairs with tolerance-based equality.
//!
//! Degeneracies
//! - Queries with no meaningful answer (parallel lines, zero vectors) return
//!   `None`. The only hard failure is `Ring::centroid` on a zero-area ring.
//!
//! Code cross-refs: `dcel::Subdivision::segment`, `orientation::Contraction`.

mod line;
mod point;
mod polygon;
mod ring;
mod segment;
pub mod tol;
mod vector;

pub use line::Line;
pub use point::Point;
pub use polygon::Polygon;
pub use ring::Ring;
pub use segment::{LineSegment, SegmentIntersection};
pub use vector::Vector2D;
