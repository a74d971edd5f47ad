//! Configurations and contractions over a subdivision.
//!
//! Purpose
//! - `Configuration`: the 3-edge window `[prev, inner, next]` around one
//!   half-edge, the track lines its endpoints slide along, and junction
//!   classification at its endpoints.
//! - `Contraction`: for a configuration and a sign, the target point, the swept
//!   region, and the blocking number, kept current through incremental updates.
//! - `ContractionIndex`: every configuration of a subdivision, refreshed after
//!   each applied contraction, plus the conflict graph between candidates.
//!
//! Both views hold half-edge ids, never references, so the subdivision stays
//! mutable between rounds. A view is valid only until the subdivision changes
//! inside its window; `TopologyDelta::stale` lists which ones to rebuild.
//!
//! Code cross-refs: `dcel::Subdivision::apply_contraction`, `dcel::TopologyDelta`.

mod configuration;
mod contraction;
mod index;

pub use configuration::{Configuration, Junction, OuterEdge};
pub use contraction::{Contraction, NoPoint, PointSelection, Sign};
pub use index::{conflict_graph, conflicts, select_independent, ContractionIndex};
