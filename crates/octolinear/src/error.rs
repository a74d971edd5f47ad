//! Error types of the engine.
//!
//! Geometric degeneracies are not errors: kernel queries return `None` and point
//! selection reports a `NoPoint` reason. What remains here are violated topology
//! preconditions, the degenerate-ring centroid, and invalid configuration values.

use thiserror::Error;

use crate::dcel::{FaceId, HalfEdgeId, VertexId};

/// A structural precondition of the subdivision does not hold.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TopologyError {
    #[error("vertex {0} is missing or was removed")]
    MissingVertex(VertexId),
    #[error("half-edge {0} is missing or was removed")]
    MissingHalfEdge(HalfEdgeId),
    #[error("face {0} is missing")]
    MissingFace(FaceId),
    #[error("half-edge {0} has no {1} link")]
    Unlinked(HalfEdgeId, &'static str),
    #[error("twin of {edge} is {twin}, whose twin is {back}")]
    TwinMismatch {
        edge: HalfEdgeId,
        twin: HalfEdgeId,
        back: HalfEdgeId,
    },
    #[error("next of {edge} is {next}, whose prev is {back}")]
    NextPrevMismatch {
        edge: HalfEdgeId,
        next: HalfEdgeId,
        back: HalfEdgeId,
    },
    #[error("half-edge {edge} ends at {head} but its next starts at {next_tail}")]
    Disconnected {
        edge: HalfEdgeId,
        head: VertexId,
        next_tail: VertexId,
    },
    #[error("vertex {vertex} does not list its outgoing half-edge {edge}")]
    VertexOrder { vertex: VertexId, edge: HalfEdgeId },
    #[error("half-edge {edge} is on face {face} but its next is on face {next_face}")]
    FaceMismatch {
        edge: HalfEdgeId,
        face: FaceId,
        next_face: FaceId,
    },
    #[error("cycle from {start} does not close within {cap} steps")]
    OpenCycle { start: HalfEdgeId, cap: usize },
    #[error("half-edge {0} dangles (its head has no other edge)")]
    DanglingEdge(HalfEdgeId),
    #[error("{kind} capacity of {limit} exceeded")]
    CapacityExceeded { kind: &'static str, limit: usize },
    #[error("coordinate ({x}, {y}) cannot be snapped at tolerance {tolerance:e}")]
    UnrepresentableCoordinate { x: f64, y: f64, tolerance: f64 },
    #[error("contraction of {0} has no target and cannot be applied")]
    NotApplicable(HalfEdgeId),
}

/// Hard geometric failures. Only the centroid of a zero-area ring qualifies.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("ring centroid is undefined for area {area:e}")]
    DegenerateRing { area: f64 },
}

/// Invalid `GeomCfg` value.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum CfgError {
    #[error("{field} must be finite and positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
}
