use std::f64::consts::FRAC_PI_2;

use super::*;
use crate::cfg::GeomCfg;
use crate::error::TopologyError;
use crate::geom::{Point, Polygon};

fn square(x0: f64, y0: f64, side: f64) -> Polygon {
    Polygon::from_coordinates(
        &[
            [x0, y0],
            [x0 + side, y0],
            [x0 + side, y0 + side],
            [x0, y0 + side],
        ],
        &[],
    )
}

fn build(polys: &[Polygon]) -> Subdivision {
    SubdivisionBuilder::from_polygons(polys, &GeomCfg::default()).unwrap()
}

fn edge(sub: &Subdivision, from: [f64; 2], to: [f64; 2]) -> HalfEdgeId {
    let (from, to) = (Point::from(from), Point::from(to));
    sub.half_edge_ids()
        .find(|&e| sub.tail_point(e).unwrap() == from && sub.head_point(e).unwrap() == to)
        .unwrap_or_else(|| panic!("no half-edge {from:?} -> {to:?}"))
}

fn vertex(sub: &Subdivision, at: [f64; 2]) -> VertexId {
    sub.vertex_ids()
        .find(|&v| sub.position(v).unwrap() == Point::from(at))
        .unwrap()
}

#[test]
fn single_square() {
    let sub = build(&[square(0.0, 0.0, 1.0)]);
    assert_eq!(sub.num_vertices(), 4);
    assert_eq!(sub.num_half_edges(), 8);
    assert_eq!(sub.num_faces(), 2);
    assert_eq!(sub.generation(), 0);

    let inside = edge(&sub, [0.0, 0.0], [1.0, 0.0]);
    let f = sub.face_of(inside).unwrap();
    assert_ne!(f, OUTER_FACE);
    assert_eq!(sub.face(f).unwrap().feature, Some(0));
    assert_eq!(sub.face_of(sub.twin(inside).unwrap()).unwrap(), OUTER_FACE);
    let outer = sub.face(OUTER_FACE).unwrap();
    assert!(outer.outer.is_none());
    assert_eq!(outer.holes.len(), 1);
    assert_eq!(sub.get_cycle(inside).unwrap().len(), 4);
    assert_eq!(
        sub.exterior_angle(inside).unwrap().unwrap(),
        FRAC_PI_2
    );
}

#[test]
fn shared_border_is_one_pair() {
    let sub = build(&[square(0.0, 0.0, 1.0), square(1.0, 0.0, 1.0)]);
    assert_eq!(sub.num_vertices(), 6);
    assert_eq!(sub.num_half_edges(), 14);
    assert_eq!(sub.num_faces(), 3);
    let left = edge(&sub, [1.0, 0.0], [1.0, 1.0]);
    let right = sub.twin(left).unwrap();
    assert_eq!(right, edge(&sub, [1.0, 1.0], [1.0, 0.0]));
    let (fl, fr) = (sub.face_of(left).unwrap(), sub.face_of(right).unwrap());
    assert_ne!(fl, fr);
    assert_eq!(sub.face(fl).unwrap().feature, Some(0));
    assert_eq!(sub.face(fr).unwrap().feature, Some(1));
    assert_eq!(sub.face_boundary(OUTER_FACE).unwrap().len(), 6);
    assert_eq!(sub.get_endpoints(left).unwrap(), [vertex(&sub, [1.0, 0.0]), vertex(&sub, [1.0, 1.0])]);
}

#[test]
fn polygon_hole_belongs_to_its_face() {
    let poly = Polygon::from_coordinates(
        &[[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]],
        &[vec![[1.0, 1.0], [3.0, 1.0], [3.0, 3.0], [1.0, 3.0]]],
    );
    let sub = build(&[poly]);
    // Unbounded face, the polygon, and the region inside the hole.
    assert_eq!(sub.num_faces(), 3);
    let ring = edge(&sub, [0.0, 0.0], [4.0, 0.0]);
    let f = sub.face_of(ring).unwrap();
    let face = sub.face(f).unwrap();
    assert_eq!(face.holes.len(), 1);
    assert_eq!(sub.face_boundary(f).unwrap().len(), 8);
    // Hole boundary runs clockwise with the polygon on its left.
    let hole_edge = edge(&sub, [3.0, 1.0], [1.0, 1.0]);
    assert_eq!(sub.face_of(hole_edge).unwrap(), f);
    let inner = sub.face_of(sub.twin(hole_edge).unwrap()).unwrap();
    assert_eq!(sub.face(inner).unwrap().feature, None);
}

#[test]
fn export_round_trips_features() {
    let holed = Polygon::from_coordinates(
        &[[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]],
        &[vec![[1.0, 1.0], [3.0, 1.0], [3.0, 3.0], [1.0, 3.0]]],
    );
    let sub = build(&[holed, square(4.0, 0.0, 4.0)]);
    let exported = sub.feature_polygons().unwrap();
    assert_eq!(exported.keys().copied().collect::<Vec<_>>(), vec![0, 1]);

    let first = &exported[&0];
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].interiors.len(), 1);
    assert!((first[0].area() - 12.0).abs() < 1e-12);
    // The shared border contributes its endpoints to both rings.
    assert_eq!(exported[&1][0].exterior.len(), 4);
    assert!((exported[&1][0].area() - 16.0).abs() < 1e-12);

    let again: Vec<Polygon> = exported.into_values().flatten().collect();
    let rebuilt = build(&again);
    assert_eq!(rebuilt.num_vertices(), sub.num_vertices());
    assert_eq!(rebuilt.num_half_edges(), sub.num_half_edges());
    assert_eq!(rebuilt.num_faces(), sub.num_faces());
    let areas = |s: &Subdivision| -> Vec<f64> {
        s.feature_polygons()
            .unwrap()
            .values()
            .flatten()
            .map(Polygon::area)
            .collect()
    };
    assert_eq!(areas(&rebuilt), areas(&sub));
}

#[test]
fn unbounded_and_collapsed_faces_are_not_exported() {
    let mut sub = build(&[Polygon::from_coordinates(
        &[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
        &[],
    )]);
    assert_eq!(sub.face_polygon(OUTER_FACE).unwrap(), None);
    assert_eq!(sub.feature_polygons().unwrap()[&0].len(), 1);

    // Down to two points: nothing left to export.
    sub.collapse_edge(edge(&sub, [0.0, 0.0], [1.0, 0.0])).unwrap();
    assert!(sub.feature_polygons().unwrap().is_empty());
}

#[test]
fn island_becomes_hole_of_enclosing_face() {
    let sub = build(&[square(0.0, 0.0, 10.0), square(4.0, 4.0, 2.0)]);
    let big = sub.face_of(edge(&sub, [0.0, 0.0], [10.0, 0.0])).unwrap();
    let island_outside = edge(&sub, [6.0, 4.0], [4.0, 4.0]);
    assert_eq!(sub.face_of(island_outside).unwrap(), big);
    assert_eq!(sub.face(big).unwrap().holes.len(), 1);
    assert_eq!(sub.face_boundary(big).unwrap().len(), 8);
    assert_eq!(sub.face_boundary(OUTER_FACE).unwrap().len(), 4);
}

#[test]
fn disjoint_polygons_are_holes_of_the_outer_face() {
    let sub = build(&[square(0.0, 0.0, 1.0), square(5.0, 0.0, 1.0)]);
    assert_eq!(sub.face(OUTER_FACE).unwrap().holes.len(), 2);
    assert_eq!(sub.face_boundary(OUTER_FACE).unwrap().len(), 8);
}

#[test]
fn outgoing_edges_are_clockwise_and_linked() {
    let sub = build(&[
        square(0.0, 0.0, 1.0),
        square(1.0, 0.0, 1.0),
        square(0.0, 1.0, 1.0),
        square(1.0, 1.0, 1.0),
    ]);
    let center = vertex(&sub, [1.0, 1.0]);
    let edges = sub.outgoing(center).unwrap();
    assert_eq!(edges.len(), 4);
    let angles: Vec<f64> = edges
        .iter()
        .map(|&e| sub.angle(e).unwrap().unwrap())
        .collect();
    assert!(angles.windows(2).all(|w| w[0] > w[1]));
    for (i, &e) in edges.iter().enumerate() {
        let following = edges[(i + 1) % edges.len()];
        assert_eq!(sub.next(sub.twin(e).unwrap()).unwrap(), following);
        assert_eq!(sub.prev(following).unwrap(), sub.twin(e).unwrap());
    }
    sub.validate().unwrap();
}

#[test]
fn cycle_restarts() {
    let sub = build(&[square(0.0, 0.0, 1.0)]);
    let e = edge(&sub, [1.0, 0.0], [1.0, 1.0]);
    let mut walk = sub.cycle(e);
    let first: Vec<HalfEdgeId> = walk.by_ref().map(Result::unwrap).collect();
    assert_eq!(first.len(), 4);
    assert_eq!(first[0], e);
    assert!(walk.next().is_none());
    walk.restart();
    assert_eq!(walk.next(), Some(Ok(e)));
}

#[test]
fn capacity_limits() {
    let cfg = GeomCfg {
        max_vertices: 3,
        ..GeomCfg::default()
    };
    let err = SubdivisionBuilder::from_polygons(&[square(0.0, 0.0, 1.0)], &cfg).unwrap_err();
    assert_eq!(
        err,
        TopologyError::CapacityExceeded {
            kind: "vertex",
            limit: 3
        }
    );
    let cfg = GeomCfg {
        max_faces: 1,
        ..GeomCfg::default()
    };
    let err = SubdivisionBuilder::from_polygons(&[square(0.0, 0.0, 1.0)], &cfg).unwrap_err();
    assert!(matches!(
        err,
        TopologyError::CapacityExceeded { kind: "face", .. }
    ));
    let cfg = GeomCfg {
        max_half_edges: 6,
        ..GeomCfg::default()
    };
    assert!(SubdivisionBuilder::from_polygons(&[square(0.0, 0.0, 1.0)], &cfg).is_err());
}

#[test]
fn coordinates_beyond_the_snapping_grid_are_rejected() {
    let far = square(1e10, 0.0, 1.0);
    let err = SubdivisionBuilder::from_polygons(&[far], &GeomCfg::default()).unwrap_err();
    assert!(matches!(
        err,
        TopologyError::UnrepresentableCoordinate { x, .. } if x == 1e10
    ));

    let nan = Polygon::from_coordinates(&[[0.0, 0.0], [1.0, 0.0], [f64::NAN, 1.0]], &[]);
    assert!(SubdivisionBuilder::from_polygons(&[nan], &GeomCfg::default()).is_err());

    // A coarser grid has room for the same coordinates.
    let coarse = GeomCfg {
        position_tolerance: 1e-3,
        ..GeomCfg::default()
    };
    let sub = SubdivisionBuilder::from_polygons(&[square(1e10, 0.0, 1.0)], &coarse).unwrap();
    assert_eq!(sub.num_vertices(), 4);
}

#[test]
fn degenerate_ring_is_skipped() {
    let sliver = Polygon::from_coordinates(&[[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]], &[]);
    let sub = build(&[sliver, square(3.0, 0.0, 1.0)]);
    assert_eq!(sub.num_half_edges(), 8);
}

#[test]
fn validate_reports_broken_links() {
    let sub = build(&[square(0.0, 0.0, 1.0)]);
    let e = edge(&sub, [0.0, 0.0], [1.0, 0.0]);
    let other = edge(&sub, [1.0, 0.0], [1.0, 1.0]);

    let mut broken = sub.clone();
    if let Some(he) = broken.half_edges[e.0].as_mut() {
        he.twin = other;
    }
    assert!(matches!(
        broken.validate(),
        Err(TopologyError::TwinMismatch { .. })
    ));

    let mut broken = sub.clone();
    if let Some(he) = broken.half_edges[e.0].as_mut() {
        he.next = sub.twin(other).unwrap();
    }
    assert!(matches!(
        broken.validate(),
        Err(TopologyError::NextPrevMismatch { .. })
    ));

    assert_eq!(
        sub.half_edge(HalfEdgeId(999)),
        Err(TopologyError::MissingHalfEdge(HalfEdgeId(999)))
    );
    assert!(sub.face(FaceId(7)).is_err());
}

#[test]
fn move_vertex_changes_geometry_only() {
    let mut sub = build(&[square(0.0, 0.0, 1.0)]);
    let e = edge(&sub, [0.0, 0.0], [1.0, 0.0]);
    let v = sub.head(e).unwrap();
    let next_before = sub.next(e).unwrap();
    sub.move_vertex(v, Point::new(2.0, 0.0)).unwrap();
    assert_eq!(sub.generation(), 1);
    assert!((sub.length(e).unwrap() - 2.0).abs() < 1e-12);
    assert_eq!(sub.next(e).unwrap(), next_before);
    sub.validate().unwrap();
    assert!(sub.move_vertex(VertexId(42), Point::new(0.0, 0.0)).is_err());
}

#[test]
fn collapse_merges_head_into_tail() {
    let mut sub = build(&[square(0.0, 0.0, 1.0), square(1.0, 0.0, 1.0)]);
    let shared = edge(&sub, [1.0, 0.0], [1.0, 1.0]);
    let bottom = edge(&sub, [0.0, 0.0], [1.0, 0.0]);
    let top_v = sub.head(shared).unwrap();
    let keep = sub.tail(shared).unwrap();
    sub.move_vertex(top_v, Point::new(1.0, 0.0)).unwrap();

    let removed = sub.collapse_edge(shared).unwrap();
    assert_eq!(removed, top_v);
    assert!(!sub.contains_half_edge(shared));
    assert_eq!(sub.num_vertices(), 5);
    assert_eq!(sub.num_half_edges(), 12);
    assert_eq!(sub.degree(keep).unwrap(), 4);
    sub.validate().unwrap();
    // Left square is now a triangle.
    assert_eq!(sub.get_cycle(bottom).unwrap().len(), 3);
    assert_eq!(sub.generation(), 2);
}

#[test]
fn collapse_down_to_a_loop_then_refuse() {
    let poly = Polygon::from_coordinates(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]], &[]);
    let mut sub = build(&[poly]);
    let e0 = edge(&sub, [0.0, 0.0], [1.0, 0.0]);
    let e1 = edge(&sub, [1.0, 0.0], [0.0, 1.0]);
    let e2 = edge(&sub, [0.0, 1.0], [0.0, 0.0]);
    sub.collapse_edge(e0).unwrap();
    sub.validate().unwrap();
    assert_eq!(sub.get_cycle(e1).unwrap(), vec![e1, e2]);
    sub.collapse_edge(e1).unwrap();
    assert_eq!(sub.next(e2).unwrap(), e2);
    assert_eq!(sub.collapse_edge(e2), Err(TopologyError::DanglingEdge(e2)));
}

#[test]
fn inflection_of_degenerate_faces_is_b() {
    let poly = Polygon::from_coordinates(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]], &[]);
    let mut sub = build(&[poly]);
    let e0 = edge(&sub, [0.0, 0.0], [1.0, 0.0]);
    let e1 = edge(&sub, [1.0, 0.0], [0.0, 1.0]);
    // A triangle has converging tracks everywhere.
    assert_eq!(sub.inflection_type(e1, 1e-9).unwrap(), InflectionType::A);
    sub.collapse_edge(e0).unwrap();
    assert_eq!(sub.inflection_type(e1, 1e-9).unwrap(), InflectionType::B);
}

#[test]
fn edge_segments_snapshot() {
    let mut sub = build(&[square(0.0, 0.0, 1.0)]);
    let e = edge(&sub, [0.0, 0.0], [1.0, 0.0]);
    let before = sub.edge_segments(&[e]).unwrap();
    sub.move_vertex(sub.tail(e).unwrap(), Point::new(-1.0, 0.0)).unwrap();
    assert_eq!(before[0].segment.a, Point::new(0.0, 0.0));
    assert_eq!(sub.segment(e).unwrap().a, Point::new(-1.0, 0.0));
}
