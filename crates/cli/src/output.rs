//! GeoJSON output of a (contracted) subdivision, one feature per input feature.

use std::collections::BTreeMap;

use anyhow::Result;
use octolinear::dcel::Subdivision;
use octolinear::geom::{Point, Polygon};
use serde_json::{json, Value};

use crate::input::SourceFeature;

/// `owner` maps subdivision feature indices to positions in `features`.
///
/// Features whose faces all collapsed are left out. A feature with one face
/// becomes a `Polygon`, otherwise a `MultiPolygon`.
pub fn to_geojson(
    sub: &Subdivision,
    features: &[SourceFeature],
    owner: &BTreeMap<usize, usize>,
) -> Result<Value> {
    let mut grouped: BTreeMap<usize, Vec<Polygon>> = BTreeMap::new();
    for (feature, polygons) in sub.feature_polygons()? {
        if let Some(&source) = owner.get(&feature) {
            grouped.entry(source).or_default().extend(polygons);
        }
    }
    let out: Vec<Value> = grouped
        .into_iter()
        .map(|(source, polygons)| {
            let geometry = match polygons.as_slice() {
                [single] => json!({ "type": "Polygon", "coordinates": polygon_coordinates(single) }),
                many => json!({
                    "type": "MultiPolygon",
                    "coordinates": many.iter().map(polygon_coordinates).collect::<Vec<_>>(),
                }),
            };
            json!({
                "type": "Feature",
                "properties": features[source].properties.clone(),
                "geometry": geometry,
            })
        })
        .collect();
    Ok(json!({ "type": "FeatureCollection", "features": out }))
}

/// Exterior counter-clockwise, holes clockwise, every ring closed.
fn polygon_coordinates(polygon: &Polygon) -> Vec<Vec<[f64; 2]>> {
    let mut rings = vec![closed(polygon.exterior.points().iter())];
    for hole in &polygon.interiors {
        rings.push(closed(hole.points().iter().rev()));
    }
    rings
}

fn closed<'a>(points: impl Iterator<Item = &'a Point>) -> Vec<[f64; 2]> {
    let mut ring: Vec<[f64; 2]> = points.map(|p| [p.x, p.y]).collect();
    if let Some(&first) = ring.first() {
        ring.push(first);
    }
    ring
}
