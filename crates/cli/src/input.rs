//! Polygon input: a plain JSON list or a GeoJSON object.
//!
//! Plain form: `[{"exterior": [[x, y], ...], "holes": [[[x, y], ...], ...], "properties": {...}}, ...]`,
//! one feature per entry. GeoJSON: `FeatureCollection`, `Feature`, `Polygon`, or
//! `MultiPolygon`; other geometry types are skipped with a warning. Extra
//! coordinates (altitude) are ignored.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use octolinear::geom::Polygon;
use serde::Deserialize;
use serde_json::{Map, Value};

/// One input feature: its polygons and the properties carried through to the output.
#[derive(Clone, Debug, Default)]
pub struct SourceFeature {
    pub properties: Map<String, Value>,
    pub polygons: Vec<Polygon>,
}

/// `key=value` match on feature properties.
///
/// A string property matches when equal to the value, a number or boolean when
/// its JSON text is the value, and an array when one of its elements matches.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyFilter {
    pub key: String,
    pub value: String,
}

impl PropertyFilter {
    pub fn matches(&self, properties: &Map<String, Value>) -> bool {
        properties
            .get(&self.key)
            .is_some_and(|v| self.matches_value(v, true))
    }

    fn matches_value(&self, v: &Value, top: bool) -> bool {
        match v {
            Value::String(s) => *s == self.value,
            Value::Number(_) | Value::Bool(_) => v.to_string() == self.value,
            Value::Array(items) if top => items.iter().any(|i| self.matches_value(i, false)),
            _ => false,
        }
    }
}

impl FromStr for PropertyFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => Ok(Self {
                key: key.trim().to_string(),
                value: value.trim().to_string(),
            }),
            _ => Err(format!("expected key=value, got {s:?}")),
        }
    }
}

impl fmt::Display for PropertyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlainPolygon {
    exterior: Vec<[f64; 2]>,
    #[serde(default)]
    holes: Vec<Vec<[f64; 2]>>,
    #[serde(default)]
    properties: Map<String, Value>,
}

pub fn read_features(path: &Path, filter: Option<&PropertyFilter>) -> Result<Vec<SourceFeature>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_features(&text, filter).with_context(|| format!("parsing {}", path.display()))
}

pub fn parse_features(text: &str, filter: Option<&PropertyFilter>) -> Result<Vec<SourceFeature>> {
    let value: Value = serde_json::from_str(text)?;
    let mut out = Vec::new();
    match &value {
        Value::Array(_) => {
            let plain: Vec<PlainPolygon> = serde_json::from_value(value)?;
            out.extend(plain.into_iter().map(|p| SourceFeature {
                polygons: vec![Polygon::from_coordinates(&p.exterior, &p.holes)],
                properties: p.properties,
            }));
        }
        Value::Object(obj) => match obj.get("type").and_then(Value::as_str) {
            Some("FeatureCollection") => {
                let features = obj
                    .get("features")
                    .and_then(Value::as_array)
                    .context("FeatureCollection without features")?;
                for feature in features {
                    out.extend(read_feature(feature)?);
                }
            }
            Some("Feature") => out.extend(read_feature(&value)?),
            Some(_) => {
                let mut polygons = Vec::new();
                read_geometry(&value, &mut polygons)?;
                if !polygons.is_empty() {
                    out.push(SourceFeature {
                        properties: Map::new(),
                        polygons,
                    });
                }
            }
            None => bail!("GeoJSON object without a type"),
        },
        _ => bail!("expected a JSON list of polygons or a GeoJSON object"),
    }

    if let Some(filter) = filter {
        let before = out.len();
        out.retain(|f| filter.matches(&f.properties));
        tracing::info!(%filter, kept = out.len(), dropped = before - out.len(), "property filter");
    }
    Ok(out)
}

/// Every polygon of `features`, in feature order.
pub fn polygons(features: &[SourceFeature]) -> impl Iterator<Item = &Polygon> + '_ {
    features.iter().flat_map(|f| f.polygons.iter())
}

fn read_feature(feature: &Value) -> Result<Option<SourceFeature>> {
    let properties = match feature.get("properties") {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };
    let mut polygons = Vec::new();
    match feature.get("geometry") {
        Some(Value::Null) | None => {
            tracing::warn!("skipping feature without geometry");
        }
        Some(geometry) => read_geometry(geometry, &mut polygons)?,
    }
    Ok((!polygons.is_empty()).then_some(SourceFeature {
        properties,
        polygons,
    }))
}

fn read_geometry(geometry: &Value, out: &mut Vec<Polygon>) -> Result<()> {
    let kind = geometry
        .get("type")
        .and_then(Value::as_str)
        .context("geometry without type")?;
    let coords = geometry
        .get("coordinates")
        .context("geometry without coordinates")?;
    match kind {
        "Polygon" => {
            let rings: Vec<Vec<Vec<f64>>> = serde_json::from_value(coords.clone())?;
            out.push(rings_to_polygon(rings)?);
        }
        "MultiPolygon" => {
            let parts: Vec<Vec<Vec<Vec<f64>>>> = serde_json::from_value(coords.clone())?;
            for rings in parts {
                out.push(rings_to_polygon(rings)?);
            }
        }
        other => tracing::warn!(kind = other, "skipping non-polygon geometry"),
    }
    Ok(())
}

fn rings_to_polygon(rings: Vec<Vec<Vec<f64>>>) -> Result<Polygon> {
    let mut rings = rings.into_iter().map(xy).collect::<Result<Vec<_>>>()?.into_iter();
    let exterior = rings.next().context("polygon without rings")?;
    let holes: Vec<Vec<[f64; 2]>> = rings.collect();
    Ok(Polygon::from_coordinates(&exterior, &holes))
}

fn xy(ring: Vec<Vec<f64>>) -> Result<Vec<[f64; 2]>> {
    ring.into_iter()
        .map(|c| match c.as_slice() {
            [x, y, ..] => Ok([*x, *y]),
            _ => bail!("position with fewer than two coordinates"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_list_with_hole() {
        let text = r#"[
            {"exterior": [[0,0],[4,0],[4,4],[0,4]], "holes": [[[1,1],[3,1],[3,3],[1,3]]]},
            {"exterior": [[5,0],[6,0],[6,1]], "properties": {"name": "wedge"}}
        ]"#;
        let features = parse_features(text, None).unwrap();
        assert_eq!(features.len(), 2);
        let polys: Vec<&Polygon> = polygons(&features).collect();
        assert_eq!(polys[0].interiors.len(), 1);
        assert!((polys[0].area() - 12.0).abs() < 1e-12);
        assert!(features[0].properties.is_empty());
        assert_eq!(features[1].properties["name"], "wedge");
    }

    #[test]
    fn geojson_collection() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"id": 1},
                 "geometry": {"type": "Polygon", "coordinates": [[[0,0,7],[1,0,7],[1,1,7],[0,0,7]]]}},
                {"type": "Feature", "properties": {"id": 2},
                 "geometry": {"type": "MultiPolygon", "coordinates": [
                    [[[2,0],[3,0],[3,1],[2,0]]],
                    [[[4,0],[5,0],[5,1],[4,0]]]
                 ]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "LineString", "coordinates": [[0,0],[1,1]]}},
                {"type": "Feature", "properties": {}, "geometry": null}
            ]
        }"#;
        let features = parse_features(text, None).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].polygons[0].exterior.len(), 3);
        assert_eq!(features[1].polygons.len(), 2);
        assert_eq!(features[1].properties["id"], 2);
        assert_eq!(polygons(&features).count(), 3);
    }

    #[test]
    fn filter_by_property() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"kind": "park"},
                 "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1]]]}},
                {"type": "Feature", "properties": {"kind": ["road", "park"], "lanes": 2},
                 "geometry": {"type": "Polygon", "coordinates": [[[2,0],[3,0],[3,1]]]}},
                {"type": "Feature", "properties": {"kind": "road"},
                 "geometry": {"type": "Polygon", "coordinates": [[[4,0],[5,0],[5,1]]]}},
                {"type": "Feature",
                 "geometry": {"type": "Polygon", "coordinates": [[[6,0],[7,0],[7,1]]]}}
            ]
        }"#;
        let park: PropertyFilter = "kind=park".parse().unwrap();
        assert_eq!(parse_features(text, Some(&park)).unwrap().len(), 2);
        let lanes: PropertyFilter = "lanes = 2".parse().unwrap();
        let kept = parse_features(text, Some(&lanes)).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].properties["kind"][0], "road");
        let none: PropertyFilter = "kind=river".parse().unwrap();
        assert!(parse_features(text, Some(&none)).unwrap().is_empty());
    }

    #[test]
    fn filter_syntax() {
        let f: PropertyFilter = "highway=primary".parse().unwrap();
        assert_eq!(f.key, "highway");
        assert_eq!(f.value, "primary");
        assert_eq!(f.to_string(), "highway=primary");
        assert!("=primary".parse::<PropertyFilter>().is_err());
        assert!("highway".parse::<PropertyFilter>().is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_features("42", None).is_err());
        assert!(parse_features(r#"[{"outline": []}]"#, None).is_err());
        assert!(parse_features(r#"{"type": "Polygon", "coordinates": [[[0]]]}"#, None).is_err());
    }
}
