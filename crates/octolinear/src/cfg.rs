//! Engine tolerances and construction limits.
//!
//! Policy
//! - One explicit `GeomCfg` value is threaded by reference through every engine
//!   call that compares floats (configuration, contraction, construction).
//! - The kernel primitives in `geom` use the fixed constants in `geom::tol`; the
//!   defaults below agree with them.
//! - Loaded from JSON by the CLI; missing keys fall back to `Default`.

use serde::{Deserialize, Serialize};

use crate::error::CfgError;

/// Tolerances and capacity limits for the schematization engine.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeomCfg {
    /// Two points closer than this (per coordinate) are the same point.
    pub eps_point: f64,
    /// Determinant threshold below which two lines count as parallel.
    pub eps_det: f64,
    /// Swept areas at or below this are zero.
    pub eps_area: f64,
    /// Angle threshold for aligned junctions and converging tracks.
    pub eps_angle: f64,
    /// Snapping grid for vertex deduplication during construction.
    pub position_tolerance: f64,
    pub max_vertices: usize,
    pub max_half_edges: usize,
    pub max_faces: usize,
    /// Recompute blocking numbers after incremental updates (debug builds only).
    pub self_check: bool,
}

impl Default for GeomCfg {
    fn default() -> Self {
        Self {
            eps_point: 1e-10,
            eps_det: 1e-12,
            eps_area: 1e-12,
            eps_angle: 1e-9,
            position_tolerance: 1e-9,
            max_vertices: usize::MAX,
            max_half_edges: usize::MAX,
            max_faces: usize::MAX,
            self_check: true,
        }
    }
}

impl GeomCfg {
    /// Reject non-finite or non-positive tolerances.
    pub fn validate(&self) -> Result<(), CfgError> {
        let fields = [
            ("eps_point", self.eps_point),
            ("eps_det", self.eps_det),
            ("eps_area", self.eps_area),
            ("eps_angle", self.eps_angle),
            ("position_tolerance", self.position_tolerance),
        ];
        for (field, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(CfgError::NonPositive { field, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: GeomCfg = serde_json::from_str(r#"{"eps_area": 0.5, "max_faces": 10}"#).unwrap();
        assert_eq!(cfg.eps_area, 0.5);
        assert_eq!(cfg.max_faces, 10);
        assert_eq!(cfg.eps_point, GeomCfg::default().eps_point);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn unknown_keys_and_bad_values_are_rejected() {
        assert!(serde_json::from_str::<GeomCfg>(r#"{"eps_typo": 1.0}"#).is_err());
        let cfg = GeomCfg {
            eps_det: -1.0,
            ..GeomCfg::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(CfgError::NonPositive {
                field: "eps_det",
                value: -1.0
            })
        );
    }
}
