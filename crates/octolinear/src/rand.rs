//! Random jittered-grid subdivisions (replay tokens).
//!
//! Purpose
//! - Deterministic test and benchmark inputs: a `rows x cols` grid of quads whose
//!   corners are displaced by bounded jitter. Adjacent cells share borders, so the
//!   result exercises shared edges, degree-4 junctions, and the outer face.
//!
//! Model
//! - Corner `(i, j)` sits at `(j, i) * cell` plus a uniform offset in
//!   `[-jitter_frac, jitter_frac] * cell` per coordinate. The jitter is clamped to
//!   `[0, 0.45]`, which keeps every cell a simple, counter-clockwise quad.
//! - Determinism uses a replay token `(seed, index)` mixed into a single RNG.
//!
//! Code cross-refs: `dcel::SubdivisionBuilder`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cfg::GeomCfg;
use crate::dcel::{Subdivision, SubdivisionBuilder};
use crate::error::TopologyError;
use crate::geom::{Point, Polygon};

/// Grid sampler configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridCfg {
    pub rows: usize,
    pub cols: usize,
    /// Cell side length before jitter.
    pub cell: f64,
    /// Corner displacement as a fraction of `cell`. Clamped to [0, 0.45].
    pub jitter_frac: f64,
}

impl Default for GridCfg {
    fn default() -> Self {
        Self {
            rows: 4,
            cols: 4,
            cell: 1.0,
            jitter_frac: 0.25,
        }
    }
}

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    pub fn to_std_rng(self) -> StdRng {
        // SplitMix64-style mixing, cheap and stable.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        StdRng::seed_from_u64(mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15))))
    }
}

/// One polygon per grid cell, row-major from the bottom-left cell.
pub fn jittered_grid_polygons(cfg: GridCfg, tok: ReplayToken) -> Vec<Polygon> {
    let mut rng = tok.to_std_rng();
    let rows = cfg.rows.max(1);
    let cols = cfg.cols.max(1);
    let cell = if cfg.cell > 0.0 { cfg.cell } else { 1.0 };
    let amp = cfg.jitter_frac.clamp(0.0, 0.45) * cell;
    let mut corners = Vec::with_capacity((rows + 1) * (cols + 1));
    for i in 0..=rows {
        for j in 0..=cols {
            let dx = (rng.gen::<f64>() * 2.0 - 1.0) * amp;
            let dy = (rng.gen::<f64>() * 2.0 - 1.0) * amp;
            corners.push(Point::new(j as f64 * cell + dx, i as f64 * cell + dy));
        }
    }
    let at = |i: usize, j: usize| corners[i * (cols + 1) + j];
    let mut cells = Vec::with_capacity(rows * cols);
    for i in 0..rows {
        for j in 0..cols {
            cells.push(Polygon::from_points(vec![
                at(i, j),
                at(i, j + 1),
                at(i + 1, j + 1),
                at(i + 1, j),
            ]));
        }
    }
    cells
}

/// Jittered grid as a subdivision (`rows * cols` bounded faces).
pub fn jittered_grid(
    cfg: GridCfg,
    tok: ReplayToken,
    geom: &GeomCfg,
) -> Result<Subdivision, TopologyError> {
    SubdivisionBuilder::from_polygons(&jittered_grid_polygons(cfg, tok), geom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reproducible_draw() {
        let tok = ReplayToken { seed: 42, index: 7 };
        let a = jittered_grid_polygons(GridCfg::default(), tok);
        let b = jittered_grid_polygons(GridCfg::default(), tok);
        assert_eq!(a, b);
        let c = jittered_grid_polygons(GridCfg::default(), ReplayToken { seed: 42, index: 8 });
        assert_ne!(a, c);
    }

    #[test]
    fn grid_counts() {
        let cfg = GridCfg {
            rows: 3,
            cols: 5,
            ..GridCfg::default()
        };
        let sub = jittered_grid(cfg, ReplayToken { seed: 1, index: 0 }, &GeomCfg::default()).unwrap();
        assert_eq!(sub.num_vertices(), 4 * 6);
        // Interior edges are shared: 3*6 vertical plus 4*5 horizontal segments.
        assert_eq!(sub.num_half_edges(), 2 * (3 * 6 + 4 * 5));
        assert_eq!(sub.num_faces(), 1 + 15);
        sub.validate().unwrap();
    }

    #[test]
    fn jitter_is_clamped() {
        let cfg = GridCfg {
            rows: 2,
            cols: 2,
            cell: 2.0,
            jitter_frac: 3.0,
        };
        for index in 0..16 {
            for poly in jittered_grid_polygons(cfg, ReplayToken { seed: 9, index }) {
                assert!(!poly.exterior.is_clockwise());
                assert!(poly.area() > 0.0);
            }
        }
    }
}
