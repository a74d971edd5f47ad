//! Summarize contractions on a few jittered grids.
//!
//! Usage:
//!   cargo run -p octolinear --example grid_report -- 6
//!
//! Prints, per draw: configurations, feasible contractions, and the size of a
//! greedy independent set; then applies that set's first move and re-counts.

use octolinear::orientation::{select_independent, Contraction, ContractionIndex};
use octolinear::rand::{jittered_grid, GridCfg, ReplayToken};
use octolinear::GeomCfg;

fn main() {
    let n: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(4);
    let cfg = GeomCfg::default();
    let grid = GridCfg {
        rows: n,
        cols: n,
        ..GridCfg::default()
    };
    for index in 0..4 {
        let tok = ReplayToken { seed: 2025, index };
        let mut sub = match jittered_grid(grid, tok, &cfg) {
            Ok(sub) => sub,
            Err(err) => {
                eprintln!("draw {index}: {err}");
                continue;
            }
        };
        let Ok(mut idx) = ContractionIndex::build(&sub, &cfg) else {
            eprintln!("draw {index}: index failed");
            continue;
        };
        let (feasible, chosen, first) = {
            let all: Vec<&Contraction> = idx.contractions().collect();
            let chosen = select_independent(&all);
            let first = chosen
                .iter()
                .map(|&i| all[i].clone())
                .find(|k| k.targets().is_some());
            (idx.feasible().len(), chosen.len(), first)
        };
        println!(
            "draw {index}: configs={} feasible={feasible} independent={chosen}",
            idx.len()
        );
        if let Some(k) = first {
            match sub.apply_contraction(&k, &cfg) {
                Ok(delta) => {
                    if let Err(err) = idx.refresh(&sub, &delta, &cfg) {
                        eprintln!("  refresh failed: {err}");
                        continue;
                    }
                    println!(
                        "  applied {} ({:?}, area {:.4}): removed={} configs={} feasible={}",
                        k.inner(),
                        k.sign(),
                        k.area(),
                        delta.removed.len(),
                        idx.len(),
                        idx.feasible().len()
                    );
                }
                Err(err) => eprintln!("  apply failed: {err}"),
            }
        }
    }
}
