use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use octolinear::dcel::{HalfEdgeId, Subdivision, SubdivisionBuilder};
use octolinear::orientation::{select_independent, Contraction, ContractionIndex, Sign};
use octolinear::rand::{jittered_grid, GridCfg, ReplayToken};
use octolinear::{GeomCfg, TopologyError};
use polars::prelude::*;
use serde_json::json;
use tracing_subscriber::fmt::SubscriberBuilder;

mod input;
mod output;
mod provenance;

use input::{PropertyFilter, SourceFeature};
use provenance::{write_sidecar, Payload};

#[derive(Parser)]
#[command(name = "octolinear")]
#[command(about = "Contraction analysis for polygon subdivisions")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Build the subdivision from polygons and write one row per contraction
    Analyze {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// JSON file with tolerance overrides
        #[arg(long)]
        config: Option<PathBuf>,
        /// Keep only features whose property matches, as key=value
        #[arg(long)]
        filter: Option<PropertyFilter>,
    },
    /// Build and validate the subdivision, then print counts
    Check {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        filter: Option<PropertyFilter>,
    },
    /// Apply rounds of independent contractions and write the result as GeoJSON
    Schematize {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        filter: Option<PropertyFilter>,
        /// Upper bound on selection rounds; stops early once nothing applies
        #[arg(long, default_value_t = 10)]
        rounds: usize,
    },
    /// Analyze a random jittered grid
    Demo {
        #[arg(long, default_value_t = 4)]
        rows: usize,
        #[arg(long, default_value_t = 4)]
        cols: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 0.25)]
        jitter: f64,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Analyze {
            input,
            out,
            config,
            filter,
        } => analyze(&input, &out, config.as_deref(), filter.as_ref()),
        Action::Check {
            input,
            config,
            filter,
        } => check(&input, config.as_deref(), filter.as_ref()),
        Action::Schematize {
            input,
            out,
            config,
            filter,
            rounds,
        } => schematize(&input, &out, config.as_deref(), filter.as_ref(), rounds),
        Action::Demo {
            rows,
            cols,
            seed,
            jitter,
            out,
        } => demo(rows, cols, seed, jitter, &out),
        Action::Report => report(),
    }
}

fn load_cfg(path: Option<&Path>) -> Result<GeomCfg> {
    let Some(path) = path else {
        return Ok(GeomCfg::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let cfg: GeomCfg =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Input features, the subdivision built from their polygons, and the map from
/// subdivision feature index back to input feature.
struct Loaded {
    features: Vec<SourceFeature>,
    sub: Subdivision,
    owner: BTreeMap<usize, usize>,
}

fn load(input: &Path, cfg: &GeomCfg, filter: Option<&PropertyFilter>) -> Result<Loaded> {
    let features = input::read_features(input, filter)?;
    let mut builder = SubdivisionBuilder::new(cfg);
    let mut owner = BTreeMap::new();
    for (i, feature) in features.iter().enumerate() {
        for polygon in &feature.polygons {
            owner.insert(builder.add_polygon(polygon)?, i);
        }
    }
    let sub = builder
        .build()
        .with_context(|| format!("building subdivision from {}", input.display()))?;
    tracing::debug!(
        features = features.len(),
        polygons = input::polygons(&features).count(),
        "loaded input"
    );
    Ok(Loaded {
        features,
        sub,
        owner,
    })
}

fn filter_param(filter: Option<&PropertyFilter>) -> serde_json::Value {
    filter.map_or(serde_json::Value::Null, |f| json!(f.to_string()))
}

fn analyze(
    input: &Path,
    out: &Path,
    config: Option<&Path>,
    filter: Option<&PropertyFilter>,
) -> Result<()> {
    let cfg = load_cfg(config)?;
    let Loaded { sub, .. } = load(input, &cfg, filter)?;
    let (mut df, summary) = verdicts(&sub, &cfg)?;
    write_csv(&mut df, out)?;
    tracing::info!(
        input = %input.display(),
        out = %out.display(),
        rows = df.height(),
        feasible = ?summary["feasible"].as_u64(),
        "analyze"
    );
    let params = json!({
        "input": input.to_string_lossy(),
        "config": cfg,
        "filter": filter_param(filter),
    });
    write_sidecar(out, Payload::new(params).with_summary(summary))?;
    Ok(())
}

fn check(input: &Path, config: Option<&Path>, filter: Option<&PropertyFilter>) -> Result<()> {
    let cfg = load_cfg(config)?;
    let Loaded { sub, .. } = load(input, &cfg, filter)?;
    sub.validate().context("validating subdivision")?;
    let counts = json!({
        "vertices": sub.num_vertices(),
        "half_edges": sub.num_half_edges(),
        "faces": sub.num_faces(),
    });
    tracing::info!(input = %input.display(), %counts, "check");
    println!("{}", serde_json::to_string_pretty(&counts)?);
    Ok(())
}

fn schematize(
    input: &Path,
    out: &Path,
    config: Option<&Path>,
    filter: Option<&PropertyFilter>,
    rounds: usize,
) -> Result<()> {
    let cfg = load_cfg(config)?;
    let Loaded {
        features,
        mut sub,
        owner,
    } = load(input, &cfg, filter)?;
    let half_edges = sub.num_half_edges();
    let applied = contract(&mut sub, &cfg, rounds)?;
    let doc = output::to_geojson(&sub, &features, &owner)?;

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    fs::write(out, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", out.display()))?;
    tracing::info!(
        input = %input.display(),
        out = %out.display(),
        applied,
        half_edges_before = half_edges,
        half_edges_after = sub.num_half_edges(),
        "schematize"
    );
    let params = json!({
        "input": input.to_string_lossy(),
        "config": cfg,
        "filter": filter_param(filter),
        "rounds": rounds,
    });
    let summary = json!({
        "applied": applied,
        "half_edges_before": half_edges,
        "half_edges_after": sub.num_half_edges(),
        "features": doc["features"].as_array().map_or(0, Vec::len),
    });
    write_sidecar(out, Payload::new(params).with_summary(summary))?;
    Ok(())
}

/// Up to `rounds` rounds of: select an independent set of feasible contractions,
/// apply its members one by one, refreshing the index after each. Members that
/// went stale or infeasible earlier in the round are skipped. Returns the number
/// applied.
fn contract(sub: &mut Subdivision, cfg: &GeomCfg, rounds: usize) -> Result<usize> {
    let mut index = ContractionIndex::build(sub, cfg)?;
    let mut applied = 0;
    for round in 0..rounds {
        let picked: Vec<(HalfEdgeId, Sign)> = {
            let all: Vec<&Contraction> = index.contractions().collect();
            select_independent(&all)
                .into_iter()
                .map(|i| (all[i].inner(), all[i].sign()))
                .collect()
        };
        let mut moved = 0;
        for (inner, sign) in picked {
            let Some(k) = index.get(inner).map(|c| c.contraction(sign).clone()) else {
                continue;
            };
            if !k.is_feasible() || k.targets().is_none() {
                continue;
            }
            let delta = match sub.apply_contraction(&k, cfg) {
                Ok(delta) => delta,
                Err(TopologyError::NotApplicable(edge)) => {
                    tracing::debug!(%edge, "contraction no longer applies");
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            index.refresh(sub, &delta, cfg)?;
            moved += 1;
        }
        tracing::debug!(round, moved, "contraction round");
        applied += moved;
        if moved == 0 {
            break;
        }
    }
    sub.validate().context("validating contracted subdivision")?;
    Ok(applied)
}

fn demo(rows: usize, cols: usize, seed: u64, jitter: f64, out: &Path) -> Result<()> {
    let cfg = GeomCfg::default();
    let grid = GridCfg {
        rows,
        cols,
        jitter_frac: jitter,
        ..GridCfg::default()
    };
    let sub = jittered_grid(grid, ReplayToken { seed, index: 0 }, &cfg)?;
    let (mut df, summary) = verdicts(&sub, &cfg)?;
    write_csv(&mut df, out)?;
    tracing::info!(rows, cols, seed, out = %out.display(), contractions = df.height(), "demo");
    let params = json!({ "rows": rows, "cols": cols, "seed": seed, "jitter": jitter });
    write_sidecar(out, Payload::new(params).with_summary(summary))?;
    Ok(())
}

fn report() -> Result<()> {
    let mut obj = provenance::header();
    obj["config"] = serde_json::to_value(GeomCfg::default())?;
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

/// One row per contraction, plus summary counts for the sidecar.
fn verdicts(sub: &Subdivision, cfg: &GeomCfg) -> Result<(DataFrame, serde_json::Value)> {
    let index = ContractionIndex::build(sub, cfg)?;
    let all: Vec<&Contraction> = index.contractions().collect();
    let mut independent = vec![false; all.len()];
    for i in select_independent(&all) {
        independent[i] = true;
    }

    let n = all.len();
    let mut edge = Vec::with_capacity(n);
    let mut sign = Vec::with_capacity(n);
    let mut x = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    let mut area = Vec::with_capacity(n);
    let mut blocking = Vec::with_capacity(n);
    let mut feasible = Vec::with_capacity(n);
    let mut junction = Vec::with_capacity(n);
    for c in &all {
        let config = index
            .get(c.inner())
            .context("contraction without configuration")?;
        let point = c.point().point();
        edge.push(c.inner().index() as u64);
        sign.push(match c.sign() {
            Sign::Positive => "positive",
            Sign::Negative => "negative",
        });
        x.push(point.map(|p| p.x));
        y.push(point.map(|p| p.y));
        area.push(c.area());
        blocking.push(c.blocking_number() as u64);
        feasible.push(c.is_feasible());
        junction.push(config.has_junction(sub)?);
    }
    let n_feasible = feasible.iter().filter(|f| **f).count();
    let df = df!(
        "edge" => edge,
        "sign" => sign,
        "x" => x,
        "y" => y,
        "area" => area,
        "blocking" => blocking,
        "feasible" => feasible,
        "junction" => junction,
        "independent" => independent,
    )?;
    let summary = json!({
        "configurations": index.len(),
        "contractions": n,
        "feasible": n_feasible,
    });
    Ok((df, summary))
}

fn write_csv(df: &mut DataFrame, out: &Path) -> Result<()> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    let mut file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("writing {}", out.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const NOTCH: &str = r#"[
        {"exterior": [[0,0],[10,0],[10,10],[6,10],[5,9],[4,10],[0,10]]}
    ]"#;

    #[test]
    fn analyze_writes_rows_and_sidecar() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("notch.json");
        fs::write(&input, NOTCH).unwrap();
        let out = dir.path().join("out").join("verdicts.csv");
        analyze(&input, &out, None, None).unwrap();

        let text = fs::read_to_string(&out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("edge,sign,x,y,area,blocking,feasible,junction,independent")
        );
        // Seven edges, both halves, both signs.
        assert_eq!(lines.count(), 28);
        assert!(dir.path().join("out").join("verdicts.provenance.json").exists());
    }

    #[test]
    fn analyze_honours_property_filter() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("two.json");
        fs::write(
            &input,
            r#"[
                {"exterior": [[0,0],[10,0],[10,10],[6,10],[5,9],[4,10],[0,10]],
                 "properties": {"kind": "block"}},
                {"exterior": [[20,0],[24,0],[24,4],[20,4]], "properties": {"kind": "yard"}}
            ]"#,
        )
        .unwrap();
        let out = dir.path().join("blocks.csv");
        let filter: PropertyFilter = "kind=block".parse().unwrap();
        analyze(&input, &out, None, Some(&filter)).unwrap();

        // Only the notched block survives the filter.
        let text = fs::read_to_string(&out).unwrap();
        assert_eq!(text.lines().count(), 1 + 28);
        let sidecar: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.path().join("blocks.provenance.json")).unwrap())
                .unwrap();
        assert_eq!(sidecar["params"]["filter"], "kind=block");
    }

    #[test]
    fn schematize_without_rounds_round_trips() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("block.json");
        fs::write(
            &input,
            r#"[{"exterior": [[0,0],[10,0],[10,10],[6,10],[5,9],[4,10],[0,10]],
                 "properties": {"name": "block"}}]"#,
        )
        .unwrap();
        let out = dir.path().join("out").join("block.geojson");
        schematize(&input, &out, None, None, 0).unwrap();

        let doc: serde_json::Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
        assert_eq!(doc["type"], "FeatureCollection");
        assert_eq!(doc["features"][0]["properties"]["name"], "block");
        let back = input::parse_features(&doc.to_string(), None).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].polygons.len(), 1);
        assert_eq!(back[0].polygons[0].exterior.len(), 7);
        assert!((back[0].polygons[0].area() - 99.0).abs() < 1e-9);
    }

    #[test]
    fn schematize_rounds_keep_a_valid_result() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("notch.json");
        fs::write(&input, NOTCH).unwrap();
        let out = dir.path().join("notch.geojson");
        schematize(&input, &out, None, None, 3).unwrap();

        let text = fs::read_to_string(&out).unwrap();
        let back = input::parse_features(&text, None).unwrap();
        assert!(back.len() <= 1);
        for polygon in input::polygons(&back) {
            assert!(polygon.area() > 0.0);
        }
        let sidecar: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.path().join("notch.provenance.json")).unwrap())
                .unwrap();
        assert_eq!(sidecar["params"]["rounds"], 3);
        assert!(sidecar["summary"]["applied"].is_u64());
        assert_eq!(
            sidecar["summary"]["features"].as_u64(),
            Some(back.len() as u64)
        );
    }

    #[test]
    fn config_overrides_and_rejects() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("cfg.json");
        fs::write(&good, r#"{"eps_area": 1e-6}"#).unwrap();
        let cfg = load_cfg(Some(&good)).unwrap();
        assert_eq!(cfg.eps_area, 1e-6);
        assert_eq!(cfg.eps_point, GeomCfg::default().eps_point);

        let unknown = dir.path().join("unknown.json");
        fs::write(&unknown, r#"{"eps": 1.0}"#).unwrap();
        assert!(load_cfg(Some(&unknown)).is_err());

        let negative = dir.path().join("negative.json");
        fs::write(&negative, r#"{"eps_point": -1.0}"#).unwrap();
        assert!(load_cfg(Some(&negative)).is_err());
    }

    #[test]
    fn demo_grid_report() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("demo.csv");
        demo(2, 3, 11, 0.2, &out).unwrap();
        let text = fs::read_to_string(&out).unwrap();
        // 2x3 grid: 17 edges, 34 half-edges, two contractions each.
        assert_eq!(text.lines().count(), 1 + 68);
    }

    #[test]
    fn check_rejects_missing_input() {
        let dir = tempdir().unwrap();
        assert!(check(&dir.path().join("absent.json"), None, None).is_err());
    }
}
