//! All configurations of a subdivision, kept current across applied contractions.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::cfg::GeomCfg;
use crate::dcel::{HalfEdgeId, Subdivision, TopologyDelta};
use crate::error::TopologyError;

use super::configuration::Configuration;
use super::contraction::Contraction;

/// Configurations keyed by inner half-edge. Edges without a window are skipped.
#[derive(Clone, Debug, Default)]
pub struct ContractionIndex {
    configs: BTreeMap<HalfEdgeId, Configuration>,
}

impl ContractionIndex {
    pub fn build(sub: &Subdivision, cfg: &GeomCfg) -> Result<Self, TopologyError> {
        let mut configs = BTreeMap::new();
        for e in sub.half_edge_ids() {
            let config = Configuration::new(sub, e, cfg)?;
            if config.window().is_some() {
                configs.insert(e, config);
            }
        }
        tracing::debug!(configurations = configs.len(), "built contraction index");
        Ok(Self { configs })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn get(&self, inner: HalfEdgeId) -> Option<&Configuration> {
        self.configs.get(&inner)
    }

    pub fn configurations(&self) -> impl Iterator<Item = &Configuration> + '_ {
        self.configs.values()
    }

    /// Both contractions of every configuration, positive first.
    pub fn contractions(&self) -> impl Iterator<Item = &Contraction> + '_ {
        self.configs.values().flat_map(|c| c.contractions())
    }

    pub fn feasible(&self) -> Vec<&Contraction> {
        self.contractions().filter(|c| c.is_feasible()).collect()
    }

    /// Account for `delta`: rebuild stale configurations, drop removed ones,
    /// and update blocking numbers of the rest.
    pub fn refresh(
        &mut self,
        sub: &Subdivision,
        delta: &TopologyDelta,
        cfg: &GeomCfg,
    ) -> Result<(), TopologyError> {
        for e in &delta.stale {
            self.configs.remove(e);
        }
        for config in self.configs.values_mut() {
            for c in config.contractions_mut() {
                c.apply_delta(sub, delta)?;
            }
            config.mark_current(sub);
        }
        let mut rebuilt = 0usize;
        for &e in &delta.stale {
            if !sub.contains_half_edge(e) {
                continue;
            }
            let config = Configuration::new(sub, e, cfg)?;
            if config.window().is_some() {
                self.configs.insert(e, config);
                rebuilt += 1;
            }
        }
        tracing::debug!(
            rebuilt,
            kept = self.configs.len() - rebuilt,
            generation = sub.generation(),
            "refreshed contraction index"
        );
        Ok(())
    }
}

/// Two contractions that must not be applied in the same round.
///
/// Same inner edge always conflicts. Same sign conflicts on any shared window
/// edge; opposite signs defer to `Contraction::is_conflicting`.
pub fn conflicts(a: &Contraction, b: &Contraction) -> bool {
    if a.inner() == b.inner() {
        return true;
    }
    if a.sign() == b.sign() {
        a.shared_window_edges(b) > 0
    } else {
        a.is_conflicting(b)
    }
}

/// Adjacency lists over indices into `contractions`.
pub fn conflict_graph(contractions: &[&Contraction]) -> Vec<Vec<usize>> {
    let n = contractions.len();
    let mut adj = vec![Vec::new(); n];
    for i in 0..n {
        for j in (i + 1)..n {
            if conflicts(contractions[i], contractions[j]) {
                adj[i].push(j);
                adj[j].push(i);
            }
        }
    }
    adj
}

/// Greedy independent set of feasible contractions, smallest area first.
///
/// Returns indices into `contractions`.
pub fn select_independent(contractions: &[&Contraction]) -> Vec<usize> {
    let adj = conflict_graph(contractions);
    let mut order: Vec<usize> = (0..contractions.len())
        .filter(|&i| contractions[i].is_feasible())
        .collect();
    order.sort_by(|&i, &j| {
        contractions[i]
            .area()
            .partial_cmp(&contractions[j].area())
            .unwrap_or(Ordering::Equal)
            .then(i.cmp(&j))
    });
    let mut taken = vec![false; contractions.len()];
    let mut out = Vec::new();
    for i in order {
        if adj[i].iter().any(|&j| taken[j]) {
            continue;
        }
        taken[i] = true;
        out.push(i);
    }
    out
}
