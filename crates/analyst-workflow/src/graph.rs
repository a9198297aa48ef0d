//! Execution planning over the static stage graph

use std::collections::{BTreeMap, BTreeSet};

use analyst_core::StageId;
use tracing::debug;

/// Order the requested stages for execution
///
/// Duplicates are ignored. Any stage a requested stage requires is added to
/// the plan even if it was not requested, which puts the data acquisition
/// root first whenever an analysis stage is asked for. The remaining order
/// is topological over [`StageId::requires`] and [`StageId::runs_after`]
/// edges between planned stages; ties are broken by canonical stage order,
/// so the plan is deterministic.
pub fn plan(requested: &[StageId]) -> Vec<StageId> {
    let mut planned: BTreeSet<StageId> = BTreeSet::new();
    let mut pending: Vec<StageId> = requested.to_vec();
    while let Some(stage) = pending.pop() {
        if planned.insert(stage) {
            pending.extend_from_slice(stage.requires());
        }
    }

    let mut in_degree: BTreeMap<StageId, usize> = planned.iter().map(|s| (*s, 0)).collect();
    let mut dependents: BTreeMap<StageId, Vec<StageId>> = BTreeMap::new();
    for &stage in &planned {
        for &upstream in stage.requires().iter().chain(stage.runs_after()) {
            if planned.contains(&upstream) {
                dependents.entry(upstream).or_default().push(stage);
                *in_degree.entry(stage).or_default() += 1;
            }
        }
    }

    let mut ready: BTreeSet<StageId> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(stage, _)| *stage)
        .collect();
    let mut order = Vec::with_capacity(planned.len());

    while let Some(stage) = ready.pop_first() {
        order.push(stage);
        for &next in dependents.get(&stage).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(&next) {
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(next);
                }
            }
        }
    }

    debug!("Planned stages: {:?} (requested {:?})", order, requested);
    order
}
