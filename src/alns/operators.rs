//! Destroy and repair operators for multi-UAV routing.
//!
//! Destroy operators:
//! - [`RandomRemoval`]: uniformly random targets
//! - [`WorstRemoval`]: targets with the largest detour, randomized
//! - [`SegmentRemoval`]: a contiguous run of targets from one route
//!
//! Repair operators:
//! - [`GreedyInsertion`]: cheapest insertion over all vehicles
//! - [`RegretInsertion`]: k-regret insertion
//! - [`RandomInsertion`]: random vehicle, cheapest position
//!
//! [`DestroyKind`] and [`RepairKind`] wrap them for enum dispatch.

use super::config::AlnsConfig;
use super::types::{removal_count, DestroyOperator, PartialSolution, RepairOperator};
use crate::model::{Instance, Node, NodeId, RouteItem, Solution, UavId};
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;

/// Removal saving of every served target, as `(target, saving)`.
fn removal_savings(solution: &Solution) -> Vec<(NodeId, f64)> {
    let mut out = Vec::new();
    for route in solution.routes.values() {
        for pos in 1..route.len().saturating_sub(1) {
            let item = &route[pos];
            let Some(id) = item.node_id.filter(|_| item.is_target()) else {
                continue;
            };
            let prev = &route[pos - 1].position;
            let next = &route[pos + 1].position;
            let saving =
                prev.distance(&item.position) + item.position.distance(next) - prev.distance(next);
            out.push((id, saving));
        }
    }
    out
}

/// Strips rally points and takes `ids` out of the plan.
fn take_targets(instance: &Instance, mut solution: Solution, ids: &[NodeId]) -> PartialSolution {
    solution.strip_rally_points();
    let mut partial = PartialSolution::new(solution);
    for &id in ids {
        if partial.solution.remove_target(id).is_some() {
            if let Some(node) = instance.target(id) {
                partial.removed.push(*node);
            }
        }
    }
    partial
}

/// Cheapest `(uav, position, delta)` for inserting `node` anywhere.
fn cheapest_insertion(solution: &Solution, node: &Node) -> Option<(UavId, usize, f64)> {
    let mut best: Option<(UavId, usize, f64)> = None;
    for &uav in solution.routes.keys() {
        if let Some((pos, delta)) = solution.best_insertion(uav, &node.position) {
            if best.is_none_or(|(_, _, d)| delta < d) {
                best = Some((uav, pos, delta));
            }
        }
    }
    best
}

fn insert_target(solution: &mut Solution, uav: UavId, pos: usize, node: &Node) {
    if let Some(route) = solution.route_mut(uav) {
        route.insert(pos, RouteItem::target(node));
    }
}

// ---- Destroy ----

/// Removes uniformly random targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomRemoval;

impl DestroyOperator for RandomRemoval {
    fn name(&self) -> &str {
        "random_removal"
    }

    fn destroy<R: Rng>(
        &self,
        instance: &Instance,
        solution: &Solution,
        degree: f64,
        rng: &mut R,
    ) -> PartialSolution {
        let mut served = solution.served_targets();
        let n = removal_count(served.len(), degree);
        served.shuffle(rng);
        served.truncate(n);
        take_targets(instance, solution.clone(), &served)
    }
}

/// Removes targets whose removal saves the most travel.
///
/// Candidates are ranked by saving and picked at index `floor(y^p * n)` with
/// `y` uniform in [0, 1), so `randomness` (p) >= 1 biases toward the worst.
///
/// # References
///
/// Ropke & Pisinger (2006), Section 3.1.2 (worst removal)
#[derive(Debug, Clone, Copy)]
pub struct WorstRemoval {
    pub randomness: f64,
}

impl Default for WorstRemoval {
    fn default() -> Self {
        Self { randomness: 3.0 }
    }
}

impl DestroyOperator for WorstRemoval {
    fn name(&self) -> &str {
        "worst_removal"
    }

    fn destroy<R: Rng>(
        &self,
        instance: &Instance,
        solution: &Solution,
        degree: f64,
        rng: &mut R,
    ) -> PartialSolution {
        let mut partial = take_targets(instance, solution.clone(), &[]);
        let n = removal_count(partial.solution.served_targets().len(), degree);

        for _ in 0..n {
            let mut savings = removal_savings(&partial.solution);
            if savings.is_empty() {
                break;
            }
            savings.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(Ordering::Equal)
                    .then(a.0.cmp(&b.0))
            });
            let y: f64 = rng.random();
            let idx = ((y.powf(self.randomness) * savings.len() as f64) as usize)
                .min(savings.len() - 1);
            let id = savings[idx].0;
            if partial.solution.remove_target(id).is_some() {
                if let Some(node) = instance.target(id) {
                    partial.removed.push(*node);
                }
            }
        }
        partial
    }
}

/// Removes a contiguous run of targets from one randomly chosen route.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentRemoval;

impl DestroyOperator for SegmentRemoval {
    fn name(&self) -> &str {
        "segment_removal"
    }

    fn destroy<R: Rng>(
        &self,
        instance: &Instance,
        solution: &Solution,
        degree: f64,
        rng: &mut R,
    ) -> PartialSolution {
        let n = removal_count(solution.served_targets().len(), degree);
        let busy: Vec<UavId> = solution
            .routes
            .keys()
            .copied()
            .filter(|&u| solution.target_count(u) > 0)
            .collect();
        if busy.is_empty() {
            return take_targets(instance, solution.clone(), &[]);
        }

        let uav = busy[rng.random_range(0..busy.len())];
        let targets: Vec<NodeId> = solution
            .route(uav)
            .map(|r| {
                r.iter()
                    .filter(|i| i.is_target())
                    .filter_map(|i| i.node_id)
                    .collect()
            })
            .unwrap_or_default();
        let len = n.min(targets.len());
        let start = rng.random_range(0..=targets.len() - len);
        take_targets(instance, solution.clone(), &targets[start..start + len])
    }
}

// ---- Repair ----

/// Inserts, one at a time, the removed target with the cheapest insertion.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyInsertion;

impl RepairOperator for GreedyInsertion {
    fn name(&self) -> &str {
        "greedy_insertion"
    }

    fn repair<R: Rng>(
        &self,
        _instance: &Instance,
        partial: PartialSolution,
        _rng: &mut R,
    ) -> Solution {
        let PartialSolution {
            mut solution,
            mut removed,
        } = partial;

        while !removed.is_empty() {
            let mut best: Option<(usize, UavId, usize, f64)> = None;
            for (idx, node) in removed.iter().enumerate() {
                if let Some((uav, pos, delta)) = cheapest_insertion(&solution, node) {
                    if best.is_none_or(|(_, _, _, d)| delta < d) {
                        best = Some((idx, uav, pos, delta));
                    }
                }
            }
            let Some((idx, uav, pos, _)) = best else {
                break;
            };
            let node = removed.remove(idx);
            insert_target(&mut solution, uav, pos, &node);
        }
        solution
    }
}

/// k-regret insertion.
///
/// Repeatedly inserts the target maximizing `sum_{j<k} (c_j - c_0)` where
/// `c_j` is its j-th cheapest per-vehicle insertion cost; ties go to the
/// smaller `c_0`.
///
/// # References
///
/// Ropke & Pisinger (2006), Section 3.2.2 (regret heuristics)
#[derive(Debug, Clone, Copy)]
pub struct RegretInsertion {
    pub k: usize,
}

impl Default for RegretInsertion {
    fn default() -> Self {
        Self { k: 2 }
    }
}

impl RepairOperator for RegretInsertion {
    fn name(&self) -> &str {
        if self.k >= 3 {
            "regret3_insertion"
        } else {
            "regret2_insertion"
        }
    }

    fn repair<R: Rng>(
        &self,
        _instance: &Instance,
        partial: PartialSolution,
        _rng: &mut R,
    ) -> Solution {
        let PartialSolution {
            mut solution,
            mut removed,
        } = partial;

        while !removed.is_empty() {
            // (index, regret, best uav, best pos, best cost)
            let mut choice: Option<(usize, f64, UavId, usize, f64)> = None;
            for (idx, node) in removed.iter().enumerate() {
                let mut options: Vec<(UavId, usize, f64)> = solution
                    .routes
                    .keys()
                    .filter_map(|&u| {
                        solution
                            .best_insertion(u, &node.position)
                            .map(|(pos, delta)| (u, pos, delta))
                    })
                    .collect();
                if options.is_empty() {
                    continue;
                }
                options.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(Ordering::Equal));
                let (uav, pos, c0) = options[0];
                let regret: f64 = options
                    .iter()
                    .skip(1)
                    .take(self.k.saturating_sub(1))
                    .map(|o| o.2 - c0)
                    .sum();

                let better = match choice {
                    None => true,
                    Some((_, r, _, _, c)) => regret > r || (regret == r && c0 < c),
                };
                if better {
                    choice = Some((idx, regret, uav, pos, c0));
                }
            }
            let Some((idx, _, uav, pos, _)) = choice else {
                break;
            };
            let node = removed.remove(idx);
            insert_target(&mut solution, uav, pos, &node);
        }
        solution
    }
}

/// Inserts removed targets in random order into random vehicles, each at
/// the cheapest position of the chosen route.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomInsertion;

impl RepairOperator for RandomInsertion {
    fn name(&self) -> &str {
        "random_insertion"
    }

    fn repair<R: Rng>(
        &self,
        _instance: &Instance,
        partial: PartialSolution,
        rng: &mut R,
    ) -> Solution {
        let PartialSolution {
            mut solution,
            mut removed,
        } = partial;
        let uavs: Vec<UavId> = solution.routes.keys().copied().collect();
        if uavs.is_empty() {
            return solution;
        }

        removed.shuffle(rng);
        for node in &removed {
            let uav = uavs[rng.random_range(0..uavs.len())];
            if let Some((pos, _)) = solution.best_insertion(uav, &node.position) {
                insert_target(&mut solution, uav, pos, node);
            }
        }
        solution
    }
}

// ---- Enum dispatch ----

/// Built-in destroy operators.
#[derive(Debug, Clone, Copy)]
pub enum DestroyKind {
    Random(RandomRemoval),
    Worst(WorstRemoval),
    Segment(SegmentRemoval),
}

impl DestroyKind {
    /// Random, worst and segment removal, in that order.
    pub fn defaults() -> Vec<DestroyKind> {
        vec![
            DestroyKind::Random(RandomRemoval),
            DestroyKind::Worst(WorstRemoval::default()),
            DestroyKind::Segment(SegmentRemoval),
        ]
    }
}

impl DestroyOperator for DestroyKind {
    fn name(&self) -> &str {
        match self {
            DestroyKind::Random(d) => d.name(),
            DestroyKind::Worst(d) => d.name(),
            DestroyKind::Segment(d) => d.name(),
        }
    }

    fn destroy<R: Rng>(
        &self,
        instance: &Instance,
        solution: &Solution,
        degree: f64,
        rng: &mut R,
    ) -> PartialSolution {
        match self {
            DestroyKind::Random(d) => d.destroy(instance, solution, degree, rng),
            DestroyKind::Worst(d) => d.destroy(instance, solution, degree, rng),
            DestroyKind::Segment(d) => d.destroy(instance, solution, degree, rng),
        }
    }
}

/// Built-in repair operators.
#[derive(Debug, Clone, Copy)]
pub enum RepairKind {
    Greedy(GreedyInsertion),
    Regret(RegretInsertion),
    Random(RandomInsertion),
}

impl RepairKind {
    /// Greedy, k-regret (with `config.k_regret`) and random insertion.
    pub fn defaults(config: &AlnsConfig) -> Vec<RepairKind> {
        vec![
            RepairKind::Greedy(GreedyInsertion),
            RepairKind::Regret(RegretInsertion { k: config.k_regret }),
            RepairKind::Random(RandomInsertion),
        ]
    }
}

impl RepairOperator for RepairKind {
    fn name(&self) -> &str {
        match self {
            RepairKind::Greedy(r) => r.name(),
            RepairKind::Regret(r) => r.name(),
            RepairKind::Random(r) => r.name(),
        }
    }

    fn repair<R: Rng>(
        &self,
        instance: &Instance,
        partial: PartialSolution,
        rng: &mut R,
    ) -> Solution {
        match self {
            RepairKind::Greedy(r) => r.repair(instance, partial, rng),
            RepairKind::Regret(r) => r.repair(instance, partial, rng),
            RepairKind::Random(r) => r.repair(instance, partial, rng),
        }
    }
}

/// Mean cheapest reinsertion cost over all served targets of `solution`.
///
/// Each target is taken out on its own and priced at its cheapest position
/// over the whole fleet. Zero when nothing is served.
pub fn mean_insertion_cost(solution: &Solution) -> f64 {
    let mut base = solution.clone();
    base.strip_rally_points();
    let mut total = 0.0;
    let mut count = 0usize;
    for route in base.routes.values() {
        for item in route.iter().filter(|i| i.is_target()) {
            let Some(id) = item.node_id else { continue };
            let mut without = base.clone();
            without.remove_target(id);
            let node = Node {
                id,
                position: item.position,
            };
            if let Some((_, _, delta)) = cheapest_insertion(&without, &node) {
                total += delta;
                count += 1;
            }
        }
    }
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}
