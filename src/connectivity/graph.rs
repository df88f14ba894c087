//! Snapshot communication graph and exact reachability.

use super::config::{ConnectivityConfig, LinkModel};
use super::signal::{link_ok, link_snr_db};
use crate::model::{Point, UavId};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Vehicle positions at one instant.
pub type Positions = BTreeMap<UavId, Point>;

/// Undirected adjacency: vehicle id to neighbor ids.
pub type Adjacency = BTreeMap<UavId, BTreeSet<UavId>>;

/// Builds the communication graph for `positions` under the configured
/// link model. Every vehicle appears as a key, isolated or not.
///
/// Every vehicle shares the same radio parameters, so the channel is
/// reciprocal: both directions of a link see the same SNR and the
/// `bidirectional` flag cannot split them. Directional links are not
/// modelled.
pub fn build_graph(positions: &Positions, config: &ConnectivityConfig) -> Adjacency {
    let mut adj: Adjacency = positions.keys().map(|&id| (id, BTreeSet::new())).collect();
    let ids: Vec<(UavId, Point)> = positions.iter().map(|(&id, &p)| (id, p)).collect();

    for (i, &(u, pu)) in ids.iter().enumerate() {
        for &(v, pv) in &ids[i + 1..] {
            let d = pu.distance(&pv);
            let linked = match &config.link_model {
                LinkModel::Range => d <= config.effective_range(),
                LinkModel::SignalQuality(params) => {
                    let snr = link_snr_db(d, params);
                    link_ok(snr, snr, params)
                }
            };
            if linked {
                adj.entry(u).or_default().insert(v);
                adj.entry(v).or_default().insert(u);
            }
        }
    }
    adj
}

/// Breadth-first reachability from the smallest vehicle id.
///
/// Graphs with zero or one node are connected.
pub fn is_connected(adj: &Adjacency) -> bool {
    let Some(&start) = adj.keys().next() else {
        return true;
    };
    let mut seen = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(u) = queue.pop_front() {
        for &v in adj.get(&u).into_iter().flatten() {
            if seen.insert(v) {
                queue.push_back(v);
            }
        }
    }
    seen.len() == adj.len()
}

/// Number of undirected edges.
pub fn edge_count(adj: &Adjacency) -> usize {
    adj.values().map(BTreeSet::len).sum::<usize>() / 2
}
