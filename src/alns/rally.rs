//! Rally-point repair.
//!
//! When a snapshot of the mission is disconnected (or flagged by the
//! surrogate), the two vehicles farthest apart at that instant both get a
//! rendezvous waypoint at their midpoint, with a dwell, right before they
//! fly home.

use crate::connectivity::ConnectivityScreen;
use crate::model::{Instance, Point, RouteItem, Solution, UavId};

/// Smallest dwell at an inserted rally point.
pub const MIN_RALLY_WAIT: f64 = 5.0;

/// Where and why a rally point was inserted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RallyInsertion {
    /// Index of the snapshot that triggered the repair.
    pub snapshot: usize,
    pub time: f64,
    pub pair: (UavId, UavId),
    /// Distance between the pair at `time`.
    pub distance: f64,
    pub point: Point,
    pub wait: f64,
}

/// Single-shot rally insertion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RallyRepair {
    wait: f64,
}

impl Default for RallyRepair {
    fn default() -> Self {
        Self {
            wait: MIN_RALLY_WAIT,
        }
    }
}

impl RallyRepair {
    /// Uses `wait` as dwell, raised to [`MIN_RALLY_WAIT`] if smaller.
    pub fn new(wait: f64) -> Self {
        Self {
            wait: wait.max(MIN_RALLY_WAIT),
        }
    }

    pub fn wait(&self) -> f64 {
        self.wait
    }

    /// Inserts one rally point pair at the first snapshot needing attention.
    ///
    /// Snapshots where every vehicle sits at the same spot are skipped, since
    /// a rendezvous there changes nothing. Returns `None`, leaving `solution`
    /// untouched, when no snapshot qualifies. Routes other than the chosen
    /// pair are never modified.
    pub fn repair(
        &self,
        solution: &mut Solution,
        instance: &Instance,
        screen: &ConnectivityScreen,
    ) -> Option<RallyInsertion> {
        let snapshots = screen.snapshots(solution, instance);
        for (k, snap) in snapshots.iter().enumerate() {
            if !screen.check(&snap.positions).needs_attention() {
                continue;
            }
            let Some((u, v, distance)) = farthest_pair(snap.positions.iter()) else {
                continue;
            };
            if distance <= 0.0 {
                continue;
            }
            let (Some(pu), Some(pv)) = (snap.positions.get(&u), snap.positions.get(&v)) else {
                continue;
            };
            let point = pu.midpoint(pv);
            let rendezvous = solution.next_rendezvous();
            for uav in [u, v] {
                if let Some(route) = solution.route_mut(uav) {
                    let pos = route.len().saturating_sub(1);
                    route.insert(pos, RouteItem::rally(rendezvous, point, self.wait));
                }
            }
            return Some(RallyInsertion {
                snapshot: k,
                time: snap.time,
                pair: (u, v),
                distance,
                point,
                wait: self.wait,
            });
        }
        None
    }
}

/// Pair of vehicles at maximum distance; the first such pair in id order.
fn farthest_pair<'a>(
    positions: impl Iterator<Item = (&'a UavId, &'a Point)> + Clone,
) -> Option<(UavId, UavId, f64)> {
    let mut best: Option<(UavId, UavId, f64)> = None;
    for (i, (&u, pu)) in positions.clone().enumerate() {
        for (&v, pv) in positions.clone().skip(i + 1) {
            let d = pu.distance(pv);
            if best.is_none_or(|(_, _, bd)| d > bd) {
                best = Some((u, v, d));
            }
        }
    }
    best
}
