//! Mutable route representation.

use super::instance::{Instance, Node, NodeId, Point, UavId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Role of a waypoint in a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteItemKind {
    Depot,
    Target,
    RallyPoint,
}

/// A single waypoint of a vehicle route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteItem {
    pub kind: RouteItemKind,
    /// Node identity for depot and target items; `None` for rally points.
    pub node_id: Option<NodeId>,
    pub position: Point,
    /// Dwell time at this waypoint, `>= 0`.
    pub wait: f64,
    /// Rendezvous shared by the rally waypoints of one repair.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendezvous: Option<usize>,
}

impl RouteItem {
    pub fn depot(node: &Node) -> Self {
        Self {
            kind: RouteItemKind::Depot,
            node_id: Some(node.id),
            position: node.position,
            wait: 0.0,
            rendezvous: None,
        }
    }

    pub fn target(node: &Node) -> Self {
        Self {
            kind: RouteItemKind::Target,
            node_id: Some(node.id),
            position: node.position,
            wait: 0.0,
            rendezvous: None,
        }
    }

    /// Rally waypoint belonging to `rendezvous`.
    pub fn rally(rendezvous: usize, position: Point, wait: f64) -> Self {
        Self {
            kind: RouteItemKind::RallyPoint,
            node_id: None,
            position,
            wait: wait.max(0.0),
            rendezvous: Some(rendezvous),
        }
    }

    pub fn is_target(&self) -> bool {
        self.kind == RouteItemKind::Target
    }

    pub fn is_rally_point(&self) -> bool {
        self.kind == RouteItemKind::RallyPoint
    }
}

/// Length of a route polyline.
pub fn route_length(route: &[RouteItem]) -> f64 {
    route
        .windows(2)
        .map(|w| w[0].position.distance(&w[1].position))
        .sum()
}

/// Detour added by inserting `point` in front of `route[pos]`.
///
/// `pos` must be in `1..route.len()`.
pub fn insertion_delta(route: &[RouteItem], pos: usize, point: &Point) -> f64 {
    let prev = &route[pos - 1].position;
    let next = &route[pos].position;
    prev.distance(point) + point.distance(next) - prev.distance(next)
}

/// A routing plan: one depot-to-depot route per vehicle.
///
/// Routes are kept in a `BTreeMap` so iteration order, and therefore every
/// derived quantity, is independent of construction order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Solution {
    pub routes: BTreeMap<UavId, Vec<RouteItem>>,
}

impl Solution {
    /// A solution where every vehicle stays at the depot.
    pub fn empty(instance: &Instance) -> Self {
        let routes = instance
            .uavs
            .iter()
            .map(|u| {
                (
                    u.id,
                    vec![RouteItem::depot(&instance.depot), RouteItem::depot(&instance.depot)],
                )
            })
            .collect();
        Self { routes }
    }

    /// Assigns target `i` to vehicle `i mod m`, in instance order.
    pub fn round_robin(instance: &Instance) -> Self {
        let mut solution = Self::empty(instance);
        if instance.uavs.is_empty() {
            return solution;
        }
        for (idx, target) in instance.targets.iter().enumerate() {
            let uav = instance.uavs[idx % instance.uavs.len()].id;
            if let Some(route) = solution.routes.get_mut(&uav) {
                let end = route.len() - 1;
                route.insert(end, RouteItem::target(target));
            }
        }
        solution
    }

    pub fn route(&self, uav: UavId) -> Option<&[RouteItem]> {
        self.routes.get(&uav).map(Vec::as_slice)
    }

    pub fn route_mut(&mut self, uav: UavId) -> Option<&mut Vec<RouteItem>> {
        self.routes.get_mut(&uav)
    }

    /// Sum of all route lengths.
    pub fn total_travel(&self) -> f64 {
        self.routes.values().map(|r| route_length(r)).sum()
    }

    /// Longest and shortest route length, `(max, min)`; `(0, 0)` without routes.
    pub fn workload_extrema(&self) -> (f64, f64) {
        let mut lengths = self.routes.values().map(|r| route_length(r));
        let Some(first) = lengths.next() else {
            return (0.0, 0.0);
        };
        lengths.fold((first, first), |(hi, lo), l| (hi.max(l), lo.min(l)))
    }

    /// Completion time of the slowest vehicle, including dwell times.
    pub fn makespan(&self, instance: &Instance, default_speed: f64) -> f64 {
        self.routes
            .iter()
            .map(|(&uav, route)| {
                let speed = instance.speed_of(uav, default_speed).max(1e-6);
                route
                    .windows(2)
                    .map(|w| w[0].position.distance(&w[1].position) / speed + w[1].wait)
                    .sum::<f64>()
            })
            .fold(0.0, f64::max)
    }

    /// Number of targets served by `uav`.
    pub fn target_count(&self, uav: UavId) -> usize {
        self.routes
            .get(&uav)
            .map_or(0, |r| r.iter().filter(|i| i.is_target()).count())
    }

    /// Identities of all served targets, with repetitions.
    pub fn served_targets(&self) -> Vec<NodeId> {
        self.routes
            .values()
            .flat_map(|r| r.iter().filter(|i| i.is_target()).filter_map(|i| i.node_id))
            .collect()
    }

    /// `true` iff every instance target is served exactly once.
    pub fn covers_targets_exactly_once(&self, instance: &Instance) -> bool {
        let served = self.served_targets();
        let unique: BTreeSet<NodeId> = served.iter().copied().collect();
        let expected: BTreeSet<NodeId> = instance.targets.iter().map(|t| t.id).collect();
        served.len() == unique.len() && unique == expected
    }

    /// Dwell of each rendezvous, the longest among its waypoints.
    fn rendezvous_waits(&self) -> BTreeMap<usize, f64> {
        let mut waits = BTreeMap::new();
        let mut untagged = usize::MAX;
        for item in self.routes.values().flatten().filter(|i| i.is_rally_point()) {
            let key = item.rendezvous.unwrap_or_else(|| {
                untagged -= 1;
                untagged
            });
            let wait = waits.entry(key).or_insert(0.0_f64);
            *wait = wait.max(item.wait);
        }
        waits
    }

    /// Number of rendezvous; the waypoints of one repair count once.
    pub fn rally_point_count(&self) -> usize {
        self.rendezvous_waits().len()
    }

    /// Accumulated dwell, charged once per rendezvous.
    pub fn rally_wait_sum(&self) -> f64 {
        self.rendezvous_waits().values().sum()
    }

    /// Id for a new rendezvous, unused by any waypoint of this solution.
    pub fn next_rendezvous(&self) -> usize {
        self.routes
            .values()
            .flatten()
            .filter_map(|i| i.rendezvous)
            .max()
            .map_or(0, |id| id + 1)
    }

    /// Removes every rally waypoint.
    pub fn strip_rally_points(&mut self) {
        for route in self.routes.values_mut() {
            route.retain(|i| !i.is_rally_point());
        }
    }

    /// Removes target `node` wherever it is served. Returns its former owner.
    pub fn remove_target(&mut self, node: NodeId) -> Option<UavId> {
        for (&uav, route) in self.routes.iter_mut() {
            if let Some(pos) = route
                .iter()
                .position(|i| i.is_target() && i.node_id == Some(node))
            {
                route.remove(pos);
                return Some(uav);
            }
        }
        None
    }

    /// Cheapest position to insert `point` into `uav`'s route, as
    /// `(position, delta)`.
    pub fn best_insertion(&self, uav: UavId, point: &Point) -> Option<(usize, f64)> {
        let route = self.routes.get(&uav)?;
        (1..route.len())
            .map(|pos| (pos, insertion_delta(route, pos, point)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Uav;

    fn square_instance() -> Instance {
        Instance::new(
            Node::new(0, 0.0, 0.0),
            vec![
                Node::new(1, 10.0, 0.0),
                Node::new(2, 0.0, 10.0),
                Node::new(3, -10.0, 0.0),
            ],
            vec![Uav::new(0), Uav::new(1)],
        )
    }

    #[test]
    fn test_round_robin_assignment() {
        let inst = square_instance();
        let sol = Solution::round_robin(&inst);
        assert_eq!(sol.target_count(0), 2);
        assert_eq!(sol.target_count(1), 1);
        assert!(sol.covers_targets_exactly_once(&inst));

        for route in sol.routes.values() {
            assert_eq!(route.first().map(|i| i.kind), Some(RouteItemKind::Depot));
            assert_eq!(route.last().map(|i| i.kind), Some(RouteItemKind::Depot));
        }
    }

    #[test]
    fn test_travel_and_workload() {
        let inst = square_instance();
        let sol = Solution::round_robin(&inst);
        // uav 0: 0 -> (10,0) -> (-10,0) -> 0 = 10 + 20 + 10
        // uav 1: 0 -> (0,10) -> 0 = 20
        assert!((sol.total_travel() - 60.0).abs() < 1e-9);
        let (hi, lo) = sol.workload_extrema();
        assert!((hi - 40.0).abs() < 1e-9);
        assert!((lo - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_makespan_includes_wait() {
        let inst = square_instance();
        let mut sol = Solution::round_robin(&inst);
        let base = sol.makespan(&inst, 15.0);
        assert!((base - 40.0 / 15.0).abs() < 1e-9);

        let route = sol.route_mut(1).unwrap();
        route.insert(2, RouteItem::rally(0, Point::new(0.0, 10.0), 5.0));
        assert!((sol.makespan(&inst, 15.0) - (20.0 / 15.0 + 5.0)).abs() < 1e-9);

        let route = sol.route_mut(0).unwrap();
        route.insert(3, RouteItem::rally(1, Point::new(-10.0, 0.0), 7.0));
        assert!((sol.makespan(&inst, 15.0) - (base + 7.0)).abs() < 1e-9);
    }

    #[test]
    fn test_remove_and_cover() {
        let inst = square_instance();
        let mut sol = Solution::round_robin(&inst);
        assert_eq!(sol.remove_target(2), Some(1));
        assert!(!sol.covers_targets_exactly_once(&inst));
        assert_eq!(sol.remove_target(2), None);
    }

    #[test]
    fn test_best_insertion_on_empty_route() {
        let inst = square_instance();
        let sol = Solution::empty(&inst);
        let (pos, delta) = sol.best_insertion(0, &Point::new(3.0, 4.0)).unwrap();
        assert_eq!(pos, 1);
        assert!((delta - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_rally_stats_and_strip() {
        let inst = square_instance();
        let mut sol = Solution::round_robin(&inst);
        assert_eq!(sol.next_rendezvous(), 0);
        for uav in [0, 1] {
            let route = sol.route_mut(uav).unwrap();
            let end = route.len() - 1;
            route.insert(end, RouteItem::rally(0, Point::new(1.0, 1.0), 5.0));
        }
        // One rendezvous in two routes counts once.
        assert_eq!(sol.rally_point_count(), 1);
        assert!((sol.rally_wait_sum() - 5.0).abs() < 1e-12);
        assert_eq!(sol.next_rendezvous(), 1);

        let route = sol.route_mut(1).unwrap();
        route.insert(1, RouteItem::rally(1, Point::new(0.0, 5.0), 7.0));
        assert_eq!(sol.rally_point_count(), 2);
        assert!((sol.rally_wait_sum() - 12.0).abs() < 1e-12);

        sol.strip_rally_points();
        assert_eq!(sol.rally_point_count(), 0);
        assert!(sol.covers_targets_exactly_once(&inst));
    }

    #[test]
    fn test_workload_extrema_without_routes() {
        assert_eq!(Solution::default().workload_extrema(), (0.0, 0.0));
    }
}
