//! Cadence bound and time-discretized position snapshots.

use super::graph::Positions;
use crate::model::{Instance, Point, RouteItem, Solution, UavId};

/// Floor applied to the snapshot interval.
pub const MIN_DELTA_TAU: f64 = 1e-3;

/// Largest snapshot interval that cannot miss a disconnection.
///
/// `max(eps, (R - 2 rho) / (2 v_max))`: two vehicles closing or separating at
/// `v_max` each cannot consume the `R - 2 rho` slack between checks.
pub fn cadence_bound(range: f64, safety_margin: f64, max_speed: f64) -> f64 {
    ((range - 2.0 * safety_margin) / (2.0 * max_speed.max(1e-6))).max(MIN_DELTA_TAU)
}

/// Piecewise-linear `(time, position)` trajectory of one vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    points: Vec<(f64, Point)>,
}

impl Timeline {
    /// Walks `route` at `speed`, holding position during positive dwells.
    pub fn from_route(route: &[RouteItem], speed: f64) -> Self {
        let speed = speed.max(1e-6);
        let Some(first) = route.first() else {
            return Self { points: Vec::new() };
        };
        let mut t = 0.0;
        let mut points = vec![(t, first.position)];
        for w in route.windows(2) {
            t += w[0].position.distance(&w[1].position) / speed;
            points.push((t, w[1].position));
            if w[1].wait > 0.0 {
                t += w[1].wait;
                points.push((t, w[1].position));
            }
        }
        Self { points }
    }

    /// Time at which the vehicle completes its route.
    pub fn end_time(&self) -> f64 {
        self.points.last().map_or(0.0, |&(t, _)| t)
    }

    /// Interpolated position at `t`, clamped to the route ends.
    pub fn position_at(&self, t: f64) -> Option<Point> {
        let (&(_, first), rest) = self.points.split_first()?;
        if rest.is_empty() {
            return Some(first);
        }
        for pair in self.points.windows(2) {
            let (t0, p0) = pair[0];
            let (t1, p1) = pair[1];
            if t <= t1 {
                if t1 == t0 {
                    return Some(p1);
                }
                return Some(p0.lerp(&p1, (t - t0) / (t1 - t0)));
            }
        }
        self.points.last().map(|&(_, p)| p)
    }
}

/// Vehicle positions at one snapshot time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub time: f64,
    pub positions: Positions,
}

/// Samples every vehicle's position at `k * delta_tau` for
/// `k = 0..=ceil(horizon / delta_tau)`.
///
/// Vehicles unknown to `instance` move at `default_speed`.
pub fn simulate_snapshots(
    solution: &Solution,
    instance: &Instance,
    delta_tau: f64,
    default_speed: f64,
) -> Vec<Snapshot> {
    let delta_tau = delta_tau.max(MIN_DELTA_TAU);
    let timelines: Vec<(UavId, Timeline)> = solution
        .routes
        .iter()
        .map(|(&uav, route)| {
            (
                uav,
                Timeline::from_route(route, instance.speed_of(uav, default_speed)),
            )
        })
        .collect();

    let horizon = timelines
        .iter()
        .map(|(_, tl)| tl.end_time())
        .fold(0.0, f64::max);
    let steps = (horizon / delta_tau).ceil() as usize;

    (0..=steps)
        .map(|k| {
            let time = k as f64 * delta_tau;
            let positions = timelines
                .iter()
                .filter_map(|(uav, tl)| tl.position_at(time).map(|p| (*uav, p)))
                .collect();
            Snapshot { time, positions }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, Uav};

    #[test]
    fn test_cadence_bound_reference_value() {
        assert_eq!(cadence_bound(150.0, 15.0, 15.0), 4.0);
    }

    #[test]
    fn test_cadence_bound_floor() {
        assert_eq!(cadence_bound(10.0, 10.0, 15.0), MIN_DELTA_TAU);
        assert!(cadence_bound(150.0, 15.0, 0.0) > 1e3);
    }

    fn line_instance() -> Instance {
        Instance::new(
            Node::new(0, 0.0, 0.0),
            vec![Node::new(1, 30.0, 0.0)],
            vec![Uav::new(0).with_max_speed(10.0), Uav::new(1).with_max_speed(10.0)],
        )
    }

    #[test]
    fn test_timeline_with_dwell() {
        let inst = line_instance();
        let route = vec![
            RouteItem::depot(&inst.depot),
            RouteItem::rally(0, Point::new(30.0, 0.0), 5.0),
            RouteItem::depot(&inst.depot),
        ];
        let tl = Timeline::from_route(&route, 10.0);
        assert!((tl.end_time() - 11.0).abs() < 1e-12);
        assert_eq!(tl.position_at(1.5), Some(Point::new(15.0, 0.0)));
        assert_eq!(tl.position_at(5.0), Some(Point::new(30.0, 0.0)));
        assert_eq!(tl.position_at(9.5), Some(Point::new(15.0, 0.0)));
        assert_eq!(tl.position_at(100.0), Some(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_snapshot_grid_covers_horizon() {
        let inst = line_instance();
        let sol = Solution::round_robin(&inst);
        // uav 0 flies 60 units at speed 10: horizon 6.
        let snaps = simulate_snapshots(&sol, &inst, 4.0, 15.0);
        let times: Vec<f64> = snaps.iter().map(|s| s.time).collect();
        assert_eq!(times, vec![0.0, 4.0, 8.0]);
        assert!(snaps[1].positions[&0].distance(&Point::new(20.0, 0.0)) < 1e-9);
        // Clamped to the depot once the route is over.
        assert_eq!(snaps[2].positions[&0], Point::new(0.0, 0.0));
        // The idle vehicle never leaves the depot.
        assert!(snaps.iter().all(|s| s.positions[&1] == Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_snapshots_are_deterministic() {
        let inst = line_instance();
        let sol = Solution::round_robin(&inst);
        assert_eq!(
            simulate_snapshots(&sol, &inst, 0.7, 15.0),
            simulate_snapshots(&sol, &inst, 0.7, 15.0)
        );
    }

    #[test]
    fn test_idle_fleet_has_single_snapshot() {
        let inst = line_instance();
        let sol = Solution::empty(&inst);
        let snaps = simulate_snapshots(&sol, &inst, 4.0, 15.0);
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].positions.len(), 2);
    }
}
