//! Immutable problem instance: depot, targets, and the UAV fleet.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identifier of a node (depot or target).
pub type NodeId = usize;

/// Identifier of a vehicle.
pub type UavId = usize;

/// A point in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new(0.5 * (self.x + other.x), 0.5 * (self.y + other.y))
    }

    /// Linear interpolation; `ratio` is clamped to `[0, 1]`.
    pub fn lerp(&self, other: &Point, ratio: f64) -> Point {
        let r = ratio.clamp(0.0, 1.0);
        Point::new(
            self.x + r * (other.x - self.x),
            self.y + r * (other.y - self.y),
        )
    }
}

/// A depot or target location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub position: Point,
}

impl Node {
    pub fn new(id: NodeId, x: f64, y: f64) -> Self {
        Self {
            id,
            position: Point::new(x, y),
        }
    }
}

/// A vehicle of the fleet.
///
/// Battery capacity is expressed in distance units (energy proportional to
/// flown distance); payload capacity in number of targets served.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Uav {
    pub id: UavId,
    pub max_speed: f64,
    pub battery_capacity: f64,
    pub payload_capacity: f64,
}

impl Uav {
    /// Creates a UAV with the default 15 units/s cruise speed and
    /// effectively unbounded battery and payload.
    pub fn new(id: UavId) -> Self {
        Self {
            id,
            max_speed: 15.0,
            battery_capacity: 1e9,
            payload_capacity: 1e9,
        }
    }

    pub fn with_max_speed(mut self, speed: f64) -> Self {
        self.max_speed = speed;
        self
    }

    pub fn with_battery_capacity(mut self, capacity: f64) -> Self {
        self.battery_capacity = capacity;
        self
    }

    pub fn with_payload_capacity(mut self, capacity: f64) -> Self {
        self.payload_capacity = capacity;
        self
    }
}

/// A routing instance. Read-only once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub depot: Node,
    pub targets: Vec<Node>,
    pub uavs: Vec<Uav>,
}

impl Instance {
    pub fn new(depot: Node, targets: Vec<Node>, uavs: Vec<Uav>) -> Self {
        Self {
            depot,
            targets,
            uavs,
        }
    }

    pub fn uav(&self, id: UavId) -> Option<&Uav> {
        self.uavs.iter().find(|u| u.id == id)
    }

    pub fn target(&self, id: NodeId) -> Option<&Node> {
        self.targets.iter().find(|t| t.id == id)
    }

    /// Max speed of `id`, or `default_speed` for unknown vehicles.
    pub fn speed_of(&self, id: UavId, default_speed: f64) -> f64 {
        self.uav(id).map_or(default_speed, |u| u.max_speed)
    }

    /// Fastest vehicle speed in the fleet (0 for an empty fleet).
    pub fn max_fleet_speed(&self) -> f64 {
        self.uavs.iter().map(|u| u.max_speed).fold(0.0, f64::max)
    }

    /// Validates the instance.
    pub fn validate(&self) -> Result<(), String> {
        if self.uavs.is_empty() {
            return Err("instance must contain at least one UAV".into());
        }
        let mut seen = BTreeSet::new();
        for uav in &self.uavs {
            if !seen.insert(uav.id) {
                return Err(format!("duplicate UAV id {}", uav.id));
            }
            if !(uav.max_speed > 0.0) {
                return Err(format!(
                    "UAV {} max_speed must be positive, got {}",
                    uav.id, uav.max_speed
                ));
            }
            if uav.battery_capacity < 0.0 || uav.payload_capacity < 0.0 {
                return Err(format!("UAV {} capacities must be non-negative", uav.id));
            }
        }
        let mut nodes = BTreeSet::new();
        nodes.insert(self.depot.id);
        for target in &self.targets {
            if !nodes.insert(target.id) {
                return Err(format!("duplicate node id {}", target.id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_instance() -> Instance {
        Instance::new(
            Node::new(0, 0.0, 0.0),
            vec![Node::new(1, 10.0, 0.0), Node::new(2, 0.0, 10.0)],
            vec![Uav::new(0), Uav::new(1)],
        )
    }

    #[test]
    fn test_point_distance_and_midpoint() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
        assert_eq!(a.midpoint(&b), Point::new(1.5, 2.0));
    }

    #[test]
    fn test_lerp_clamps() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(a.lerp(&b, 0.25), Point::new(2.5, 0.0));
        assert_eq!(a.lerp(&b, 2.0), b);
        assert_eq!(a.lerp(&b, -1.0), a);
    }

    #[test]
    fn test_validate_ok() {
        assert!(small_instance().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_speed() {
        let mut inst = small_instance();
        inst.uavs[1] = Uav::new(1).with_max_speed(0.0);
        assert!(inst.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let mut inst = small_instance();
        inst.uavs.push(Uav::new(0));
        assert!(inst.validate().is_err());

        let mut inst = small_instance();
        inst.targets.push(Node::new(1, 5.0, 5.0));
        assert!(inst.validate().is_err());
    }

    #[test]
    fn test_speed_lookup() {
        let inst = small_instance();
        assert!((inst.speed_of(0, 3.0) - 15.0).abs() < 1e-12);
        assert!((inst.speed_of(99, 3.0) - 3.0).abs() < 1e-12);
    }
}
