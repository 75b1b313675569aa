//! Course data: waypoints for the AI racing line, ordered checkpoints
//! for lap progress, and item boxes.

use bincode::{Decode, Encode};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::math;

/// Seconds before a collected item box comes back.
pub const ITEM_BOX_RESPAWN: f32 = 10.0;
/// Pickup radius around an item box.
pub const ITEM_BOX_RADIUS: f32 = 2.0;

/// Ordered course gate. Passing within `width` of its position
/// registers progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Checkpoint {
    #[bincode(with_serde)]
    pub position: Vec3,
    pub width: f32,
}

/// An item pickup on the track. Collected boxes respawn on a countdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct ItemBox {
    #[bincode(with_serde)]
    pub position: Vec3,
    pub active: bool,
    pub respawn_timer: f32,
}

impl ItemBox {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            active: true,
            respawn_timer: 0.0,
        }
    }

    /// Deactivate after pickup and arm the respawn countdown.
    pub fn collect(&mut self) {
        self.active = false;
        self.respawn_timer = ITEM_BOX_RESPAWN;
    }

    pub fn tick(&mut self, delta: f32) {
        if !self.active {
            self.respawn_timer -= delta;
            if self.respawn_timer <= 0.0 {
                self.respawn_timer = 0.0;
                self.active = true;
            }
        }
    }
}

/// Static course description plus the mutable item-box states.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct CourseData {
    pub name: String,
    pub laps: u32,
    #[bincode(with_serde)]
    pub waypoints: Vec<Vec3>,
    pub checkpoints: Vec<Checkpoint>,
    pub item_boxes: Vec<ItemBox>,
    #[bincode(with_serde)]
    pub start_position: Vec3,
}

/// The park circuit: a 40-segment oval (80 x 50) with four evenly
/// spaced checkpoints and twenty item boxes weaving across the racing
/// line.
pub fn monkey_park_circuit() -> CourseData {
    const SEGMENTS: usize = 40;
    const RADIUS_X: f32 = 80.0;
    const RADIUS_Z: f32 = 50.0;

    let mut waypoints = Vec::with_capacity(SEGMENTS);
    for i in 0..SEGMENTS {
        let angle = (i as f32 / SEGMENTS as f32) * std::f32::consts::TAU;
        waypoints.push(Vec3::new(
            math::cos_det(angle) * RADIUS_X,
            0.0,
            math::sin_det(angle) * RADIUS_Z,
        ));
    }

    // Gates every ten segments, ordered along the racing line from the
    // start. The last gate sits at the start/finish line.
    let checkpoints = [20usize, 30, 0, 10]
        .into_iter()
        .map(|i| Checkpoint {
            position: waypoints[i],
            width: 16.0,
        })
        .collect();

    let mut item_boxes = Vec::with_capacity(20);
    for i in 0..20 {
        let angle = (i as f32 / 20.0) * std::f32::consts::TAU;
        // Weave boxes across the line: inside, center, outside
        let offset = (i % 3) as f32 - 1.0;
        let x = math::cos_det(angle) * (RADIUS_X + offset * 3.0);
        let z = math::sin_det(angle) * (RADIUS_Z + offset * 3.0 * (RADIUS_Z / RADIUS_X));
        item_boxes.push(ItemBox::new(Vec3::new(x, 1.5, z)));
    }

    CourseData {
        name: "Monkey Park Circuit".to_string(),
        laps: 3,
        waypoints,
        checkpoints,
        item_boxes,
        start_position: Vec3::new(0.0, 0.0, RADIUS_Z + 5.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circuit_layout() {
        let course = monkey_park_circuit();
        assert_eq!(course.waypoints.len(), 40);
        assert_eq!(course.checkpoints.len(), 4);
        assert_eq!(course.item_boxes.len(), 20);
        assert_eq!(course.laps, 3);
        for checkpoint in &course.checkpoints {
            assert_eq!(checkpoint.width, 16.0);
        }
        // First gate after the start is the -X apex; the last gate is
        // the start/finish line near the grid.
        assert!((course.checkpoints[0].position.x + 80.0).abs() < 0.5);
        let finish = course.checkpoints[3].position;
        assert!(finish.distance(course.start_position) < 16.0);
    }

    #[test]
    fn item_box_respawns_after_countdown() {
        let mut item_box = ItemBox::new(Vec3::ZERO);
        item_box.collect();
        assert!(!item_box.active);

        for _ in 0..599 {
            item_box.tick(1.0 / 60.0);
        }
        assert!(!item_box.active, "still down just before 10s");
        item_box.tick(1.0 / 60.0);
        item_box.tick(1.0 / 60.0);
        assert!(item_box.active, "back after 10s");
    }
}
