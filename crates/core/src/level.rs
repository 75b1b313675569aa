//! Static stage data for the capture game.
//!
//! Stage geometry is authored data the simulation reads but never writes.
//! Platform footprints within a stage must not overlap: landing resolution
//! takes the first qualifying platform in list order.

use bincode::{Decode, Encode};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entities::MonkeyKind;
use crate::math;
use crate::random::SeededRandom;

/// A box platform the player can stand on. `size` is the full extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Platform {
    #[bincode(with_serde)]
    pub position: Vec3,
    #[bincode(with_serde)]
    pub size: Vec3,
}

impl Platform {
    /// Y of the walkable top face.
    pub fn top(&self) -> f32 {
        self.position.y + self.size.y / 2.0
    }

    /// Y of the bottom face.
    pub fn bottom(&self) -> f32 {
        self.position.y - self.size.y / 2.0
    }
}

/// A solid obstacle the player is pushed out of.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Obstacle {
    #[bincode(with_serde)]
    pub position: Vec3,
    #[bincode(with_serde)]
    pub size: Vec3,
}

/// Immutable configuration for one stage.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct StageConfig {
    pub id: u32,
    pub name: String,
    pub monkey_count: u32,
    /// Half extent of the square play area.
    pub boundary: f32,
    pub has_boss: bool,
    pub platforms: Vec<Platform>,
    pub obstacles: Vec<Obstacle>,
}

impl StageConfig {
    pub const STAGE_COUNT: u32 = 5;

    /// Stage table. Ids run 1..=5.
    pub fn stage(id: u32) -> StageConfig {
        let id = id.clamp(1, Self::STAGE_COUNT);
        match id {
            1 => StageConfig {
                id,
                name: "Sunny Park".into(),
                monkey_count: 15,
                boundary: 50.0,
                has_boss: false,
                platforms: vec![
                    Platform {
                        position: Vec3::new(10.0, 2.0, 10.0),
                        size: Vec3::new(6.0, 1.0, 6.0),
                    },
                    Platform {
                        position: Vec3::new(-15.0, 3.0, 5.0),
                        size: Vec3::new(5.0, 1.0, 5.0),
                    },
                ],
                obstacles: vec![
                    Obstacle {
                        position: Vec3::new(0.0, 1.5, -12.0),
                        size: Vec3::new(4.0, 3.0, 2.0),
                    },
                    Obstacle {
                        position: Vec3::new(20.0, 1.5, -5.0),
                        size: Vec3::new(2.0, 3.0, 6.0),
                    },
                ],
            },
            2 => StageConfig {
                id,
                name: "Windy Beach".into(),
                monkey_count: 18,
                boundary: 50.0,
                has_boss: false,
                platforms: vec![
                    Platform {
                        position: Vec3::new(-8.0, 2.5, -18.0),
                        size: Vec3::new(6.0, 1.0, 4.0),
                    },
                    Platform {
                        position: Vec3::new(18.0, 4.0, 14.0),
                        size: Vec3::new(5.0, 1.0, 5.0),
                    },
                ],
                obstacles: vec![Obstacle {
                    position: Vec3::new(-22.0, 2.0, 8.0),
                    size: Vec3::new(3.0, 4.0, 3.0),
                }],
            },
            3 => StageConfig {
                id,
                name: "Misty Forest".into(),
                monkey_count: 20,
                boundary: 50.0,
                has_boss: false,
                platforms: vec![
                    Platform {
                        position: Vec3::new(0.0, 3.0, 20.0),
                        size: Vec3::new(8.0, 1.0, 4.0),
                    },
                    Platform {
                        position: Vec3::new(-20.0, 5.0, -20.0),
                        size: Vec3::new(4.0, 1.0, 4.0),
                    },
                    Platform {
                        position: Vec3::new(25.0, 2.0, 0.0),
                        size: Vec3::new(5.0, 1.0, 8.0),
                    },
                ],
                obstacles: vec![
                    Obstacle {
                        position: Vec3::new(5.0, 2.5, 3.0),
                        size: Vec3::new(2.0, 5.0, 2.0),
                    },
                    Obstacle {
                        position: Vec3::new(-12.0, 2.5, -6.0),
                        size: Vec3::new(2.0, 5.0, 2.0),
                    },
                ],
            },
            4 => StageConfig {
                id,
                name: "Frozen Summit".into(),
                monkey_count: 25,
                boundary: 50.0,
                has_boss: false,
                platforms: vec![
                    Platform {
                        position: Vec3::new(12.0, 3.0, -14.0),
                        size: Vec3::new(6.0, 1.0, 6.0),
                    },
                    Platform {
                        position: Vec3::new(-18.0, 6.0, 16.0),
                        size: Vec3::new(5.0, 1.0, 5.0),
                    },
                ],
                obstacles: vec![
                    Obstacle {
                        position: Vec3::new(8.0, 2.0, 22.0),
                        size: Vec3::new(6.0, 4.0, 2.0),
                    },
                    Obstacle {
                        position: Vec3::new(-25.0, 2.0, -10.0),
                        size: Vec3::new(2.0, 4.0, 8.0),
                    },
                ],
            },
            _ => StageConfig {
                id,
                name: "Specter Tower".into(),
                monkey_count: 30,
                boundary: 50.0,
                has_boss: true,
                platforms: vec![
                    Platform {
                        position: Vec3::new(0.0, 4.0, -25.0),
                        size: Vec3::new(10.0, 1.0, 5.0),
                    },
                    Platform {
                        position: Vec3::new(22.0, 7.0, 18.0),
                        size: Vec3::new(4.0, 1.0, 4.0),
                    },
                ],
                obstacles: vec![
                    Obstacle {
                        position: Vec3::new(15.0, 3.0, 0.0),
                        size: Vec3::new(3.0, 6.0, 3.0),
                    },
                    Obstacle {
                        position: Vec3::new(-15.0, 3.0, 0.0),
                        size: Vec3::new(3.0, 6.0, 3.0),
                    },
                ],
            },
        }
    }

    /// Archetype pool monkeys are drawn from when spawning this stage.
    /// Later stages mix in the tougher kinds.
    pub fn kind_pool(&self) -> &'static [MonkeyKind] {
        match self.id {
            1 => &[MonkeyKind::Yellow, MonkeyKind::Yellow, MonkeyKind::Blue],
            2 => &[MonkeyKind::Yellow, MonkeyKind::Blue, MonkeyKind::Green],
            3 => &[
                MonkeyKind::Yellow,
                MonkeyKind::Blue,
                MonkeyKind::Red,
                MonkeyKind::Green,
            ],
            4 => &[
                MonkeyKind::Blue,
                MonkeyKind::Red,
                MonkeyKind::Green,
                MonkeyKind::Black,
            ],
            _ => &[
                MonkeyKind::Yellow,
                MonkeyKind::Blue,
                MonkeyKind::Red,
                MonkeyKind::Green,
                MonkeyKind::Black,
            ],
        }
    }
}

/// Generate patrol points on a jittered ring around a spawn point,
/// clamped to the stage boundary.
pub fn generate_patrol_points(
    rng: &mut SeededRandom,
    center: Vec3,
    count: usize,
    radius: f32,
    boundary: f32,
) -> Vec<Vec3> {
    let mut points = Vec::with_capacity(count);
    for i in 0..count {
        let angle = (i as f32 / count as f32) * std::f32::consts::TAU;
        let r = radius + rng.next_range(-2.0, 2.0);
        let point = Vec3::new(
            (center.x + math::sin_det(angle) * r).clamp(-boundary, boundary),
            center.y,
            (center.z + math::cos_det(angle) * r).clamp(-boundary, boundary),
        );
        points.push(point);
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_table_counts() {
        assert_eq!(StageConfig::stage(1).monkey_count, 15);
        assert_eq!(StageConfig::stage(2).monkey_count, 18);
        assert_eq!(StageConfig::stage(3).monkey_count, 20);
        assert_eq!(StageConfig::stage(4).monkey_count, 25);
        assert_eq!(StageConfig::stage(5).monkey_count, 30);
    }

    #[test]
    fn only_final_stage_has_boss() {
        for id in 1..=4 {
            assert!(!StageConfig::stage(id).has_boss);
        }
        assert!(StageConfig::stage(5).has_boss);
    }

    #[test]
    fn out_of_range_stage_id_clamps() {
        assert_eq!(StageConfig::stage(0).id, 1);
        assert_eq!(StageConfig::stage(99).id, 5);
    }

    #[test]
    fn patrol_points_stay_in_bounds() {
        let mut rng = SeededRandom::new(7);
        let points = generate_patrol_points(&mut rng, Vec3::new(48.0, 1.0, 48.0), 4, 5.0, 50.0);
        assert_eq!(points.len(), 4);
        for p in points {
            assert!(p.x.abs() <= 50.0 && p.z.abs() <= 50.0);
            assert_eq!(p.y, 1.0);
        }
    }

    #[test]
    fn platform_faces() {
        let platform = Platform {
            position: Vec3::new(0.0, 2.0, 0.0),
            size: Vec3::new(4.0, 1.0, 4.0),
        };
        assert_eq!(platform.top(), 2.5);
        assert_eq!(platform.bottom(), 1.5);
    }
}
