//! Racing machines: stat tables, form state, and per-tick vehicle
//! physics.
//!
//! Speed chases a target value exponentially, steering authority scales
//! with the current speed fraction, and the track is a flat plane with
//! Y pinned to 0. Drift is a held-input state with escalating levels
//! that pays out a timed boost on release.

use bincode::{Decode, Encode};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entities::EntityId;
use crate::input::RaceInput;
use crate::math;
use crate::physics;
use crate::status::{StatusKind, StatusSet};

use super::items::ItemKind;

/// Speed below which drift cannot start.
pub const DRIFT_MIN_SPEED: f32 = 50.0;
const DRIFT_LEVEL_2_TIME: f32 = 1.0;
const DRIFT_LEVEL_3_TIME: f32 = 2.0;
/// Seconds of boost per drift level on release.
const DRIFT_BOOST_DURATION: f32 = 1.5;
const DRIFT_BOOST_MULTIPLIER: f32 = 1.5;
/// Extra yaw rate in the drift direction, rad/s.
const DRIFT_EXTRA_YAW: f32 = 0.5;
const TRANSFORM_COOLDOWN: f32 = 5.0;
const LONG_FORM_SPEED_BONUS: f32 = 1.2;
const LONG_FORM_HANDLING_PENALTY: f32 = 0.7;
/// Reverse target as a fraction of top speed.
const BRAKE_SPEED_FACTOR: f32 = 0.3;
/// Track containment radius; straying outside clamps and halves speed.
pub const COURSE_MAX_RADIUS: f32 = 150.0;

/// Fixed per-machine stats. `handling` is a yaw rate in rad/s at full
/// speed fraction; `acceleration` is the exponential chase rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct MachineStats {
    pub max_speed: f32,
    pub acceleration: f32,
    pub handling: f32,
    pub weight: f32,
    pub drift_bonus: f32,
}

/// Every machine in the game, player roster and rivals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum MachineKind {
    // Player roster
    HeroMonkey,
    SpeedStar,
    TankMonkey,
    NinjaMonkey,
    // Rivals
    PipotronYellow,
    PipotronBlue,
    PipotronRed,
    PipotronBlack,
    DevichMonkey,
    ApeSoldier,
    BananaBoy,
}

impl MachineKind {
    /// Rival lineup in grid order.
    pub const RIVALS: [MachineKind; 7] = [
        MachineKind::PipotronYellow,
        MachineKind::PipotronBlue,
        MachineKind::PipotronRed,
        MachineKind::PipotronBlack,
        MachineKind::DevichMonkey,
        MachineKind::ApeSoldier,
        MachineKind::BananaBoy,
    ];

    pub const fn stats(&self) -> MachineStats {
        match self {
            MachineKind::HeroMonkey => MachineStats {
                max_speed: 100.0,
                acceleration: 80.0,
                handling: 80.0,
                weight: 50.0,
                drift_bonus: 1.0,
            },
            MachineKind::SpeedStar => MachineStats {
                max_speed: 120.0,
                acceleration: 70.0,
                handling: 60.0,
                weight: 40.0,
                drift_bonus: 0.8,
            },
            MachineKind::TankMonkey => MachineStats {
                max_speed: 80.0,
                acceleration: 60.0,
                handling: 70.0,
                weight: 90.0,
                drift_bonus: 1.2,
            },
            MachineKind::NinjaMonkey => MachineStats {
                max_speed: 90.0,
                acceleration: 90.0,
                handling: 100.0,
                weight: 30.0,
                drift_bonus: 1.5,
            },
            MachineKind::PipotronYellow => MachineStats {
                max_speed: 95.0,
                acceleration: 75.0,
                handling: 75.0,
                weight: 50.0,
                drift_bonus: 1.0,
            },
            MachineKind::PipotronBlue => MachineStats {
                max_speed: 110.0,
                acceleration: 85.0,
                handling: 65.0,
                weight: 45.0,
                drift_bonus: 0.9,
            },
            MachineKind::PipotronRed => MachineStats {
                max_speed: 100.0,
                acceleration: 90.0,
                handling: 70.0,
                weight: 55.0,
                drift_bonus: 1.1,
            },
            MachineKind::PipotronBlack => MachineStats {
                max_speed: 115.0,
                acceleration: 95.0,
                handling: 90.0,
                weight: 50.0,
                drift_bonus: 1.3,
            },
            MachineKind::DevichMonkey => MachineStats {
                max_speed: 85.0,
                acceleration: 70.0,
                handling: 80.0,
                weight: 45.0,
                drift_bonus: 1.0,
            },
            MachineKind::ApeSoldier => MachineStats {
                max_speed: 90.0,
                acceleration: 80.0,
                handling: 75.0,
                weight: 55.0,
                drift_bonus: 0.9,
            },
            MachineKind::BananaBoy => MachineStats {
                max_speed: 80.0,
                acceleration: 65.0,
                handling: 85.0,
                weight: 40.0,
                drift_bonus: 1.1,
            },
        }
    }
}

/// Vehicle body form. Long trades handling for top speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Encode, Decode)]
pub enum MachineForm {
    #[default]
    Normal,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum DriftDirection {
    Left,
    Right,
}

/// One racing machine, player or rival.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct Machine {
    pub id: EntityId,
    pub kind: MachineKind,
    #[bincode(with_serde)]
    pub position: Vec3,
    /// Yaw in radians; 0 faces +Z.
    pub rotation: f32,
    pub speed: f32,
    pub form: MachineForm,
    pub transform_cooldown: f32,
    pub is_drifting: bool,
    pub drift_direction: Option<DriftDirection>,
    pub drift_level: u8,
    pub drift_time: f32,
    pub statuses: StatusSet,
    pub current_item: Option<ItemKind>,
    pub current_lap: u32,
    pub current_checkpoint: usize,
    pub lap_times: Vec<f32>,
    /// 1-based rank, refreshed by the ranking pass each tick.
    pub current_position: u32,
    pub is_player: bool,
    /// AI waypoint target index; unused for the player.
    pub ai_waypoint: usize,
    /// Difficulty handicap on top speed; 1.0 for the player.
    pub speed_scale: f32,
}

impl Machine {
    pub fn new(id: EntityId, kind: MachineKind, position: Vec3, is_player: bool) -> Self {
        Self {
            id,
            kind,
            position,
            rotation: 0.0,
            speed: 0.0,
            form: MachineForm::Normal,
            transform_cooldown: 0.0,
            is_drifting: false,
            drift_direction: None,
            drift_level: 0,
            drift_time: 0.0,
            statuses: StatusSet::new(),
            current_item: None,
            current_lap: 0,
            current_checkpoint: 0,
            lap_times: Vec::new(),
            current_position: 0,
            is_player,
            ai_waypoint: 0,
            speed_scale: 1.0,
        }
    }

    /// Top speed for the current form and difficulty handicap.
    pub fn max_speed(&self) -> f32 {
        let base = self.kind.stats().max_speed * self.speed_scale;
        match self.form {
            MachineForm::Normal => base,
            MachineForm::Long => base * LONG_FORM_SPEED_BONUS,
        }
    }

    /// Handling for the current form, before the drift penalty.
    pub fn handling(&self) -> f32 {
        let base = self.kind.stats().handling;
        match self.form {
            MachineForm::Normal => base,
            MachineForm::Long => base * LONG_FORM_HANDLING_PENALTY,
        }
    }

    pub fn is_invincible(&self) -> bool {
        self.statuses.is_invincible()
    }

    pub fn is_spinning(&self) -> bool {
        self.statuses.is_spinning()
    }

    /// Heading unit vector on the track plane.
    pub fn forward(&self) -> Vec3 {
        math::yaw_forward(self.rotation)
    }

    pub fn finished(&self, laps: u32) -> bool {
        self.current_lap >= laps
    }
}

/// Advance one machine one tick from an input snapshot. Pure vehicle
/// dynamics; progress, items and machine-machine contacts are separate
/// passes.
pub fn update_machine(machine: &mut Machine, input: &RaceInput, now: f32, delta: f32) {
    let stats = machine.kind.stats();
    let max_speed = machine.max_speed();

    // A spun-out machine gets no throttle until the spin expires.
    let throttle = input.accelerate() && !machine.is_spinning();

    let target_speed = if throttle {
        let boost = machine.statuses.boost_multiplier().unwrap_or(1.0);
        max_speed * boost
    } else if input.brake() {
        -max_speed * BRAKE_SPEED_FACTOR
    } else {
        0.0
    };

    // Off-throttle deceleration is twice as strong as acceleration.
    let accel = if throttle {
        stats.acceleration
    } else {
        stats.acceleration * 2.0
    };
    machine.speed = physics::approach(machine.speed, target_speed, accel * delta);

    update_drift(machine, input, now, delta);

    let handling = if machine.is_drifting {
        machine.handling() * 0.7
    } else {
        machine.handling()
    };
    let turn = input.turn() as f32;
    machine.rotation += turn * handling * delta * (machine.speed / max_speed);

    if machine.is_drifting {
        match machine.drift_direction {
            Some(DriftDirection::Left) => machine.rotation += DRIFT_EXTRA_YAW * delta,
            Some(DriftDirection::Right) => machine.rotation -= DRIFT_EXTRA_YAW * delta,
            None => {}
        }
    }

    machine.position += machine.forward() * machine.speed * delta;
    machine.position.y = 0.0;

    let (clamped, hit_wall) = physics::clamp_to_radius(machine.position, COURSE_MAX_RADIUS);
    if hit_wall {
        machine.position = clamped;
        machine.speed *= 0.5;
    }

    if input.transform() && machine.transform_cooldown <= 0.0 {
        machine.form = match machine.form {
            MachineForm::Normal => MachineForm::Long,
            MachineForm::Long => MachineForm::Normal,
        };
        machine.transform_cooldown = TRANSFORM_COOLDOWN;
        log::debug!("machine {} transforms to {:?}", machine.id.0, machine.form);
    }
    machine.transform_cooldown = (machine.transform_cooldown - delta).max(0.0);
}

/// Drift state machine: start on held input above the minimum speed,
/// escalate by held time, pay out a boost on release. Level never
/// decreases while held.
fn update_drift(machine: &mut Machine, input: &RaceInput, now: f32, delta: f32) {
    if input.drift() && machine.speed > DRIFT_MIN_SPEED {
        if !machine.is_drifting {
            machine.is_drifting = true;
            machine.drift_direction = if input.left() {
                Some(DriftDirection::Left)
            } else if input.right() {
                Some(DriftDirection::Right)
            } else {
                None
            };
            machine.drift_level = 1;
            machine.drift_time = 0.0;
        } else {
            machine.drift_time += delta;
            if machine.drift_time > DRIFT_LEVEL_3_TIME {
                machine.drift_level = 3;
            } else if machine.drift_time > DRIFT_LEVEL_2_TIME {
                machine.drift_level = 2;
            }
        }
    } else if machine.is_drifting && !input.drift() {
        machine.is_drifting = false;
        if machine.drift_level >= 1 {
            let duration = DRIFT_BOOST_DURATION
                * machine.drift_level as f32
                * machine.kind.stats().drift_bonus;
            machine.statuses.add(
                StatusKind::Boost {
                    multiplier: DRIFT_BOOST_MULTIPLIER,
                },
                now,
                duration,
            );
            log::debug!(
                "machine {} drift level {} boost for {:.1}s",
                machine.id.0,
                machine.drift_level,
                duration
            );
        }
        machine.drift_direction = None;
        machine.drift_level = 0;
        machine.drift_time = 0.0;
    }
}
