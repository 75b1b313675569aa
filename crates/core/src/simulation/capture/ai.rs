//! Monkey and boss AI.
//!
//! Per tick each monkey gets: an alert level update driven purely by
//! distance, a behavioral state from the priority rules, and a movement
//! target its velocity is smoothed toward. `Captured` is absorbing; a
//! captured monkey is never touched again.

use glam::Vec3;

use crate::entities::{Boss, Monkey, MonkeyState, ThreatResponse};
use crate::math;
use crate::physics::{self, StageBounds};

/// Range inside which an attack-response monkey engages instead of fleeing.
const ATTACK_ENGAGE_RANGE: f32 = 5.0;
/// Engage range for the elite response.
const ELITE_ENGAGE_RANGE: f32 = 8.0;
/// Speed fraction while closing in or patrolling.
const APPROACH_SPEED_FACTOR: f32 = 0.5;
/// Speed fraction of the wary backpedal in the alert state.
const RETREAT_SPEED_FACTOR: f32 = 0.3;
/// Zigzag weave: amplitude of the lateral flee rotation.
const ZIGZAG_AMPLITUDE: f32 = std::f32::consts::PI / 3.0;
/// Zigzag weave: oscillation rate in rad/s of simulation time.
const ZIGZAG_RATE: f32 = 5.0;
/// Velocity smoothing rate (fraction per second toward the target).
const VELOCITY_SMOOTHING: f32 = 5.0;
/// Facing smoothing rate.
const ROTATION_SMOOTHING: f32 = 10.0;

/// Raise alert inside detection range at 2/s, decay outside at the
/// archetype decay rate. Clamped to [0, 1]; no memory beyond the value.
pub fn update_alert(alert: f32, distance: f32, detection_range: f32, delta: f32) -> f32 {
    if distance < detection_range {
        (alert + delta * 2.0).min(1.0)
    } else {
        (alert - delta * Monkey::ALERT_DECAY).max(0.0)
    }
}

/// Behavioral state from the priority rules. First match wins.
pub fn next_state(monkey: &Monkey, distance: f32) -> MonkeyState {
    if monkey.state == MonkeyState::Captured {
        return MonkeyState::Captured;
    }
    if monkey.stun_time > 0.0 {
        return MonkeyState::Stunned;
    }
    if monkey.alert_level > 0.5 {
        return match monkey.kind.stats().response {
            ThreatResponse::Flee | ThreatResponse::Zigzag => MonkeyState::Fleeing,
            ThreatResponse::Attack => {
                if distance < ATTACK_ENGAGE_RANGE {
                    MonkeyState::Attacking
                } else {
                    MonkeyState::Fleeing
                }
            }
            ThreatResponse::Hide => MonkeyState::Hidden,
            ThreatResponse::Elite => {
                if distance < ELITE_ENGAGE_RANGE {
                    MonkeyState::Attacking
                } else {
                    MonkeyState::Fleeing
                }
            }
        };
    }
    if monkey.alert_level > 0.2 {
        return MonkeyState::Alert;
    }
    if !monkey.patrol_points.is_empty() {
        return MonkeyState::Patrol;
    }
    MonkeyState::Idle
}

/// Unit direction away from the player on the ground plane. The zigzag
/// response weaves the vector with a continuous oscillation driven by
/// simulation time.
pub fn flee_direction(position: Vec3, player_pos: Vec3, response: ThreatResponse, elapsed: f32) -> Vec3 {
    let mut away = Vec3::new(position.x - player_pos.x, 0.0, position.z - player_pos.z);
    if away.length_squared() < 1e-6 {
        away = Vec3::Z;
    }
    let away = away.normalize();

    if response == ThreatResponse::Zigzag {
        let weave = math::sin_det(elapsed * ZIGZAG_RATE) * ZIGZAG_AMPLITUDE;
        let yaw = math::heading_yaw(away) + weave;
        math::yaw_forward(yaw)
    } else {
        away
    }
}

/// Desired velocity for the current state. Stunned, hidden, idle and
/// captured all target zero; momentum comes from the smoothing.
fn target_velocity(monkey: &Monkey, player_pos: Vec3, elapsed: f32) -> Vec3 {
    let stats = monkey.kind.stats();
    match monkey.state {
        MonkeyState::Fleeing => {
            flee_direction(monkey.position, player_pos, stats.response, elapsed) * stats.speed
        }
        MonkeyState::Attacking => {
            let mut toward = Vec3::new(
                player_pos.x - monkey.position.x,
                0.0,
                player_pos.z - monkey.position.z,
            );
            if toward.length_squared() < 1e-6 {
                return Vec3::ZERO;
            }
            toward = toward.normalize();
            toward * stats.speed * APPROACH_SPEED_FACTOR
        }
        MonkeyState::Patrol => {
            let target = monkey.patrol_points[monkey.patrol_index % monkey.patrol_points.len()];
            let mut toward = Vec3::new(
                target.x - monkey.position.x,
                0.0,
                target.z - monkey.position.z,
            );
            if toward.length_squared() < 1e-6 {
                return Vec3::ZERO;
            }
            toward = toward.normalize();
            toward * stats.speed * APPROACH_SPEED_FACTOR
        }
        MonkeyState::Alert => {
            let mut away = Vec3::new(
                monkey.position.x - player_pos.x,
                0.0,
                monkey.position.z - player_pos.z,
            );
            if away.length_squared() < 1e-6 {
                away = Vec3::Z;
            }
            away.normalize() * stats.speed * RETREAT_SPEED_FACTOR
        }
        MonkeyState::Idle
        | MonkeyState::Stunned
        | MonkeyState::Hidden
        | MonkeyState::Captured => Vec3::ZERO,
    }
}

/// Advance one monkey by one tick: timers, alert, state, movement.
pub fn update_monkey(
    monkey: &mut Monkey,
    player_pos: Vec3,
    bounds: StageBounds,
    elapsed: f32,
    delta: f32,
) {
    if monkey.is_captured() {
        return;
    }

    monkey.stun_time = (monkey.stun_time - delta).max(0.0);
    monkey.attack_cooldown = (monkey.attack_cooldown - delta).max(0.0);

    let distance = monkey.position.distance(player_pos);
    monkey.alert_level = update_alert(
        monkey.alert_level,
        distance,
        monkey.kind.stats().detection_range,
        delta,
    );

    let state = next_state(monkey, distance);
    if state != monkey.state {
        log::debug!(
            "monkey {} {:?} -> {:?} (alert {:.2})",
            monkey.id.0,
            monkey.state,
            state,
            monkey.alert_level
        );
        monkey.state = state;
    }

    // Patrol arrival advances the index; movement continues next tick.
    if monkey.state == MonkeyState::Patrol {
        let target = monkey.patrol_points[monkey.patrol_index % monkey.patrol_points.len()];
        if physics::within_range(monkey.position, target, Monkey::PATROL_ARRIVE_DISTANCE) {
            monkey.patrol_index = (monkey.patrol_index + 1) % monkey.patrol_points.len();
        }
    }

    let target = target_velocity(monkey, player_pos, elapsed);
    monkey.velocity = physics::approach_vec3(monkey.velocity, target, delta * VELOCITY_SMOOTHING);
    monkey.position += monkey.velocity * delta;
    monkey.position.y = monkey.position.y.max(Monkey::GROUND_Y);
    monkey.position = bounds.clamp(monkey.position);

    let planar_speed = Vec3::new(monkey.velocity.x, 0.0, monkey.velocity.z).length();
    if planar_speed > 0.1 {
        let heading = math::atan2_det(monkey.velocity.x, monkey.velocity.z);
        monkey.rotation = math::damp_angle(monkey.rotation, heading, delta * ROTATION_SMOOTHING);
    }
}

/// True when this monkey should damage the player this tick.
pub fn threatens_player(monkey: &Monkey, player_pos: Vec3) -> bool {
    monkey.kind.stats().response == ThreatResponse::Attack
        && monkey.state == MonkeyState::Attacking
        && monkey.attack_cooldown <= 0.0
        && physics::within_range(monkey.position, player_pos, Monkey::CONTACT_RANGE)
}

/// Boss tick outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossAction {
    None,
    Attack,
}

/// Advance the boss: approach the player, attack when in range and off
/// cooldown. Phase is derived from health inside `Boss::phase`.
pub fn update_boss(boss: &mut Boss, player_pos: Vec3, bounds: StageBounds, delta: f32) -> BossAction {
    if boss.is_defeated() {
        boss.velocity = Vec3::ZERO;
        return BossAction::None;
    }

    boss.attack_cooldown = (boss.attack_cooldown - delta).max(0.0);

    let distance = boss.position.distance(player_pos);
    if distance < Boss::ATTACK_RANGE && boss.attack_cooldown <= 0.0 {
        boss.attack_cooldown = boss.attack_interval();
        log::debug!("boss {} attacks at phase {}", boss.name, boss.phase());
        return BossAction::Attack;
    }

    let mut toward = Vec3::new(
        player_pos.x - boss.position.x,
        0.0,
        player_pos.z - boss.position.z,
    );
    if toward.length_squared() > 1e-6 {
        toward = toward.normalize();
        boss.velocity =
            physics::approach_vec3(boss.velocity, toward * Boss::SPEED, delta * VELOCITY_SMOOTHING);
        boss.position += boss.velocity * delta;
        boss.position = bounds.clamp(boss.position);
        let heading = math::atan2_det(toward.x, toward.z);
        boss.rotation = math::damp_angle(boss.rotation, heading, delta * ROTATION_SMOOTHING);
    }
    BossAction::None
}
