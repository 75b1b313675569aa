//! Collision and interaction resolution for the capture game.
//!
//! Runs after `movement` each tick. Platform landing takes the first
//! qualifying platform in list order; stage data keeps footprints
//! disjoint so order never matters in practice. Net and rod checks
//! walk the monkey list in spawn order, which keeps multi-candidate
//! outcomes identical across runs.

use crate::entities::{EntityId, Monkey, MonkeyState, Player, Tool};
use crate::level::{Obstacle, Platform};
use crate::physics;

/// Extra XZ margin around a platform footprint for landing checks.
const PLATFORM_MARGIN: f32 = 0.5;
/// Pushout slack so the player does not re-collide next tick.
const PUSHOUT_EPSILON: f32 = 0.01;

/// Snap the player onto platform tops and bump them off platform
/// undersides. The player's origin sits `Player::GROUND_Y` above the
/// surface they stand on.
pub fn resolve_player_platforms(player: &mut Player, platforms: &[Platform]) {
    for platform in platforms {
        let dx = (player.position.x - platform.position.x).abs();
        let dz = (player.position.z - platform.position.z).abs();
        if dx > platform.size.x / 2.0 + PLATFORM_MARGIN
            || dz > platform.size.z / 2.0 + PLATFORM_MARGIN
        {
            continue;
        }

        let top = platform.top();
        if player.velocity.y <= 0.0
            && player.position.y >= top
            && player.position.y <= top + Player::GROUND_Y
        {
            player.position.y = top + Player::GROUND_Y;
            player.velocity.y = 0.0;
            player.is_jumping = false;
            return;
        }

        let bottom = platform.bottom();
        if player.velocity.y > 0.0
            && player.position.y <= bottom
            && player.position.y >= bottom - Player::GROUND_Y
        {
            player.position.y = bottom - Player::GROUND_Y;
            player.velocity.y = 0.0;
            return;
        }
    }
}

/// Push the player out of solid obstacles along the shallower axis and
/// kill the velocity component into the face.
pub fn resolve_player_obstacles(player: &mut Player, obstacles: &[Obstacle]) {
    for obstacle in obstacles {
        // Ignore obstacles the player has cleared vertically.
        if player.position.y > obstacle.position.y + obstacle.size.y / 2.0 + Player::GROUND_Y {
            continue;
        }

        let dx = player.position.x - obstacle.position.x;
        let dz = player.position.z - obstacle.position.z;
        let pen_x = obstacle.size.x / 2.0 + Player::RADIUS - dx.abs();
        let pen_z = obstacle.size.z / 2.0 + Player::RADIUS - dz.abs();
        if pen_x <= 0.0 || pen_z <= 0.0 {
            continue;
        }

        if pen_x < pen_z {
            player.position.x += (pen_x + PUSHOUT_EPSILON) * dx.signum();
            player.velocity.x = 0.0;
        } else {
            player.position.z += (pen_z + PUSHOUT_EPSILON) * dz.signum();
            player.velocity.z = 0.0;
        }
    }
}

/// Swing the net: capture the first eligible monkey strictly inside
/// `Player::CAPTURE_RANGE`, at most one per swing. Returns the captured
/// id. Arms the tool cooldown whether or not anything was caught.
pub fn try_net_capture(player: &mut Player, monkeys: &mut [Monkey]) -> Option<EntityId> {
    if player.current_tool != Tool::Net || player.tool_cooldown > 0.0 {
        return None;
    }
    player.tool_cooldown = Tool::Net.cooldown();

    for monkey in monkeys.iter_mut() {
        if monkey.is_captured() || !monkey.capture_eligible() {
            continue;
        }
        if !physics::within_range(player.position, monkey.position, Player::CAPTURE_RANGE) {
            continue;
        }
        monkey.state = MonkeyState::Captured;
        monkey.velocity = glam::Vec3::ZERO;
        player.captured_monkeys += 1;
        log::debug!("captured monkey {} ({:?})", monkey.id.0, monkey.kind);
        return Some(monkey.id);
    }
    None
}

/// Swing the rod: damage every non-stunned monkey within
/// `Player::ATTACK_RANGE`. A hit that empties the health pool stuns;
/// otherwise the monkey just takes the damage. Returns the hit ids.
pub fn swing_rod(player: &mut Player, monkeys: &mut [Monkey]) -> Vec<EntityId> {
    if player.current_tool != Tool::Rod || player.tool_cooldown > 0.0 {
        return Vec::new();
    }
    player.tool_cooldown = Tool::Rod.cooldown();

    let mut hits = Vec::new();
    for monkey in monkeys.iter_mut() {
        if monkey.is_captured() || monkey.state == MonkeyState::Stunned {
            continue;
        }
        if !physics::within_range(player.position, monkey.position, Player::ATTACK_RANGE) {
            continue;
        }
        monkey.health = (monkey.health - Player::ROD_DAMAGE).max(0);
        if monkey.health <= 0 {
            monkey.stun_time = Monkey::STUN_DURATION;
            monkey.state = MonkeyState::Stunned;
            monkey.velocity = glam::Vec3::ZERO;
        }
        hits.push(monkey.id);
    }
    hits
}
