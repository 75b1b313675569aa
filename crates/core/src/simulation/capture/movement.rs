//! Player kinematics for the capture game.
//!
//! Movement is camera-relative: the wish direction comes from the input
//! axes rotated by the camera yaw, and horizontal velocity is set
//! directly rather than accelerated. Vertical motion is the only
//! integrated axis.

use glam::Vec3;

use crate::entities::Player;
use crate::input::CaptureInput;
use crate::math;
use crate::status::StatusKind;

/// Horizontal velocity retained per tick with no directional input.
const IDLE_DAMPING: f32 = 0.8;
/// Planar speed below which the facing stops tracking the velocity.
const FACING_SPEED_FLOOR: f32 = 0.1;
/// Facing smoothing rate.
const ROTATION_SMOOTHING: f32 = 10.0;

/// Advance the player one tick from an input snapshot. Platform and
/// obstacle resolution happens afterwards in `collision`.
pub fn update_player(
    player: &mut Player,
    input: &CaptureInput,
    camera_yaw: f32,
    now: f32,
    delta: f32,
) {
    player.tool_cooldown = (player.tool_cooldown - delta).max(0.0);
    player.dash_cooldown = (player.dash_cooldown - delta).max(0.0);

    if input.dash() && player.dash_cooldown <= 0.0 && !player.is_dashing() {
        player
            .statuses
            .add(StatusKind::Dash, now, Player::DASH_DURATION);
        player.dash_cooldown = Player::DASH_COOLDOWN;
        log::debug!("player dash at t={:.2}", now);
    }

    let advance = input.advance() as f32;
    let strafe = input.strafe() as f32;
    let forward = math::yaw_forward(camera_yaw);
    let right = math::yaw_forward(camera_yaw + std::f32::consts::FRAC_PI_2);
    let wish = forward * advance + right * strafe;

    if wish.length_squared() > 1e-6 {
        let speed = if player.is_dashing() {
            Player::DASH_SPEED
        } else {
            Player::MOVE_SPEED
        };
        let dir = wish.normalize();
        player.velocity.x = dir.x * speed;
        player.velocity.z = dir.z * speed;
    } else {
        player.velocity.x *= IDLE_DAMPING;
        player.velocity.z *= IDLE_DAMPING;
    }

    if input.jump() && !player.is_jumping {
        player.velocity.y = Player::JUMP_FORCE;
        player.is_jumping = true;
    }
    player.velocity.y += Player::GRAVITY * delta;

    player.position += player.velocity * delta;

    // Base ground; platform tops are handled by the collision pass.
    if player.position.y <= Player::GROUND_Y {
        player.position.y = Player::GROUND_Y;
        player.velocity.y = 0.0;
        player.is_jumping = false;
    }

    let planar = Vec3::new(player.velocity.x, 0.0, player.velocity.z);
    if planar.length() > FACING_SPEED_FLOOR {
        let heading = math::atan2_det(player.velocity.x, player.velocity.z);
        player.rotation = math::damp_angle(player.rotation, heading, delta * ROTATION_SMOOTHING);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::EntityId;

    const DT: f32 = 1.0 / 60.0;

    fn player() -> Player {
        Player::new(EntityId(1), Vec3::new(0.0, Player::GROUND_Y, 0.0))
    }

    fn step(player: &mut Player, input: &CaptureInput, camera_yaw: f32, ticks: u32) -> f32 {
        let mut now = 0.0;
        for _ in 0..ticks {
            now += DT;
            player.statuses.sweep(now);
            update_player(player, input, camera_yaw, now, DT);
        }
        now
    }

    #[test]
    fn forward_moves_along_camera_heading() {
        let mut p = player();
        let input = CaptureInput::from_bits(CaptureInput::FORWARD);

        // Camera looking +Z
        step(&mut p, &input, 0.0, 60);
        assert!(p.position.z > 5.0, "moved {:?}", p.position);
        assert!(p.position.x.abs() < 0.1);
    }

    #[test]
    fn strafe_is_perpendicular_to_heading() {
        let mut p = player();
        let input = CaptureInput::from_bits(CaptureInput::RIGHT);
        step(&mut p, &input, 0.0, 60);
        assert!(p.position.x > 5.0, "moved {:?}", p.position);
        assert!(p.position.z.abs() < 0.1);
    }

    #[test]
    fn idle_damping_bleeds_speed() {
        let mut p = player();
        p.velocity = Vec3::new(8.0, 0.0, 0.0);
        let idle = CaptureInput::new();
        update_player(&mut p, &idle, 0.0, DT, DT);
        assert!((p.velocity.x - 8.0 * IDLE_DAMPING).abs() < 1e-5);
    }

    #[test]
    fn jump_arcs_and_lands() {
        let mut p = player();
        let jump = CaptureInput::from_bits(CaptureInput::JUMP);
        update_player(&mut p, &jump, 0.0, DT, DT);
        assert!(p.is_jumping);
        assert!(p.velocity.y > 0.0);

        // No double jump while airborne
        let vy = p.velocity.y;
        update_player(&mut p, &jump, 0.0, 2.0 * DT, DT);
        assert!(p.velocity.y < vy);

        let idle = CaptureInput::new();
        let mut landed = false;
        for i in 0..300 {
            update_player(&mut p, &idle, 0.0, (i + 3) as f32 * DT, DT);
            if !p.is_jumping {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert_eq!(p.position.y, Player::GROUND_Y);
        assert_eq!(p.velocity.y, 0.0);
    }

    #[test]
    fn dash_boosts_speed_then_cools_down() {
        let mut p = player();
        let input = CaptureInput::from_bits(CaptureInput::FORWARD | CaptureInput::DASH);

        update_player(&mut p, &input, 0.0, DT, DT);
        assert!(p.is_dashing());
        assert!((p.velocity.z - Player::DASH_SPEED).abs() < 1e-4);
        // The decrement runs before the trigger, so the cooldown leaves
        // the triggering tick at its full value.
        assert_eq!(p.dash_cooldown, Player::DASH_COOLDOWN);

        // After the dash window expires, speed drops back but the
        // cooldown still blocks a re-trigger.
        let now = Player::DASH_DURATION + 2.0 * DT;
        p.statuses.sweep(now);
        update_player(&mut p, &input, 0.0, now, DT);
        assert!(!p.is_dashing());
        assert!((p.velocity.z - Player::MOVE_SPEED).abs() < 1e-4);
        assert!((p.dash_cooldown - (Player::DASH_COOLDOWN - DT)).abs() < 1e-4);
    }

    #[test]
    fn facing_tracks_velocity() {
        let mut p = player();
        let input = CaptureInput::from_bits(CaptureInput::FORWARD);
        step(&mut p, &input, std::f32::consts::FRAC_PI_2, 60);
        // Camera yaw pi/2 points +X, so the facing converges there
        assert!((p.rotation - std::f32::consts::FRAC_PI_2).abs() < 0.05);
    }
}
