//! Rival steering: waypoint chasing with cross/dot thresholds, plus
//! probabilistic item use and form changes.

use crate::input::RaceInput;
use crate::random::SeededRandom;

use super::course::CourseData;
use super::machine::{Machine, MachineForm, DRIFT_MIN_SPEED};

/// Advance to the next waypoint when inside this radius.
const WAYPOINT_RADIUS: f32 = 10.0;
/// |cross| above this turns; above `DRIFT_CROSS` with speed it drifts.
const TURN_THRESHOLD: f32 = 0.1;
const DRIFT_CROSS: f32 = 0.5;
/// Throttle stays open unless the target is well behind.
const ACCEL_DOT: f32 = -0.3;
const BRAKE_DOT: f32 = -0.7;
/// Per-tick chance to fire a held item when someone is ahead.
const ITEM_CHANCE: f32 = 0.02;
/// Per-tick chance to stretch into long form on a straight.
const TRANSFORM_CHANCE: f32 = 0.001;

/// Produce this tick's input for a rival machine. Mutates only the
/// machine's waypoint cursor; all driving goes through the same
/// physics as the player.
pub fn ai_input(
    machine: &mut Machine,
    course: &CourseData,
    machines: &[Machine],
    rng: &mut SeededRandom,
) -> RaceInput {
    let target = course.waypoints[machine.ai_waypoint % course.waypoints.len()];
    let mut to_target = target - machine.position;
    to_target.y = 0.0;

    if to_target.length() < WAYPOINT_RADIUS {
        machine.ai_waypoint = (machine.ai_waypoint + 1) % course.waypoints.len();
    }

    let to_target = if to_target.length_squared() > 1e-6 {
        to_target.normalize()
    } else {
        machine.forward()
    };
    let forward = machine.forward();

    // Signed turn error: positive means the target is to port (+yaw).
    let cross_y = forward.z * to_target.x - forward.x * to_target.z;
    let dot = forward.dot(to_target);

    let mut input = RaceInput::new();
    input.set(RaceInput::LEFT, cross_y > TURN_THRESHOLD);
    input.set(RaceInput::RIGHT, cross_y < -TURN_THRESHOLD);
    input.set(RaceInput::ACCELERATE, dot > ACCEL_DOT);
    input.set(RaceInput::BRAKE, dot < BRAKE_DOT);
    input.set(
        RaceInput::DRIFT,
        cross_y.abs() > DRIFT_CROSS && machine.speed > DRIFT_MIN_SPEED * 0.8,
    );

    if machine.current_item.is_some() {
        let anyone_ahead = machines
            .iter()
            .any(|m| m.id != machine.id && m.current_position < machine.current_position);
        if anyone_ahead && rng.next_bool(ITEM_CHANCE) {
            input.set(RaceInput::USE_ITEM, true);
        }
    }

    if cross_y.abs() < TURN_THRESHOLD
        && machine.form == MachineForm::Normal
        && rng.next_bool(TRANSFORM_CHANCE)
    {
        input.set(RaceInput::TRANSFORM, true);
    }

    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::EntityId;
    use crate::simulation::race::course::monkey_park_circuit;
    use crate::simulation::race::machine::MachineKind;
    use glam::Vec3;

    fn rival(position: Vec3) -> Machine {
        Machine::new(EntityId(5), MachineKind::PipotronRed, position, false)
    }

    #[test]
    fn drives_toward_waypoint_ahead() {
        let course = monkey_park_circuit();
        // First waypoint is at (+80, 0, 0); park behind it facing +X
        let mut m = rival(Vec3::new(40.0, 0.0, 0.0));
        m.rotation = std::f32::consts::FRAC_PI_2;

        let mut rng = SeededRandom::new(1);
        let input = ai_input(&mut m, &course, &[], &mut rng);
        assert!(input.accelerate());
        assert!(!input.brake());
        assert!(!input.left() && !input.right(), "dead ahead, no turning");
    }

    #[test]
    fn turns_toward_offset_waypoint() {
        let course = monkey_park_circuit();
        // Facing +Z while the waypoint sits at +X: port turn (left)
        let mut m = rival(Vec3::new(40.0, 0.0, 0.0));
        m.rotation = 0.0;

        let mut rng = SeededRandom::new(1);
        let input = ai_input(&mut m, &course, &[], &mut rng);
        assert!(input.left());
        assert!(!input.right());
    }

    #[test]
    fn advances_waypoint_on_arrival() {
        let course = monkey_park_circuit();
        let mut m = rival(course.waypoints[0] + Vec3::new(2.0, 0.0, 0.0));
        let mut rng = SeededRandom::new(1);

        ai_input(&mut m, &course, &[], &mut rng);
        assert_eq!(m.ai_waypoint, 1);

        // Wraps at the end of the loop
        m.ai_waypoint = course.waypoints.len() - 1;
        m.position = course.waypoints[course.waypoints.len() - 1];
        ai_input(&mut m, &course, &[], &mut rng);
        assert_eq!(m.ai_waypoint, 0);
    }

    #[test]
    fn drifts_only_in_fast_sharp_turns() {
        let course = monkey_park_circuit();
        // Target dead astern gives maximal |cross| as it swings; build
        // a 90-degree error instead: facing -Z with target at +X
        let mut m = rival(Vec3::new(40.0, 0.0, 0.0));
        m.rotation = std::f32::consts::PI; // facing -Z
        m.speed = 60.0;
        let mut rng = SeededRandom::new(1);
        let input = ai_input(&mut m, &course, &[], &mut rng);
        assert!(input.drift(), "fast sharp corner drifts");

        m.speed = 20.0;
        let input = ai_input(&mut m, &course, &[], &mut rng);
        assert!(!input.drift(), "too slow to drift");
    }

    #[test]
    fn never_fires_item_without_holding_one() {
        let course = monkey_park_circuit();
        let mut m = rival(Vec3::new(40.0, 0.0, 0.0));
        m.current_position = 5;
        let mut rng = SeededRandom::new(1);
        for _ in 0..1000 {
            let input = ai_input(&mut m, &course, &[], &mut rng);
            assert!(!input.use_item());
        }
    }
}
