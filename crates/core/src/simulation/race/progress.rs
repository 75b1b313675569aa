//! Lap/checkpoint progress and the standings order.

use crate::physics;

use super::course::CourseData;
use super::machine::Machine;

/// Check the machine against its next checkpoint. Checkpoints must be
/// passed in order; passing the last one completes a lap, resets the
/// cursor, and appends a lap time. Returns true when a lap completed.
pub fn update_progress(machine: &mut Machine, course: &CourseData, race_elapsed: f32) -> bool {
    if course.checkpoints.is_empty() {
        return false;
    }
    let index = machine.current_checkpoint;
    if index >= course.checkpoints.len() {
        return false;
    }

    let checkpoint = &course.checkpoints[index];
    if !physics::within_range(machine.position, checkpoint.position, checkpoint.width) {
        return false;
    }

    machine.current_checkpoint = index + 1;
    if index == course.checkpoints.len() - 1 {
        machine.current_lap += 1;
        machine.current_checkpoint = 0;
        let previous: f32 = machine.lap_times.iter().sum();
        machine.lap_times.push(race_elapsed - previous);
        log::debug!(
            "machine {} lap {} in {:.2}s",
            machine.id.0,
            machine.current_lap,
            machine.lap_times.last().copied().unwrap_or(0.0)
        );
        return true;
    }
    false
}

/// Refresh every machine's 1-based `current_position`. Order: laps
/// descending, checkpoint index descending, distance to the next
/// checkpoint ascending. Machines are not reordered; exact three-way
/// ties keep the stable spawn order.
pub fn update_rankings(machines: &mut [Machine], course: &CourseData) {
    let mut order: Vec<usize> = (0..machines.len()).collect();
    order.sort_by(|&a, &b| {
        let (ma, mb) = (&machines[a], &machines[b]);
        mb.current_lap
            .cmp(&ma.current_lap)
            .then(mb.current_checkpoint.cmp(&ma.current_checkpoint))
            .then_with(|| {
                let next_a = &course.checkpoints[ma.current_checkpoint % course.checkpoints.len()];
                let next_b = &course.checkpoints[mb.current_checkpoint % course.checkpoints.len()];
                let da = ma.position.distance_squared(next_a.position);
                let db = mb.position.distance_squared(next_b.position);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
    });
    for (rank, &i) in order.iter().enumerate() {
        machines[i].current_position = rank as u32 + 1;
    }
}
