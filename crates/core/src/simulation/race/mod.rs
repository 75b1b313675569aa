//! Racing-game orchestration.
//!
//! `RaceSim::tick` runs one frame in fixed order: status sweeps, vehicle
//! physics (player from the input snapshot, rivals from their steering),
//! item use, lap progress, item-box pickups, hazard hits,
//! machine-machine contacts, projectile flight, rankings, and the finish
//! check. The whole state serializes so hosts can snapshot and restore
//! mid-race.

pub mod ai;
pub mod course;
pub mod items;
pub mod machine;
pub mod progress;

use bincode::{Decode, Encode};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entities::{EntityId, EntityIdGenerator};
use crate::events::{Effect, EffectKind, sweep_effects};
use crate::input::RaceInput;
use crate::random::SeededRandom;
use crate::simulation::FrameClock;

use self::course::{CourseData, ITEM_BOX_RADIUS, monkey_park_circuit};
use self::items::{ItemKind, PlacedItem, PlacedItemKind};
use self::machine::{Machine, MachineKind};

/// Seconds of start countdown before anything moves.
const COUNTDOWN_DURATION: f32 = 3.0;
/// Center distance below which two machines collide.
const MACHINE_CONTACT_RANGE: f32 = 3.0;
/// Separation applied to each machine in a contact.
const CONTACT_PUSH: f32 = 0.5;
const CONTACT_SPEED_FACTOR: f32 = 0.8;
/// Grid spacing behind the start line.
const GRID_ROW_SPACING: f32 = 4.0;
const GRID_LANE_OFFSET: f32 = 2.0;

/// Rival top-speed handicap per difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Encode, Decode)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Extreme,
}

impl Difficulty {
    pub const fn factor(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Normal => 0.9,
            Difficulty::Hard => 1.0,
            Difficulty::Extreme => 1.05,
        }
    }
}

/// Coin payout by final position.
pub const fn coins_for_position(position: u32) -> u32 {
    match position {
        1 => 500,
        2 => 300,
        3 => 200,
        _ => 100,
    }
}

/// Gameplay notifications drained by the host each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub enum RaceEvent {
    RaceStarted,
    ItemCollected { id: EntityId, kind: ItemKind },
    ItemUsed { id: EntityId, kind: ItemKind },
    MachineHit { id: EntityId, hazard: PlacedItemKind },
    LapCompleted { id: EntityId, lap: u32, time: f32 },
    RaceFinished { position: u32, coins: u32 },
}

/// Final standings entry for the player, latched when they cross the
/// line on the last lap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct RaceOutcome {
    pub position: u32,
    pub coins: u32,
    pub total_time: f32,
    pub lap_times: Vec<f32>,
}

/// Complete racing-game state. The player is always `machines[0]`.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct RaceState {
    pub clock: FrameClock,
    pub course: CourseData,
    pub difficulty: Difficulty,
    pub machines: Vec<Machine>,
    pub placed_items: Vec<PlacedItem>,
    pub effects: Vec<Effect>,
    pub events: Vec<RaceEvent>,
    pub rng: SeededRandom,
    pub ids: EntityIdGenerator,
    /// Remaining start countdown; racing begins at zero.
    pub countdown: f32,
    /// Seconds since the countdown ended.
    pub race_elapsed: f32,
    pub result: Option<RaceOutcome>,
}

impl RaceState {
    pub fn player(&self) -> &Machine {
        &self.machines[0]
    }

    pub fn player_mut(&mut self) -> &mut Machine {
        &mut self.machines[0]
    }

    pub fn find_machine(&self, id: EntityId) -> Option<&Machine> {
        self.machines.iter().find(|m| m.id == id)
    }

    pub fn find_machine_mut(&mut self, id: EntityId) -> Option<&mut Machine> {
        self.machines.iter_mut().find(|m| m.id == id)
    }
}

/// The racing simulation. Deterministic given the seed and the input
/// sequence.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct RaceSim {
    pub state: RaceState,
}

impl RaceSim {
    pub fn new(player_kind: MachineKind, difficulty: Difficulty, seed: u32) -> Self {
        let course = monkey_park_circuit();
        let rng = SeededRandom::new(seed);
        let mut ids = EntityIdGenerator::new();

        // The racing line runs counter-clockwise; at the start that
        // means facing -X.
        let start_yaw = -std::f32::consts::FRAC_PI_2;

        let mut player = Machine::new(ids.next(), player_kind, course.start_position, true);
        player.rotation = start_yaw;
        let mut machines = vec![player];

        // Rivals line up in two lanes behind the start, which for the
        // -X heading means stepping back along +X.
        for (i, kind) in MachineKind::RIVALS.iter().enumerate() {
            let row = (i / 2 + 1) as f32;
            let lane = ((i % 2) as f32 - 0.5) * 2.0 * GRID_LANE_OFFSET;
            let position = course.start_position + Vec3::new(row * GRID_ROW_SPACING, 0.0, lane);
            let mut rival = Machine::new(ids.next(), *kind, position, false);
            rival.rotation = start_yaw;
            rival.speed_scale = difficulty.factor();
            rival.ai_waypoint = 10;
            machines.push(rival);
        }
        progress::update_rankings(&mut machines, &course);

        log::debug!(
            "race on '{}': {:?} vs {} rivals, difficulty {:?}",
            course.name,
            player_kind,
            machines.len() - 1,
            difficulty
        );

        Self {
            state: RaceState {
                clock: FrameClock::new(),
                course,
                difficulty,
                machines,
                placed_items: Vec::new(),
                effects: Vec::new(),
                events: Vec::new(),
                rng,
                ids,
                countdown: COUNTDOWN_DURATION,
                race_elapsed: 0.0,
                result: None,
            },
        }
    }

    /// Advance one frame. Events from this tick are returned as a slice;
    /// they are replaced on the next call. During the countdown the grid
    /// is frozen; after the player's result latches, further ticks are
    /// no-ops.
    pub fn tick(&mut self, input: &RaceInput, delta: f32) -> &[RaceEvent] {
        let s = &mut self.state;
        s.events.clear();
        if s.result.is_some() {
            return &s.events;
        }

        let dt = s.clock.advance(delta);
        if s.countdown > 0.0 {
            s.countdown -= dt;
            if s.countdown <= 0.0 {
                s.countdown = 0.0;
                s.events.push(RaceEvent::RaceStarted);
                log::debug!("race start");
            }
            return &s.events;
        }
        s.race_elapsed += dt;
        let now = s.clock.elapsed;

        for machine in &mut s.machines {
            machine.statuses.sweep(now);
        }

        // Player drives from the input snapshot, rivals from their
        // steering; everything else is shared passes over all machines.
        let was_drifting = s.machines[0].is_drifting;
        machine::update_machine(&mut s.machines[0], input, now, dt);
        Self::drift_payout_effect(s, 0, was_drifting);
        if input.use_item() {
            Self::fire_item(s, 0, now);
        }

        let standings = s.machines.clone();
        for i in 1..s.machines.len() {
            let rival_input = ai::ai_input(&mut s.machines[i], &s.course, &standings, &mut s.rng);
            let was_drifting = s.machines[i].is_drifting;
            machine::update_machine(&mut s.machines[i], &rival_input, now, dt);
            Self::drift_payout_effect(s, i, was_drifting);
            if rival_input.use_item() {
                Self::fire_item(s, i, now);
            }
        }

        for i in 0..s.machines.len() {
            if progress::update_progress(&mut s.machines[i], &s.course, s.race_elapsed) {
                let m = &s.machines[i];
                s.events.push(RaceEvent::LapCompleted {
                    id: m.id,
                    lap: m.current_lap,
                    time: m.lap_times.last().copied().unwrap_or(0.0),
                });
            }
        }

        Self::collect_item_boxes(s);
        for item_box in &mut s.course.item_boxes {
            item_box.tick(dt);
        }

        let hits = items::resolve_placed_item_hits(&mut s.machines, &mut s.placed_items, now);
        for (id, hazard) in hits {
            if let Some(position) = s.find_machine(id).map(|m| m.position) {
                let kind = match hazard {
                    PlacedItemKind::Missile => EffectKind::Explosion,
                    PlacedItemKind::Banana | PlacedItemKind::Oil => EffectKind::SpinOut,
                };
                let effect_id = s.ids.next();
                s.effects.push(Effect::new(effect_id, kind, position, 0.5));
            }
            s.events.push(RaceEvent::MachineHit { id, hazard });
        }

        Self::resolve_contacts(&mut s.machines);
        items::update_placed_items(&mut s.placed_items, &s.machines, now, dt);
        sweep_effects(&mut s.effects, dt);
        progress::update_rankings(&mut s.machines, &s.course);

        let player = &s.machines[0];
        if player.finished(s.course.laps) {
            let outcome = RaceOutcome {
                position: player.current_position,
                coins: coins_for_position(player.current_position),
                total_time: s.race_elapsed,
                lap_times: player.lap_times.clone(),
            };
            log::debug!(
                "race finish: position {}, {:.1}s, {} coins",
                outcome.position,
                outcome.total_time,
                outcome.coins
            );
            s.events.push(RaceEvent::RaceFinished {
                position: outcome.position,
                coins: outcome.coins,
            });
            s.result = Some(outcome);
        }

        &s.events
    }

    /// Use the held item of `machines[index]`, if any.
    fn fire_item(s: &mut RaceState, index: usize, now: f32) {
        if let Some(kind) = items::use_item(index, &mut s.machines, &mut s.placed_items, &mut s.ids, now)
        {
            let m = &s.machines[index];
            s.events.push(RaceEvent::ItemUsed { id: m.id, kind });
            if matches!(kind, ItemKind::Boost | ItemKind::GoldBoost) {
                let position = m.position;
                let effect_id = s.ids.next();
                s.effects
                    .push(Effect::new(effect_id, EffectKind::BoostFlame, position, 0.5));
            }
        }
    }

    /// Spark burst when a drift released into a boost this tick.
    fn drift_payout_effect(s: &mut RaceState, index: usize, was_drifting: bool) {
        let m = &s.machines[index];
        if was_drifting && !m.is_drifting {
            let position = m.position;
            let effect_id = s.ids.next();
            s.effects
                .push(Effect::new(effect_id, EffectKind::DriftSpark, position, 0.3));
        }
    }

    /// Empty-handed machines pick up the first active box in reach.
    /// Draw odds depend on the machine's current standing.
    fn collect_item_boxes(s: &mut RaceState) {
        let total = s.machines.len() as u32;
        for machine in &mut s.machines {
            if machine.current_item.is_some() {
                continue;
            }
            for item_box in &mut s.course.item_boxes {
                if !item_box.active {
                    continue;
                }
                if machine.position.distance(item_box.position) < ITEM_BOX_RADIUS {
                    item_box.collect();
                    let kind = items::draw_item(&mut s.rng, machine.current_position, total);
                    machine.current_item = Some(kind);
                    s.events.push(RaceEvent::ItemCollected {
                        id: machine.id,
                        kind,
                    });
                    break;
                }
            }
        }
    }

    /// Pairwise body contacts: push apart on the track plane and scrub
    /// speed from both machines.
    fn resolve_contacts(machines: &mut [Machine]) {
        for i in 0..machines.len() {
            for j in (i + 1)..machines.len() {
                let diff = machines[j].position - machines[i].position;
                let dist = diff.length();
                if dist >= MACHINE_CONTACT_RANGE || dist < 1e-4 {
                    continue;
                }
                let push = diff / dist * CONTACT_PUSH;
                machines[i].position -= push;
                machines[j].position += push;
                machines[i].position.y = 0.0;
                machines[j].position.y = 0.0;
                machines[i].speed *= CONTACT_SPEED_FACTOR;
                machines[j].speed *= CONTACT_SPEED_FACTOR;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn started_sim(seed: u32) -> RaceSim {
        let mut sim = RaceSim::new(MachineKind::HeroMonkey, Difficulty::Normal, seed);
        sim.state.countdown = 0.0;
        sim
    }

    #[test]
    fn grid_lines_up_behind_the_start() {
        let sim = RaceSim::new(MachineKind::SpeedStar, Difficulty::Hard, 5);
        let s = &sim.state;
        assert_eq!(s.machines.len(), 8);
        assert!(s.machines[0].is_player);
        assert_eq!(s.machines[0].kind, MachineKind::SpeedStar);
        for rival in &s.machines[1..] {
            assert!(!rival.is_player);
            assert_eq!(rival.speed_scale, Difficulty::Hard.factor());
            assert!(rival.position.x > s.machines[0].position.x, "behind the line");
        }
        // Positions are seeded so item draws work before the first tick
        let mut seen: Vec<u32> = s.machines.iter().map(|m| m.current_position).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn countdown_freezes_the_grid() {
        let mut sim = RaceSim::new(MachineKind::HeroMonkey, Difficulty::Normal, 1);
        let start = sim.state.machines[0].position;
        let gas = RaceInput::from_bits(RaceInput::ACCELERATE);

        let mut started = 0;
        for _ in 0..170 {
            started += sim
                .tick(&gas, DT)
                .iter()
                .filter(|e| matches!(e, RaceEvent::RaceStarted))
                .count();
        }
        assert_eq!(sim.state.machines[0].position, start, "frozen under 3s");
        assert_eq!(started, 0);

        for _ in 0..20 {
            started += sim
                .tick(&gas, DT)
                .iter()
                .filter(|e| matches!(e, RaceEvent::RaceStarted))
                .count();
        }
        assert_eq!(started, 1, "start fires exactly once");
        assert!(sim.state.machines[0].position != start);
    }

    #[test]
    fn item_box_pickup_emits_event_and_downs_the_box() {
        let mut sim = started_sim(3);
        let box_position = sim.state.course.item_boxes[0].position;
        sim.state.machines[0].position = Vec3::new(box_position.x, 0.0, box_position.z);

        let events = sim.tick(&RaceInput::new(), DT).to_vec();
        let player_id = sim.state.machines[0].id;
        assert!(
            events
                .iter()
                .any(|e| matches!(e, RaceEvent::ItemCollected { id, .. } if *id == player_id)),
            "pickup event: {events:?}"
        );
        assert!(sim.state.machines[0].current_item.is_some());
        assert!(!sim.state.course.item_boxes[0].active);

        // Holding an item blocks further pickups
        let held = sim.state.machines[0].current_item;
        sim.state.course.item_boxes[0].active = true;
        sim.tick(&RaceInput::new(), DT);
        assert_eq!(sim.state.machines[0].current_item, held);
    }

    #[test]
    fn body_contact_pushes_machines_apart() {
        let mut sim = started_sim(4);
        let base = sim.state.machines[0].position;
        sim.state.machines[1].position = base + Vec3::new(1.0, 0.0, 0.0);
        sim.state.machines[0].speed = 60.0;
        sim.state.machines[1].speed = 60.0;

        sim.tick(&RaceInput::new(), DT);
        let gap = sim.state.machines[0]
            .position
            .distance(sim.state.machines[1].position);
        assert!(gap > 1.0, "separated, gap {gap}");
        assert!(sim.state.machines[0].speed < 60.0);
    }

    #[test]
    fn player_crossing_the_last_lap_latches_the_result() {
        let mut sim = started_sim(6);
        let laps = sim.state.course.laps;
        sim.state.machines[0].current_lap = laps - 1;
        sim.state.machines[0].current_checkpoint = sim.state.course.checkpoints.len() - 1;
        sim.state.machines[0].lap_times = vec![40.0, 41.0];
        sim.state.race_elapsed = 120.0;
        let finish = sim.state.course.checkpoints[sim.state.course.checkpoints.len() - 1].position;
        sim.state.machines[0].position = finish;

        let events = sim.tick(&RaceInput::new(), DT).to_vec();
        assert!(
            events
                .iter()
                .any(|e| matches!(e, RaceEvent::RaceFinished { .. })),
            "finish event: {events:?}"
        );
        let outcome = sim.state.result.clone().expect("result latched");
        assert_eq!(outcome.position, 1);
        assert_eq!(outcome.coins, 500);
        assert_eq!(outcome.lap_times.len(), 3);

        // Latched: further ticks are no-ops
        let frame = sim.state.clock.frame;
        sim.tick(&RaceInput::new(), DT);
        assert_eq!(sim.state.clock.frame, frame);
    }

    #[test]
    fn identical_seeds_and_inputs_stay_in_lockstep() {
        let mut a = started_sim(777);
        let mut b = started_sim(777);

        let inputs = [
            RaceInput::from_bits(RaceInput::ACCELERATE),
            RaceInput::from_bits(RaceInput::ACCELERATE | RaceInput::LEFT),
            RaceInput::from_bits(RaceInput::ACCELERATE | RaceInput::DRIFT | RaceInput::LEFT),
            RaceInput::from_bits(RaceInput::ACCELERATE | RaceInput::USE_ITEM),
        ];
        for i in 0..600 {
            let input = inputs[i % inputs.len()];
            a.tick(&input, DT);
            b.tick(&input, DT);
        }

        assert_eq!(a.state.rng.state(), b.state.rng.state());
        assert_eq!(a.state.race_elapsed, b.state.race_elapsed);
        for (ma, mb) in a.state.machines.iter().zip(&b.state.machines) {
            assert_eq!(ma.position, mb.position);
            assert_eq!(ma.speed, mb.speed);
            assert_eq!(ma.current_checkpoint, mb.current_checkpoint);
            assert_eq!(ma.current_item, mb.current_item);
        }
    }
}
