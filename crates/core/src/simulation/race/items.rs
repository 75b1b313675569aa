//! Racing item system: position-tiered draws, use effects, placed
//! hazards and homing missiles.

use bincode::{Decode, Encode};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entities::{EntityId, EntityIdGenerator};
use crate::math;
use crate::random::SeededRandom;
use crate::status::StatusKind;

use super::machine::Machine;

/// Pickup radius against placed hazards.
const HIT_RADIUS: f32 = 1.5;
/// Missiles detonate at twice the hazard radius.
const MISSILE_HIT_RADIUS: f32 = 3.0;
/// Missile closing speed, units/s.
const MISSILE_SPEED: f32 = 80.0;
/// A freshly placed item cannot hit its owner for this long.
const SELF_IMMUNITY: f32 = 1.0;
const MISSILE_TTL: f32 = 10.0;
const PLACED_TTL: f32 = 30.0;
/// Spin-out recovery time.
pub const SPIN_DURATION: f32 = 1.0;

const SHIELD_DURATION: f32 = 8.0;
const BOOST_DURATION: f32 = 3.0;
const BOOST_MULTIPLIER: f32 = 1.5;
const GOLD_BOOST_DURATION: f32 = 5.0;
const GOLD_BOOST_MULTIPLIER: f32 = 2.0;
const THUNDER_SPEED_FACTOR: f32 = 0.5;
const BANANA_SPEED_FACTOR: f32 = 0.3;
const OIL_SPEED_FACTOR: f32 = 0.5;

/// Items a machine can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum ItemKind {
    Banana,
    Missile,
    Shield,
    Boost,
    Thunder,
    Oil,
    BananaTriple,
    GoldBoost,
}

/// Draw-table tier keyed by race position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    First,
    Early,
    Middle,
    Last,
}

fn tier_for(position: u32, total: u32) -> Tier {
    if position == 1 {
        Tier::First
    } else if position <= total.div_ceil(3) {
        Tier::Early
    } else if position <= (total * 2).div_ceil(3) {
        Tier::Middle
    } else {
        Tier::Last
    }
}

/// Per-tier item weights, in fixed draw order. Each row sums to 1.0.
/// The leader never draws offensive items.
fn tier_table(tier: Tier) -> [(ItemKind, f32); 8] {
    use ItemKind::*;
    match tier {
        Tier::First => [
            (Banana, 0.35),
            (Missile, 0.0),
            (Shield, 0.0),
            (Boost, 0.30),
            (Thunder, 0.0),
            (Oil, 0.20),
            (BananaTriple, 0.10),
            (GoldBoost, 0.05),
        ],
        Tier::Early => [
            (Banana, 0.25),
            (Missile, 0.10),
            (Shield, 0.10),
            (Boost, 0.25),
            (Thunder, 0.0),
            (Oil, 0.15),
            (BananaTriple, 0.10),
            (GoldBoost, 0.05),
        ],
        Tier::Middle => [
            (Banana, 0.15),
            (Missile, 0.20),
            (Shield, 0.15),
            (Boost, 0.20),
            (Thunder, 0.05),
            (Oil, 0.10),
            (BananaTriple, 0.10),
            (GoldBoost, 0.05),
        ],
        Tier::Last => [
            (Banana, 0.05),
            (Missile, 0.25),
            (Shield, 0.20),
            (Boost, 0.15),
            (Thunder, 0.15),
            (Oil, 0.05),
            (BananaTriple, 0.05),
            (GoldBoost, 0.10),
        ],
    }
}

/// Draw an item from the tier table for the given race position.
/// Cumulative sampling; if rounding leaves no match the first entry
/// wins.
pub fn draw_item(rng: &mut SeededRandom, position: u32, total: u32) -> ItemKind {
    let table = tier_table(tier_for(position, total));
    let roll = rng.next();
    let mut cumulative = 0.0;
    for (kind, probability) in table {
        cumulative += probability;
        if roll <= cumulative {
            return kind;
        }
    }
    table[0].0
}

/// Hazards placed on the track, including in-flight missiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum PlacedItemKind {
    Banana,
    Oil,
    Missile,
}

#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct PlacedItem {
    pub id: EntityId,
    pub kind: PlacedItemKind,
    #[bincode(with_serde)]
    pub position: Vec3,
    pub owner: EntityId,
    /// Simulation time at placement; drives TTL and self-immunity.
    pub created_at: f32,
    /// Locked target for missiles; they hit nothing else.
    pub target: Option<EntityId>,
}

impl PlacedItem {
    fn ttl(&self) -> f32 {
        match self.kind {
            PlacedItemKind::Missile => MISSILE_TTL,
            PlacedItemKind::Banana | PlacedItemKind::Oil => PLACED_TTL,
        }
    }
}

/// Offset in machine-local space rotated into the world. Local +Z is
/// the machine's heading.
fn local_offset(machine: &Machine, offset: Vec3) -> Vec3 {
    let forward = machine.forward();
    let right = math::yaw_forward(machine.rotation + std::f32::consts::FRAC_PI_2);
    machine.position + right * offset.x + forward * offset.z + Vec3::new(0.0, offset.y, 0.0)
}

/// Consume and apply `machines[index]`'s held item. The item is always
/// cleared, even when the effect finds no target. Returns the kind used.
pub fn use_item(
    index: usize,
    machines: &mut [Machine],
    placed: &mut Vec<PlacedItem>,
    ids: &mut EntityIdGenerator,
    now: f32,
) -> Option<ItemKind> {
    let kind = machines[index].current_item.take()?;
    log::debug!("machine {} uses {:?}", machines[index].id.0, kind);

    match kind {
        ItemKind::Banana => {
            let m = &machines[index];
            placed.push(PlacedItem {
                id: ids.next(),
                kind: PlacedItemKind::Banana,
                position: local_offset(m, Vec3::new(0.0, 0.5, -3.0)),
                owner: m.id,
                created_at: now,
                target: None,
            });
        }
        ItemKind::BananaTriple => {
            for i in 0..3 {
                let m = &machines[index];
                let offset = Vec3::new((i as f32 - 1.0) * 2.0, 0.5, -3.0 - i as f32 * 2.0);
                placed.push(PlacedItem {
                    id: ids.next(),
                    kind: PlacedItemKind::Banana,
                    position: local_offset(m, offset),
                    owner: m.id,
                    created_at: now,
                    target: None,
                });
            }
        }
        ItemKind::Oil => {
            let m = &machines[index];
            placed.push(PlacedItem {
                id: ids.next(),
                kind: PlacedItemKind::Oil,
                position: local_offset(m, Vec3::new(0.0, 0.1, -4.0)),
                owner: m.id,
                created_at: now,
                target: None,
            });
        }
        ItemKind::Missile => {
            // Lock the nearest machine ahead in the standings; with
            // nobody ahead the missile is wasted.
            let my_position = machines[index].current_position;
            let target = machines
                .iter()
                .filter(|m| m.id != machines[index].id && m.current_position < my_position)
                .max_by_key(|m| m.current_position)
                .map(|m| m.id);
            if let Some(target) = target {
                let m = &machines[index];
                placed.push(PlacedItem {
                    id: ids.next(),
                    kind: PlacedItemKind::Missile,
                    position: local_offset(m, Vec3::new(0.0, 1.0, 2.0)),
                    owner: m.id,
                    created_at: now,
                    target: Some(target),
                });
            }
        }
        ItemKind::Shield => {
            machines[index]
                .statuses
                .add(StatusKind::Invincible, now, SHIELD_DURATION);
        }
        ItemKind::Boost => {
            machines[index].statuses.add(
                StatusKind::Boost {
                    multiplier: BOOST_MULTIPLIER,
                },
                now,
                BOOST_DURATION,
            );
        }
        ItemKind::GoldBoost => {
            let statuses = &mut machines[index].statuses;
            statuses.add(StatusKind::Invincible, now, GOLD_BOOST_DURATION);
            statuses.add(
                StatusKind::Boost {
                    multiplier: GOLD_BOOST_MULTIPLIER,
                },
                now,
                GOLD_BOOST_DURATION,
            );
        }
        ItemKind::Thunder => {
            let user_id = machines[index].id;
            for m in machines.iter_mut() {
                if m.id == user_id || m.is_invincible() {
                    continue;
                }
                m.statuses.add(StatusKind::Spin, now, SPIN_DURATION);
                m.speed *= THUNDER_SPEED_FACTOR;
            }
        }
    }
    Some(kind)
}

/// Hit test every machine against the placed hazards and apply the
/// effects. Hit items are removed. Returns (machine, hazard) pairs for
/// the host's effect feed.
pub fn resolve_placed_item_hits(
    machines: &mut [Machine],
    placed: &mut Vec<PlacedItem>,
    now: f32,
) -> Vec<(EntityId, PlacedItemKind)> {
    let mut hits = Vec::new();
    let mut consumed: Vec<usize> = Vec::new();

    for machine in machines.iter_mut() {
        for (i, item) in placed.iter().enumerate() {
            if consumed.contains(&i) {
                continue;
            }
            if item.owner == machine.id && now - item.created_at < SELF_IMMUNITY {
                continue;
            }

            if item.kind == PlacedItemKind::Missile {
                if item.target != Some(machine.id) {
                    continue;
                }
                if machine.position.distance(item.position) < MISSILE_HIT_RADIUS {
                    if !machine.is_invincible() {
                        machine.statuses.add(StatusKind::Spin, now, SPIN_DURATION);
                        machine.speed = 0.0;
                    }
                    consumed.push(i);
                    hits.push((machine.id, item.kind));
                    break;
                }
                continue;
            }

            if machine.position.distance(item.position) < HIT_RADIUS {
                // Invincible machines still soak the hazard up.
                if !machine.is_invincible() {
                    let factor = match item.kind {
                        PlacedItemKind::Banana => BANANA_SPEED_FACTOR,
                        PlacedItemKind::Oil => OIL_SPEED_FACTOR,
                        PlacedItemKind::Missile => unreachable!(),
                    };
                    machine.statuses.add(StatusKind::Spin, now, SPIN_DURATION);
                    machine.speed *= factor;
                }
                consumed.push(i);
                hits.push((machine.id, item.kind));
                break;
            }
        }
    }

    consumed.sort_unstable_by(|a, b| b.cmp(a));
    for i in consumed {
        placed.remove(i);
    }
    hits
}

/// Advance placed items one tick: missiles re-aim at their target's
/// current position, and anything past its TTL is purged.
pub fn update_placed_items(
    placed: &mut Vec<PlacedItem>,
    machines: &[Machine],
    now: f32,
    delta: f32,
) {
    for item in placed.iter_mut() {
        if item.kind != PlacedItemKind::Missile {
            continue;
        }
        let target = item
            .target
            .and_then(|id| machines.iter().find(|m| m.id == id));
        if let Some(target) = target {
            let to_target = target.position - item.position;
            if to_target.length_squared() > 1e-6 {
                item.position += to_target.normalize() * MISSILE_SPEED * delta;
            }
        }
    }
    placed.retain(|item| now - item.created_at < item.ttl());
}
