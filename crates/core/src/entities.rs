//! Entity types for the capture game.
//!
//! Plain records mutated only by the update passes in `simulation::capture`.
//! Collections are `Vec` so iteration order is identical across runs.
//! Racing-side entities live in `simulation::race::machine`.

use bincode::{Decode, Encode};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::status::{StatusKind, StatusSet};

/// Unique identifier for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub struct EntityId(pub u32);

/// Manages entity ID generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Encode, Decode)]
pub struct EntityIdGenerator {
    next_id: u32,
}

impl EntityIdGenerator {
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    pub fn next(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// Player gadgets. Net and rod drive the interaction rules; the rest only
/// matter to the host but share the cooldown table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Encode, Decode)]
pub enum Tool {
    #[default]
    Net,
    Rod,
    Booster,
    Hover,
    Radar,
}

impl Tool {
    /// Seconds between uses.
    pub fn cooldown(&self) -> f32 {
        match self {
            Tool::Net => 0.5,
            Tool::Rod => 0.8,
            Tool::Booster => 3.0,
            Tool::Hover => 5.0,
            Tool::Radar => 10.0,
        }
    }
}

/// The capture-game player.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct Player {
    pub id: EntityId,
    #[bincode(with_serde)]
    pub position: Vec3,
    #[bincode(with_serde)]
    pub velocity: Vec3,
    /// Facing yaw, `atan2(vx, vz)` of the last movement heading.
    pub rotation: f32,
    pub health: i32,
    pub max_health: i32,
    pub current_tool: Tool,
    pub tool_cooldown: f32,
    pub dash_cooldown: f32,
    pub is_jumping: bool,
    pub is_attacking: bool,
    pub statuses: StatusSet,
    pub captured_monkeys: u32,
}

impl Player {
    pub const MOVE_SPEED: f32 = 8.0;
    pub const DASH_SPEED: f32 = 16.0;
    pub const JUMP_FORCE: f32 = 12.0;
    pub const GRAVITY: f32 = -25.0;
    pub const MAX_HEALTH: i32 = 100;
    pub const DASH_DURATION: f32 = 0.3;
    pub const DASH_COOLDOWN: f32 = 1.5;
    pub const INVINCIBLE_DURATION: f32 = 1.5;
    pub const CAPTURE_RANGE: f32 = 4.5;
    pub const ATTACK_RANGE: f32 = 4.0;
    pub const ROD_DAMAGE: i32 = 1;
    pub const RADIUS: f32 = 0.5;
    pub const GROUND_Y: f32 = 1.0;

    pub fn new(id: EntityId, position: Vec3) -> Self {
        Self {
            id,
            position,
            velocity: Vec3::ZERO,
            rotation: 0.0,
            health: Self::MAX_HEALTH,
            max_health: Self::MAX_HEALTH,
            current_tool: Tool::Net,
            tool_cooldown: 0.0,
            dash_cooldown: 0.0,
            is_jumping: false,
            is_attacking: false,
            statuses: StatusSet::new(),
            captured_monkeys: 0,
        }
    }

    pub fn is_dashing(&self) -> bool {
        self.statuses.is_dashing()
    }

    pub fn is_invincible(&self) -> bool {
        self.statuses.is_invincible()
    }

    /// Apply damage with the invincibility window. Health never goes
    /// below zero. Returns true if the hit landed.
    pub fn apply_damage(&mut self, amount: i32, now: f32) -> bool {
        if self.is_invincible() {
            return false;
        }
        self.health = (self.health - amount).max(0);
        self.statuses
            .add(StatusKind::Invincible, now, Self::INVINCIBLE_DURATION);
        true
    }

    /// Damage taken so far, used for rank scoring.
    pub fn damage_taken(&self) -> i32 {
        self.max_health - self.health
    }
}

/// How an archetype reacts once its alert level passes the action
/// threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum ThreatResponse {
    /// Run straight away from the player.
    Flee,
    /// Flee with a time-varying lateral weave.
    Zigzag,
    /// Close in and attack at short range, flee otherwise.
    Attack,
    /// Freeze in place.
    Hide,
    /// Attack at long range, flee otherwise.
    Elite,
}

/// Fixed per-archetype stats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct MonkeyStats {
    pub max_health: i32,
    pub speed: f32,
    pub detection_range: f32,
    pub response: ThreatResponse,
}

/// The five monkey archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum MonkeyKind {
    Yellow,
    Blue,
    Red,
    Green,
    Black,
}

impl MonkeyKind {
    /// Archetype stat table. Adding a kind is a data change here, not a
    /// code change across the AI.
    pub const fn stats(&self) -> MonkeyStats {
        match self {
            MonkeyKind::Yellow => MonkeyStats {
                max_health: 1,
                speed: 2.5,
                detection_range: 8.0,
                response: ThreatResponse::Flee,
            },
            MonkeyKind::Blue => MonkeyStats {
                max_health: 1,
                speed: 4.5,
                detection_range: 10.0,
                response: ThreatResponse::Zigzag,
            },
            MonkeyKind::Red => MonkeyStats {
                max_health: 2,
                speed: 3.5,
                detection_range: 12.0,
                response: ThreatResponse::Attack,
            },
            MonkeyKind::Green => MonkeyStats {
                max_health: 2,
                speed: 2.0,
                detection_range: 6.0,
                response: ThreatResponse::Hide,
            },
            MonkeyKind::Black => MonkeyStats {
                max_health: 4,
                speed: 4.0,
                detection_range: 15.0,
                response: ThreatResponse::Elite,
            },
        }
    }
}

/// Behavioral state. Exactly one active; `Captured` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Encode, Decode)]
pub enum MonkeyState {
    #[default]
    Idle,
    Patrol,
    Alert,
    Fleeing,
    Attacking,
    Stunned,
    Captured,
    Hidden,
}

/// A monkey NPC.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct Monkey {
    pub id: EntityId,
    pub kind: MonkeyKind,
    #[bincode(with_serde)]
    pub position: Vec3,
    #[bincode(with_serde)]
    pub velocity: Vec3,
    pub rotation: f32,
    pub state: MonkeyState,
    pub health: i32,
    /// Seconds of stun remaining.
    pub stun_time: f32,
    /// Awareness of the player, clamped to [0, 1].
    pub alert_level: f32,
    #[bincode(with_serde)]
    pub patrol_points: Vec<Vec3>,
    pub patrol_index: usize,
    pub attack_cooldown: f32,
}

impl Monkey {
    pub const ALERT_DECAY: f32 = 0.5;
    pub const STUN_DURATION: f32 = 3.0;
    pub const ATTACK_COOLDOWN: f32 = 1.5;
    pub const PATROL_ARRIVE_DISTANCE: f32 = 1.0;
    pub const CONTACT_RANGE: f32 = 2.0;
    pub const CONTACT_DAMAGE: i32 = 10;
    pub const GROUND_Y: f32 = 1.0;

    pub fn new(id: EntityId, kind: MonkeyKind, position: Vec3) -> Self {
        Self {
            id,
            kind,
            position,
            velocity: Vec3::ZERO,
            rotation: 0.0,
            state: MonkeyState::Idle,
            health: kind.stats().max_health,
            stun_time: 0.0,
            alert_level: 0.0,
            patrol_points: Vec::new(),
            patrol_index: 0,
            attack_cooldown: 0.0,
        }
    }

    pub fn is_captured(&self) -> bool {
        self.state == MonkeyState::Captured
    }

    /// Net eligibility: stunned, downed, or at half health or below.
    pub fn capture_eligible(&self) -> bool {
        self.state == MonkeyState::Stunned
            || self.health <= 0
            || self.health * 2 <= self.kind.stats().max_health
    }
}

/// Stage boss. Not capturable; defeated at zero health.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct Boss {
    pub id: EntityId,
    pub name: String,
    #[bincode(with_serde)]
    pub position: Vec3,
    #[bincode(with_serde)]
    pub velocity: Vec3,
    pub rotation: f32,
    pub health: i32,
    pub max_health: i32,
    pub max_phase: u8,
    pub attack_cooldown: f32,
    pub invulnerable: bool,
}

impl Boss {
    pub const SPEED: f32 = 3.0;
    pub const ATTACK_RANGE: f32 = 10.0;
    pub const CONTACT_DAMAGE: i32 = 15;
    pub const BASE_ATTACK_INTERVAL: f32 = 3.0;
    pub const PHASE_INTERVAL_STEP: f32 = 0.5;

    pub fn new(id: EntityId, name: impl Into<String>, position: Vec3, max_health: i32) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            velocity: Vec3::ZERO,
            rotation: 0.0,
            health: max_health,
            max_health,
            max_phase: 3,
            attack_cooldown: 0.0,
            invulnerable: false,
        }
    }

    /// Phase is derived from the health fraction every tick; it is never
    /// stored independently.
    pub fn phase(&self) -> u8 {
        let fraction = self.health as f32 / self.max_health as f32;
        let phase = if fraction <= 0.25 {
            3
        } else if fraction <= 0.5 {
            2
        } else {
            1
        };
        phase.min(self.max_phase)
    }

    /// Seconds between attacks, shrinking as phases advance.
    pub fn attack_interval(&self) -> f32 {
        Self::BASE_ATTACK_INTERVAL - Self::PHASE_INTERVAL_STEP * (self.phase() - 1) as f32
    }

    pub fn is_defeated(&self) -> bool {
        self.health <= 0
    }
}
