//! Visual effect triggers emitted by the simulations.
//!
//! Effects have no gameplay meaning; they exist so the host can render
//! particles and flashes against positions the simulation computed. They
//! age with simulation time and are purged once their duration elapses.
//! Gameplay notifications are the typed event enums in each sim module.

use bincode::{Decode, Encode};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entities::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum EffectKind {
    Capture,
    Hit,
    Stun,
    Dash,
    BossAttack,
    DriftSpark,
    BoostFlame,
    SpinOut,
    Explosion,
}

/// One transient visual effect.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct Effect {
    pub id: EntityId,
    pub kind: EffectKind,
    #[bincode(with_serde)]
    pub position: Vec3,
    pub duration: f32,
    pub elapsed: f32,
}

impl Effect {
    pub fn new(id: EntityId, kind: EffectKind, position: Vec3, duration: f32) -> Self {
        Self {
            id,
            kind,
            position,
            duration,
            elapsed: 0.0,
        }
    }

    pub fn expired(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Age all effects and drop the expired ones. One call per tick.
pub fn sweep_effects(effects: &mut Vec<Effect>, delta: f32) {
    for effect in effects.iter_mut() {
        effect.elapsed += delta;
    }
    effects.retain(|e| !e.expired());
}
