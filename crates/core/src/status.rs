//! Transient status effects with a single expiry sweep.
//!
//! Dashing, invincibility, boost and spin-out are all "flag until time T"
//! states. Instead of one ad hoc flag plus timer per state, each entity
//! carries a list of tagged effects with an expiry in simulation seconds,
//! swept once per tick. Cooldowns are not statuses; they gate actions and
//! stay plain countdown floats on their owners.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Kind of transient status.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub enum StatusKind {
    /// Capture game: dash window, speed doubled.
    Dash,
    /// Immune to damage and item hits.
    Invincible,
    /// Racing: target speed multiplied while accelerating.
    Boost { multiplier: f32 },
    /// Racing: spun out, no throttle.
    Spin,
}

impl StatusKind {
    fn same_kind(&self, other: &StatusKind) -> bool {
        matches!(
            (self, other),
            (StatusKind::Dash, StatusKind::Dash)
                | (StatusKind::Invincible, StatusKind::Invincible)
                | (StatusKind::Boost { .. }, StatusKind::Boost { .. })
                | (StatusKind::Spin, StatusKind::Spin)
        )
    }
}

/// One active status with its expiry in simulation elapsed seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub expires_at: f32,
}

/// Per-entity set of active statuses.
///
/// Backed by a `Vec` for deterministic order; at most one entry per kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct StatusSet {
    effects: Vec<StatusEffect>,
}

impl StatusSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a status expiring `duration` seconds from `now`. An existing
    /// status of the same kind is replaced (refresh, not stack).
    pub fn add(&mut self, kind: StatusKind, now: f32, duration: f32) {
        let expires_at = now + duration;
        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind.same_kind(&kind)) {
            existing.kind = kind;
            existing.expires_at = expires_at;
        } else {
            self.effects.push(StatusEffect { kind, expires_at });
        }
    }

    /// Remove expired statuses. Called once per tick by the scheduler.
    pub fn sweep(&mut self, now: f32) {
        self.effects.retain(|e| e.expires_at > now);
    }

    /// Drop a status of the given kind immediately.
    pub fn clear(&mut self, kind: StatusKind) {
        self.effects.retain(|e| !e.kind.same_kind(&kind));
    }

    pub fn clear_all(&mut self) {
        self.effects.clear();
    }

    fn has(&self, kind: StatusKind) -> bool {
        self.effects.iter().any(|e| e.kind.same_kind(&kind))
    }

    pub fn is_dashing(&self) -> bool {
        self.has(StatusKind::Dash)
    }

    pub fn is_invincible(&self) -> bool {
        self.has(StatusKind::Invincible)
    }

    pub fn is_spinning(&self) -> bool {
        self.has(StatusKind::Spin)
    }

    /// Active boost multiplier, if boosting.
    pub fn boost_multiplier(&self) -> Option<f32> {
        self.effects.iter().find_map(|e| match e.kind {
            StatusKind::Boost { multiplier } => Some(multiplier),
            _ => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_expire() {
        let mut set = StatusSet::new();
        set.add(StatusKind::Dash, 10.0, 0.3);
        assert!(set.is_dashing());

        set.sweep(10.2);
        assert!(set.is_dashing());

        set.sweep(10.31);
        assert!(!set.is_dashing());
    }

    #[test]
    fn refresh_replaces_instead_of_stacking() {
        let mut set = StatusSet::new();
        set.add(StatusKind::Invincible, 0.0, 1.0);
        set.add(StatusKind::Invincible, 0.5, 2.0);

        set.sweep(1.5);
        assert!(set.is_invincible(), "refreshed expiry should hold");
        assert_eq!(set.iter().count(), 1);
    }

    #[test]
    fn boost_carries_multiplier() {
        let mut set = StatusSet::new();
        assert_eq!(set.boost_multiplier(), None);

        set.add(StatusKind::Boost { multiplier: 1.5 }, 0.0, 3.0);
        assert_eq!(set.boost_multiplier(), Some(1.5));

        // Gold boost replaces the normal boost
        set.add(StatusKind::Boost { multiplier: 2.0 }, 1.0, 5.0);
        assert_eq!(set.boost_multiplier(), Some(2.0));
        assert_eq!(set.iter().count(), 1);
    }

    #[test]
    fn clear_removes_only_matching_kind() {
        let mut set = StatusSet::new();
        set.add(StatusKind::Spin, 0.0, 1.0);
        set.add(StatusKind::Invincible, 0.0, 1.0);

        set.clear(StatusKind::Spin);
        assert!(!set.is_spinning());
        assert!(set.is_invincible());
    }
}
