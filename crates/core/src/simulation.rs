//! Frame-driven simulation scaffolding shared by both game modes.
//!
//! Each mode owns a state struct and an orchestrator with a `tick` that
//! runs the fixed update order: physics, AI, collision/interaction,
//! status sweep, terminal checks. One tick runs to completion before the
//! next; there is no other mutation path into the state.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

pub mod capture;
pub mod race;

/// Upper bound on one tick's delta. A tab stall or debugger pause hands
/// us a huge delta; stepping that far in one go destabilizes the
/// integrators, so the excess time is dropped.
pub const MAX_DELTA: f32 = 0.1;

/// Frame counter plus accumulated simulation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct FrameClock {
    pub frame: u64,
    pub elapsed: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one frame, returning the clamped delta the tick should use.
    pub fn advance(&mut self, delta: f32) -> f32 {
        let dt = delta.clamp(0.0, MAX_DELTA);
        self.frame += 1;
        self.elapsed += dt;
        dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_clamps_large_deltas() {
        let mut clock = FrameClock::new();
        let dt = clock.advance(5.0);
        assert_eq!(dt, MAX_DELTA);
        assert_eq!(clock.elapsed, MAX_DELTA);
        assert_eq!(clock.frame, 1);
    }

    #[test]
    fn clock_rejects_negative_deltas() {
        let mut clock = FrameClock::new();
        let dt = clock.advance(-1.0);
        assert_eq!(dt, 0.0);
        assert_eq!(clock.frame, 1);
    }

    #[test]
    fn clock_accumulates() {
        let mut clock = FrameClock::new();
        for _ in 0..60 {
            clock.advance(1.0 / 60.0);
        }
        assert!((clock.elapsed - 1.0).abs() < 1e-4);
        assert_eq!(clock.frame, 60);
    }
}
