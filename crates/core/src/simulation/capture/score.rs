//! Stage clear scoring.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Clear rank. Ordered best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum Rank {
    S,
    A,
    B,
    C,
}

impl Rank {
    /// Position in the S > A > B > C ordering, for best-of comparisons.
    fn order(&self) -> u8 {
        match self {
            Rank::S => 0,
            Rank::A => 1,
            Rank::B => 2,
            Rank::C => 3,
        }
    }

    /// The better of two ranks.
    pub fn best(self, other: Rank) -> Rank {
        if self.order() <= other.order() {
            self
        } else {
            other
        }
    }
}

/// Classify a clear by elapsed time and damage taken. Strict ordered
/// fallthrough: the first matching band wins, so a fast clear with heavy
/// damage falls through S and A to the time-only B check.
pub fn rank_for(time: f32, damage: i32) -> Rank {
    if time <= 180.0 && damage == 0 {
        Rank::S
    } else if time <= 300.0 && damage <= 30 {
        Rank::A
    } else if time <= 600.0 {
        Rank::B
    } else {
        Rank::C
    }
}

/// Result of clearing a stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct StageResult {
    pub stage: u32,
    pub time: f32,
    pub damage: i32,
    pub captured: u32,
    pub total: u32,
    pub rank: Rank,
}

impl StageResult {
    pub fn new(stage: u32, time: f32, damage: i32, captured: u32, total: u32) -> Self {
        Self {
            stage,
            time,
            damage,
            captured,
            total,
            rank: rank_for(time, damage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_bands() {
        assert_eq!(rank_for(150.0, 0), Rank::S);
        assert_eq!(rank_for(250.0, 20), Rank::A);
        // A's damage bound exceeded: falls to the time-only B check
        assert_eq!(rank_for(250.0, 40), Rank::B);
        assert_eq!(rank_for(700.0, 0), Rank::C);
    }

    #[test]
    fn rank_band_edges() {
        assert_eq!(rank_for(180.0, 0), Rank::S);
        assert_eq!(rank_for(180.01, 0), Rank::A);
        assert_eq!(rank_for(300.0, 30), Rank::A);
        assert_eq!(rank_for(300.0, 31), Rank::B);
        assert_eq!(rank_for(600.0, 999), Rank::B);
        assert_eq!(rank_for(600.01, 0), Rank::C);
    }

    #[test]
    fn fast_but_damaged_is_not_s() {
        assert_eq!(rank_for(10.0, 1), Rank::A);
    }

    #[test]
    fn best_of() {
        assert_eq!(Rank::S.best(Rank::B), Rank::S);
        assert_eq!(Rank::C.best(Rank::A), Rank::A);
        assert_eq!(Rank::B.best(Rank::B), Rank::B);
    }
}
