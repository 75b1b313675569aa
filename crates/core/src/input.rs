//! Abstract input snapshots consumed by the simulations.
//!
//! The host samples its devices once per frame and hands the core one of
//! these value types. Bits are packed into a u16; camera deltas are
//! quantized to i16 so snapshots hash and replay identically.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Input snapshot for the capture game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct CaptureInput {
    /// Raw bitfield of pressed inputs
    pub bits: u16,

    /// Camera yaw delta, quantized (radians * 1000).
    pub yaw_delta: i16,

    /// Camera pitch delta, quantized (radians * 1000).
    pub pitch_delta: i16,
}

impl CaptureInput {
    // Movement
    pub const FORWARD: u16 = 1 << 0;
    pub const BACKWARD: u16 = 1 << 1;
    pub const LEFT: u16 = 1 << 2;
    pub const RIGHT: u16 = 1 << 3;

    // Actions
    pub const JUMP: u16 = 1 << 4;
    pub const DASH: u16 = 1 << 5;
    pub const ATTACK: u16 = 1 << 6;

    pub const fn new() -> Self {
        Self {
            bits: 0,
            yaw_delta: 0,
            pitch_delta: 0,
        }
    }

    pub const fn from_bits(bits: u16) -> Self {
        Self {
            bits,
            yaw_delta: 0,
            pitch_delta: 0,
        }
    }

    /// Quantize a raw camera delta (radians) to i16.
    pub fn quantize_delta(raw: f32) -> i16 {
        (raw * 1000.0).clamp(-32768.0, 32767.0) as i16
    }

    /// Camera deltas back in radians.
    pub fn camera_delta(&self) -> (f32, f32) {
        (
            self.yaw_delta as f32 / 1000.0,
            self.pitch_delta as f32 / 1000.0,
        )
    }

    #[inline]
    pub const fn is_pressed(&self, input: u16) -> bool {
        self.bits & input != 0
    }

    #[inline]
    pub fn set(&mut self, input: u16, pressed: bool) {
        if pressed {
            self.bits |= input;
        } else {
            self.bits &= !input;
        }
    }

    #[inline]
    pub const fn forward(&self) -> bool {
        self.is_pressed(Self::FORWARD)
    }

    #[inline]
    pub const fn backward(&self) -> bool {
        self.is_pressed(Self::BACKWARD)
    }

    #[inline]
    pub const fn left(&self) -> bool {
        self.is_pressed(Self::LEFT)
    }

    #[inline]
    pub const fn right(&self) -> bool {
        self.is_pressed(Self::RIGHT)
    }

    #[inline]
    pub const fn jump(&self) -> bool {
        self.is_pressed(Self::JUMP)
    }

    #[inline]
    pub const fn dash(&self) -> bool {
        self.is_pressed(Self::DASH)
    }

    #[inline]
    pub const fn attack(&self) -> bool {
        self.is_pressed(Self::ATTACK)
    }

    /// Strafe axis as -1, 0, or 1.
    pub const fn strafe(&self) -> i8 {
        match (self.left(), self.right()) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }

    /// Advance axis as -1, 0, or 1.
    pub const fn advance(&self) -> i8 {
        match (self.forward(), self.backward()) {
            (true, false) => 1,
            (false, true) => -1,
            _ => 0,
        }
    }
}

/// Input snapshot for the racing game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct RaceInput {
    /// Raw bitfield of pressed inputs
    pub bits: u16,
}

impl RaceInput {
    pub const ACCELERATE: u16 = 1 << 0;
    pub const BRAKE: u16 = 1 << 1;
    pub const LEFT: u16 = 1 << 2;
    pub const RIGHT: u16 = 1 << 3;
    pub const DRIFT: u16 = 1 << 4;
    pub const USE_ITEM: u16 = 1 << 5;
    pub const TRANSFORM: u16 = 1 << 6;

    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    pub const fn from_bits(bits: u16) -> Self {
        Self { bits }
    }

    #[inline]
    pub const fn is_pressed(&self, input: u16) -> bool {
        self.bits & input != 0
    }

    #[inline]
    pub fn set(&mut self, input: u16, pressed: bool) {
        if pressed {
            self.bits |= input;
        } else {
            self.bits &= !input;
        }
    }

    #[inline]
    pub const fn accelerate(&self) -> bool {
        self.is_pressed(Self::ACCELERATE)
    }

    #[inline]
    pub const fn brake(&self) -> bool {
        self.is_pressed(Self::BRAKE)
    }

    #[inline]
    pub const fn left(&self) -> bool {
        self.is_pressed(Self::LEFT)
    }

    #[inline]
    pub const fn right(&self) -> bool {
        self.is_pressed(Self::RIGHT)
    }

    #[inline]
    pub const fn drift(&self) -> bool {
        self.is_pressed(Self::DRIFT)
    }

    #[inline]
    pub const fn use_item(&self) -> bool {
        self.is_pressed(Self::USE_ITEM)
    }

    #[inline]
    pub const fn transform(&self) -> bool {
        self.is_pressed(Self::TRANSFORM)
    }

    /// Turn axis as -1 (right), 0, or 1 (left), matching the yaw sign.
    pub const fn turn(&self) -> i8 {
        match (self.left(), self.right()) {
            (true, false) => 1,
            (false, true) => -1,
            _ => 0,
        }
    }
}
