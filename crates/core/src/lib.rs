//! Monkeypark Core - Deterministic Game Simulation
//!
//! This crate contains the per-frame simulation logic for both game modes:
//! the monkey capture game (player movement/combat, monkey AI state machine,
//! boss, stage clear scoring) and the kart racing game (vehicle physics,
//! drift/boost/transform, item system, lap progress, ranking).
//!
//! Rendering, audio and input devices live in the host. The core consumes
//! an abstract input snapshot per tick and exposes state snapshots plus
//! discrete events the host drains.
//!
//! # Determinism Rules
//!
//! 1. No `rand::thread_rng()` - Use `SeededRandom` only
//! 2. No system time - All timing derives from clamped tick deltas
//! 3. Deterministic trig - `math` module, not hardware intrinsics
//! 4. Ordered iteration - `Vec` not `HashMap` for entities
//! 5. No async - Pure synchronous logic

pub mod entities;
pub mod events;
pub mod input;
pub mod level;
pub mod math;
pub mod physics;
pub mod random;
pub mod save;
pub mod simulation;
pub mod status;

pub use entities::EntityId;
pub use input::{CaptureInput, RaceInput};
pub use random::SeededRandom;
pub use save::SaveData;
pub use simulation::capture::{CaptureSim, CaptureState};
pub use simulation::race::{RaceSim, RaceState};
pub use simulation::FrameClock;
