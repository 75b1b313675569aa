//! Save-data model and its binary codec.
//!
//! The host decides where the bytes live (a file, browser storage); this
//! module owns the layout, the version gate, and the best-of merging
//! rules for stage and race results.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::level::StageConfig;
use crate::simulation::capture::score::{Rank, StageResult};
use crate::simulation::race::RaceOutcome;
use crate::simulation::race::machine::MachineKind;

/// Bumped whenever the layout changes; old blobs are rejected rather
/// than misread.
pub const SAVE_VERSION: u32 = 1;

/// Errors from loading or storing a save blob.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("unsupported save version {found} (expected {SAVE_VERSION})")]
    Version { found: u32 },
}

/// Per-stage progress in the capture game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct StageRecord {
    pub unlocked: bool,
    pub cleared: bool,
    pub best_time: Option<f32>,
    pub best_rank: Option<Rank>,
}

/// Everything the game persists between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct SaveData {
    version: u32,
    pub stages: Vec<StageRecord>,
    pub coins: u32,
    pub unlocked_machines: Vec<MachineKind>,
    /// Best race time per course name.
    pub course_records: Vec<(String, f32)>,
}

impl Default for SaveData {
    /// A fresh save: stage 1 open, the starter machine owned.
    fn default() -> Self {
        let mut stages = vec![StageRecord::default(); StageConfig::STAGE_COUNT as usize];
        stages[0].unlocked = true;
        Self {
            version: SAVE_VERSION,
            stages,
            coins: 0,
            unlocked_machines: vec![MachineKind::HeroMonkey],
            course_records: Vec::new(),
        }
    }
}

impl SaveData {
    /// Fold a stage clear in: mark it cleared, keep the better time and
    /// rank, and open the next stage.
    pub fn record_stage_result(&mut self, result: &StageResult) {
        let index = result.stage.saturating_sub(1) as usize;
        let Some(record) = self.stages.get_mut(index) else {
            return;
        };
        record.cleared = true;
        record.best_time = Some(match record.best_time {
            Some(best) => best.min(result.time),
            None => result.time,
        });
        record.best_rank = Some(match record.best_rank {
            Some(best) => best.best(result.rank),
            None => result.rank,
        });
        if let Some(next) = self.stages.get_mut(index + 1) {
            next.unlocked = true;
        }
        log::debug!("stage {} recorded, rank {:?}", result.stage, result.rank);
    }

    /// Fold a finished race in: bank the coins and keep the better
    /// course time.
    pub fn record_race_outcome(&mut self, course: &str, outcome: &RaceOutcome) {
        self.award_coins(outcome.coins);
        match self
            .course_records
            .iter_mut()
            .find(|(name, _)| name == course)
        {
            Some((_, best)) => *best = best.min(outcome.total_time),
            None => self
                .course_records
                .push((course.to_string(), outcome.total_time)),
        }
    }

    pub fn award_coins(&mut self, amount: u32) {
        self.coins = self.coins.saturating_add(amount);
    }

    /// Spend coins to own a machine. Returns false when the price is
    /// not covered; owning it already costs nothing.
    pub fn unlock_machine(&mut self, kind: MachineKind, price: u32) -> bool {
        if self.unlocked_machines.contains(&kind) {
            return true;
        }
        if self.coins < price {
            return false;
        }
        self.coins -= price;
        self.unlocked_machines.push(kind);
        true
    }

    pub fn is_stage_unlocked(&self, stage: u32) -> bool {
        self.stages
            .get(stage.saturating_sub(1) as usize)
            .is_some_and(|r| r.unlocked)
    }
}

/// Encode a save to bytes.
pub fn encode(save: &SaveData) -> Result<Vec<u8>, SaveError> {
    Ok(bincode::serde::encode_to_vec(
        save,
        bincode::config::standard(),
    )?)
}

/// Decode a save from bytes, rejecting unknown versions.
pub fn decode(data: &[u8]) -> Result<SaveData, SaveError> {
    let (save, _): (SaveData, _) =
        bincode::serde::decode_from_slice(data, bincode::config::standard())?;
    if save.version != SAVE_VERSION {
        return Err(SaveError::Version {
            found: save.version,
        });
    }
    Ok(save)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_save_opens_only_stage_one() {
        let save = SaveData::default();
        assert!(save.is_stage_unlocked(1));
        for stage in 2..=StageConfig::STAGE_COUNT {
            assert!(!save.is_stage_unlocked(stage));
        }
        assert_eq!(save.coins, 0);
        assert_eq!(save.unlocked_machines, vec![MachineKind::HeroMonkey]);
    }

    #[test]
    fn stage_results_merge_best_of() {
        let mut save = SaveData::default();
        save.record_stage_result(&StageResult::new(1, 400.0, 50, 5, 5));
        assert_eq!(save.stages[0].best_rank, Some(Rank::B));
        assert!(save.is_stage_unlocked(2), "clearing opens the next stage");

        // A faster, cleaner clear improves both records
        save.record_stage_result(&StageResult::new(1, 120.0, 0, 5, 5));
        assert_eq!(save.stages[0].best_time, Some(120.0));
        assert_eq!(save.stages[0].best_rank, Some(Rank::S));

        // A worse later run changes nothing
        save.record_stage_result(&StageResult::new(1, 700.0, 90, 5, 5));
        assert_eq!(save.stages[0].best_time, Some(120.0));
        assert_eq!(save.stages[0].best_rank, Some(Rank::S));
    }

    #[test]
    fn final_stage_clear_does_not_panic() {
        let mut save = SaveData::default();
        save.record_stage_result(&StageResult::new(StageConfig::STAGE_COUNT, 200.0, 10, 25, 25));
        assert!(save.stages[StageConfig::STAGE_COUNT as usize - 1].cleared);
    }

    #[test]
    fn race_outcomes_bank_coins_and_keep_best_time() {
        let mut save = SaveData::default();
        let first = RaceOutcome {
            position: 2,
            coins: 300,
            total_time: 130.0,
            lap_times: vec![44.0, 43.0, 43.0],
        };
        save.record_race_outcome("Monkey Park Circuit", &first);
        assert_eq!(save.coins, 300);
        assert_eq!(save.course_records, vec![("Monkey Park Circuit".to_string(), 130.0)]);

        let slower = RaceOutcome {
            position: 1,
            coins: 500,
            total_time: 140.0,
            lap_times: vec![47.0, 47.0, 46.0],
        };
        save.record_race_outcome("Monkey Park Circuit", &slower);
        assert_eq!(save.coins, 800, "coins always accumulate");
        assert_eq!(save.course_records[0].1, 130.0, "best time stands");
    }

    #[test]
    fn machine_unlocks_charge_once() {
        let mut save = SaveData::default();
        save.award_coins(1000);
        assert!(!save.unlock_machine(MachineKind::NinjaMonkey, 1500));
        assert!(save.unlock_machine(MachineKind::SpeedStar, 800));
        assert_eq!(save.coins, 200);
        assert!(save.unlock_machine(MachineKind::SpeedStar, 800), "owned is free");
        assert_eq!(save.coins, 200);
    }

    #[test]
    fn roundtrip() {
        let mut save = SaveData::default();
        save.record_stage_result(&StageResult::new(1, 150.0, 0, 5, 5));
        save.award_coins(700);
        save.unlock_machine(MachineKind::TankMonkey, 600);

        let bytes = encode(&save).unwrap();
        let loaded = decode(&bytes).unwrap();
        assert_eq!(loaded, save);
    }

    #[test]
    fn garbage_blob_is_an_error() {
        assert!(decode(&[0xff, 0x07, 0x13]).is_err());
    }

    #[test]
    fn future_version_is_rejected() {
        let mut save = SaveData::default();
        save.version = SAVE_VERSION + 1;
        let bytes = encode(&save).unwrap();
        assert!(matches!(
            decode(&bytes),
            Err(SaveError::Version { found }) if found == SAVE_VERSION + 1
        ));
    }
}
