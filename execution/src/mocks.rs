use crate::presentation::{Notice, PresentationPort, Settlement, Snapshot};
use crate::rng::{DiceRoller, GameRng};
use crate::store::KeyValueStore;
use anyhow::{anyhow, Result};
use std::collections::VecDeque;
use taixiu_types::{Dice, RoundRecord};

/// Deciding dice that follow a script, then fall back to a seeded RNG.
#[derive(Clone, Debug)]
pub struct ScriptedDice {
    rolls: VecDeque<Dice>,
    fallback: GameRng,
}

impl ScriptedDice {
    /// Panics on out-of-range faces; scripts are test fixtures.
    pub fn new(rolls: &[[u8; 3]]) -> Self {
        Self {
            rolls: rolls
                .iter()
                .map(|faces| Dice::new(*faces).expect("scripted dice in range"))
                .collect(),
            fallback: GameRng::from_seed(0),
        }
    }

    pub fn push(&mut self, faces: [u8; 3]) {
        self.rolls
            .push_back(Dice::new(faces).expect("scripted dice in range"));
    }
}

impl DiceRoller for ScriptedDice {
    fn roll_die(&mut self) -> u8 {
        self.fallback.roll_die()
    }

    fn roll_dice(&mut self) -> Dice {
        match self.rolls.pop_front() {
            Some(dice) => dice,
            None => self.fallback.roll_dice(),
        }
    }
}

/// Port that records everything it is told.
#[derive(Clone, Debug, Default)]
pub struct RecordingPort {
    pub snapshots: Vec<Snapshot>,
    pub ticks: Vec<Dice>,
    pub settlements: Vec<Settlement>,
    pub histories: Vec<Vec<RoundRecord>>,
    pub notices: Vec<Notice>,
}

impl RecordingPort {
    pub fn last_snapshot(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl PresentationPort for RecordingPort {
    fn on_state(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    fn on_tick(&mut self, dice: Dice) {
        self.ticks.push(dice);
    }

    fn on_settled(&mut self, settlement: &Settlement) {
        self.settlements.push(settlement.clone());
    }

    fn on_history(&mut self, history: &[RoundRecord]) {
        self.histories.push(history.to_vec());
    }

    fn on_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

/// Store whose every operation fails (unreadable/quota-exceeded medium).
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Err(anyhow!("store unavailable reading {key}"))
    }

    fn set(&mut self, key: &str, _value: &str) -> Result<()> {
        Err(anyhow!("quota exceeded writing {key}"))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        Err(anyhow!("store unavailable removing {key}"))
    }
}
