//! Taixiu round engine.
//!
//! This crate contains the round lifecycle state machine ([`RoundController`]), settlement,
//! the bounded history log, and fail-soft persistence of balance and history behind a
//! [`KeyValueStore`]. Rendering is reached only through [`PresentationPort`], so the whole
//! engine runs headless.
//!
//! ## Time
//! The controller never reads a monotonic clock or sleeps. A roll arms a repeating cosmetic
//! tick and a one-shot settlement on a [`RollScheduler`]; the driver calls
//! [`RoundController::advance`] with the current time in milliseconds and sleeps until
//! [`RoundController::next_deadline`].
//!
//! ## Minimal session (example)
//! ```rust
//! use taixiu_execution::{
//!     GameRng, MemoryStore, PersistenceGateway, RoundController, TableConfig,
//!     presentation::{Notice, PresentationPort, Settlement, Snapshot},
//! };
//! use taixiu_types::{Dice, RoundRecord, Side};
//!
//! struct Quiet;
//! impl PresentationPort for Quiet {
//!     fn on_state(&mut self, _: Snapshot) {}
//!     fn on_tick(&mut self, _: Dice) {}
//!     fn on_settled(&mut self, _: &Settlement) {}
//!     fn on_history(&mut self, _: &[RoundRecord]) {}
//!     fn on_notice(&mut self, _: Notice) {}
//! }
//!
//! let mut table = RoundController::new(
//!     TableConfig::default(),
//!     PersistenceGateway::new(MemoryStore::default()),
//!     Quiet,
//!     GameRng::from_seed(1),
//! );
//! table.select_side(Side::Big).unwrap();
//! table.roll(0).unwrap();
//! assert_eq!(table.state().balance, 9_900);
//! table.advance(2_000);
//! assert_eq!(table.history().len(), 1);
//! ```

pub mod config;
pub mod controller;
pub mod history;
pub mod persistence;
pub mod presentation;
pub mod rng;
pub mod scheduler;
pub mod store;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;


pub use config::{ConfigError, TableConfig};
pub use controller::{parse_bet_amount, RoundController};
pub use history::HistoryLog;
pub use persistence::{PersistenceGateway, Restored};
pub use presentation::{Notice, PresentationPort, Settlement, Severity, Snapshot};
pub use rng::{DiceRoller, GameRng};
pub use scheduler::{RollScheduler, Timer, TimerHandle};
pub use store::{FileStore, KeyValueStore, MemoryStore, SqliteStore};
