//! Outbound interface to whatever renders the table.

use std::fmt;

use taixiu_types::{Dice, GameState, Outcome, Phase, RoundRecord, Side};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Success => write!(f, "success"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Transient message for the player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Render-ready view of [`GameState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub balance: u64,
    pub bet_amount: u64,
    pub phase: Phase,
    pub selected_side: Option<Side>,
    pub can_roll: bool,
}

impl From<&GameState> for Snapshot {
    fn from(state: &GameState) -> Self {
        Self {
            balance: state.balance,
            bet_amount: state.bet_amount,
            phase: state.phase,
            selected_side: state.selected_side,
            can_roll: state.can_roll(),
        }
    }
}

/// Final faces and result of a round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub dice: Dice,
    pub sum: u8,
    /// Side the dice landed on (not the side bet).
    pub side: Side,
    pub outcome: Outcome,
    /// Chips credited back (stake included); zero on a loss.
    pub payout: u64,
    pub record: RoundRecord,
}

/// Receives state changes from the round controller.
pub trait PresentationPort {
    fn on_state(&mut self, snapshot: Snapshot);

    /// Cosmetic faces while rolling. They never decide the outcome.
    fn on_tick(&mut self, dice: Dice);

    fn on_settled(&mut self, settlement: &Settlement);

    fn on_history(&mut self, history: &[RoundRecord]);

    fn on_notice(&mut self, notice: Notice);
}

impl<P: PresentationPort + ?Sized> PresentationPort for Box<P> {
    fn on_state(&mut self, snapshot: Snapshot) {
        (**self).on_state(snapshot)
    }

    fn on_tick(&mut self, dice: Dice) {
        (**self).on_tick(dice)
    }

    fn on_settled(&mut self, settlement: &Settlement) {
        (**self).on_settled(settlement)
    }

    fn on_history(&mut self, history: &[RoundRecord]) {
        (**self).on_history(history)
    }

    fn on_notice(&mut self, notice: Notice) {
        (**self).on_notice(notice)
    }
}
