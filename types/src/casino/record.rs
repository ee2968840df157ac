use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

use super::{Dice, Outcome, Side, WIN_MULTIPLIER};

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum RecordInvariantError {
    #[error("recorded total does not match dice (total={total}, dice_sum={dice_sum})")]
    TotalMismatch { total: u8, dice_sum: u8 },
    #[error("recorded outcome does not match dice (side={side}, sum={sum}, outcome={outcome})")]
    OutcomeMismatch { side: Side, sum: u8, outcome: Outcome },
}

/// A settled round. Field names follow the stored JSON layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    pub id: u64,
    pub dice_values: Dice,
    #[serde(rename = "betType")]
    pub bet_side: Side,
    pub bet_amount: u64,
    #[serde(rename = "result")]
    pub outcome: Outcome,
    #[serde(rename = "totalSum")]
    pub sum_total: u8,
    pub timestamp: DateTime<Utc>,
}

impl RoundRecord {
    /// Build the record for a round settled with `dice`.
    pub fn settle(
        id: u64,
        dice: Dice,
        bet_side: Side,
        bet_amount: u64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let sum_total = dice.sum();
        let outcome = if bet_side.wins_on(sum_total) {
            Outcome::Win
        } else {
            Outcome::Lose
        };
        Self {
            id,
            dice_values: dice,
            bet_side,
            bet_amount,
            outcome,
            sum_total,
            timestamp,
        }
    }

    /// Chips returned to the balance at settlement (stake included).
    pub fn payout(&self) -> u64 {
        match self.outcome {
            Outcome::Win => self.bet_amount.saturating_mul(WIN_MULTIPLIER),
            Outcome::Lose => 0,
        }
    }

    pub fn validate_invariants(&self) -> Result<(), RecordInvariantError> {
        let dice_sum = self.dice_values.sum();
        if self.sum_total != dice_sum {
            return Err(RecordInvariantError::TotalMismatch {
                total: self.sum_total,
                dice_sum,
            });
        }
        let expected = if self.bet_side.wins_on(dice_sum) {
            Outcome::Win
        } else {
            Outcome::Lose
        };
        if self.outcome != expected {
            return Err(RecordInvariantError::OutcomeMismatch {
                side: self.bet_side,
                sum: dice_sum,
                outcome: self.outcome,
            });
        }
        Ok(())
    }
}
