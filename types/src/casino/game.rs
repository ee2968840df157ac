use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

use super::{
    BIG_RANGE, DEFAULT_BET, DICE_COUNT, DIE_FACES, INITIAL_BALANCE, MAX_SUM, MIN_SUM, SMALL_RANGE,
};

/// Side of the table a bet is placed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Tài: sums 11-18.
    #[serde(rename = "tài")]
    Big,
    /// Xỉu: sums 3-10.
    #[serde(rename = "xỉu")]
    Small,
}

impl Side {
    /// Classify a three-dice sum. Every sum in 3..=18 maps to exactly one side.
    pub fn classify(sum: u8) -> Option<Side> {
        if BIG_RANGE.contains(&sum) {
            Some(Side::Big)
        } else if SMALL_RANGE.contains(&sum) {
            Some(Side::Small)
        } else {
            None
        }
    }

    /// Whether a sum pays out on this side.
    pub fn wins_on(&self, sum: u8) -> bool {
        match self {
            Side::Big => BIG_RANGE.contains(&sum),
            Side::Small => SMALL_RANGE.contains(&sum),
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Side::Big => "Tài",
            Side::Small => "Xỉu",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Big => write!(f, "Tài (Big)"),
            Side::Small => write!(f, "Xỉu (Small)"),
        }
    }
}

#[derive(Debug, ThisError, PartialEq, Eq)]
#[error("unknown side {0:?} (expected tai/big or xiu/small)")]
pub struct ParseSideError(pub String);

impl FromStr for Side {
    type Err = ParseSideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tai" | "tài" | "big" | "b" => Ok(Side::Big),
            "xiu" | "xỉu" | "small" | "s" => Ok(Side::Small),
            other => Err(ParseSideError(other.to_string())),
        }
    }
}

/// Round lifecycle: `Idle -> Rolling -> Settled -> Idle`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Idle,
    Rolling,
    Settled,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "Idle",
            Phase::Rolling => "Rolling",
            Phase::Settled => "Settled",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Lose,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win => write!(f, "Win"),
            Outcome::Lose => write!(f, "Lose"),
        }
    }
}

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum DiceError {
    #[error("die face out of range (got={got}, max={max})")]
    FaceOutOfRange { got: u8, max: u8 },
}

/// Three dice faces, each in 1..=6.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[u8; DICE_COUNT]", into = "[u8; DICE_COUNT]")]
pub struct Dice([u8; DICE_COUNT]);

impl Dice {
    pub fn new(values: [u8; DICE_COUNT]) -> Result<Self, DiceError> {
        for &face in values.iter() {
            if face == 0 || face > DIE_FACES {
                return Err(DiceError::FaceOutOfRange {
                    got: face,
                    max: DIE_FACES,
                });
            }
        }
        Ok(Self(values))
    }

    pub fn values(&self) -> [u8; DICE_COUNT] {
        self.0
    }

    /// Sum of the faces, always in 3..=18.
    pub fn sum(&self) -> u8 {
        self.0.iter().sum()
    }

    pub fn side(&self) -> Side {
        // Faces are validated, so the sum is always classifiable.
        Side::classify(self.sum()).unwrap_or(Side::Small)
    }
}

impl Default for Dice {
    fn default() -> Self {
        Self([1; DICE_COUNT])
    }
}

impl TryFrom<[u8; DICE_COUNT]> for Dice {
    type Error = DiceError;

    fn try_from(values: [u8; DICE_COUNT]) -> Result<Self, Self::Error> {
        Dice::new(values)
    }
}

impl From<Dice> for [u8; DICE_COUNT] {
    fn from(dice: Dice) -> Self {
        dice.0
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "{a}-{b}-{c} ({})", self.sum())
    }
}

// Compile-time guard on the partition of possible sums.
const _: () = assert!(MIN_SUM == DICE_COUNT as u8 && MAX_SUM == DICE_COUNT as u8 * DIE_FACES);

/// Mutable table state owned by the round controller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub balance: u64,
    pub bet_amount: u64,
    pub selected_side: Option<Side>,
    pub phase: Phase,
}

impl GameState {
    pub fn new(balance: u64, bet_amount: u64) -> Self {
        Self {
            balance,
            bet_amount,
            selected_side: None,
            phase: Phase::Idle,
        }
    }

    pub fn is_rolling(&self) -> bool {
        self.phase == Phase::Rolling
    }

    /// A roll can start: side chosen, stake affordable, nothing in flight.
    pub fn can_roll(&self) -> bool {
        self.selected_side.is_some() && self.balance >= self.bet_amount && !self.is_rolling()
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(INITIAL_BALANCE, DEFAULT_BET)
    }
}

/// Quick-bet buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QuickBet {
    Amount(u64),
    Half,
    Max,
}

impl QuickBet {
    /// Amount this button would stake against `balance`.
    pub fn resolve(&self, balance: u64) -> u64 {
        match self {
            QuickBet::Amount(amount) => *amount,
            QuickBet::Half => balance / 2,
            QuickBet::Max => balance,
        }
    }
}

impl fmt::Display for QuickBet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuickBet::Amount(amount) => write!(f, "{amount}"),
            QuickBet::Half => write!(f, "half"),
            QuickBet::Max => write!(f, "max"),
        }
    }
}

#[derive(Debug, ThisError, PartialEq, Eq)]
#[error("invalid quick bet {0:?} (expected an amount, half or max)")]
pub struct ParseQuickBetError(pub String);

impl FromStr for QuickBet {
    type Err = ParseQuickBetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "half" | "1/2" => Ok(QuickBet::Half),
            "max" | "all" => Ok(QuickBet::Max),
            other => other
                .parse::<u64>()
                .map(QuickBet::Amount)
                .map_err(|_| ParseQuickBetError(other.to_string())),
        }
    }
}

/// Reasons a player intent is refused. Always recoverable.
#[derive(Clone, Debug, ThisError, PartialEq, Eq)]
pub enum Rejection {
    #[error("A roll is already in progress")]
    RollInProgress,
    #[error("Please enter a valid bet amount")]
    InvalidBetAmount,
    #[error("Insufficient balance")]
    InsufficientBalance { bet: u64, balance: u64 },
    #[error("Choose Tài or Xỉu before rolling")]
    NoSideSelected,
}
