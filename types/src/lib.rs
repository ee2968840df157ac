pub mod casino;

pub use casino::{
    Dice, DiceError, GameState, Outcome, Phase, QuickBet, Rejection, RoundRecord, Side,
};
