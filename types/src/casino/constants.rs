use std::ops::RangeInclusive;

/// Starting chips for a fresh (or reset) table
pub const INITIAL_BALANCE: u64 = 10_000;

/// Bet amount used at start, after reset, and when the entered amount is unusable
pub const DEFAULT_BET: u64 = 100;

/// Maximum number of rounds kept in the history log
pub const MAX_HISTORY: usize = 10;

/// Dice thrown per round
pub const DICE_COUNT: usize = 3;

/// Faces on each die
pub const DIE_FACES: u8 = 6;

/// Length of the rolling animation before the outcome is drawn
pub const ROLL_DURATION_MS: u64 = 2_000;

/// Interval between cosmetic faces while rolling
pub const ROLL_TICK_MS: u64 = 100;

/// How long a notice stays on screen
pub const NOTICE_DURATION_MS: u64 = 3_000;

/// Lowest and highest possible sum of three dice.
pub const MIN_SUM: u8 = 3;
pub const MAX_SUM: u8 = 18;

/// Sums paying out on a Tài (Big) bet.
pub const BIG_RANGE: RangeInclusive<u8> = 11..=18;

/// Sums paying out on a Xỉu (Small) bet.
pub const SMALL_RANGE: RangeInclusive<u8> = 3..=10;

/// Total return multiplier on a win (stake + equal profit).
pub const WIN_MULTIPLIER: u64 = 2;

/// Store key holding the balance as a decimal string.
pub const BALANCE_KEY: &str = "taixiu_balance";

/// Store key holding the JSON-encoded history.
pub const HISTORY_KEY: &str = "taixiu_history";

/// Quick-bet fixed amounts offered next to half/max.
pub const QUICK_BET_AMOUNTS: [u64; 4] = [100, 500, 1_000, 5_000];
