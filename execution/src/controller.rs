//! Round lifecycle: `Idle -> Rolling -> Settled -> Idle`.
//!
//! [`RoundController`] owns the only [`GameState`], validates every player intent, debits the
//! stake when a roll starts, and settles the round when the settlement timer fires. Timer
//! completions arrive through [`RoundController::advance`], which the driver calls with the
//! current monotonic time; the controller never sleeps or spawns.

use chrono::Utc;
use taixiu_types::casino::format_chips;
use taixiu_types::{GameState, Phase, QuickBet, Rejection, RoundRecord, Side};
use tracing::{debug, info, warn};

use crate::config::TableConfig;
use crate::history::HistoryLog;
use crate::persistence::PersistenceGateway;
use crate::presentation::{Notice, PresentationPort, Settlement, Snapshot};
use crate::rng::{DiceRoller, GameRng};
use crate::scheduler::{RollScheduler, Timer, TimerHandle};
use crate::store::KeyValueStore;

/// Timers and stake of the roll in flight.
#[derive(Clone, Copy, Debug)]
struct ActiveRoll {
    tick: TimerHandle,
    settle: TimerHandle,
    side: Side,
    bet: u64,
}

pub struct RoundController<S: KeyValueStore, P: PresentationPort, D: DiceRoller> {
    config: TableConfig,
    state: GameState,
    history: HistoryLog,
    gateway: PersistenceGateway<S>,
    port: P,
    dice: D,
    cosmetic: GameRng,
    scheduler: RollScheduler,
    roll: Option<ActiveRoll>,
    last_id: u64,
}

impl<S: KeyValueStore, P: PresentationPort, D: DiceRoller> RoundController<S, P, D> {
    /// Restore persisted balance/history (or defaults) and publish the initial state.
    pub fn new(config: TableConfig, gateway: PersistenceGateway<S>, port: P, dice: D) -> Self {
        let restored = gateway.load();
        let balance = restored.balance.unwrap_or(config.initial_balance);
        let history = HistoryLog::from_records(
            restored.history.unwrap_or_default(),
            config.history_limit,
        );
        let last_id = history.max_id().unwrap_or(0);
        info!(balance, rounds = history.len(), "Table ready");

        let mut controller = Self {
            config,
            state: GameState::new(balance, config.default_bet),
            history,
            gateway,
            port,
            dice,
            cosmetic: GameRng::from_entropy(),
            scheduler: RollScheduler::default(),
            roll: None,
            last_id,
        };
        controller.publish_state();
        controller.publish_history();
        controller
    }

    /// Replace the roller behind the cosmetic tick faces (entropy by default).
    pub fn with_cosmetic_rng(mut self, rng: GameRng) -> Self {
        self.cosmetic = rng;
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn gateway(&self) -> &PersistenceGateway<S> {
        &self.gateway
    }

    pub fn can_roll(&self) -> bool {
        self.state.can_roll()
    }

    /// Whether a quick-bet button is usable right now.
    pub fn quick_bet_enabled(&self, quick: QuickBet) -> bool {
        !self.state.is_rolling() && quick.resolve(self.state.balance) <= self.state.balance
    }

    /// Earliest pending timer deadline, if a roll is in flight.
    pub fn next_deadline(&self) -> Option<u64> {
        self.scheduler.next_deadline()
    }

    /// Set the stake from raw input.
    ///
    /// Only the leading number counts (see [`parse_bet_amount`]). Input without one, or a zero
    /// stake, falls back to the default bet.
    /// Amounts above the balance are clamped to it with an "Insufficient balance" notice.
    pub fn set_bet_amount(&mut self, raw: &str) -> Result<u64, Rejection> {
        if self.state.is_rolling() {
            return Err(self.reject(Rejection::RollInProgress));
        }
        let mut value = parse_bet_amount(raw).unwrap_or(self.config.default_bet);
        if value > self.state.balance {
            let clamped = Rejection::InsufficientBalance {
                bet: value,
                balance: self.state.balance,
            };
            self.port.on_notice(Notice::error(clamped.to_string()));
            value = self.state.balance;
        }
        self.state.bet_amount = value;
        debug!(bet = value, "Bet amount set");
        self.publish_state();
        Ok(value)
    }

    /// Apply a quick-bet button. Unlike typed input, an unaffordable amount is refused.
    pub fn set_quick_bet(&mut self, quick: QuickBet) -> Result<u64, Rejection> {
        if self.state.is_rolling() {
            return Err(self.reject(Rejection::RollInProgress));
        }
        let value = quick.resolve(self.state.balance);
        if value > self.state.balance {
            return Err(self.reject(Rejection::InsufficientBalance {
                bet: value,
                balance: self.state.balance,
            }));
        }
        self.state.bet_amount = value;
        debug!(bet = value, %quick, "Quick bet set");
        self.publish_state();
        Ok(value)
    }

    pub fn select_side(&mut self, side: Side) -> Result<(), Rejection> {
        if self.state.is_rolling() {
            return Err(self.reject(Rejection::RollInProgress));
        }
        if self.state.bet_amount == 0 {
            return Err(self.reject(Rejection::InvalidBetAmount));
        }
        if self.state.bet_amount > self.state.balance {
            return Err(self.reject(Rejection::InsufficientBalance {
                bet: self.state.bet_amount,
                balance: self.state.balance,
            }));
        }
        self.state.selected_side = Some(side);
        self.port.on_notice(Notice::info(format!(
            "You bet {} on {}",
            format_chips(self.state.bet_amount),
            side
        )));
        self.publish_state();
        Ok(())
    }

    /// Commit the stake and start rolling.
    ///
    /// The stake leaves the balance (and is persisted) now, not at settlement.
    pub fn roll(&mut self, now_ms: u64) -> Result<(), Rejection> {
        if self.state.is_rolling() {
            return Err(self.reject(Rejection::RollInProgress));
        }
        let Some(side) = self.state.selected_side else {
            return Err(self.reject(Rejection::NoSideSelected));
        };
        let bet = self.state.bet_amount;
        if bet == 0 {
            return Err(self.reject(Rejection::InvalidBetAmount));
        }
        let Some(balance) = self.state.balance.checked_sub(bet) else {
            return Err(self.reject(Rejection::InsufficientBalance {
                bet,
                balance: self.state.balance,
            }));
        };

        self.state.balance = balance;
        self.state.phase = Phase::Rolling;
        self.gateway.save(self.state.balance, &self.history.to_vec());

        let tick = self
            .scheduler
            .schedule_every(now_ms, self.config.tick_interval_ms, Timer::Tick);
        let settle = self
            .scheduler
            .schedule_once(now_ms, self.config.roll_duration_ms, Timer::Settle);
        self.roll = Some(ActiveRoll {
            tick,
            settle,
            side,
            bet,
        });
        info!(?side, bet, balance, "Roll started");
        self.publish_state();
        Ok(())
    }

    /// Fire every timer due at `now_ms`. Returns how many fired.
    pub fn advance(&mut self, now_ms: u64) -> usize {
        let mut fired = 0;
        while let Some((handle, timer)) = self.scheduler.pop_due(now_ms) {
            fired += 1;
            match timer {
                Timer::Tick => {
                    let faces = self.cosmetic.roll_dice();
                    debug!(%faces, "Tick");
                    self.port.on_tick(faces);
                }
                Timer::Settle => self.settle(handle),
            }
        }
        fired
    }

    fn settle(&mut self, handle: TimerHandle) {
        let Some(roll) = self.roll.take() else {
            warn!(?handle, "Settlement fired with no roll in flight");
            return;
        };
        if roll.settle != handle {
            warn!(?handle, expected = ?roll.settle, "Unexpected settlement timer");
        }
        self.scheduler.cancel(roll.tick);

        let dice = self.dice.roll_dice();
        let record = RoundRecord::settle(self.next_id(), dice, roll.side, roll.bet, Utc::now());
        let payout = record.payout();
        self.state.balance = self.state.balance.saturating_add(payout);
        let notice = if payout > 0 {
            Notice::success(format!(
                "Dice sum: {}. You won {} chips.",
                record.sum_total,
                format_chips(roll.bet)
            ))
        } else {
            Notice::error(format!(
                "Dice sum: {}. You lost {} chips.",
                record.sum_total,
                format_chips(roll.bet)
            ))
        };
        info!(
            dice = %dice,
            side = ?roll.side,
            outcome = %record.outcome,
            bet = roll.bet,
            balance = self.state.balance,
            "Round settled"
        );

        self.history.push(record.clone());
        self.gateway.save(self.state.balance, &self.history.to_vec());

        self.state.phase = Phase::Settled;
        let settlement = Settlement {
            dice,
            sum: record.sum_total,
            side: dice.side(),
            outcome: record.outcome,
            payout,
            record,
        };
        self.port.on_settled(&settlement);
        self.port.on_notice(notice);
        self.publish_history();
        self.publish_state();

        self.state.phase = Phase::Idle;
        self.state.selected_side = None;
        self.publish_state();
    }

    /// Back to a fresh table, from any phase. A roll in flight is abandoned with its stake.
    pub fn reset(&mut self) {
        self.scheduler.cancel_all();
        if let Some(roll) = self.roll.take() {
            warn!(bet = roll.bet, "Reset abandoned a roll in flight");
        }
        self.state = GameState::new(self.config.initial_balance, self.config.default_bet);
        self.history.clear();
        self.gateway.clear();
        info!(balance = self.state.balance, "Table reset");

        self.port.on_notice(Notice::info(
            "Your balance and game history have been reset",
        ));
        self.publish_history();
        self.publish_state();
    }

    /// Wall-clock millis, bumped past the previous id if the clock has not moved.
    fn next_id(&mut self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let id = now.max(self.last_id.saturating_add(1));
        self.last_id = id;
        id
    }

    fn reject(&mut self, rejection: Rejection) -> Rejection {
        debug!(%rejection, phase = self.state.phase.name(), "Rejected");
        self.port.on_notice(Notice::error(rejection.to_string()));
        rejection
    }

    fn publish_state(&mut self) {
        self.port.on_state(Snapshot::from(&self.state));
    }

    fn publish_history(&mut self) {
        let history = self.history.to_vec();
        self.port.on_history(&history);
    }
}

/// Parse typed stake input from its leading digits, so `"12.5"` is 12 and `"250abc"` is 250.
/// `,` and `_` inside the leading number are treated as thousands separators. Input without
/// leading digits, or whose number is zero, yields `None`. Oversized values saturate.
pub fn parse_bet_amount(raw: &str) -> Option<u64> {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, ',' | '_'))
        .filter(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return None;
    }
    let value = digits
        .parse::<u128>()
        .map(|v| v.min(u64::MAX as u128) as u64)
        .unwrap_or(u64::MAX);
    (value > 0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{RecordingPort, ScriptedDice};
    use crate::presentation::Severity;
    use crate::store::MemoryStore;
    use taixiu_types::Outcome;

    type Table = RoundController<MemoryStore, RecordingPort, ScriptedDice>;

    fn table(rolls: &[[u8; 3]]) -> Table {
        RoundController::new(
            TableConfig::default(),
            PersistenceGateway::new(MemoryStore::default()),
            RecordingPort::default(),
            ScriptedDice::new(rolls),
        )
    }

    #[test]
    fn test_parse_bet_amount() {
        assert_eq!(parse_bet_amount("250"), Some(250));
        assert_eq!(parse_bet_amount(" 1,000 "), Some(1_000));
        assert_eq!(parse_bet_amount("0"), None);
        assert_eq!(parse_bet_amount("-5"), None);
        assert_eq!(parse_bet_amount("abc"), None);
        assert_eq!(parse_bet_amount(""), None);
        assert_eq!(parse_bet_amount("12.5"), Some(12));
        assert_eq!(parse_bet_amount("250abc"), Some(250));
        assert_eq!(parse_bet_amount("1_000 chips"), Some(1_000));
        assert_eq!(parse_bet_amount(",5"), None);
        assert_eq!(parse_bet_amount("0.9"), None);
        assert_eq!(
            parse_bet_amount("99999999999999999999999999"),
            Some(u64::MAX)
        );
    }

    #[test]
    fn test_new_publishes_defaults() {
        let table = table(&[]);
        assert_eq!(table.state(), &GameState::default());
        let snapshot = table.port().last_snapshot().unwrap();
        assert_eq!(snapshot.balance, 10_000);
        assert_eq!(snapshot.bet_amount, 100);
        assert!(!snapshot.can_roll);
        assert_eq!(table.port().histories.len(), 1);
    }

    #[test]
    fn test_set_bet_amount_defaults_bad_input() {
        let mut table = table(&[]);
        assert_eq!(table.set_bet_amount("750"), Ok(750));
        assert_eq!(table.set_bet_amount("nope"), Ok(100));
        assert_eq!(table.set_bet_amount("-20"), Ok(100));
        assert_eq!(table.state().bet_amount, 100);
        assert!(table.port().notices.is_empty());
    }

    #[test]
    fn test_set_bet_amount_keeps_leading_number() {
        let mut table = table(&[]);
        table.set_bet_amount("500").unwrap();
        assert_eq!(table.set_bet_amount("12.5"), Ok(12));
        assert_eq!(table.set_bet_amount("250abc"), Ok(250));
        assert_eq!(table.state().bet_amount, 250);
    }

    #[test]
    fn test_set_bet_amount_clamps() {
        let mut table = table(&[]);
        assert_eq!(table.set_bet_amount("50000"), Ok(10_000));
        let notice = table.port().notices.last().unwrap();
        assert_eq!(notice.severity, Severity::Error);
        assert_eq!(notice.message, "Insufficient balance");
    }

    #[test]
    fn test_quick_bets() {
        let mut table = table(&[]);
        assert_eq!(table.set_quick_bet(QuickBet::Half), Ok(5_000));
        assert_eq!(table.set_quick_bet(QuickBet::Max), Ok(10_000));
        assert_eq!(table.set_quick_bet(QuickBet::Amount(500)), Ok(500));
        assert!(table.quick_bet_enabled(QuickBet::Amount(5_000)));
        assert!(!table.quick_bet_enabled(QuickBet::Amount(20_000)));
        assert!(matches!(
            table.set_quick_bet(QuickBet::Amount(20_000)),
            Err(Rejection::InsufficientBalance { .. })
        ));
        // Refused quick bets leave the stake untouched.
        assert_eq!(table.state().bet_amount, 500);
    }

    #[test]
    fn test_select_side_confirms() {
        let mut table = table(&[]);
        table.select_side(Side::Small).unwrap();
        assert_eq!(table.state().selected_side, Some(Side::Small));
        let notice = table.port().notices.last().unwrap();
        assert_eq!(notice.severity, Severity::Info);
        assert_eq!(notice.message, "You bet 100 on Xỉu (Small)");
        assert!(table.can_roll());
    }

    #[test]
    fn test_select_side_rejects_zero_bet() {
        let mut table = table(&[]);
        table.state.balance = 0;
        table.set_bet_amount("100").unwrap();
        assert_eq!(table.state().bet_amount, 0);
        assert_eq!(
            table.select_side(Side::Big),
            Err(Rejection::InvalidBetAmount)
        );
        assert_eq!(table.state().selected_side, None);
    }

    #[test]
    fn test_roll_debits_and_persists_immediately() {
        let mut table = table(&[[1, 1, 1]]);
        table.select_side(Side::Big).unwrap();
        table.roll(0).unwrap();
        assert_eq!(table.state().phase, Phase::Rolling);
        assert_eq!(table.state().balance, 9_900);
        assert_eq!(table.gateway().load().balance, Some(9_900));
        assert_eq!(table.next_deadline(), Some(100));
    }

    #[test]
    fn test_ticks_are_cosmetic() {
        let mut table = table(&[[6, 6, 6]]);
        table.select_side(Side::Big).unwrap();
        table.roll(0).unwrap();
        assert_eq!(table.advance(1_999), 19);
        assert_eq!(table.port().ticks.len(), 19);
        assert_eq!(table.state().phase, Phase::Rolling);
        assert!(table.history().is_empty());

        table.advance(2_000);
        assert_eq!(table.state().phase, Phase::Idle);
        assert_eq!(table.history().latest().unwrap().dice_values.values(), [6, 6, 6]);
        // Tick timer cancelled by settlement.
        assert_eq!(table.next_deadline(), None);
        let ticks = table.port().ticks.len();
        table.advance(10_000);
        assert_eq!(table.port().ticks.len(), ticks);
    }

    #[test]
    fn test_seeded_cosmetic_ticks_repeat() {
        let mut table = table(&[[1, 1, 1]]).with_cosmetic_rng(GameRng::from_seed(42));
        table.select_side(Side::Small).unwrap();
        table.roll(0).unwrap();
        table.advance(500);

        let mut expected = GameRng::from_seed(42);
        let faces: Vec<_> = (0..5).map(|_| expected.roll_dice()).collect();
        assert_eq!(table.port().ticks, faces);
        // Deciding dice are untouched by the cosmetic stream.
        table.advance(2_000);
        assert_eq!(table.history().latest().unwrap().dice_values.values(), [1, 1, 1]);
    }

    #[test]
    fn test_lose_keeps_stake() {
        let mut table = table(&[[1, 2, 3]]);
        table.select_side(Side::Big).unwrap();
        table.roll(0).unwrap();
        table.advance(2_000);
        assert_eq!(table.state().balance, 9_900);
        let record = table.history().latest().unwrap();
        assert_eq!(record.outcome, Outcome::Lose);
        assert_eq!(record.sum_total, 6);
        let notice = table.port().notices.last().unwrap();
        assert_eq!(notice.severity, Severity::Error);
        assert_eq!(notice.message, "Dice sum: 6. You lost 100 chips.");
    }

    #[test]
    fn test_settled_phase_is_published() {
        let mut table = table(&[[3, 4, 5]]);
        table.select_side(Side::Big).unwrap();
        table.roll(0).unwrap();
        table.advance(2_000);

        let phases: Vec<Phase> = table.port().snapshots.iter().map(|s| s.phase).collect();
        let tail = &phases[phases.len() - 3..];
        assert_eq!(tail, &[Phase::Rolling, Phase::Settled, Phase::Idle]);
        let settlement = table.port().settlements.last().unwrap();
        assert_eq!(settlement.sum, 12);
        assert_eq!(settlement.side, Side::Big);
        assert_eq!(settlement.payout, 200);
        assert_eq!(table.state().selected_side, None);
    }

    #[test]
    fn test_record_ids_are_unique() {
        let mut table = table(&[[1, 2, 3], [1, 2, 3], [1, 2, 3]]);
        for round in 0..3u64 {
            table.select_side(Side::Small).unwrap();
            table.roll(round * 5_000).unwrap();
            table.advance(round * 5_000 + 2_000);
        }
        let ids: Vec<u64> = table.history().iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 3);
        assert!(ids[0] > ids[1] && ids[1] > ids[2]);
    }

    #[test]
    fn test_reset_mid_roll_cancels_timers() {
        let mut table = table(&[[6, 6, 6]]);
        table.select_side(Side::Big).unwrap();
        table.roll(0).unwrap();
        table.advance(500);
        table.reset();
        assert_eq!(table.next_deadline(), None);
        assert_eq!(table.advance(5_000), 0);
        assert_eq!(table.state(), &GameState::default());
        assert!(table.history().is_empty());
        assert!(table.port().settlements.is_empty());
    }
}
