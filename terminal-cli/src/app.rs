use std::time::{Duration, Instant};

use chrono::Local;
use taixiu_execution::{Notice, Severity, Snapshot};
use taixiu_types::casino::{format_chips, NOTICE_DURATION_MS};
use taixiu_types::{Dice, GameState, Outcome, RoundRecord};

use crate::commands::{filter_commands, hint_for};
use crate::port::UiEvent;

const MAX_LOG_LINES: usize = 300;

#[derive(Clone, Debug)]
pub struct LastRound {
    pub dice: Dice,
    pub outcome: Outcome,
    pub payout: u64,
    pub bet_amount: u64,
}

#[derive(Clone, Debug)]
pub struct BoardState {
    pub snapshot: Snapshot,
    /// Faces on display; cosmetic while rolling.
    pub faces: Dice,
    pub last: Option<LastRound>,
    pub history: Vec<RoundRecord>,
}

impl Default for BoardState {
    fn default() -> Self {
        Self {
            snapshot: Snapshot::from(&GameState::default()),
            faces: Dice::default(),
            last: None,
            history: Vec::new(),
        }
    }
}

#[derive(Default)]
pub struct CompletionState {
    pub filtered: Vec<usize>,
    pub selected: usize,
}

pub struct AppState {
    pub input: String,
    pub logs: Vec<String>,
    pub status: String,
    pub hint: String,
    pub board: BoardState,
    pub completion: CompletionState,
    pub toast: Option<(Notice, Instant)>,
}

impl AppState {
    pub fn new(status: String) -> Self {
        let mut app = Self {
            input: String::new(),
            logs: vec!["Welcome to Tài Xỉu. Pick /tai or /xiu, then Enter to roll.".to_string()],
            status,
            hint: String::new(),
            board: BoardState::default(),
            completion: CompletionState::default(),
            toast: None,
        };
        app.update_hint();
        app
    }

    pub fn apply(&mut self, event: UiEvent, now: Instant) {
        match event {
            UiEvent::State(snapshot) => self.board.snapshot = snapshot,
            UiEvent::Tick(dice) => self.board.faces = dice,
            UiEvent::Settled(settlement) => {
                self.board.faces = settlement.dice;
                self.board.last = Some(LastRound {
                    dice: settlement.dice,
                    outcome: settlement.outcome,
                    payout: settlement.payout,
                    bet_amount: settlement.record.bet_amount,
                });
                self.push_log(format!(
                    "Rolled {} → {} | bet {} on {} | {}",
                    settlement.dice,
                    settlement.side.short_name(),
                    format_chips(settlement.record.bet_amount),
                    settlement.record.bet_side.short_name(),
                    settlement.outcome,
                ));
            }
            UiEvent::History(history) => self.board.history = history,
            UiEvent::Notice(notice) => {
                let prefix = match notice.severity {
                    Severity::Info => "",
                    Severity::Success => "✓ ",
                    Severity::Error => "⚠️ ",
                };
                self.push_log(format!("{prefix}{}", notice.message));
                self.toast = Some((notice, now));
            }
        }
    }

    /// Drop the toast once it has been up for the notice duration.
    pub fn expire_toast(&mut self, now: Instant) {
        let ttl = Duration::from_millis(NOTICE_DURATION_MS);
        if let Some((_, shown)) = &self.toast {
            if now.saturating_duration_since(*shown) >= ttl {
                self.toast = None;
            }
        }
    }

    pub fn push_log(&mut self, line: String) {
        let ts = Local::now().format("%H:%M:%S");
        self.logs.push(format!("{ts} {line}"));
        if self.logs.len() > MAX_LOG_LINES {
            let excess = self.logs.len() - MAX_LOG_LINES;
            self.logs.drain(0..excess);
        }
    }

    pub fn update_hint(&mut self) {
        let trimmed = self.input.trim().to_string();
        self.completion.filtered = filter_commands(&trimmed);
        self.completion.selected = 0;
        self.hint = hint_for(&trimmed);
    }

    /// Recent rounds as log lines, newest first.
    pub fn history_lines(&self) -> Vec<String> {
        if self.board.history.is_empty() {
            return vec!["No games played yet. Place your bets and roll the dice!".to_string()];
        }
        self.board
            .history
            .iter()
            .map(|r| {
                format!(
                    "{} {} sum {} | {} {} | {}",
                    r.timestamp.with_timezone(&Local).format("%H:%M:%S"),
                    r.dice_values,
                    r.sum_total,
                    r.bet_side.short_name(),
                    format_chips(r.bet_amount),
                    r.outcome,
                )
            })
            .collect()
    }
}
