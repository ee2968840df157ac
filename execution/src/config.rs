use serde::{Deserialize, Serialize};
use taixiu_types::casino::{
    DEFAULT_BET, INITIAL_BALANCE, MAX_HISTORY, ROLL_DURATION_MS, ROLL_TICK_MS,
};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("tick interval ({tick_ms}ms) must be shorter than the roll ({roll_ms}ms)")]
    TickTooLong { tick_ms: u64, roll_ms: u64 },
    #[error("default bet ({bet}) exceeds the initial balance ({balance})")]
    BetAboveBalance { bet: u64, balance: u64 },
}

/// Table parameters. Durations are in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub initial_balance: u64,
    pub default_bet: u64,
    pub history_limit: usize,
    pub roll_duration_ms: u64,
    pub tick_interval_ms: u64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_balance: INITIAL_BALANCE,
            default_bet: DEFAULT_BET,
            history_limit: MAX_HISTORY,
            roll_duration_ms: ROLL_DURATION_MS,
            tick_interval_ms: ROLL_TICK_MS,
        }
    }
}

impl TableConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_balance == 0 {
            return Err(ConfigError::Zero("initial_balance"));
        }
        if self.default_bet == 0 {
            return Err(ConfigError::Zero("default_bet"));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::Zero("history_limit"));
        }
        if self.roll_duration_ms == 0 {
            return Err(ConfigError::Zero("roll_duration_ms"));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Zero("tick_interval_ms"));
        }
        if self.tick_interval_ms >= self.roll_duration_ms {
            return Err(ConfigError::TickTooLong {
                tick_ms: self.tick_interval_ms,
                roll_ms: self.roll_duration_ms,
            });
        }
        if self.default_bet > self.initial_balance {
            return Err(ConfigError::BetAboveBalance {
                bet: self.default_bet,
                balance: self.initial_balance,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = TableConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.initial_balance, 10_000);
        assert_eq!(config.default_bet, 100);
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.roll_duration_ms, 2_000);
        assert_eq!(config.tick_interval_ms, 100);
    }

    #[test]
    fn test_validation() {
        let valid = TableConfig::default();

        let zero_roll = TableConfig {
            roll_duration_ms: 0,
            ..valid
        };
        assert_eq!(zero_roll.validate(), Err(ConfigError::Zero("roll_duration_ms")));

        let zero_tick = TableConfig {
            tick_interval_ms: 0,
            ..valid
        };
        assert_eq!(zero_tick.validate(), Err(ConfigError::Zero("tick_interval_ms")));

        let slow_tick = TableConfig {
            tick_interval_ms: 2_000,
            ..valid
        };
        assert!(matches!(
            slow_tick.validate(),
            Err(ConfigError::TickTooLong { .. })
        ));

        let big_bet = TableConfig {
            default_bet: 20_000,
            ..valid
        };
        assert!(matches!(
            big_bet.validate(),
            Err(ConfigError::BetAboveBalance { .. })
        ));

        let no_history = TableConfig {
            history_limit: 0,
            ..valid
        };
        assert!(no_history.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TableConfig = serde_json::from_str(r#"{"roll_duration_ms": 500}"#).unwrap();
        assert_eq!(config.roll_duration_ms, 500);
        assert_eq!(config.tick_interval_ms, 100);
        assert!(config.validate().is_ok());
    }
}
