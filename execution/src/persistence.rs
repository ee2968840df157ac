//! Fail-soft persistence of balance and history.
//!
//! Nothing here returns an error to the caller: unreadable or malformed entries are logged
//! and treated as absent, and failed writes are logged and dropped.

use anyhow::{anyhow, Context as _, Result};
use taixiu_types::casino::{BALANCE_KEY, HISTORY_KEY};
use taixiu_types::RoundRecord;
use tracing::{debug, error, warn};

use crate::store::KeyValueStore;

/// State recovered at startup. `None` means "use the default".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Restored {
    pub balance: Option<u64>,
    pub history: Option<Vec<RoundRecord>>,
}

pub struct PersistenceGateway<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> PersistenceGateway<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read both keys independently; a bad balance does not discard a good history.
    pub fn load(&self) -> Restored {
        let balance = match self.load_balance() {
            Ok(balance) => balance,
            Err(e) => {
                warn!(error = ?e, "Ignoring persisted balance");
                None
            }
        };
        let history = match self.load_history() {
            Ok(history) => history,
            Err(e) => {
                warn!(error = ?e, "Ignoring persisted history");
                None
            }
        };
        debug!(?balance, rounds = history.as_ref().map(Vec::len), "Loaded game state");
        Restored { balance, history }
    }

    fn load_balance(&self) -> Result<Option<u64>> {
        let Some(raw) = self.store.get(BALANCE_KEY).context("read balance")? else {
            return Ok(None);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        let balance = raw
            .parse::<u64>()
            .with_context(|| format!("balance is not a non-negative integer: {raw:?}"))?;
        Ok(Some(balance))
    }

    fn load_history(&self) -> Result<Option<Vec<RoundRecord>>> {
        let Some(raw) = self.store.get(HISTORY_KEY).context("read history")? else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let history: Vec<RoundRecord> =
            serde_json::from_str(&raw).context("decode history json")?;
        for record in history.iter() {
            record
                .validate_invariants()
                .map_err(|e| anyhow!("history record {} is corrupt: {e}", record.id))?;
        }
        Ok(Some(history))
    }

    /// Best-effort write of both keys.
    pub fn save(&mut self, balance: u64, history: &[RoundRecord]) {
        if let Err(e) = self.try_save(balance, history) {
            error!(error = ?e, balance, "Error saving game state");
        }
    }

    fn try_save(&mut self, balance: u64, history: &[RoundRecord]) -> Result<()> {
        self.store
            .set(BALANCE_KEY, &balance.to_string())
            .context("write balance")?;
        let encoded = serde_json::to_string(history).context("encode history")?;
        self.store
            .set(HISTORY_KEY, &encoded)
            .context("write history")?;
        Ok(())
    }

    /// Remove both keys. Safe to call when nothing is stored.
    pub fn clear(&mut self) {
        for key in [BALANCE_KEY, HISTORY_KEY] {
            if let Err(e) = self.store.remove(key) {
                error!(error = ?e, key, "Error clearing game state");
            }
        }
    }
}
