use std::collections::VecDeque;

use taixiu_types::casino::MAX_HISTORY;
use taixiu_types::RoundRecord;

/// Bounded, most-recent-first log of settled rounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryLog {
    records: VecDeque<RoundRecord>,
    limit: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::with_limit(MAX_HISTORY)
    }
}

impl HistoryLog {
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            records: VecDeque::with_capacity(limit + 1),
            limit,
        }
    }

    /// Rebuild from a stored most-recent-first sequence, keeping the newest `limit` entries.
    pub fn from_records(records: Vec<RoundRecord>, limit: usize) -> Self {
        let mut log = Self::with_limit(limit);
        log.records.extend(records.into_iter().take(log.limit));
        log
    }

    /// Insert at the head, evicting the oldest entries past the limit.
    pub fn push(&mut self, record: RoundRecord) {
        self.records.push_front(record);
        self.records.truncate(self.limit);
    }

    pub fn latest(&self) -> Option<&RoundRecord> {
        self.records.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoundRecord> {
        self.records.iter()
    }

    /// Most-recent-first copy of the log.
    pub fn to_vec(&self) -> Vec<RoundRecord> {
        self.records.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Largest id recorded so far.
    pub fn max_id(&self) -> Option<u64> {
        self.records.iter().map(|r| r.id).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use taixiu_types::{Dice, Side};

    fn record(id: u64) -> RoundRecord {
        let ts = Utc.timestamp_millis_opt(id as i64).unwrap();
        RoundRecord::settle(id, Dice::new([1, 2, 3]).unwrap(), Side::Small, 100, ts)
    }

    #[test]
    fn test_push_is_most_recent_first() {
        let mut log = HistoryLog::default();
        log.push(record(1));
        log.push(record(2));
        log.push(record(3));
        let ids: Vec<u64> = log.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(log.latest().map(|r| r.id), Some(3));
    }

    #[test]
    fn test_push_evicts_oldest() {
        let mut log = HistoryLog::default();
        for id in 1..=11 {
            log.push(record(id));
        }
        assert_eq!(log.len(), MAX_HISTORY);
        let ids: Vec<u64> = log.iter().map(|r| r.id).collect();
        assert_eq!(ids, (2..=11).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_from_records_truncates_tail() {
        let stored: Vec<RoundRecord> = (1..=15).rev().map(record).collect();
        let log = HistoryLog::from_records(stored, MAX_HISTORY);
        assert_eq!(log.len(), MAX_HISTORY);
        assert_eq!(log.latest().map(|r| r.id), Some(15));
        assert_eq!(log.iter().last().map(|r| r.id), Some(6));
        assert_eq!(log.max_id(), Some(15));
    }

    #[test]
    fn test_clear() {
        let mut log = HistoryLog::default();
        log.push(record(1));
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.to_vec(), Vec::new());
    }

    proptest! {
        #[test]
        fn prop_len_is_min_of_pushes_and_limit(pushes in 0usize..40) {
            let mut log = HistoryLog::default();
            for id in 0..pushes {
                log.push(record(id as u64));
            }
            prop_assert_eq!(log.len(), pushes.min(MAX_HISTORY));
            let ids: Vec<u64> = log.iter().map(|r| r.id).collect();
            let mut sorted = ids.clone();
            sorted.sort_unstable_by(|a, b| b.cmp(a));
            prop_assert_eq!(ids, sorted);
        }
    }
}
