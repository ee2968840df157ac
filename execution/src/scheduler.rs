//! Virtual-time timers for the rolling phase.
//!
//! A roll is driven by two scheduled tasks: a repeating cosmetic tick and a one-shot
//! settlement. Both are owned by [`RollScheduler`] and addressed through a [`TimerHandle`],
//! so the settlement (or a reset) can cancel the tick explicitly.
//!
//! The scheduler performs no I/O and reads no clock. Callers pass the current monotonic time
//! in milliseconds, which keeps behavior deterministic under test:
//!
//! ```rust
//! use taixiu_execution::scheduler::{RollScheduler, Timer};
//!
//! let mut scheduler = RollScheduler::default();
//! let tick = scheduler.schedule_every(0, 100, Timer::Tick);
//! let _settle = scheduler.schedule_once(0, 2_000, Timer::Settle);
//!
//! assert_eq!(scheduler.pop_due(100), Some((tick, Timer::Tick)));
//! assert!(scheduler.cancel(tick));
//! assert_eq!(scheduler.next_deadline(), Some(2_000));
//! ```

use std::collections::BTreeMap;

/// Work a timer stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timer {
    /// Show fresh cosmetic faces.
    Tick,
    /// Draw the deciding faces and settle the round.
    Settle,
}

/// Cancel handle for a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

#[derive(Clone, Debug)]
struct Entry {
    due_ms: u64,
    interval_ms: Option<u64>,
    timer: Timer,
}

#[derive(Clone, Debug, Default)]
pub struct RollScheduler {
    next_handle: u64,
    entries: BTreeMap<TimerHandle, Entry>,
}

impl RollScheduler {
    /// Fire `timer` once, `delay_ms` after `now_ms`.
    pub fn schedule_once(&mut self, now_ms: u64, delay_ms: u64, timer: Timer) -> TimerHandle {
        self.insert(now_ms.saturating_add(delay_ms), None, timer)
    }

    /// Fire `timer` every `interval_ms` starting one interval after `now_ms`.
    ///
    /// A zero interval is treated as 1ms so a repeating timer can never fire twice at
    /// the same instant.
    pub fn schedule_every(&mut self, now_ms: u64, interval_ms: u64, timer: Timer) -> TimerHandle {
        let interval_ms = interval_ms.max(1);
        self.insert(now_ms.saturating_add(interval_ms), Some(interval_ms), timer)
    }

    fn insert(&mut self, due_ms: u64, interval_ms: Option<u64>, timer: Timer) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.insert(
            handle,
            Entry {
                due_ms,
                interval_ms,
                timer,
            },
        );
        handle
    }

    /// Cancel a timer. Returns `false` if it already fired (one-shot) or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.entries.remove(&handle).is_some()
    }

    /// Drop every pending timer.
    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    pub fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Earliest deadline among pending timers.
    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.values().map(|e| e.due_ms).min()
    }

    /// Pop the earliest timer due at `now_ms`.
    ///
    /// Ties go to the timer scheduled first. One-shot timers are removed; repeating timers
    /// are re-armed one interval after their previous deadline.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TimerHandle, Timer)> {
        let (handle, _) = self
            .entries
            .iter()
            .filter(|(_, e)| e.due_ms <= now_ms)
            .min_by_key(|(handle, e)| (e.due_ms, **handle))?;
        let handle = *handle;
        let entry = self.entries.get_mut(&handle)?;
        let timer = entry.timer;
        match entry.interval_ms {
            Some(interval) => entry.due_ms = entry.due_ms.saturating_add(interval),
            None => {
                self.entries.remove(&handle);
            }
        }
        Some((handle, timer))
    }
}
