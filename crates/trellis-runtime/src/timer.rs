#![forbid(unsafe_code)]

//! Logical-clock timer queue.
//!
//! Timers are keyed by `(deadline, sequence)` so that two timers due at the
//! same instant fire in scheduling order. The queue never reads the wall
//! clock; [`Ui::tick`](crate::Ui::tick) pops due entries against the time the
//! host supplies.

use std::collections::BTreeMap;

use ahash::AHashMap;
use web_time::Instant;

/// Handle for cancelling a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Ordered set of pending timers carrying payload `T`.
#[derive(Debug)]
pub struct TimerQueue<T> {
    entries: BTreeMap<(Instant, u64), T>,
    deadlines: AHashMap<u64, Instant>,
    next_seq: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            deadlines: AHashMap::new(),
            next_seq: 0,
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline: Instant, payload: T) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert((deadline, seq), payload);
        self.deadlines.insert(seq, deadline);
        TimerId(seq)
    }

    /// Remove a timer before it fires. Returns `false` if it already fired
    /// or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id.0) {
            Some(deadline) => self.entries.remove(&(deadline, id.0)).is_some(),
            None => false,
        }
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id.0)
    }

    /// Earliest deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Pop the earliest timer due at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<(Instant, T)> {
        let key = *self.entries.keys().next()?;
        if key.0 > now {
            return None;
        }
        let payload = self.entries.remove(&key)?;
        self.deadlines.remove(&key.1);
        Some((key.0, payload))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
