//! Cooperative timer queue driven by the UI frame loop.
//!
//! Time is a [`Duration`] since the owner started; nothing here reads a real
//! clock, so the panel can be stepped deterministically in tests.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
pub struct Scheduler<E> {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, TimerId), E>,
    deadlines: HashMap<TimerId, Duration>,
}
impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            queue: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }
}
impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Queue `event` to fire `delay` after the current time. While an event is
    /// being handled the current time is that event's deadline.
    pub fn schedule(&mut self, delay: Duration, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = self.now + delay;
        self.queue.insert((deadline, id), event);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Drop a pending event. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some(deadline) => self.queue.remove(&(deadline, id)).is_some(),
            None => false,
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Pop the earliest event due at or before `until`, moving the clock to its
    /// deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<E> {
        let (deadline, id) = *self.queue.keys().next()?;
        if deadline > until {
            return None;
        }
        self.deadlines.remove(&id);
        let event = self.queue.remove(&(deadline, id))?;
        self.now = self.now.max(deadline);
        Some(event)
    }

    /// Move the clock forward once every due event has been handled.
    pub fn advance_to(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }
}
