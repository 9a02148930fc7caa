//! Typewriter style text reveal.
//!
//! Every target owns at most one reveal session. Starting a new reveal swaps
//! the session out and cancels the old one's pending tick, so a stale tick can
//! never touch the new text.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tracing::trace;

use crate::schedule::{Scheduler, TimerId};

/// Pause between the last character and the completion event.
pub const DONE_DELAY: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

/// Continuation of a running reveal, routed back through [`Revealer::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTick<T> {
    pub target: T,
    pub session: SessionId,
}

#[derive(Debug)]
struct RevealSession<E> {
    id: SessionId,
    text: Vec<char>,
    position: usize,
    shown: String,
    speed: Duration,
    cancel: Option<TimerId>,
    on_done: Option<E>,
}

#[derive(Debug)]
pub struct Revealer<T, E> {
    sessions: HashMap<T, RevealSession<E>>,
    next_session: u64,
}
impl<T, E> Default for Revealer<T, E> {
    fn default() -> Self {
        Self {
            sessions: HashMap::new(),
            next_session: 0,
        }
    }
}
impl<T, E> Revealer<T, E>
where
    T: Copy + Eq + Hash + std::fmt::Debug,
    E: From<RevealTick<T>>,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Start revealing `text` on `target`, one character every `speed`. The
    /// first character shows immediately. `on_done` is scheduled
    /// [`DONE_DELAY`] after the reveal completes, unless it gets superseded.
    pub fn reveal(
        &mut self,
        sched: &mut Scheduler<E>,
        target: T,
        text: &str,
        speed: Duration,
        on_done: Option<E>,
    ) -> SessionId {
        let id = SessionId(self.next_session);
        self.next_session += 1;
        let session = RevealSession {
            id,
            text: text.chars().collect(),
            position: 0,
            shown: String::with_capacity(text.len()),
            speed,
            cancel: None,
            on_done,
        };
        if let Some(old) = self.sessions.insert(target, session) {
            if let Some(timer) = old.cancel {
                trace!("Superseding reveal on {target:?}");
                sched.cancel(timer);
            }
        }
        self.step(sched, target);
        id
    }

    pub fn tick(&mut self, sched: &mut Scheduler<E>, tick: RevealTick<T>) {
        match self.sessions.get(&tick.target) {
            Some(session) if session.id == tick.session => self.step(sched, tick.target),
            _ => trace!("Dropping stale reveal tick for {:?}", tick.target),
        }
    }

    fn step(&mut self, sched: &mut Scheduler<E>, target: T) {
        let Some(session) = self.sessions.get_mut(&target) else {
            return;
        };
        session.cancel = None;
        match session.text.get(session.position) {
            Some(c) => {
                session.shown.push(*c);
                session.position += 1;
                let next = RevealTick {
                    target,
                    session: session.id,
                };
                session.cancel = Some(sched.schedule(session.speed, E::from(next)));
            }
            None => {
                if let Some(done) = session.on_done.take() {
                    sched.schedule(DONE_DELAY, done);
                }
            }
        }
    }

    /// Text revealed so far on `target`.
    pub fn text(&self, target: T) -> Option<&str> {
        self.sessions.get(&target).map(|s| s.shown.as_str())
    }

    pub fn is_typing(&self, target: T) -> bool {
        self.sessions
            .get(&target)
            .is_some_and(|s| s.cancel.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Tick(RevealTick<u8>),
        Done(&'static str),
    }
    impl From<RevealTick<u8>> for Event {
        fn from(tick: RevealTick<u8>) -> Self {
            Event::Tick(tick)
        }
    }

    const SPEED: Duration = Duration::from_millis(20);

    fn run(
        revealer: &mut Revealer<u8, Event>,
        sched: &mut Scheduler<Event>,
        until: Duration,
    ) -> Vec<(Duration, &'static str)> {
        let mut done = vec![];
        while let Some(event) = sched.pop_due(until) {
            match event {
                Event::Tick(tick) => revealer.tick(sched, tick),
                Event::Done(name) => done.push((sched.now(), name)),
            }
        }
        sched.advance_to(until);
        done
    }

    #[test]
    fn test_reveals_one_char_per_interval() {
        let mut sched: Scheduler<Event> = Scheduler::new();
        let mut revealer: Revealer<u8, Event> = Revealer::new();
        revealer.reveal(&mut sched, 0, "héllo", SPEED, Some(Event::Done("a")));
        assert_eq!(revealer.text(0), Some("h"));
        assert!(revealer.is_typing(0));

        assert!(run(&mut revealer, &mut sched, Duration::from_millis(20)).is_empty());
        assert_eq!(revealer.text(0), Some("hé"));

        assert!(run(&mut revealer, &mut sched, Duration::from_millis(80)).is_empty());
        assert_eq!(revealer.text(0), Some("héllo"));
        assert!(revealer.is_typing(0));

        // idle one interval after the last char, callback 50ms later
        let done = run(&mut revealer, &mut sched, Duration::from_secs(1));
        assert!(!revealer.is_typing(0));
        assert_eq!(done, vec![(Duration::from_millis(150), "a")]);
    }

    #[test]
    fn test_second_reveal_supersedes_first() {
        let mut sched: Scheduler<Event> = Scheduler::new();
        let mut revealer: Revealer<u8, Event> = Revealer::new();
        revealer.reveal(&mut sched, 0, "first message", SPEED, Some(Event::Done("first")));
        run(&mut revealer, &mut sched, Duration::from_millis(60));
        assert_eq!(revealer.text(0), Some("firs"));

        revealer.reveal(&mut sched, 0, "second", SPEED, Some(Event::Done("second")));
        assert_eq!(revealer.text(0), Some("s"));
        assert_eq!(sched.pending(), 1);

        let done = run(&mut revealer, &mut sched, Duration::from_secs(5));
        assert_eq!(revealer.text(0), Some("second"));
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].1, "second");
    }

    #[test]
    fn test_stale_tick_is_ignored() {
        let mut sched: Scheduler<Event> = Scheduler::new();
        let mut revealer: Revealer<u8, Event> = Revealer::new();
        let old = revealer.reveal(&mut sched, 0, "abc", SPEED, None);
        revealer.reveal(&mut sched, 0, "xyz", SPEED, None);
        revealer.tick(&mut sched, RevealTick { target: 0, session: old });
        assert_eq!(revealer.text(0), Some("x"));
    }

    #[test]
    fn test_targets_are_independent() {
        let mut sched: Scheduler<Event> = Scheduler::new();
        let mut revealer: Revealer<u8, Event> = Revealer::new();
        revealer.reveal(&mut sched, 0, "ab", SPEED, Some(Event::Done("zero")));
        revealer.reveal(&mut sched, 1, "cd", SPEED, Some(Event::Done("one")));
        let done = run(&mut revealer, &mut sched, Duration::from_secs(1));
        assert_eq!(revealer.text(0), Some("ab"));
        assert_eq!(revealer.text(1), Some("cd"));
        assert_eq!(done.len(), 2);
    }

    #[test]
    fn test_empty_text_completes() {
        let mut sched: Scheduler<Event> = Scheduler::new();
        let mut revealer: Revealer<u8, Event> = Revealer::new();
        revealer.reveal(&mut sched, 0, "", SPEED, Some(Event::Done("empty")));
        assert_eq!(revealer.text(0), Some(""));
        assert!(!revealer.is_typing(0));
        let done = run(&mut revealer, &mut sched, Duration::from_secs(1));
        assert_eq!(done, vec![(DONE_DELAY, "empty")]);
    }
}
