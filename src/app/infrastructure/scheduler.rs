//! Keyed one-shot timers for trailing-edge debouncing.
//!
//! Each timer kind has at most one outstanding deadline. Arming a kind
//! replaces its previous deadline, which is the only form of cancellation the
//! engine needs. Nothing here sleeps: the owner asks which kinds are due at a
//! given instant, so tests can drive it with virtual time.

use std::time::Duration;

#[derive(Debug, Clone, Copy)]
struct Timer<K> {
    kind: K,
    due: Duration,
    seq: u64,
}

#[derive(Debug)]
pub struct Scheduler<K> {
    timers: Vec<Timer<K>>,
    next_seq: u64,
}

impl<K: Copy + PartialEq> Scheduler<K> {
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            next_seq: 0,
        }
    }

    /// Arm `kind` to fire `delay` after `now`, dropping any pending timer of
    /// the same kind.
    pub fn schedule(&mut self, kind: K, delay: Duration, now: Duration) {
        self.cancel(kind);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(Timer {
            kind,
            due: now + delay,
            seq,
        });
    }

    /// Returns true if a timer was pending for `kind`.
    pub fn cancel(&mut self, kind: K) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.kind != kind);
        self.timers.len() != before
    }

    pub fn is_pending(&self, kind: K) -> bool {
        self.timers.iter().any(|t| t.kind == kind)
    }

    /// Earliest outstanding deadline, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.iter().map(|t| t.due).min()
    }

    /// Remove and return every kind whose deadline is at or before `now`,
    /// ordered by deadline and then by arming order.
    pub fn take_due(&mut self, now: Duration) -> Vec<K> {
        let mut due: Vec<Timer<K>> = Vec::new();
        self.timers.retain(|t| {
            if t.due <= now {
                due.push(*t);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|t| (t.due, t.seq));
        due.into_iter().map(|t| t.kind).collect()
    }
}

impl<K: Copy + PartialEq> Default for Scheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Kind {
        A,
        B,
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_not_due_before_deadline() {
        let mut s = Scheduler::new();
        s.schedule(Kind::A, ms(250), ms(0));
        assert!(s.take_due(ms(249)).is_empty());
        assert_eq!(s.take_due(ms(250)), vec![Kind::A]);
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn test_rescheduling_replaces_pending_timer() {
        let mut s = Scheduler::new();
        s.schedule(Kind::A, ms(250), ms(0));
        s.schedule(Kind::A, ms(250), ms(200));
        assert!(s.take_due(ms(300)).is_empty());
        assert_eq!(s.next_deadline(), Some(ms(450)));
        assert_eq!(s.take_due(ms(450)), vec![Kind::A]);
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut s = Scheduler::new();
        s.schedule(Kind::A, ms(100), ms(0));
        s.schedule(Kind::B, ms(50), ms(0));
        s.schedule(Kind::B, ms(50), ms(40));
        assert_eq!(s.take_due(ms(100)), vec![Kind::B, Kind::A]);
    }

    #[test]
    fn test_ties_fire_in_arming_order() {
        let mut s = Scheduler::new();
        s.schedule(Kind::B, ms(10), ms(0));
        s.schedule(Kind::A, ms(10), ms(0));
        assert_eq!(s.take_due(ms(10)), vec![Kind::B, Kind::A]);
    }

    #[test]
    fn test_cancel() {
        let mut s = Scheduler::new();
        s.schedule(Kind::A, ms(10), ms(0));
        assert!(s.is_pending(Kind::A));
        assert!(s.cancel(Kind::A));
        assert!(!s.cancel(Kind::A));
        assert!(s.take_due(ms(100)).is_empty());
    }
}
