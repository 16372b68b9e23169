//! Single-threaded logical timer queue.
//!
//! Time is a `Duration` offset from the queue's creation and only moves when
//! the owner calls [`TimerQueue::advance_to`]. Nothing here sleeps, so state
//! machines built on it can be driven tick by tick in tests.

use std::collections::BTreeMap;
use std::time::Duration;

/// Handle returned by [`TimerQueue::schedule`], used to cancel a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A timer that came due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    pub id: TimerId,
    pub deadline: Duration,
    pub payload: T,
}

/// One-shot timers ordered by deadline, ties broken by scheduling order.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    now: Duration,
    next_id: u64,
    pending: BTreeMap<(Duration, TimerId), T>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            pending: BTreeMap::new(),
        }
    }

    /// Current logical time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Arms a one-shot timer that fires `after` from now. Deadlines saturate
    /// at `Duration::MAX`.
    pub fn schedule(&mut self, after: Duration, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.insert((self.now.saturating_add(after), id), payload);
        id
    }

    /// Disarms a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let key = self.pending.keys().find(|(_, tid)| *tid == id).copied();
        key.and_then(|k| self.pending.remove(&k)).is_some()
    }

    /// Disarms every pending timer.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Deadline of the earliest pending timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Pops the earliest timer whose deadline is `<= until`, moving the clock
    /// to its deadline. Returns `None` (and moves the clock to `until`) once no
    /// timer is due.
    ///
    /// Popping one timer at a time lets the owner arm or cancel timers between
    /// firings; those changes are seen by the next call.
    pub fn advance_to(&mut self, until: Duration) -> Option<Fired<T>> {
        let due = self
            .pending
            .first_key_value()
            .is_some_and(|((deadline, _), _)| *deadline <= until);

        if !due {
            self.now = self.now.max(until);
            return None;
        }

        let ((deadline, id), payload) = self.pending.pop_first()?;
        self.now = self.now.max(deadline);
        Some(Fired {
            id,
            deadline,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn drain(queue: &mut TimerQueue<&'static str>, until: Duration) -> Vec<&'static str> {
        let mut out = Vec::new();
        while let Some(fired) = queue.advance_to(until) {
            out.push(fired.payload);
        }
        out
    }

    #[test]
    fn fires_in_deadline_then_schedule_order() {
        let mut q = TimerQueue::new();
        q.schedule(ms(200), "b");
        q.schedule(ms(100), "a");
        q.schedule(ms(200), "c");

        assert_eq!(drain(&mut q, ms(250)), vec!["a", "b", "c"]);
        assert_eq!(q.now(), ms(250));
        assert!(q.is_empty());
    }

    #[test]
    fn nothing_fires_before_deadline() {
        let mut q = TimerQueue::new();
        q.schedule(ms(1000), "tick");
        assert!(drain(&mut q, ms(999)).is_empty());
        assert_eq!(q.next_deadline(), Some(ms(1000)));
        assert_eq!(drain(&mut q, ms(1000)), vec!["tick"]);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut q = TimerQueue::new();
        let id = q.schedule(ms(10), "gone");
        q.schedule(ms(20), "kept");
        assert!(q.cancel(id));
        assert!(!q.cancel(id));
        assert_eq!(drain(&mut q, ms(30)), vec!["kept"]);
    }

    #[test]
    fn schedule_is_relative_to_logical_now() {
        let mut q = TimerQueue::new();
        q.schedule(ms(100), "first");
        let fired = q.advance_to(ms(500)).unwrap();
        assert_eq!(fired.deadline, ms(100));
        assert_eq!(q.now(), ms(100));

        q.schedule(ms(100), "second");
        assert_eq!(q.next_deadline(), Some(ms(200)));
        assert_eq!(drain(&mut q, ms(500)), vec!["second"]);
    }

    #[test]
    fn clear_disarms_everything() {
        let mut q = TimerQueue::new();
        q.schedule(ms(1), "a");
        q.schedule(ms(2), "b");
        q.clear();
        assert_eq!(q.len(), 0);
        assert!(drain(&mut q, ms(10)).is_empty());
    }

    #[test]
    fn deadlines_saturate_at_the_end_of_time() {
        let mut q = TimerQueue::new();
        assert!(q.advance_to(Duration::MAX).is_none());
        let id = q.schedule(ms(5), "late");
        assert_eq!(q.next_deadline(), Some(Duration::MAX));
        let fired = q.advance_to(Duration::MAX).unwrap();
        assert_eq!((fired.id, fired.payload), (id, "late"));
        assert_eq!(q.now(), Duration::MAX);
    }
}
