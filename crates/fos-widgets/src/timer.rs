//! Timer APIs
//!
//! setTimeout / setInterval over a virtual millisecond clock. Time only moves
//! when the runtime is told to `advance`, which keeps transitions and
//! autohide delays deterministic.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::Runtime;

/// Handle returned by `set_timeout`/`set_interval`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u32);

pub(crate) enum TimerCallback {
    Once(Box<dyn FnOnce(&mut Runtime)>),
    Repeat(Rc<dyn Fn(&mut Runtime)>),
}

struct Timer {
    interval: Option<u64>,
    callback: TimerCallback,
}

/// Timer manager
#[derive(Default)]
pub struct Scheduler {
    now: u64,
    next_id: u32,
    /// Keyed by (deadline, id) so equal deadlines fire in creation order
    timers: BTreeMap<(u64, TimerId), Timer>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("now", &self.now)
            .field("pending", &self.timers.len())
            .finish()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds
    pub fn now(&self) -> u64 {
        self.now
    }

    fn next_id(&mut self) -> TimerId {
        self.next_id += 1;
        TimerId(self.next_id)
    }

    /// Add a timeout
    pub(crate) fn set_timeout(&mut self, delay_ms: u64, callback: Box<dyn FnOnce(&mut Runtime)>) -> TimerId {
        let id = self.next_id();
        self.timers.insert(
            (self.now + delay_ms, id),
            Timer {
                interval: None,
                callback: TimerCallback::Once(callback),
            },
        );
        id
    }

    /// Add an interval; a zero period is treated as 1 ms
    pub(crate) fn set_interval(&mut self, period_ms: u64, callback: Rc<dyn Fn(&mut Runtime)>) -> TimerId {
        let period = period_ms.max(1);
        let id = self.next_id();
        self.timers.insert(
            (self.now + period, id),
            Timer {
                interval: Some(period),
                callback: TimerCallback::Repeat(callback),
            },
        );
        id
    }

    /// Clear a timer; unknown ids are ignored
    pub fn clear(&mut self, id: TimerId) {
        let key = self.timers.keys().find(|(_, t)| *t == id).copied();
        if let Some(key) = key {
            self.timers.remove(&key);
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.keys().any(|(_, t)| *t == id)
    }

    /// Check if there are pending timers
    pub fn has_pending(&self) -> bool {
        !self.timers.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.timers.len()
    }

    /// Take the earliest timer due at or before `until`, moving the clock to
    /// its deadline. Intervals are re-armed before they are handed out.
    pub(crate) fn pop_due(&mut self, until: u64) -> Option<TimerCallback> {
        let (&(deadline, id), _) = self.timers.first_key_value()?;
        if deadline > until {
            return None;
        }
        let timer = self.timers.remove(&(deadline, id))?;
        self.now = self.now.max(deadline);
        match (timer.interval, timer.callback) {
            (Some(period), TimerCallback::Repeat(callback)) => {
                self.timers.insert(
                    (deadline + period, id),
                    Timer {
                        interval: Some(period),
                        callback: TimerCallback::Repeat(callback.clone()),
                    },
                );
                Some(TimerCallback::Repeat(callback))
            }
            (_, callback) => Some(callback),
        }
    }

    pub(crate) fn settle(&mut self, until: u64) {
        self.now = self.now.max(until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.set_timeout(20, Box::new(|_| {}));
        let first = scheduler.set_timeout(10, Box::new(|_| {}));
        let second = scheduler.set_timeout(10, Box::new(|_| {}));
        assert!(first < second);
        assert_eq!(scheduler.pending_count(), 3);

        assert!(scheduler.pop_due(15).is_some());
        assert_eq!(scheduler.now(), 10);
        assert!(!scheduler.is_pending(first));
        assert!(scheduler.is_pending(second));
        assert!(scheduler.pop_due(15).is_some());
        assert!(scheduler.pop_due(15).is_none());
    }

    #[test]
    fn test_clear() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.set_timeout(5, Box::new(|_| {}));
        scheduler.clear(id);
        assert!(!scheduler.has_pending());
        scheduler.clear(id);
    }

    #[test]
    fn test_interval_rearms() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.set_interval(0, Rc::new(|_| {}));
        assert!(matches!(scheduler.pop_due(1), Some(TimerCallback::Repeat(_))));
        assert!(scheduler.is_pending(id));
        assert!(scheduler.pop_due(1).is_none());
        assert!(scheduler.pop_due(2).is_some());
    }
}
