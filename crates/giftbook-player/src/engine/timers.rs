//! Timer scheduler — deferred work on a millisecond clock.
//!
//! Tasks are plain data (`T`), not closures: the owner schedules a task,
//! keeps the returned handle, and receives the task back from
//! `advance_to` once it is due. A cancelled handle never fires.

/// Identifies one scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct Pending<T> {
    due_ms: u64,
    handle: TimerHandle,
    task: T,
}

/// Single-threaded scheduler driven by the engine clock
#[derive(Debug)]
pub struct Scheduler<T> {
    now_ms: u64,
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 1,
            pending: Vec::new(),
        }
    }

    /// Current clock value (last value passed to `advance_to`)
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Schedule `task` to fire `delay_ms` after the current clock value
    pub fn schedule(&mut self, delay_ms: u64, task: T) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            due_ms: self.now_ms.saturating_add(delay_ms),
            handle,
            task,
        });
        handle
    }

    /// Cancel a pending task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        self.pending.len() != before
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Move the clock forward and hand back every task that became due,
    /// ordered by due time, then by scheduling order.
    /// The clock never runs backwards.
    pub fn advance_to(&mut self, now_ms: u64) -> Vec<(TimerHandle, T)> {
        self.now_ms = self.now_ms.max(now_ms);
        let now = self.now_ms;

        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due_ms <= now {
                due.push(self.pending.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|p| (p.due_ms, p.handle.0));
        due.into_iter().map(|p| (p.handle, p.task)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_when_due() {
        let mut timers = Scheduler::new();
        let handle = timers.schedule(600, "cooldown");
        assert!(timers.advance_to(599).is_empty());
        assert!(timers.is_pending(handle));

        let fired = timers.advance_to(600);
        assert_eq!(fired, vec![(handle, "cooldown")]);
        assert!(!timers.is_pending(handle));
        assert_eq!(timers.pending_len(), 0);
    }

    #[test]
    fn cancelled_task_never_fires() {
        let mut timers = Scheduler::new();
        let handle = timers.schedule(300, "flip");
        assert!(timers.cancel(handle));
        assert!(!timers.cancel(handle));
        assert!(timers.advance_to(10_000).is_empty());
    }

    #[test]
    fn delay_is_relative_to_clock() {
        let mut timers = Scheduler::new();
        timers.advance_to(1_000);
        timers.schedule(300, 'a');
        assert!(timers.advance_to(1_299).is_empty());
        assert_eq!(timers.advance_to(1_300).len(), 1);
    }

    #[test]
    fn due_order_then_schedule_order() {
        let mut timers = Scheduler::new();
        let late = timers.schedule(600, 'c');
        let first = timers.schedule(300, 'a');
        let second = timers.schedule(300, 'b');
        let fired = timers.advance_to(700);
        assert_eq!(fired, vec![(first, 'a'), (second, 'b'), (late, 'c')]);
    }

    #[test]
    fn clock_never_runs_backwards() {
        let mut timers: Scheduler<()> = Scheduler::new();
        timers.advance_to(500);
        timers.advance_to(100);
        assert_eq!(timers.now_ms(), 500);
    }
}
