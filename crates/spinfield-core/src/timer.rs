//! # Timers
//!
//! Deferred work goes through the [`Scheduler`] trait: `schedule` returns a
//! [`TimerId`] that can be cancelled until the task runs. Nothing here uses
//! threads; a host pumps [`TimerQueue`] from its event loop with
//! [`TimerQueue::tick`], and tests move virtual time with
//! [`TimerQueue::advance`]:
//!
//! ```rust
//! use spinfield_core::{Scheduler, TimerQueue};
//! use std::{cell::Cell, rc::Rc, time::Duration};
//!
//! let queue = TimerQueue::new();
//! let hits = Rc::new(Cell::new(0));
//! let h = hits.clone();
//! queue.schedule(Duration::from_millis(400), Box::new(move || h.set(h.get() + 1)));
//!
//! queue.advance(Duration::from_millis(399));
//! assert_eq!(hits.get(), 0);
//! queue.advance(Duration::from_millis(1));
//! assert_eq!(hits.get(), 1);
//! ```

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use slotmap::{SlotMap, new_key_type};
use web_time::Instant;

use crate::clock;

new_key_type! {
    pub struct TimerId;
}

pub type Task = Box<dyn FnOnce()>;

pub trait Scheduler {
    /// Runs `task` once, `delay` from now.
    fn schedule(&self, delay: Duration, task: Task) -> TimerId;
    /// Drops the task if it has not run yet. Returns whether it was pending.
    fn cancel(&self, id: TimerId) -> bool;
}

struct Entry {
    deadline: Duration,
    seq: u64,
    task: Task,
}

#[derive(Default)]
struct QueueInner {
    elapsed: Duration,
    seq: u64,
    timers: SlotMap<TimerId, Entry>,
}

/// Single-threaded timer queue on its own timeline.
///
/// Due tasks run in deadline order, ties in scheduling order. A task that
/// schedules another one during [`advance`](Self::advance) sees the clock at
/// its own deadline, so the follow-up runs in the same call if it falls
/// inside the advanced window.
#[derive(Clone)]
pub struct TimerQueue {
    inner: Rc<RefCell<QueueInner>>,
    origin: Instant,
}

impl Default for TimerQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerQueue {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(QueueInner::default())),
            origin: clock::now(),
        }
    }

    /// Time this queue has advanced through.
    pub fn elapsed(&self) -> Duration {
        self.inner.borrow().elapsed
    }

    pub fn pending(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.inner.borrow().timers.contains_key(id)
    }

    /// Moves virtual time forward, running every task that comes due.
    /// Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.elapsed() + by;
        self.run_until(target)
    }

    /// Catches up with `now`, as measured from the queue's creation.
    pub fn tick(&self, now: Instant) -> usize {
        let target = now.saturating_duration_since(self.origin);
        if target <= self.elapsed() {
            return 0;
        }
        self.run_until(target)
    }

    /// [`tick`](Self::tick) against the installed global clock.
    pub fn tick_now(&self) -> usize {
        self.tick(clock::now())
    }

    fn run_until(&self, target: Duration) -> usize {
        let mut ran = 0;
        loop {
            // Take the task out before running it: it may schedule or cancel.
            let task = {
                let mut inner = self.inner.borrow_mut();
                let due = inner
                    .timers
                    .iter()
                    .filter(|(_, e)| e.deadline <= target)
                    .min_by_key(|(_, e)| (e.deadline, e.seq))
                    .map(|(id, _)| id);
                match due.and_then(|id| inner.timers.remove(id)) {
                    Some(entry) => {
                        inner.elapsed = inner.elapsed.max(entry.deadline);
                        entry.task
                    }
                    None => break,
                }
            };
            task();
            ran += 1;
        }
        let mut inner = self.inner.borrow_mut();
        inner.elapsed = inner.elapsed.max(target);
        ran
    }
}

impl Scheduler for TimerQueue {
    fn schedule(&self, delay: Duration, task: Task) -> TimerId {
        let mut inner = self.inner.borrow_mut();
        let deadline = inner.elapsed + delay;
        let seq = inner.seq;
        inner.seq += 1;
        inner.timers.insert(Entry {
            deadline,
            seq,
            task,
        })
    }

    fn cancel(&self, id: TimerId) -> bool {
        self.inner.borrow_mut().timers.remove(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn runs_in_deadline_then_insertion_order() {
        let q = TimerQueue::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (name, at) in [("b", 20), ("a", 10), ("c", 20)] {
            let log = log.clone();
            q.schedule(ms(at), Box::new(move || log.borrow_mut().push(name)));
        }
        assert_eq!(q.advance(ms(25)), 3);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(q.elapsed(), ms(25));
    }

    #[test]
    fn cancelled_tasks_never_run() {
        let q = TimerQueue::new();
        let ran = Rc::new(RefCell::new(false));
        let r = ran.clone();
        let id = q.schedule(ms(5), Box::new(move || *r.borrow_mut() = true));
        assert!(q.is_pending(id));
        assert!(q.cancel(id));
        assert!(!q.cancel(id));
        q.advance(ms(10));
        assert!(!*ran.borrow());
        assert_eq!(q.pending(), 0);
    }

    #[test]
    fn rescheduling_from_a_task_uses_its_deadline() {
        let q = TimerQueue::new();
        let times = Rc::new(RefCell::new(Vec::new()));

        fn arm(q: &TimerQueue, times: &Rc<RefCell<Vec<Duration>>>) {
            let (q2, t2) = (q.clone(), times.clone());
            q.schedule(
                ms(30),
                Box::new(move || {
                    t2.borrow_mut().push(q2.elapsed());
                    arm(&q2, &t2);
                }),
            );
        }
        arm(&q, &times);

        q.advance(ms(100));
        assert_eq!(*times.borrow(), vec![ms(30), ms(60), ms(90)]);
        assert_eq!(q.pending(), 1);
    }

    #[test]
    fn tick_follows_wall_time() {
        let q = TimerQueue::new();
        let ran = Rc::new(RefCell::new(0));
        let r = ran.clone();
        q.schedule(ms(50), Box::new(move || *r.borrow_mut() += 1));
        assert_eq!(q.tick(q.origin + ms(10)), 0);
        assert_eq!(q.tick(q.origin + ms(50)), 1);
        // going backwards is a no-op
        assert_eq!(q.tick(q.origin), 0);
        assert_eq!(*ran.borrow(), 1);
    }
}
