//! Press-and-hold auto-repeat.
//!
//! Each direction of a spin control owns one [`RepeatStepper`]:
//!
//! ```text
//!  Idle --press_start--> Pending --fire--> Repeating --fire--> Repeating ...
//!    ^                      |                  |
//!    +------press_end-------+------------------+
//! ```
//!
//! `press_start` steps once right away and arms the initial delay; every fire
//! steps once and re-arms the direction's interval. At most one timer per
//! stepper is ever pending, and every arm goes through `rearm`, which cancels
//! the previous timer first.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use spinfield_core::{Scheduler, TimerId};

use crate::Callback;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepDirection {
    Increment,
    Decrement,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepeatState {
    Idle,
    /// Stepped once, waiting out the initial delay.
    Pending,
    /// Stepping every interval.
    Repeating,
}

/// Timing for press-and-hold repeat.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RepeatConfig {
    /// Delay between the immediate first step and the first repeat.
    pub initial_delay: Duration,
    pub increment_interval: Duration,
    pub decrement_interval: Duration,
}

impl Default for RepeatConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(400),
            increment_interval: Duration::from_millis(60),
            decrement_interval: Duration::from_millis(100),
        }
    }
}

impl RepeatConfig {
    pub fn interval(&self, direction: StepDirection) -> Duration {
        match direction {
            StepDirection::Increment => self.increment_interval,
            StepDirection::Decrement => self.decrement_interval,
        }
    }
}

struct Slot {
    state: RepeatState,
    timer: Option<TimerId>,
}

struct StepperInner {
    direction: StepDirection,
    interval: Duration,
    scheduler: Rc<dyn Scheduler>,
    step: RefCell<Option<Callback>>,
    slot: RefCell<Slot>,
}

impl StepperInner {
    fn state(&self) -> RepeatState {
        self.slot.borrow().state
    }

    fn run_step(&self) {
        let step = self.step.borrow().clone();
        if let Some(step) = step {
            step();
        }
    }

    fn cancel(&self) -> bool {
        let timer = {
            let mut slot = self.slot.borrow_mut();
            slot.state = RepeatState::Idle;
            slot.timer.take()
        };
        match timer {
            Some(id) => self.scheduler.cancel(id),
            None => false,
        }
    }

    /// The only place a timer is armed.
    fn rearm(self: &Rc<Self>, delay: Duration, next: RepeatState) {
        self.cancel();
        let weak = Rc::downgrade(self);
        let id = self.scheduler.schedule(
            delay,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.fire();
                }
            }),
        );
        let mut slot = self.slot.borrow_mut();
        slot.timer = Some(id);
        slot.state = next;
    }

    fn fire(self: &Rc<Self>) {
        // The scheduler already dropped this timer.
        self.slot.borrow_mut().timer = None;
        log::trace!("{:?} repeat fired", self.direction);
        self.run_step();
        if self.should_rearm() {
            self.rearm(self.interval, RepeatState::Repeating);
        }
    }

    /// False when the step itself ended the press or re-pressed.
    fn should_rearm(&self) -> bool {
        let slot = self.slot.borrow();
        slot.state != RepeatState::Idle && slot.timer.is_none()
    }

    fn press_start(self: &Rc<Self>, initial_delay: Duration) {
        if self.step.borrow().is_none() {
            log::debug!("{:?} press ignored: no step callback", self.direction);
            return;
        }
        self.cancel();
        self.slot.borrow_mut().state = RepeatState::Pending;
        self.run_step();
        if self.should_rearm() {
            self.rearm(initial_delay, RepeatState::Pending);
        }
    }
}

pub struct RepeatStepper {
    inner: Rc<StepperInner>,
}

impl RepeatStepper {
    pub fn new(direction: StepDirection, interval: Duration, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            inner: Rc::new(StepperInner {
                direction,
                interval,
                scheduler,
                step: RefCell::new(None),
                slot: RefCell::new(Slot {
                    state: RepeatState::Idle,
                    timer: None,
                }),
            }),
        }
    }

    pub fn direction(&self) -> StepDirection {
        self.inner.direction
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    pub fn state(&self) -> RepeatState {
        self.inner.state()
    }

    /// Replaces the step callback; takes effect from the next step.
    pub fn set_step(&self, step: Option<Callback>) {
        *self.inner.step.borrow_mut() = step;
    }

    /// Steps once and starts the repeat sequence, replacing any running one.
    pub fn press_start(&self, initial_delay: Duration) {
        self.inner.press_start(initial_delay);
    }

    /// Stops repeating; a pending timer never fires.
    pub fn press_end(&self) {
        if self.inner.cancel() {
            log::trace!("{:?} repeat cancelled", self.inner.direction);
        }
    }

    pub fn downgrade(&self) -> WeakStepper {
        WeakStepper {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl Drop for RepeatStepper {
    fn drop(&mut self) {
        self.inner.cancel();
    }
}

/// Non-owning handle given to press handlers; a no-op once the stepper is gone.
#[derive(Clone)]
pub struct WeakStepper {
    inner: Weak<StepperInner>,
}

impl WeakStepper {
    pub fn press_start(&self, initial_delay: Duration) {
        if let Some(inner) = self.inner.upgrade() {
            inner.press_start(initial_delay);
        }
    }

    pub fn press_end(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cancel();
        }
    }
}
