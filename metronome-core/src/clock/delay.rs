//! Microsecond delay engine
//!
//! A delay is split into steps, each a number of counter units, by
//! [`DelayPlan`]. Each step is then waited out against the live counter by
//! [`wait_step`].
//!
//! Every step's start is the previous step's target rather than a fresh
//! sample, so polling overhead and preemption late in one step are absorbed
//! by the next instead of accumulating.
//!
//! # Wrap detection
//!
//! The counter moves `start, start - 1, .., 0, period - 1, ..`. A step of
//! `units` is pending while the counter lies in the circular window of
//! `units` values ending at `start`:
//!
//! ```text
//! no wrap (units <= start):   pending = (target, start]
//! wrap    (units >  start):   pending = [0, start] ∪ (target + period, period - 1]
//! ```
//!
//! The step is done as soon as a poll lands outside that window. In the
//! wrapping case a value in `[0, start]` means the reload has not happened
//! yet, so it can never satisfy the step.

use metronome_hal::DownCounter;

use crate::config::ClockTiming;

/// Sequence of per-step counter-unit counts for one delay
#[derive(Debug, Clone)]
pub struct DelayPlan {
    remaining_usec: u32,
    fine_units: u32,
    long_units: u32,
    long_usec: u32,
}

impl DelayPlan {
    /// Plan a delay of `usec` microseconds
    pub fn new(timing: &ClockTiming, usec: u32) -> Self {
        Self {
            remaining_usec: usec,
            fine_units: timing.units_per_usec(),
            long_units: timing.long_units(),
            long_usec: timing.long_usec(),
        }
    }

    fn steps_left(&self) -> usize {
        let steps = if self.long_usec == 0 {
            self.remaining_usec
        } else {
            self.remaining_usec / self.long_usec + self.remaining_usec % self.long_usec
        };
        steps as usize
    }
}

impl Iterator for DelayPlan {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.remaining_usec == 0 {
            return None;
        }

        if self.long_usec != 0 && self.remaining_usec >= self.long_usec {
            self.remaining_usec -= self.long_usec;
            Some(self.long_units)
        } else {
            self.remaining_usec -= 1;
            Some(self.fine_units)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let steps = self.steps_left();
        (steps, Some(steps))
    }
}

impl ExactSizeIterator for DelayPlan {}

/// Counter value at which a step of `units` from `start` completes
///
/// Requires `start < period` and `0 < units < period`.
pub fn step_target(start: u32, units: u32, period: u32) -> u32 {
    if units <= start {
        start - units
    } else {
        start + period - units
    }
}

/// Whether `now` lies outside the pending window `(target, start]`
fn step_done(now: u32, start: u32, target: u32) -> bool {
    if target <= start {
        now <= target || now > start
    } else {
        now > start && now <= target
    }
}

/// Busy-wait one step of `units` counter units starting at `start`
///
/// Returns the step's target, which is where the next step starts. The
/// counter is read afresh on every poll. A preemption longer than one
/// reload period is not detected and costs up to one extra period.
pub fn wait_step<C: DownCounter + ?Sized>(counter: &C, start: u32, units: u32, period: u32) -> u32 {
    let target = step_target(start, units, period);
    while !step_done(counter.value(), start, target) {
        core::hint::spin_loop();
    }
    target
}
