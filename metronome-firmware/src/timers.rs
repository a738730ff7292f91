//! Minimal timer queue and interrupt accounting for the demo
//!
//! A single alarm stands in for a full software timer queue: the tick
//! interrupt raises a poll request when the alarm is due, and the main
//! loop consumes it.

use metronome_core::{ActivityMonitor, TickCount, TimerQueue};
use portable_atomic::{AtomicBool, AtomicU32, Ordering};

/// One-shot alarm at a tick deadline
pub struct Alarm {
    armed: AtomicBool,
    deadline: AtomicU32,
    poll_requested: AtomicBool,
}

impl Alarm {
    pub const fn new() -> Self {
        Self {
            armed: AtomicBool::new(false),
            deadline: AtomicU32::new(0),
            poll_requested: AtomicBool::new(false),
        }
    }

    /// Arm for `deadline`, replacing any previous deadline
    pub fn arm(&self, deadline: TickCount) {
        self.deadline.store(deadline, Ordering::Relaxed);
        self.poll_requested.store(false, Ordering::Relaxed);
        self.armed.store(true, Ordering::Release);
    }

    /// Consume a pending poll request, disarming the alarm
    pub fn take_poll(&self) -> bool {
        if self.poll_requested.swap(false, Ordering::AcqRel) {
            self.armed.store(false, Ordering::Release);
            true
        } else {
            false
        }
    }
}

impl TimerQueue for Alarm {
    fn pending(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    fn next_expiration(&self) -> TickCount {
        self.deadline.load(Ordering::Relaxed)
    }

    fn request_poll(&self) {
        self.poll_requested.store(true, Ordering::Release);
    }
}

/// Counts interrupt-type work
pub struct IrqEnergy {
    entries: AtomicU32,
}

impl IrqEnergy {
    pub const fn new() -> Self {
        Self {
            entries: AtomicU32::new(0),
        }
    }

    /// Interrupt bodies entered so far
    pub fn entries(&self) -> u32 {
        self.entries.load(Ordering::Relaxed)
    }
}

impl ActivityMonitor for IrqEnergy {
    fn irq_enter(&self) {
        let n = self.entries.load(Ordering::Relaxed);
        self.entries.store(n.wrapping_add(1), Ordering::Relaxed);
    }

    fn irq_exit(&self) {}
}
