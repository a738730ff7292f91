//! Collaborator interfaces consumed from interrupt context
//!
//! The clock does not own a timer queue or any energy accounting; it only
//! calls into them once per tick. These traits are that boundary.

use crate::clock::TickCount;

/// Software timer queue
///
/// Queried once per tick from the tick interrupt. Implementations must be
/// callable from interrupt context and must not block.
pub trait TimerQueue {
    /// Whether any timed entry is queued
    fn pending(&self) -> bool;

    /// Tick at which the earliest queued entry expires
    fn next_expiration(&self) -> TickCount;

    /// One-shot request for the queue to run a poll pass
    ///
    /// Only signals; the queue is processed later outside the interrupt.
    fn request_poll(&self);
}

/// Energy/activity accounting
///
/// Brackets interrupt-type work. Side-effect only.
pub trait ActivityMonitor {
    /// Entering interrupt work
    fn irq_enter(&self);

    /// Leaving interrupt work
    fn irq_exit(&self);
}

/// Timer queue that never has anything pending
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTimers;

impl TimerQueue for NoTimers {
    fn pending(&self) -> bool {
        false
    }

    fn next_expiration(&self) -> TickCount {
        0
    }

    fn request_poll(&self) {}
}

/// Activity monitor that records nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoActivity;

impl ActivityMonitor for NoActivity {
    fn irq_enter(&self) {}

    fn irq_exit(&self) {}
}
