//! Monotonic tick clock
//!
//! [`Clock`] holds the tick counter, the seconds counter and the countdown
//! between them. The periodic tick interrupt is the only writer; every
//! other path only reads. Busy waits read either the tick counter
//! ([`Clock::wait`]) or the live hardware counter ([`Clock::delay_usec`]).
//!
//! A board keeps one `Clock` in a `static` and installs [`Clock::on_tick`]
//! as the timer interrupt. Wait and delay must not be called from that
//! interrupt.

pub mod delay;

use metronome_hal::{DownCounter, PeriodicTimer};
use portable_atomic::{AtomicU32, Ordering};

use crate::config::ClockTiming;
use crate::hooks::{ActivityMonitor, TimerQueue};

pub use delay::DelayPlan;

/// Logical time in ticks, wrapping
pub type TickCount = u32;

/// Whole seconds
pub type Seconds = u32;

/// Elapsed ticks between two samples
///
/// Correct across a counter wrap as long as the samples are less than one
/// full counter range apart.
#[inline]
pub const fn ticks_since(start: TickCount, now: TickCount) -> TickCount {
    now.wrapping_sub(start)
}

/// Tick-driven clock state
pub struct Clock {
    timing: ClockTiming,
    ticks: AtomicU32,
    seconds: AtomicU32,
    countdown: AtomicU32,
}

impl Clock {
    /// Create a clock at tick zero, second zero
    pub const fn new(timing: ClockTiming) -> Self {
        Self {
            timing,
            ticks: AtomicU32::new(0),
            seconds: AtomicU32::new(0),
            countdown: AtomicU32::new(timing.ticks_per_second()),
        }
    }

    /// Derived timing constants
    pub fn timing(&self) -> &ClockTiming {
        &self.timing
    }

    /// Program and start the periodic timer
    ///
    /// Call exactly once, before any other clock operation.
    pub fn init<T: PeriodicTimer + ?Sized>(&self, timer: &mut T) {
        timer.set_clock_source(self.timing.source());
        timer.set_reload(self.timing.reload());
        timer.clear_current();
        timer.enable_interrupt();
        timer.enable_counter();
    }

    /// Periodic tick interrupt body
    ///
    /// Advances the tick counter, asks the timer queue to poll when its
    /// next expiration is due, and rolls the seconds countdown.
    pub fn on_tick<Q, A>(&self, timers: &Q, activity: &A)
    where
        Q: TimerQueue + ?Sized,
        A: ActivityMonitor + ?Sized,
    {
        activity.irq_enter();

        let now = self.ticks.load(Ordering::Relaxed).wrapping_add(1);
        self.ticks.store(now, Ordering::Release);

        if timers.pending() && timers.next_expiration() <= now {
            timers.request_poll();
        }

        let countdown = self.countdown.load(Ordering::Relaxed) - 1;
        if countdown == 0 {
            let seconds = self.seconds.load(Ordering::Relaxed).wrapping_add(1);
            self.seconds.store(seconds, Ordering::Release);
            self.countdown
                .store(self.timing.ticks_per_second(), Ordering::Relaxed);
        } else {
            self.countdown.store(countdown, Ordering::Relaxed);
        }

        activity.irq_exit();
    }

    /// Current tick count
    #[inline]
    pub fn now_ticks(&self) -> TickCount {
        self.ticks.load(Ordering::Acquire)
    }

    /// Current seconds count
    #[inline]
    pub fn now_seconds(&self) -> Seconds {
        self.seconds.load(Ordering::Acquire)
    }

    /// Overwrite the seconds count
    ///
    /// The countdown keeps its phase, so the next increment can come up to
    /// one second early.
    pub fn set_seconds(&self, seconds: Seconds) {
        self.seconds.store(seconds, Ordering::Release);
    }

    /// Ticks left until the next seconds increment, in `[1, ticks_per_second]`
    pub fn countdown(&self) -> u32 {
        self.countdown.load(Ordering::Acquire)
    }

    /// Busy-wait until at least `ticks` ticks have elapsed
    pub fn wait(&self, ticks: TickCount) {
        let start = self.now_ticks();
        while ticks_since(start, self.now_ticks()) < ticks {
            core::hint::spin_loop();
        }
    }

    /// Microseconds since start, with sub-tick resolution, wrapping
    ///
    /// Re-reads when a tick lands between the tick and counter samples.
    pub fn now_usec<C: DownCounter + ?Sized>(&self, counter: &C) -> u32 {
        loop {
            let ticks = self.now_ticks();
            let value = counter.value();
            if self.now_ticks() == ticks {
                let elapsed = self.timing.reload().saturating_sub(value);
                return self
                    .timing
                    .ticks_to_usec(ticks)
                    .wrapping_add(elapsed / self.timing.units_per_usec());
            }
        }
    }

    /// Busy-wait for `usec` microseconds against the live counter
    ///
    /// Does not touch the tick counter. Zero returns without reading the
    /// counter.
    pub fn delay_usec<C: DownCounter + ?Sized>(&self, counter: &C, usec: u32) {
        let mut plan = DelayPlan::new(&self.timing, usec);
        let Some(first) = plan.next() else {
            return;
        };

        let period = self.timing.period();
        let mut start = delay::wait_step(counter, counter.value(), first, period);
        for units in plan {
            start = delay::wait_step(counter, start, units, period);
        }
    }

    /// Obsolete delay in historical 2.83us units, taken as 3us each
    pub fn delay<C: DownCounter + ?Sized>(&self, counter: &C, t: u16) {
        self.delay_usec(counter, 3 * u32::from(t));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClockConfig, DelayStrategy};
    use core::cell::Cell;
    use metronome_hal::ClockSource;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn timing(ticks_per_second: u32, strategy: DelayStrategy) -> ClockTiming {
        ClockConfig {
            core_hz: 72_000_000,
            source: ClockSource::CoreDiv8,
            ticks_per_second,
            strategy,
        }
        .timing()
        .unwrap()
    }

    #[derive(Default)]
    struct MockQueue {
        pending: bool,
        next: TickCount,
        polls: Cell<u32>,
    }

    impl TimerQueue for MockQueue {
        fn pending(&self) -> bool {
            self.pending
        }

        fn next_expiration(&self) -> TickCount {
            self.next
        }

        fn request_poll(&self) {
            self.polls.set(self.polls.get() + 1);
        }
    }

    #[derive(Default)]
    struct MockActivity {
        depth: Cell<i32>,
        entries: Cell<u32>,
    }

    impl ActivityMonitor for MockActivity {
        fn irq_enter(&self) {
            self.depth.set(self.depth.get() + 1);
            self.entries.set(self.entries.get() + 1);
        }

        fn irq_exit(&self) {
            self.depth.set(self.depth.get() - 1);
        }
    }

    /// Counter that moves down one unit per read
    struct FreeRunning {
        value: Cell<u32>,
        period: u32,
        reads: Cell<u64>,
    }

    impl FreeRunning {
        fn new(start: u32, period: u32) -> Self {
            Self {
                value: Cell::new(start),
                period,
                reads: Cell::new(0),
            }
        }
    }

    impl DownCounter for FreeRunning {
        fn value(&self) -> u32 {
            let v = self.value.get();
            self.value
                .set(if v == 0 { self.period - 1 } else { v - 1 });
            self.reads.set(self.reads.get() + 1);
            v
        }
    }

    #[derive(Default)]
    struct MockTimer {
        calls: std::vec::Vec<&'static str>,
        source: Option<ClockSource>,
        reload: Option<u32>,
    }

    impl PeriodicTimer for MockTimer {
        fn set_clock_source(&mut self, source: ClockSource) {
            self.source = Some(source);
            self.calls.push("source");
        }

        fn set_reload(&mut self, reload: u32) {
            self.reload = Some(reload);
            self.calls.push("reload");
        }

        fn clear_current(&mut self) {
            self.calls.push("clear");
        }

        fn enable_interrupt(&mut self) {
            self.calls.push("interrupt");
        }

        fn enable_counter(&mut self) {
            self.calls.push("counter");
        }
    }

    #[test]
    fn test_init_programs_timer() {
        let clock = Clock::new(timing(1000, DelayStrategy::LongInterval));
        let mut timer = MockTimer::default();
        clock.init(&mut timer);

        assert_eq!(timer.source, Some(ClockSource::CoreDiv8));
        assert_eq!(timer.reload, Some(8999));
        assert_eq!(timer.calls, ["source", "reload", "clear", "interrupt", "counter"]);
    }

    #[test]
    fn test_fresh_clock() {
        let clock = Clock::new(timing(128, DelayStrategy::LongInterval));
        assert_eq!(clock.now_ticks(), 0);
        assert_eq!(clock.now_seconds(), 0);
        assert_eq!(clock.countdown(), 128);
    }

    #[test]
    fn test_one_second_after_128_ticks() {
        let clock = Clock::new(timing(128, DelayStrategy::LongInterval));
        let queue = MockQueue::default();
        let activity = MockActivity::default();

        for _ in 0..127 {
            clock.on_tick(&queue, &activity);
        }
        assert_eq!(clock.now_seconds(), 0);
        assert_eq!(clock.countdown(), 1);

        clock.on_tick(&queue, &activity);
        assert_eq!(clock.now_ticks(), 128);
        assert_eq!(clock.now_seconds(), 1);
        assert_eq!(clock.countdown(), 128);
    }

    #[test]
    fn test_seconds_once_per_period_of_ticks() {
        let clock = Clock::new(timing(100, DelayStrategy::LongInterval));
        let queue = MockQueue::default();
        let activity = MockActivity::default();

        let mut last = clock.now_seconds();
        for tick in 1..=1000u32 {
            clock.on_tick(&queue, &activity);
            let seconds = clock.now_seconds();
            assert!(seconds - last <= 1);
            last = seconds;
            assert_eq!(seconds, tick / 100);
        }
    }

    #[test]
    fn test_set_seconds_keeps_countdown() {
        let clock = Clock::new(timing(128, DelayStrategy::LongInterval));
        let queue = MockQueue::default();
        let activity = MockActivity::default();

        for _ in 0..40 {
            clock.on_tick(&queue, &activity);
        }
        let countdown = clock.countdown();

        clock.set_seconds(1_700_000_000);
        assert_eq!(clock.now_seconds(), 1_700_000_000);
        assert_eq!(clock.countdown(), countdown);

        for _ in 0..countdown {
            clock.on_tick(&queue, &activity);
        }
        assert_eq!(clock.now_seconds(), 1_700_000_001);
    }

    #[test]
    fn test_activity_brackets_every_tick() {
        let clock = Clock::new(timing(128, DelayStrategy::LongInterval));
        let queue = MockQueue::default();
        let activity = MockActivity::default();

        for _ in 0..5 {
            clock.on_tick(&queue, &activity);
            assert_eq!(activity.depth.get(), 0);
        }
        assert_eq!(activity.entries.get(), 5);
    }

    #[test]
    fn test_poll_requested_when_expiration_due() {
        let clock = Clock::new(timing(128, DelayStrategy::LongInterval));
        let activity = MockActivity::default();
        let queue = MockQueue {
            pending: true,
            next: 3,
            ..Default::default()
        };

        clock.on_tick(&queue, &activity);
        clock.on_tick(&queue, &activity);
        assert_eq!(queue.polls.get(), 0);

        clock.on_tick(&queue, &activity);
        assert_eq!(queue.polls.get(), 1);

        // Stays due until the queue catches up
        clock.on_tick(&queue, &activity);
        assert_eq!(queue.polls.get(), 2);
    }

    #[test]
    fn test_no_poll_without_pending_entries() {
        let clock = Clock::new(timing(128, DelayStrategy::LongInterval));
        let activity = MockActivity::default();
        let queue = MockQueue {
            pending: false,
            next: 0,
            ..Default::default()
        };

        for _ in 0..10 {
            clock.on_tick(&queue, &activity);
        }
        assert_eq!(queue.polls.get(), 0);
    }

    #[test]
    fn test_tick_counter_wraps_silently() {
        let clock = Clock::new(timing(128, DelayStrategy::LongInterval));
        let queue = MockQueue::default();
        let activity = MockActivity::default();
        clock.ticks.store(TickCount::MAX, Ordering::Relaxed);

        let start = clock.now_ticks();
        clock.on_tick(&queue, &activity);
        clock.on_tick(&queue, &activity);

        assert_eq!(clock.now_ticks(), 1);
        assert_eq!(ticks_since(start, clock.now_ticks()), 2);
    }

    #[test]
    fn test_wait_across_wrap() {
        let clock = Arc::new(Clock::new(timing(1000, DelayStrategy::LongInterval)));
        clock.ticks.store(TickCount::MAX - 3, Ordering::Relaxed);

        let ticker = {
            let clock = Arc::clone(&clock);
            thread::spawn(move || {
                for _ in 0..20 {
                    thread::sleep(Duration::from_millis(1));
                    clock.on_tick(&crate::hooks::NoTimers, &crate::hooks::NoActivity);
                }
            })
        };

        let start = clock.now_ticks();
        clock.wait(10);
        assert!(ticks_since(start, clock.now_ticks()) >= 10);

        ticker.join().unwrap();
    }

    #[test]
    fn test_wait_zero_returns_immediately() {
        let clock = Clock::new(timing(1000, DelayStrategy::LongInterval));
        clock.wait(0);
        assert_eq!(clock.now_ticks(), 0);
    }

    #[test]
    fn test_delay_zero_reads_nothing() {
        let clock = Clock::new(timing(1000, DelayStrategy::LongInterval));
        let counter = FreeRunning::new(500, 9000);
        clock.delay_usec(&counter, 0);
        assert_eq!(counter.reads.get(), 0);
    }

    #[test]
    fn test_delay_consumes_requested_units() {
        let clock = Clock::new(timing(1000, DelayStrategy::LongInterval));
        let counter = FreeRunning::new(4000, 9000);

        // 2.5 periods, so the counter reloads twice during the delay
        clock.delay_usec(&counter, 2500);

        // One unit per read: the counter ends exactly on the final target
        let units = 2500 * 9;
        let expected = (4000 + 3 * 9000 - units) % 9000;
        assert_eq!(counter.value.get(), (expected + 9000 - 1) % 9000);
        assert_eq!(counter.reads.get(), 1 + units as u64);
    }

    #[test]
    fn test_fine_only_delay_matches_long_interval() {
        let fine = Clock::new(timing(1000, DelayStrategy::FineOnly));
        let long = Clock::new(timing(1000, DelayStrategy::LongInterval));
        let a = FreeRunning::new(123, 9000);
        let b = FreeRunning::new(123, 9000);

        fine.delay_usec(&a, 777);
        long.delay_usec(&b, 777);

        assert_eq!(a.value.get(), b.value.get());
        assert_eq!(a.reads.get(), b.reads.get());
    }

    #[test]
    fn test_obsolete_delay_is_three_microseconds() {
        let clock = Clock::new(timing(1000, DelayStrategy::LongInterval));
        let a = FreeRunning::new(6000, 9000);
        let b = FreeRunning::new(6000, 9000);

        clock.delay(&a, 50);
        clock.delay_usec(&b, 150);

        assert_eq!(a.reads.get(), b.reads.get());
        assert_eq!(a.value.get(), b.value.get());
    }

    #[test]
    fn test_now_usec_sub_tick() {
        let clock = Clock::new(timing(1000, DelayStrategy::LongInterval));
        let queue = MockQueue::default();
        let activity = MockActivity::default();
        for _ in 0..3 {
            clock.on_tick(&queue, &activity);
        }

        // 900 units into the fourth tick
        let counter = FreeRunning::new(8999 - 900, 9000);
        assert_eq!(clock.now_usec(&counter), 3100);
    }

    #[test]
    fn test_now_usec_tracks_seconds_at_uneven_rate() {
        let clock = Clock::new(timing(128, DelayStrategy::LongInterval));
        for _ in 0..128 * 60 {
            clock.on_tick(&crate::hooks::NoTimers, &crate::hooks::NoActivity);
        }
        assert_eq!(clock.now_seconds(), 60);

        // Counter just reloaded, no sub-tick part
        let counter = FreeRunning::new(clock.timing().reload(), clock.timing().period());
        assert_eq!(clock.now_usec(&counter), 60_000_000);
    }

    /// Counter whose first read lands just before a tick interrupt
    struct TickDuringRead<'a> {
        clock: &'a Clock,
        samples: [u32; 2],
        reads: Cell<usize>,
    }

    impl DownCounter for TickDuringRead<'_> {
        fn value(&self) -> u32 {
            let n = self.reads.get();
            self.reads.set(n + 1);
            if n == 0 {
                self.clock
                    .on_tick(&crate::hooks::NoTimers, &crate::hooks::NoActivity);
            }
            self.samples[n.min(1)]
        }
    }

    #[test]
    fn test_now_usec_rereads_after_tick_between_samples() {
        let clock = Clock::new(timing(1000, DelayStrategy::LongInterval));
        for _ in 0..5 {
            clock.on_tick(&crate::hooks::NoTimers, &crate::hooks::NoActivity);
        }

        // First sample is near the end of tick 5, then the counter reloads
        // and tick 6 begins; the second sample is 90 units into tick 6.
        let counter = TickDuringRead {
            clock: &clock,
            samples: [5, 8999 - 90],
            reads: Cell::new(0),
        };

        // A torn read would pair tick 5 with the stale sample (5999)
        assert_eq!(clock.now_usec(&counter), 6010);
        assert_eq!(counter.reads.get(), 2);
        assert_eq!(clock.now_ticks(), 6);
    }

    proptest::proptest! {
        #[test]
        fn prop_elapsed_survives_wrap(start in proptest::num::u32::ANY, elapsed in 0u32..u32::MAX) {
            let now = start.wrapping_add(elapsed);
            proptest::prop_assert_eq!(ticks_since(start, now), elapsed);
        }

        #[test]
        fn prop_ticks_advance_by_one(initial in proptest::num::u32::ANY, n in 1u32..500) {
            let clock = Clock::new(timing(128, DelayStrategy::LongInterval));
            clock.ticks.store(initial, Ordering::Relaxed);
            for _ in 0..n {
                clock.on_tick(&crate::hooks::NoTimers, &crate::hooks::NoActivity);
            }
            proptest::prop_assert_eq!(ticks_since(initial, clock.now_ticks()), n);
            proptest::prop_assert_eq!(clock.now_seconds(), n / 128);
        }
    }
}
