//! # Timer Module - Cancellable Countdown Ticks
//!
//! A periodic tick source driven by the host's clock. The host calls [Ticker::poll] whenever
//! it wakes up (after an input event or a poll timeout) and receives one callback per whole
//! interval that has passed since the last tick. Nothing runs in the background, so a
//! cancelled ticker can never fire into a run that has been replaced.
//!
//! ```rust
//! use quill::timer::Ticker;
//! use web_time::{Duration, Instant};
//!
//! let start = Instant::now();
//! let mut ticker = Ticker::new(Duration::from_secs(1));
//! ticker.start(start);
//!
//! let mut ticks = 0;
//! ticker.poll(start + Duration::from_millis(2500), || ticks += 1);
//! assert_eq!(ticks, 2);
//!
//! ticker.cancel();
//! ticker.poll(start + Duration::from_secs(10), || ticks += 1);
//! assert_eq!(ticks, 2);
//! ```

use web_time::{Duration, Instant};

/// Cancellable periodic tick source
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    /// When the next tick is due, `None` while stopped
    next_due: Option<Instant>,
}

impl Ticker {
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// A ticker firing once per second
    pub const fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }

    /// Start ticking, with the first tick one interval after `now`
    ///
    /// Restarting an active ticker resets its phase.
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    /// Stop ticking. Pending ticks are dropped.
    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub const fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    /// Time left until the next tick, zero if it is overdue
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.next_due
            .map(|due| due.saturating_duration_since(now))
    }

    /// Fire `on_tick` once for every tick due at `now`
    ///
    /// Returns the amount of ticks fired.
    pub fn poll<F: FnMut()>(&mut self, now: Instant, mut on_tick: F) -> u32 {
        self.poll_until(now, || {
            on_tick();
            std::ops::ControlFlow::Continue(())
        })
    }

    /// Like [Self::poll], but stops and cancels the ticker when `on_tick` breaks
    pub fn poll_until<F>(&mut self, now: Instant, mut on_tick: F) -> u32
    where
        F: FnMut() -> std::ops::ControlFlow<()>,
    {
        let mut fired = 0;

        while let Some(due) = self.next_due
            && due <= now
        {
            self.next_due = Some(due + self.interval);
            fired += 1;

            if on_tick().is_break() {
                self.cancel();
                break;
            }
        }

        fired
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::every_second()
    }
}
