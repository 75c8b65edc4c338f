//! Busy-wait delay for hosted targets.
//!
//! `thread::sleep` on a general purpose kernel rounds short sleeps up and
//! batches timer wakeups, easily adding a few hundred microseconds to a 320 µs
//! pulse. [`SpinDelay`] instead spins on the monotonic clock, trading a core for
//! pulse widths accurate to a few microseconds.
//!
//! Requires the `std` feature.

use std::hint;
use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;

/// A [`DelayNs`] implementation that spins on [`Instant`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SpinDelay;

impl SpinDelay {
    /// Creates a new spin delay.
    pub const fn new() -> Self {
        Self
    }

    fn spin(&self, duration: Duration) {
        let start = Instant::now();
        while start.elapsed() < duration {
            hint::spin_loop();
        }
    }
}

impl DelayNs for SpinDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.spin(Duration::from_nanos(ns.into()));
    }

    fn delay_us(&mut self, us: u32) {
        self.spin(Duration::from_micros(us.into()));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.spin(Duration::from_millis(ms.into()));
    }
}
