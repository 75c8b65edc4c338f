//! Pulse driver for 433 MHz OOK transmitters.
//!
//! This module provides the [`PulseDriver`] struct, which owns the transmit pin
//! and a delay provider and turns [`Pulse`]s into carrier-on / carrier-off
//! periods. It has no knowledge of frames or commands.
//!
//! Upper layers do not talk to the driver directly but through the
//! [`PulseSink`] trait, so the frame encoder and command composer can be run
//! against a recording fake instead of real hardware.
//!
//! ## Example
//!
//! ```rust
//! # use embedded_hal_mock::eh1::digital::{Mock as Pin, State as PinState, Transaction as PinTransaction};
//! # use embedded_hal_mock::eh1::delay::NoopDelay;
//! use dooya433::consts::SYNC_PULSE;
//! use dooya433::pulse::{PulseDriver, PulseSink};
//!
//! # let tx_pin = Pin::new(&[
//! #     PinTransaction::set(PinState::Low),
//! #     PinTransaction::set(PinState::High),
//! #     PinTransaction::set(PinState::Low),
//! #     PinTransaction::set(PinState::Low),
//! # ]);
//! let mut driver = PulseDriver::new(tx_pin, NoopDelay::new()).unwrap();
//! driver.emit(SYNC_PULSE).unwrap();
//! let (mut tx_pin, _delay) = driver.release().unwrap();
//! # tx_pin.done();
//! ```
//!
//! ## Timing
//!
//! Each [`PulseDriver::emit`] is one blocking high/low period on the calling
//! thread. On a general purpose OS the delay provider should be a busy-wait or
//! high resolution sleep. The receiver tolerates roughly ±20% of the nominal
//! pulse width, which coarse scheduler sleeps can exceed.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::Error;

/// One on-air pulse: a carrier-on period followed by a carrier-off period.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Pulse {
    /// Time the pin is held high, in microseconds.
    pub high_us: u32,
    /// Time the pin is held low afterwards, in microseconds.
    pub low_us: u32,
}

impl Pulse {
    /// Creates a pulse from its high and low durations in microseconds.
    pub const fn new(high_us: u32, low_us: u32) -> Self {
        Self { high_us, low_us }
    }

    /// Total air time of the pulse in microseconds.
    pub const fn period_us(&self) -> u32 {
        self.high_us + self.low_us
    }
}

/// Something that can put pulses and gaps on air.
///
/// Every call is one atomic protocol unit. Implementations must not merge
/// consecutive calls or return before the requested time has elapsed.
pub trait PulseSink {
    /// Error raised when the underlying output cannot be driven.
    type Error;

    /// Emits a single high/low pulse.
    fn emit(&mut self, pulse: Pulse) -> Result<(), Self::Error>;

    /// Holds the output low for `us` microseconds.
    fn pause(&mut self, us: u32) -> Result<(), Self::Error>;
}

impl<T: PulseSink + ?Sized> PulseSink for &mut T {
    type Error = T::Error;

    fn emit(&mut self, pulse: Pulse) -> Result<(), Self::Error> {
        (**self).emit(pulse)
    }

    fn pause(&mut self, us: u32) -> Result<(), Self::Error> {
        (**self).pause(us)
    }
}

/// Drives a transmitter's data pin with blocking delays.
///
/// ## Type Parameters
///
/// - `TX`: A type implementing [`embedded_hal::digital::OutputPin`] wired to the transmitter data input
/// - `D`: A delay provider implementing [`embedded_hal::delay::DelayNs`]
///
/// ## Notes
///
/// - The pin is driven low on construction and on [`release`](PulseDriver::release),
///   so the transmitter is silent before and after a command.
/// - Only one driver should own a given pin. Nothing here is shared.
#[derive(Debug)]
pub struct PulseDriver<TX, D>
where
    TX: OutputPin,
    D: DelayNs,
{
    tx: TX,
    delay: D,
    /// Number of pulses emitted since construction.
    pub pulses_sent: u32,
}

impl<TX, D> PulseDriver<TX, D>
where
    TX: OutputPin,
    D: DelayNs,
{
    /// Creates a new driver, taking ownership of the pin and the delay.
    ///
    /// # Errors
    /// [`Error::Pin`] if the pin cannot be driven low.
    pub fn new(tx: TX, delay: D) -> Result<Self, Error<TX::Error>> {
        let mut driver = Self {
            tx,
            delay,
            pulses_sent: 0,
        };
        driver.tx.set_low().map_err(Error::Pin)?;
        Ok(driver)
    }

    /// Drives the pin low and returns the pin and delay provider.
    pub fn release(mut self) -> Result<(TX, D), Error<TX::Error>> {
        self.tx.set_low().map_err(Error::Pin)?;
        Ok((self.tx, self.delay))
    }
}

impl<TX, D> PulseSink for PulseDriver<TX, D>
where
    TX: OutputPin,
    D: DelayNs,
{
    type Error = Error<TX::Error>;

    fn emit(&mut self, pulse: Pulse) -> Result<(), Self::Error> {
        self.tx.set_high().map_err(Error::Pin)?;
        self.delay.delay_us(pulse.high_us);
        self.tx.set_low().map_err(Error::Pin)?;
        self.delay.delay_us(pulse.low_us);
        self.pulses_sent = self.pulses_sent.wrapping_add(1);
        Ok(())
    }

    fn pause(&mut self, us: u32) -> Result<(), Self::Error> {
        self.delay.delay_us(us);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{BIT_0_PULSE, BIT_1_PULSE, SYNC_PULSE};
    use embedded_hal::digital::ErrorKind;
    use embedded_hal_mock::eh1::delay::{CheckedDelay, NoopDelay, Transaction as DelayTransaction};
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    #[test]
    fn test_driver_initialization_drives_pin_low() {
        let tx = PinMock::new(&[PinTransaction::set(PinState::Low)]);
        let driver = PulseDriver::new(tx, NoopDelay::new()).unwrap();

        assert_eq!(driver.pulses_sent, 0);
        let mut tx = driver.tx;
        tx.done();
    }

    #[test]
    fn test_emit_sets_high_then_low_with_exact_delays() {
        let tx = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
        ]);
        let delay = CheckedDelay::new(&[
            DelayTransaction::delay_us(4_500),
            DelayTransaction::delay_us(1_400),
            DelayTransaction::delay_us(320),
            DelayTransaction::delay_us(620),
        ]);

        let mut driver = PulseDriver::new(tx, delay).unwrap();
        driver.emit(SYNC_PULSE).unwrap();
        driver.emit(BIT_0_PULSE).unwrap();
        assert_eq!(driver.pulses_sent, 2);

        let (mut tx, mut delay) = (driver.tx, driver.delay);
        tx.done();
        delay.done();
    }

    #[test]
    fn test_pause_only_waits() {
        let tx = PinMock::new(&[PinTransaction::set(PinState::Low)]);
        let delay = CheckedDelay::new(&[DelayTransaction::delay_us(7_400)]);

        let mut driver = PulseDriver::new(tx, delay).unwrap();
        driver.pause(7_400).unwrap();
        assert_eq!(driver.pulses_sent, 0);

        let (mut tx, mut delay) = (driver.tx, driver.delay);
        tx.done();
        delay.done();
    }

    #[test]
    fn test_release_leaves_pin_low() {
        let tx = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::Low),
        ]);
        let mut driver = PulseDriver::new(tx, NoopDelay::new()).unwrap();
        driver.emit(BIT_1_PULSE).unwrap();

        let (mut tx, _delay) = driver.release().unwrap();
        tx.done();
    }

    /// Output pin that fails every write after the first `ok` ones.
    #[derive(Debug)]
    struct FaultyPin {
        ok: usize,
    }

    impl embedded_hal::digital::ErrorType for FaultyPin {
        type Error = ErrorKind;
    }

    impl OutputPin for FaultyPin {
        fn set_low(&mut self) -> Result<(), ErrorKind> {
            self.set_high()
        }

        fn set_high(&mut self) -> Result<(), ErrorKind> {
            if self.ok == 0 {
                return Err(ErrorKind::Other);
            }
            self.ok -= 1;
            Ok(())
        }
    }

    #[test]
    fn test_pin_fault_is_propagated() {
        let mut driver = PulseDriver::new(FaultyPin { ok: 2 }, NoopDelay::new()).unwrap();

        assert!(driver.emit(BIT_0_PULSE).is_err());
        assert_eq!(driver.emit(SYNC_PULSE), Err(Error::Pin(ErrorKind::Other)));
        assert_eq!(driver.pulses_sent, 0);
    }

    #[test]
    fn test_fault_on_initial_low_is_reported() {
        assert!(matches!(
            PulseDriver::new(FaultyPin { ok: 0 }, NoopDelay::new()),
            Err(Error::Pin(ErrorKind::Other))
        ));
    }

    #[test]
    fn test_pulse_period() {
        assert_eq!(SYNC_PULSE.period_us(), 5_900);
        assert_eq!(BIT_0_PULSE.period_us(), BIT_1_PULSE.period_us());
    }
}
