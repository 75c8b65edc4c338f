//! Command composer: the emulated handheld remote.
//!
//! [`Remote`] turns logical button presses into repeated frame passes on a
//! [`PulseSink`]:
//!
//! - each command frame is sent [`DEFAULT_REPEAT`] times, every copy followed by
//!   a [`SEQUENCE_GAP_US`] pause;
//! - `up` and `down` then send the same number of confirmation frames
//!   (low nibble complemented);
//! - `pair` and `change_direction` chain several presses with fixed gaps,
//!   reproducing the button ritual of the physical remote.
//!
//! The protocol is open loop. Nothing is read back, so every sequence here is
//! linear and always runs to the end unless the sink reports an error.
//!
//! ## Example
//!
//! ```rust
//! # use embedded_hal_mock::eh1::digital::{Mock as Pin, State as PinState, Transaction as PinTransaction};
//! # use embedded_hal_mock::eh1::delay::NoopDelay;
//! use dooya433::frame::Header;
//! use dooya433::pulse::PulseDriver;
//! use dooya433::remote::{Action, Remote};
//!
//! # let mut expected = vec![PinTransaction::set(PinState::Low)];
//! # for _ in 0..6 * 41 {
//! #     expected.push(PinTransaction::set(PinState::High));
//! #     expected.push(PinTransaction::set(PinState::Low));
//! # }
//! # expected.push(PinTransaction::set(PinState::Low));
//! # let tx_pin = Pin::new(&expected);
//! let driver = PulseDriver::new(tx_pin, NoopDelay::new()).unwrap();
//! let mut remote = Remote::new(driver, Header::new(0x42, 1));
//!
//! let action: Action = "stop".parse().unwrap();
//! remote.perform(action).unwrap();
//!
//! let (mut tx_pin, _delay) = remote.into_sink().release().unwrap();
//! # tx_pin.done();
//! ```

use core::fmt;
use core::str::FromStr;

use crate::consts::{DEFAULT_REPEAT, GESTURE_SETTLE_US, PRESS_GAP_US, SEQUENCE_GAP_US};
use crate::encoder::transmit_frame;
use crate::error::ParseActionError;
use crate::frame::{Command, Frame, Header};
use crate::pulse::PulseSink;

/// Everything the remote can do, as selected by the user.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Action {
    /// Raise the shutter.
    Up,
    /// Lower the shutter.
    Down,
    /// Stop the motor.
    Stop,
    /// One press of the learn button.
    Learn,
    /// The "P2" button: a single learn press, used on an already paired
    /// motor to let it accept an additional remote.
    P2,
    /// Pair with a motor in factory state: learn, learn, up.
    Pair,
    /// Invert the motor's rotation sense: learn, learn, down.
    ChangeDirection,
}

impl Action {
    /// Every action, in the order shown to users.
    pub const ALL: [Action; 7] = [
        Action::Up,
        Action::Down,
        Action::Stop,
        Action::Learn,
        Action::P2,
        Action::Pair,
        Action::ChangeDirection,
    ];

    /// Command-line name of the action.
    pub const fn name(self) -> &'static str {
        match self {
            Action::Up => "up",
            Action::Down => "down",
            Action::Stop => "stop",
            Action::Learn => "learn",
            Action::P2 => "p2",
            Action::Pair => "pair",
            Action::ChangeDirection => "change_direction",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.name() == s)
            .ok_or(ParseActionError)
    }
}

/// An emulated handheld remote bound to one header (remote id + channel).
///
/// Holds no state between commands besides the header: sending the same
/// action twice produces the same pulse train twice.
#[derive(Debug)]
pub struct Remote<S: PulseSink> {
    sink: S,
    header: Header,
    repeat: u8,
}

impl<S: PulseSink> Remote<S> {
    /// Creates a remote that transmits through `sink` using `header`.
    pub fn new(sink: S, header: Header) -> Self {
        Self {
            sink,
            header,
            repeat: DEFAULT_REPEAT,
        }
    }

    /// Overrides the number of copies sent per frame pass.
    pub fn with_repeat(mut self, repeat: u8) -> Self {
        self.repeat = repeat;
        self
    }

    /// The header every frame is built from.
    pub fn header(&self) -> Header {
        self.header
    }

    /// Gives the sink back, e.g. to release the transmit pin.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Sends `code` as `repeat` frames, each followed by the inter-sequence gap.
    ///
    /// With `confirm` set, the confirmation frame is then sent the same way.
    pub fn send_command(&mut self, code: u8, repeat: u8, confirm: bool) -> Result<(), S::Error> {
        let frame = Frame::new(self.header, code);
        debug!("sending code {:#x} x{}", code, repeat);
        self.send_repeated(frame, repeat)?;

        if confirm {
            let confirmation = frame.confirmation();
            debug!("confirming with code {:#x} x{}", confirmation.code(), repeat);
            self.send_repeated(confirmation, repeat)?;
        }
        Ok(())
    }

    fn send_repeated(&mut self, frame: Frame, repeat: u8) -> Result<(), S::Error> {
        for _ in 0..repeat {
            transmit_frame(&mut self.sink, frame)?;
            self.sink.pause(SEQUENCE_GAP_US)?;
        }
        Ok(())
    }

    fn press(&mut self, command: Command) -> Result<(), S::Error> {
        self.send_command(command.code(), self.repeat, command.needs_confirmation())
    }

    /// Raises the shutter.
    pub fn up(&mut self) -> Result<(), S::Error> {
        self.press(Command::Up)
    }

    /// Lowers the shutter.
    pub fn down(&mut self) -> Result<(), S::Error> {
        self.press(Command::Down)
    }

    /// Stops the motor. Sent without confirmation.
    pub fn stop(&mut self) -> Result<(), S::Error> {
        self.press(Command::Stop)
    }

    /// Presses learn once. Sent without confirmation.
    pub fn learn(&mut self) -> Result<(), S::Error> {
        self.press(Command::Learn)
    }

    /// Pairs this remote with a motor waiting for a new remote.
    pub fn pair(&mut self) -> Result<(), S::Error> {
        self.learn_twice_then(Command::Up)
    }

    /// Inverts the rotation sense of a paired motor.
    pub fn change_direction(&mut self) -> Result<(), S::Error> {
        self.learn_twice_then(Command::Down)
    }

    // learn, short gap, learn, long gap, final command
    fn learn_twice_then(&mut self, last: Command) -> Result<(), S::Error> {
        self.learn()?;
        self.sink.pause(PRESS_GAP_US)?;
        self.learn()?;
        self.sink.pause(GESTURE_SETTLE_US)?;
        self.press(last)
    }

    /// Runs `action` to completion.
    pub fn perform(&mut self, action: Action) -> Result<(), S::Error> {
        info!("performing {}", action.name());
        match action {
            Action::Up => self.up(),
            Action::Down => self.down(),
            Action::Stop => self.stop(),
            Action::Learn | Action::P2 => self.learn(),
            Action::Pair => self.pair(),
            Action::ChangeDirection => self.change_direction(),
        }
    }
}
