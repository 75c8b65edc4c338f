//! # dooya433
//!
//! A portable, no_std Rust emulator for the 433 MHz handheld remote of Dooya-family
//! rotary window-shutter motors (sold under many brands, e.g. 3T-Motors HS1 remotes).
//!
//! The crate reproduces, with microsecond timing, the pulse train a genuine remote
//! produces, using a cheap OOK transmitter module (FS1000A and similar) on a single
//! GPIO pin:
//! - `embedded-hal` traits for digital output and blocking delays
//! - a sync pulse followed by a 40-bit frame, most significant bit first
//! - six copies per frame, plus an inverted-nibble confirmation pass for motion commands
//! - multi-press gestures for pairing and for reversing the motor direction
//!
//! ## Crate features
//! | Feature     | Description |
//! |-------------|-------------|
//! | `std`       | Disables `#![no_std]`, enables the pid file `lock` and the `SpinDelay` busy-wait delay |
//! | `log`       | Uses `log` logging |
//! | `defmt-0-3` | Uses `defmt` logging |
//! | `cli`       | Builds the `dooya` binary for Raspberry Pi (pulls in `rppal`, `clap`) |
//!
//! ## Usage
//!
//! ```rust
//! # use embedded_hal_mock::eh1::digital::{Mock as Pin, State as PinState, Transaction as PinTransaction};
//! # use embedded_hal_mock::eh1::delay::NoopDelay;
//! use dooya433::frame::Header;
//! use dooya433::pulse::PulseDriver;
//! use dooya433::remote::Remote;
//!
//! # let mut expected = vec![PinTransaction::set(PinState::Low)];
//! # for _ in 0..12 * 41 {
//! #     expected.push(PinTransaction::set(PinState::High));
//! #     expected.push(PinTransaction::set(PinState::Low));
//! # }
//! # expected.push(PinTransaction::set(PinState::Low));
//! # let tx_pin = Pin::new(&expected);
//! # let delay = NoopDelay::new();
//! let driver = PulseDriver::new(tx_pin, delay).unwrap();
//! let mut remote = Remote::new(driver, Header::new(0x42, 1));
//! remote.up().unwrap();
//! # let (mut tx_pin, _) = remote.into_sink().release().unwrap();
//! # tx_pin.done();
//! ```
//!
//! ## Integration Notes
//!
//! - Every pulse is a blocking wait on the calling thread; a single command takes
//!   0.3 to 0.6 s (about 1.3 s for gestures) and must not be interrupted
//! - Timing precision is critical; the receiver tolerates about ±20% per pulse
//! - The protocol is one-way: there is no way to know whether the motor heard the command
//!
//! --
//! Designed for `#![no_std]` use; the Raspberry Pi binary is a thin shell around it.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

#[macro_use]
mod fmt;

pub mod consts;
#[cfg(feature = "std")]
pub mod delay;
pub mod encoder;
pub mod error;
pub mod frame;
#[cfg(feature = "std")]
pub mod lock;
pub mod pulse;
pub mod remote;

pub use encoder::transmit_frame;
pub use error::{Error, ParseActionError};
pub use frame::{Command, Frame, Header};
pub use pulse::{Pulse, PulseDriver, PulseSink};
pub use remote::{Action, Remote};
