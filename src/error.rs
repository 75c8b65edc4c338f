//! Error types.
//!
//! The transmit path has a single failure class: the output pin refusing a
//! write. It is surfaced as [`Error::Pin`] and never retried, because a frame
//! that was cut off halfway cannot be resumed and the motor has no way to
//! acknowledge anything anyway.

use core::fmt::Debug;

use thiserror::Error;

/// Errors raised while driving the transmitter.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Error<E: Debug> {
    /// The transmit pin could not be driven.
    #[error("transmit pin fault: {0:?}")]
    Pin(E),
}

/// Returned when a command name does not match any [`Action`](crate::remote::Action).
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
#[error("unknown command (expected one of: up, down, stop, learn, p2, pair, change_direction)")]
pub struct ParseActionError;
