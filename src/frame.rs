//! Frame layout of the Dooya remote protocol.
//!
//! Every message on air is a single 40-bit [`Frame`]:
//!
//! ```text
//!  39      32 31                  16 15    12 11     8 7          0
//! +----------+-----------------------+--------+--------+------------+
//! |   0x1f   |       remote id       |  0xf   | channel|  command   |
//! +----------+-----------------------+--------+--------+------------+
//!                               ^^^^ overlaid by 0xff << 12
//! ```
//!
//! The upper 32 bits form the [`Header`], which is fixed for one invocation.
//! The low byte carries the [`Command`]. Motion commands are followed by a
//! confirmation frame whose low nibble is complemented, see
//! [`Frame::confirmation`].

use crate::consts::{
    BIT_0_PULSE, BIT_1_PULSE, CHANNEL_MASK, CHANNEL_SHIFT, COMMAND_DOWN, COMMAND_LEARN,
    COMMAND_MASK, COMMAND_STOP, COMMAND_UP, DEFAULT_CHANNEL, DEFAULT_REMOTE_ID, FRAME_BITS,
    FRAME_MASK, HEADER_MARKER, HEADER_MARKER_SHIFT, HEADER_PREFIX, HEADER_PREFIX_SHIFT,
    REMOTE_ID_SHIFT, SYNC_PULSE,
};
use crate::pulse::Pulse;

/// Identity part of a frame: protocol prefix, remote id and channel.
///
/// The low 8 bits of a header are always zero.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Header(u64);

impl Header {
    /// Builds the header for `remote_id` on `channel`.
    ///
    /// Only the low 4 bits of `channel` are used.
    pub const fn new(remote_id: u16, channel: u8) -> Self {
        Self(
            HEADER_PREFIX << HEADER_PREFIX_SHIFT
                | (remote_id as u64) << REMOTE_ID_SHIFT
                | HEADER_MARKER << HEADER_MARKER_SHIFT
                | ((channel & CHANNEL_MASK) as u64) << CHANNEL_SHIFT,
        )
    }

    /// Raw header bits.
    pub const fn bits(&self) -> u64 {
        self.0
    }

    /// The channel encoded in this header.
    pub const fn channel(&self) -> u8 {
        ((self.0 >> CHANNEL_SHIFT) as u8) & CHANNEL_MASK
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new(DEFAULT_REMOTE_ID, DEFAULT_CHANNEL)
    }
}

/// Command byte carried in the low 8 bits of a frame.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Command {
    /// Raise the shutter.
    Up,
    /// Lower the shutter.
    Down,
    /// Stop the motor.
    Stop,
    /// Put the motor into learn (pairing) mode.
    Learn,
}

impl Command {
    /// On-air code of the command.
    pub const fn code(self) -> u8 {
        match self {
            Command::Up => COMMAND_UP,
            Command::Down => COMMAND_DOWN,
            Command::Stop => COMMAND_STOP,
            Command::Learn => COMMAND_LEARN,
        }
    }

    /// Whether the command is followed by a confirmation pass.
    ///
    /// Only the motion commands are confirmed; stop and learn are sent once.
    pub const fn needs_confirmation(self) -> bool {
        matches!(self, Command::Up | Command::Down)
    }
}

/// A single 40-bit protocol message.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Frame(u64);

impl Frame {
    /// Combines a header with a raw command code.
    pub const fn new(header: Header, code: u8) -> Self {
        Self(header.bits() | code as u64)
    }

    /// Wraps raw bits. Anything above bit 39 is discarded.
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits & FRAME_MASK)
    }

    /// Raw frame bits.
    pub const fn bits(&self) -> u64 {
        self.0
    }

    /// The command byte.
    pub const fn code(&self) -> u8 {
        (self.0 & COMMAND_MASK) as u8
    }

    /// Derives the confirmation frame.
    ///
    /// Header and the high nibble of the command are kept, the low nibble is
    /// replaced with its complement. For `up` (`0x11`) this yields `0x1e`.
    pub const fn confirmation(&self) -> Self {
        let code = self.code();
        let confirm = (code & 0xf0) | ((code ^ 0xff) & 0x0f);
        Self((self.0 & !COMMAND_MASK) | confirm as u64)
    }

    /// The 40 payload bits, most significant first.
    pub fn bits_msb_first(&self) -> Bits {
        Bits {
            frame: self.0,
            remaining: FRAME_BITS,
        }
    }

    /// Every pulse of the frame in transmission order: sync, then 40 bits.
    pub fn pulses(&self) -> impl Iterator<Item = Pulse> {
        core::iter::once(SYNC_PULSE).chain(self.bits_msb_first().map(|bit| {
            if bit { BIT_1_PULSE } else { BIT_0_PULSE }
        }))
    }
}

/// Iterator over the payload bits of a [`Frame`], most significant first.
#[derive(Clone, Debug)]
pub struct Bits {
    frame: u64,
    remaining: u32,
}

impl Iterator for Bits {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some((self.frame >> self.remaining) & 1 == 1)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Bits {}
