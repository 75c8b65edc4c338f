//! Constants used across the Dooya protocol implementation.
//!
//! This module defines the pulse timings, gaps, command codes and header
//! layout of the 433 MHz shutter remote protocol.
//!
//! These values were measured on a genuine handheld remote with a scope and must
//! be reproduced bit-exact: the motor silently drops any frame whose pulse
//! widths or bit layout deviate.
//!
//! ## Key Concepts
//!
//! - **Pulses**: Every symbol on air is a high period followed by a low period.
//! - **Sync**: A long pulse that marks the start of every 40-bit frame.
//! - **Gaps**: Fixed low periods between repeated frames and between button presses.
//! - **Header**: The upper 32 bits of a frame, derived from remote id and channel.
//! - **Commands**: The low 8 bits of a frame.
//!
//! ## Timing table
//!
//! | Element | High (µs) | Low (µs) |
//! |---------|-----------|----------|
//! | sync    |      4500 |     1400 |
//! | bit 0   |       320 |      620 |
//! | bit 1   |       620 |      320 |

use crate::pulse::Pulse;

/// Pulse preceding every frame.
pub const SYNC_PULSE: Pulse = Pulse::new(4_500, 1_400);

/// Pulse encoding a `0` bit (short high, long low).
pub const BIT_0_PULSE: Pulse = Pulse::new(320, 620);

/// Pulse encoding a `1` bit (long high, short low).
pub const BIT_1_PULSE: Pulse = Pulse::new(620, 320);

/// Low period after every transmitted frame, in microseconds.
pub const SEQUENCE_GAP_US: u32 = 7_400;

/// Low period between two simulated button presses, in microseconds.
pub const PRESS_GAP_US: u32 = 20_000;

/// Low period before the final press of a composite gesture, in microseconds.
///
/// Five times [`PRESS_GAP_US`].
pub const GESTURE_SETTLE_US: u32 = 5 * PRESS_GAP_US;

/// Number of frames sent per frame pass.
///
/// Six repeats is the lowest count that was observed to be received reliably.
pub const DEFAULT_REPEAT: u8 = 6;

/// Number of payload bits in one frame.
pub const FRAME_BITS: u32 = 40;

/// Mask selecting the 40 payload bits of a frame.
pub const FRAME_MASK: u64 = (1 << FRAME_BITS) - 1;

/// Number of pulses emitted per frame: one sync pulse plus one pulse per bit.
pub const PULSES_PER_FRAME: usize = FRAME_BITS as usize + 1;

/// Protocol marker placed in the top byte (bits 32..=39) of every header.
pub const HEADER_PREFIX: u64 = 0x1f;

/// Constant marker OR'd into bits 12..=19 of every header.
///
/// It overlays the low nibble of the remote id. Real remotes do the same.
pub const HEADER_MARKER: u64 = 0xff;

/// Bit offset of [`HEADER_PREFIX`].
pub const HEADER_PREFIX_SHIFT: u32 = 32;

/// Bit offset of the 16-bit remote id.
pub const REMOTE_ID_SHIFT: u32 = 16;

/// Bit offset of [`HEADER_MARKER`].
pub const HEADER_MARKER_SHIFT: u32 = 12;

/// Bit offset of the 4-bit channel.
pub const CHANNEL_SHIFT: u32 = 8;

/// Mask applied to the channel before it is shifted into place.
pub const CHANNEL_MASK: u8 = 0x0f;

/// Mask of the command byte within a frame (bits 0..=7).
pub const COMMAND_MASK: u64 = 0xff;

/// Remote id used when none is given.
pub const DEFAULT_REMOTE_ID: u16 = 0x42;

/// Channel used when none is given.
pub const DEFAULT_CHANNEL: u8 = 1;

/// Command code: raise the shutter. `0001 0001`
pub const COMMAND_UP: u8 = 0x11;

/// Command code: lower the shutter. `0011 0011`
pub const COMMAND_DOWN: u8 = 0x33;

/// Command code: stop the motor. `0101 0101`
pub const COMMAND_STOP: u8 = 0x55;

/// Command code: enter learn (pairing) mode. `1100 1100`
pub const COMMAND_LEARN: u8 = 0xcc;
