//! Frame encoder.
//!
//! Translates a 40-bit [`Frame`] into its 41 on-air pulses and hands them to a
//! [`PulseSink`]. Knows nothing about commands, headers or repetition.

use crate::frame::Frame;
use crate::pulse::PulseSink;

/// Transmits one frame: a sync pulse followed by the 40 payload bits, MSB first.
///
/// Stops at the first sink error. The remainder of the frame is not sent.
pub fn transmit_frame<S: PulseSink>(sink: &mut S, frame: Frame) -> Result<(), S::Error> {
    trace!("frame {:#x}", frame.bits());
    for pulse in frame.pulses() {
        sink.emit(pulse)?;
    }
    Ok(())
}
