//! Byte-at-a-time assembly of ASCII Intel HEX lines.
//!
//! All state lives in [`AssemblyState`], so a line may start in one input
//! chunk and end in a later one.

use crate::record::MAX_RECORD;
use crate::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// No line in progress; also the state after a line was dispatched.
    AwaitingStart,
    InLine,
    Overrun,
    Invalid,
}

#[derive(Debug, Clone)]
pub struct AssemblyState {
    buffer: [u8; MAX_RECORD],
    index: usize,
    high: Option<u8>,
    phase: Phase,
}

impl AssemblyState {
    pub const fn new() -> Self {
        AssemblyState {
            buffer: [0; MAX_RECORD],
            index: 0,
            high: None,
            phase: Phase::AwaitingStart,
        }
    }

    /// Consumes one ASCII byte.
    ///
    /// Returns `Some` on the first terminator of a started line, carrying the
    /// decoded binary line. Every other byte, including a second terminator,
    /// returns `None`.
    pub fn push(&mut self, byte: u8) -> Option<Result<&[u8], DecodeError>> {
        match byte {
            b':' => {
                self.start();
                None
            }
            b'\r' | b'\n' => self.terminate(),
            digit if digit.is_ascii_hexdigit() => {
                self.digit(digit);
                None
            }
            _ => None,
        }
    }

    /// True when no line is in progress.
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::AwaitingStart
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn start(&mut self) {
        self.buffer = [0; MAX_RECORD];
        self.index = 0;
        self.high = None;
        self.phase = Phase::InLine;
    }

    fn digit(&mut self, digit: u8) {
        if self.phase != Phase::InLine {
            return;
        }

        if self.index == MAX_RECORD {
            self.phase = Phase::Overrun;
            return;
        }

        match self.high.take() {
            None => self.high = Some(digit),
            Some(high) => {
                let mut byte = [0];

                match hex::decode_to_slice([high, digit], &mut byte) {
                    Ok(()) => {
                        self.buffer[self.index] = byte[0];
                        self.index += 1;
                    }
                    Err(_) => self.phase = Phase::Invalid,
                }
            }
        }
    }

    fn terminate(&mut self) -> Option<Result<&[u8], DecodeError>> {
        match core::mem::replace(&mut self.phase, Phase::AwaitingStart) {
            Phase::AwaitingStart => None,
            Phase::Overrun => Some(Err(DecodeError::LineOverrun)),
            Phase::Invalid => Some(Err(DecodeError::InvalidDigit)),
            Phase::InLine if self.high.is_some() => Some(Err(DecodeError::BadLength)),
            Phase::InLine => Some(Ok(&self.buffer[..self.index])),
        }
    }
}

impl Default for AssemblyState {
    fn default() -> Self {
        Self::new()
    }
}
