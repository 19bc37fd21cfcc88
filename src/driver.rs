//! Window-by-window driving of a [`Session`].
//!
//! [`ChunkDriver`] reads ASCII into a fixed window, decodes it into a fixed
//! binary block and forwards each block holding payload to a [`Sink`]. Input
//! left unconsumed by an `Unaligned` or full block is offered again before
//! the window is refilled.

#[cfg(feature = "alloc")]
use alloc::vec::Vec;
use core::convert::Infallible;

use log::{trace, warn};
use thiserror::Error;

use crate::processor::{Progress, Session, Status};
use crate::DecodeError;

/// Default ASCII window size.
pub const ASCII_WINDOW: usize = 512;
/// Default binary block size.
pub const BINARY_BLOCK: usize = 256;

pub trait Source {
    type Error;

    /// Reads into `buf` and returns the number of bytes read. 0 means the
    /// input is exhausted.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// One decoded block handed to a [`Sink`].
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    pub address: u32,
    /// Always the full block size, padded with `0xFF` past `payload`.
    pub bytes: &'a [u8],
    pub payload: usize,
}

pub trait Sink {
    type Error;

    fn write_block(&mut self, block: Block<'_>) -> Result<(), Self::Error>;
}

impl Source for &[u8] {
    type Error = Infallible;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let length = self.len().min(buf.len());
        let (head, tail) = self.split_at(length);

        buf[..length].copy_from_slice(head);
        *self = tail;

        Ok(length)
    }
}

impl<T: Source + ?Sized> Source for &mut T {
    type Error = T::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        (**self).read(buf)
    }
}

/// Adapts any [`std::io::Read`] into a [`Source`].
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct ReadSource<R>(pub R);

#[cfg(feature = "std")]
impl<R: std::io::Read> Source for ReadSource<R> {
    type Error = std::io::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        loop {
            match self.0.read(buf) {
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                result => return result,
            }
        }
    }
}

impl<T: Sink + ?Sized> Sink for &mut T {
    type Error = T::Error;

    fn write_block(&mut self, block: Block<'_>) -> Result<(), Self::Error> {
        (**self).write_block(block)
    }
}

/// Collects `(address, payload)` pairs, dropping the padding.
#[cfg(feature = "alloc")]
impl Sink for Vec<(u32, Vec<u8>)> {
    type Error = Infallible;

    fn write_block(&mut self, block: Block<'_>) -> Result<(), Self::Error> {
        self.push((block.address, block.bytes[..block.payload].to_vec()));
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum DriverError<S, K> {
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("source failed: {0:?}")]
    Source(S),
    #[error("sink failed: {0:?}")]
    Sink(K),
    #[error("input ended without an End Of File record")]
    MissingEof,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Blocks forwarded to the sink.
    pub blocks: usize,
    /// Payload bytes in those blocks, padding excluded.
    pub bytes: usize,
}

pub struct ChunkDriver<S, K, const WINDOW: usize = ASCII_WINDOW, const BLOCK: usize = BINARY_BLOCK>
{
    source: S,
    sink: K,
    session: Session,
    window: [u8; WINDOW],
    start: usize,
    end: usize,
    block: [u8; BLOCK],
}

impl<S: Source, K: Sink> ChunkDriver<S, K> {
    /// Driver with a 512 byte window and 256 byte blocks.
    pub fn new(source: S, sink: K) -> Self {
        Self::with_sizes(source, sink)
    }
}

impl<S: Source, K: Sink, const WINDOW: usize, const BLOCK: usize> ChunkDriver<S, K, WINDOW, BLOCK> {
    pub fn with_sizes(source: S, sink: K) -> Self {
        ChunkDriver {
            source,
            sink,
            session: Session::new(),
            window: [0; WINDOW],
            start: 0,
            end: 0,
            block: [0; BLOCK],
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_parts(self) -> (S, K) {
        (self.source, self.sink)
    }

    /// Decodes until the End Of File record.
    pub fn run(&mut self) -> Result<Summary, DriverError<S::Error, K::Error>> {
        let mut summary = Summary::default();

        loop {
            if self.start == self.end {
                self.end = self.source.read(&mut self.window).map_err(DriverError::Source)?;
                self.start = 0;

                if self.end == 0 {
                    return self.drain(summary);
                }
            }

            let progress = self
                .session
                .process(&self.window[self.start..self.end], &mut self.block)
                .map_err(|err| {
                    warn!("aborting decode: {}", err);
                    err
                })?;
            self.start += progress.consumed;

            self.forward(&progress, &mut summary)?;

            if progress.status == Status::Eof {
                return Ok(summary);
            }
        }
    }

    fn drain(&mut self, mut summary: Summary) -> Result<Summary, DriverError<S::Error, K::Error>> {
        loop {
            let progress = self.session.finish(&mut self.block).map_err(|err| {
                warn!("aborting decode at end of input: {}", err);
                err
            })?;

            self.forward(&progress, &mut summary)?;

            if progress.status == Status::Eof {
                return Ok(summary);
            }

            if !self.session.has_pending() {
                warn!("input ended without an End Of File record");
                return Err(DriverError::MissingEof);
            }
        }
    }

    fn forward(
        &mut self,
        progress: &Progress,
        summary: &mut Summary,
    ) -> Result<(), DriverError<S::Error, K::Error>> {
        // `written` counts padding on Eof; the run end does not
        let payload = self
            .session
            .address()
            .last_known_address()
            .wrapping_sub(progress.start_address) as usize;

        if payload == 0 {
            trace!("skipping empty block ({:?})", progress.status);
            return Ok(());
        }

        trace!(
            "block at {:#010x}, {} payload bytes ({:?})",
            progress.start_address,
            payload,
            progress.status
        );

        self.sink
            .write_block(Block {
                address: progress.start_address,
                bytes: &self.block,
                payload,
            })
            .map_err(DriverError::Sink)?;

        summary.blocks += 1;
        summary.bytes += payload;

        Ok(())
    }
}
