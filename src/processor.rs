//! Record dispatch, address tracking and binary block assembly.
//!
//! A [`Session`] turns ASCII chunks into fixed-size binary blocks. Each call
//! to [`Session::process`] fills one caller-supplied block with a single
//! contiguous run of payload bytes and pads the rest with [`PAD`].
//!
//! A Data record that cannot go into the current block is carried: either it
//! does not continue the run (`Unaligned`), or it does not fit. The carried
//! record is written first on the next call, so the caller only needs to offer
//! the input that was not consumed.

use log::{debug, trace};

use crate::assembler::AssemblyState;
use crate::record::{Record, MAX_DATA};
use crate::types::RecordType;
use crate::DecodeError;

/// Fill value for block bytes not covered by payload.
pub const PAD: u8 = 0xFF;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Block is done; call again with the unconsumed input or the next chunk.
    Ok,
    /// End Of File record seen, the block is fully padded.
    Eof,
    /// The next Data record does not continue the current run. It is carried
    /// into the next call.
    Unaligned,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub status: Status,
    /// ASCII bytes consumed from the chunk.
    pub consumed: usize,
    /// Payload bytes at the start of the block. The full capacity on `Eof`.
    pub written: usize,
    /// Absolute address of the block's first byte.
    pub start_address: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressState {
    upper: u16,
    last_known: u32,
    carried: Option<Record>,
}

impl AddressState {
    pub const fn new() -> Self {
        AddressState {
            upper: 0,
            last_known: 0,
            carried: None,
        }
    }

    /// Address the next contiguous Data record must start at.
    pub fn last_known_address(&self) -> u32 {
        self.last_known
    }

    /// Base set by the last Extended Linear Address record.
    pub fn linear_base(&self) -> u32 {
        u32::from(self.upper) << 16
    }

    pub fn carried(&self) -> Option<&Record> {
        self.carried.as_ref()
    }

    fn locate(&self, record: &Record) -> u32 {
        self.linear_base() | u32::from(record.address)
    }

    fn append(&mut self, record: &Record, bin: &mut [u8], written: &mut usize) {
        let data = record.data();

        bin[*written..*written + data.len()].copy_from_slice(data);
        *written += data.len();
        self.last_known = self.last_known.wrapping_add(data.len() as u32);
    }

    fn replay(&mut self, bin: &mut [u8], written: &mut usize) {
        if let Some(record) = self.carried.take() {
            self.last_known = self.locate(&record);
            debug!("replaying carried record at {:#010x}", self.last_known);
            self.append(&record, bin, written);
        }
    }

    /// Applies one record. Returns the status to stop with, if any.
    fn dispatch(&mut self, record: Record, bin: &mut [u8], written: &mut usize) -> Option<Status> {
        match record.kind() {
            RecordType::Data => {
                let address = self.locate(&record);

                if address != self.last_known {
                    if *written > 0 {
                        debug!(
                            "unaligned record at {:#010x}, run ends at {:#010x}",
                            address, self.last_known
                        );
                        self.carried = Some(record);
                        return Some(Status::Unaligned);
                    }

                    debug!("starting run at {:#010x}", address);
                    self.last_known = address;
                }

                if *written + record.data().len() > bin.len() {
                    debug!("block full, carrying record at {:#010x}", address);
                    self.carried = Some(record);
                    return Some(Status::Ok);
                }

                self.append(&record, bin, written);
                None
            }
            RecordType::EndOfFile => {
                debug!("end of file, run ends at {:#010x}", self.last_known);
                Some(Status::Eof)
            }
            RecordType::ExtendedLinearAddress => {
                self.upper = record.linear_base();
                debug!("linear base {:#010x}", self.linear_base());
                None
            }
            other => {
                trace!("ignoring {:?} record", other);
                None
            }
        }
    }

    fn close(&self, status: Status, consumed: usize, bin: &mut [u8], written: usize) -> Progress {
        bin[written..].fill(PAD);

        let start_address = self.last_known.wrapping_sub(written as u32);
        let written = match status {
            Status::Eof => bin.len(),
            _ => written,
        };

        Progress {
            status,
            consumed,
            written,
            start_address,
        }
    }
}

/// One decode session: the line assembler and the address tracker.
///
/// Sessions are independent; decoding two images needs two sessions.
#[derive(Debug, Clone, Default)]
pub struct Session {
    assembly: AssemblyState,
    address: AddressState,
}

impl Session {
    pub const fn new() -> Self {
        Session {
            assembly: AssemblyState::new(),
            address: AddressState::new(),
        }
    }

    /// Decodes `ascii` into `bin`, whose length is the block capacity.
    ///
    /// Stops after the line that produced a terminal status. Otherwise the
    /// whole chunk is consumed and the status is `Ok`. A carried record from
    /// the previous call is written before any new input is looked at.
    ///
    /// Errors are fatal for the session and come with no block.
    pub fn process(&mut self, ascii: &[u8], bin: &mut [u8]) -> Result<Progress, DecodeError> {
        if bin.len() < MAX_DATA {
            return Err(DecodeError::BufferTooSmall);
        }

        let mut written = 0;
        self.address.replay(bin, &mut written);

        for (index, &byte) in ascii.iter().enumerate() {
            let line = match self.assembly.push(byte) {
                Some(line) => line?,
                None => continue,
            };

            let record = Record::from_bytes(line)?;

            if let Some(status) = self.address.dispatch(record, bin, &mut written) {
                return Ok(self.address.close(status, index + 1, bin, written));
            }
        }

        Ok(self.address.close(Status::Ok, ascii.len(), bin, written))
    }

    /// Signals end of input.
    ///
    /// A line still in progress is terminated, so an image whose last record
    /// lacks a line ending still reaches `Eof`. Call again while
    /// [`Session::has_pending`] is true.
    pub fn finish(&mut self, bin: &mut [u8]) -> Result<Progress, DecodeError> {
        let input: &[u8] = if self.assembly.is_idle() { b"" } else { b"\n" };

        let mut progress = self.process(input, bin)?;
        progress.consumed = 0;

        Ok(progress)
    }

    /// True while a line is in progress or a record is carried.
    pub fn has_pending(&self) -> bool {
        !self.assembly.is_idle() || self.address.carried.is_some()
    }

    pub fn reset(&mut self) {
        self.assembly.reset();
        self.address = AddressState::new();
    }

    pub fn assembly(&self) -> &AssemblyState {
        &self.assembly
    }

    pub fn address(&self) -> &AddressState {
        &self.address
    }
}
