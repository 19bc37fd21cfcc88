use core::str::FromStr;

use crate::checksum::checksum;
use crate::types::{self, RecordType};
use crate::DecodeError;

/// Largest payload a record may carry.
pub const MAX_DATA: usize = 0x20;
/// Largest decoded record: byte count, address, type, payload and checksum.
pub const MAX_RECORD: usize = 1 + 2 + 1 + MAX_DATA + 1;

/// One decoded Intel HEX line.
///
/// Only the first `byte_count` bytes of `payload` are meaningful.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub byte_count: u8,
    pub address: u16,
    pub record_type: u8,
    pub payload: [u8; MAX_DATA],
    pub checksum: u8,
}

impl Record {
    /// Builds a record with a freshly computed checksum.
    pub fn new(record_type: RecordType, address: u16, data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() > MAX_DATA {
            return Err(DecodeError::LineOverrun);
        }

        let mut payload = [0; MAX_DATA];
        payload[..data.len()].copy_from_slice(data);

        let mut record = Record {
            byte_count: data.len() as u8,
            address,
            record_type: record_type.into(),
            payload,
            checksum: 0,
        };

        let mut bytes = [0; MAX_RECORD];
        let length = record.to_bytes(&mut bytes);
        record.checksum = checksum(&bytes[..length - 1]);

        Ok(record)
    }

    /// Decodes the binary form of a line, checksum byte included.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() < 5 {
            return Err(DecodeError::BadLength);
        }

        let byte_count = bytes[0];

        if byte_count as usize > MAX_DATA {
            return Err(DecodeError::LineOverrun);
        }

        if bytes.len() != byte_count as usize + 5 {
            return Err(DecodeError::BadLength);
        }

        let (body, tail) = bytes.split_at(bytes.len() - 1);
        let expected = tail[0];
        let computed = checksum(body);

        if computed != expected {
            return Err(DecodeError::ChecksumFail { computed, expected });
        }

        let mut short = [0; 2];
        short.copy_from_slice(&body[1..3]);
        let address = u16::from_be_bytes(short);

        let mut payload = [0; MAX_DATA];
        payload[..byte_count as usize].copy_from_slice(&body[4..]);

        Ok(Record {
            byte_count,
            address,
            record_type: body[3],
            payload,
            checksum: expected,
        })
    }

    /// Parses a complete ASCII line such as `:00000001FF`.
    ///
    /// Trailing line terminators are ignored.
    pub fn parse<T: AsRef<[u8]>>(line: T) -> Result<Self, DecodeError> {
        let mut line = line.as_ref();

        while let [rest @ .., b'\r' | b'\n'] = line {
            line = rest;
        }

        let line = match line.split_first() {
            Some((b':', rest)) => rest,
            _ => return Err(DecodeError::MissingColon),
        };

        if line.len() % 2 != 0 {
            return Err(DecodeError::BadLength);
        }

        let length = line.len() / 2;

        if length > MAX_RECORD {
            return Err(DecodeError::LineOverrun);
        }

        let mut bytes = [0; MAX_RECORD];

        if hex::decode_to_slice(line, &mut bytes[..length]).is_err() {
            return Err(DecodeError::InvalidDigit);
        }

        Self::from_bytes(&bytes[..length])
    }

    /// Writes the binary form of the record and returns its length.
    pub fn to_bytes(&self, bytes: &mut [u8; MAX_RECORD]) -> usize {
        let data = self.data();
        let length = data.len() + 5;

        bytes[0] = self.byte_count;
        bytes[1..3].copy_from_slice(&self.address.to_be_bytes());
        bytes[3] = self.record_type;
        bytes[4..length - 1].copy_from_slice(data);
        bytes[length - 1] = self.checksum;

        length
    }

    pub fn data(&self) -> &[u8] {
        let length = (self.byte_count as usize).min(MAX_DATA);
        &self.payload[..length]
    }

    pub fn kind(&self) -> RecordType {
        RecordType::from(self.record_type)
    }

    /// Upper 16 bits carried by an Extended Linear Address record.
    pub fn linear_base(&self) -> u16 {
        u16::from_be_bytes([self.payload[0], self.payload[1]])
    }

    pub fn checksum_valid(&self) -> bool {
        let mut bytes = [0; MAX_RECORD];
        let length = self.to_bytes(&mut bytes);

        checksum(&bytes[..length - 1]) == self.checksum
    }

    pub fn is_data(&self) -> bool {
        self.record_type == types::DATA
    }
}

impl FromStr for Record {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Record::parse(s)
    }
}
