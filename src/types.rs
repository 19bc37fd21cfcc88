pub const DATA: u8 = 0x00;
pub const END_OF_FILE: u8 = 0x01;
pub const EXTENDED_SEGMENT_ADDRESS: u8 = 0x02;
pub const START_SEGMENT_ADDRESS: u8 = 0x03;
pub const EXTENDED_LINEAR_ADDRESS: u8 = 0x04;
pub const START_LINEAR_ADDRESS: u8 = 0x05;

/// Typed view of a record's type byte.
///
/// Only `Data`, `EndOfFile` and `ExtendedLinearAddress` affect decoding, the
/// rest are consumed without effect. Unknown values are kept as-is.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    Data,
    EndOfFile,
    ExtendedSegmentAddress,
    StartSegmentAddress,
    ExtendedLinearAddress,
    StartLinearAddress,
    Unknown(u8),
}

impl From<u8> for RecordType {
    fn from(value: u8) -> Self {
        match value {
            DATA => Self::Data,
            END_OF_FILE => Self::EndOfFile,
            EXTENDED_SEGMENT_ADDRESS => Self::ExtendedSegmentAddress,
            START_SEGMENT_ADDRESS => Self::StartSegmentAddress,
            EXTENDED_LINEAR_ADDRESS => Self::ExtendedLinearAddress,
            START_LINEAR_ADDRESS => Self::StartLinearAddress,
            other => Self::Unknown(other),
        }
    }
}

impl From<RecordType> for u8 {
    fn from(value: RecordType) -> Self {
        match value {
            RecordType::Data => DATA,
            RecordType::EndOfFile => END_OF_FILE,
            RecordType::ExtendedSegmentAddress => EXTENDED_SEGMENT_ADDRESS,
            RecordType::StartSegmentAddress => START_SEGMENT_ADDRESS,
            RecordType::ExtendedLinearAddress => EXTENDED_LINEAR_ADDRESS,
            RecordType::StartLinearAddress => START_LINEAR_ADDRESS,
            RecordType::Unknown(other) => other,
        }
    }
}
