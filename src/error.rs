use thiserror::Error;

/// Reasons a record or a decode session cannot continue.
///
/// None of these are retried: they describe invalid input, not a transient
/// condition.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("record does not start with ':'")]
    MissingColon,
    #[error("record contains a non-hex digit")]
    InvalidDigit,
    #[error("record length does not match its byte count")]
    BadLength,
    #[error("record exceeds the maximum record length")]
    LineOverrun,
    #[error("bad checksum: computed {computed:#04x}, record has {expected:#04x}")]
    ChecksumFail { computed: u8, expected: u8 },
    #[error("output buffer is too small")]
    BufferTooSmall,
}
