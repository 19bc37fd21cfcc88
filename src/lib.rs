//! A no std, resumable Intel HEX to binary decoder.
//!
//! ASCII input may arrive in chunks of any size, and records may straddle
//! chunk boundaries. Output comes out in fixed-size blocks, each holding one
//! contiguous run of bytes padded with `0xFF`, ready for a flash writer.
//!
//! ```
//! use ihex_stream::{Session, Status};
//!
//! let mut session = Session::new();
//! let mut block = [0u8; 64];
//!
//! let progress = session
//!     .process(b":0400100001020304E2\n:00000001FF\n", &mut block)
//!     .unwrap();
//!
//! assert_eq!(progress.status, Status::Eof);
//! assert_eq!(progress.start_address, 0x10);
//! assert_eq!(&block[..5], &[1, 2, 3, 4, 0xFF]);
//! ```
#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

mod checksum;
mod error;
mod serializer;

pub mod assembler;
pub mod driver;
pub mod processor;
pub mod record;
pub mod types;

pub use assembler::AssemblyState;
#[cfg(feature = "std")]
pub use driver::ReadSource;
pub use driver::{
    Block, ChunkDriver, DriverError, Sink, Source, Summary, ASCII_WINDOW, BINARY_BLOCK,
};
pub use error::DecodeError;
pub use processor::{AddressState, Progress, Session, Status, PAD};
pub use record::{Record, MAX_DATA, MAX_RECORD};
pub use types::RecordType;
