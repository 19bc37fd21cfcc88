#![cfg(feature = "std")]

use std::collections::BTreeMap;
use std::convert::Infallible;

use ihex_stream::{
    AssemblyState, Block, ChunkDriver, Record, RecordType, Sink, Source, MAX_DATA, PAD,
};
use proptest::prelude::*;

/// Cortex-M0 image, ending without a final line terminator.
const FIRMWARE: &str = ":020000040000FA\n\
    :10000000C0070000D1060000D1000000B1060000CA\n\
    :1000100000000000000000000000000000000000E0\n\
    :100020000000000000000000000000005107000078\n\
    :100030000000000000000000DB000000E500000000\n\
    :10004000EF000000F9000000030100000D010000B6\n\
    :1000500017010000210100002B0100003501000004\n\
    :100060003F01000049010000530100005D01000054\n\
    :1000700067010000710100007B01000085010000A4\n\
    :100080008F01000099010000A3010000AD010000F4\n\
    :10009000B7010000C1010000CB010000D501000044\n\
    :1000A000DF010000E9010000F3010000FD01000094\n\
    :1000B00007020000110200001B02000025020000E0\n\
    :1000C0001FB5C046C04600F0EFFA04B00FB41FBD24\n\
    :1000D00008205A49096809580847382057490968CB\n\
    :1000E000095808473C2055490968095808474020E5\n\
    :1000F0005249096809580847442050490968095875\n\
    :10010000084748204D490968095808474C204B4981\n\
    :10011000096809580847502048490968095808479C\n\
    :100120005420464909680958084758204349096836\n\
    :10013000095808475C204149096809580847602068\n\
    :100140003E4909680958084764203C49096809582C\n\
    :100150000847682039490968095808476C20374919\n\
    :100160000968095808477020344909680958084740\n\
    :100170007420324909680958084778202F490968CE\n\
    :10018000095808477C202D490968095808478020EC\n\
    :100190002A490968095808478420284909680958E4\n\
    :1001A0000847882025490968095808478C202349B1\n\
    :1001B00009680958084790202049096809580847E4\n\
    :1001C00094201E4909680958084798201B49096866\n\
    :1001D000095808479C201949096809580847A02070\n\
    :1001E0001649096809580847A4201449096809589C\n\
    :1001F0000847A8201149096809580847AC200F4949\n\
    :10020000096809580847B0200C4909680958084787\n\
    :10021000B4200A49096809580847B82007490968FD\n\
    :1002200009580847BC2005490968095808470000D3\n\
    :00000001FF";

const FIRMWARE_LEN: usize = 0x230;

/// Line-at-a-time decode used as the expected image.
fn reference(text: &str) -> BTreeMap<u32, u8> {
    let mut image = BTreeMap::new();
    let mut base = 0u32;

    for line in text.lines().filter(|line| !line.is_empty()) {
        let record = Record::parse(line).unwrap();

        match record.kind() {
            RecordType::Data => {
                for (offset, &byte) in record.data().iter().enumerate() {
                    image.insert(base + u32::from(record.address) + offset as u32, byte);
                }
            }
            RecordType::ExtendedLinearAddress => base = u32::from(record.linear_base()) << 16,
            _ => {}
        }
    }

    image
}

#[derive(Default)]
struct Flash {
    image: BTreeMap<u32, u8>,
    blocks: usize,
}

impl Sink for Flash {
    type Error = Infallible;

    fn write_block(&mut self, block: Block<'_>) -> Result<(), Self::Error> {
        assert!(block.bytes[block.payload..].iter().all(|&byte| byte == PAD));

        for (offset, &byte) in block.bytes[..block.payload].iter().enumerate() {
            let previous = self.image.insert(block.address + offset as u32, byte);
            assert_eq!(previous, None, "byte written twice");
        }

        self.blocks += 1;
        Ok(())
    }
}

/// Hands out input in the given read sizes, cycling through them.
struct Chunked<'a> {
    input: &'a [u8],
    sizes: Vec<usize>,
    next: usize,
}

impl Source for Chunked<'_> {
    type Error = Infallible;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let size = self.sizes[self.next % self.sizes.len()].min(buf.len());
        self.next += 1;

        let length = size.min(self.input.len());
        buf[..length].copy_from_slice(&self.input[..length]);
        self.input = &self.input[length..];

        Ok(length)
    }
}

fn decode<const WINDOW: usize, const BLOCK: usize>(text: &str) -> Flash {
    let mut flash = Flash::default();
    let mut driver = ChunkDriver::<_, _, WINDOW, BLOCK>::with_sizes(text.as_bytes(), &mut flash);

    let summary = driver.run().unwrap();
    assert_eq!(summary.bytes, FIRMWARE_LEN);
    drop(driver);

    flash
}

#[test]
fn firmware_default_sizes() {
    let mut flash = Flash::default();
    let mut driver = ChunkDriver::new(FIRMWARE.as_bytes(), &mut flash);

    let summary = driver.run().unwrap();
    drop(driver);

    assert_eq!(summary.bytes, FIRMWARE_LEN);
    assert_eq!(summary.blocks, flash.blocks);
    assert_eq!(flash.image, reference(FIRMWARE));
}

#[test]
fn firmware_window_and_block_sizes() {
    let expected = reference(FIRMWARE);

    assert_eq!(decode::<1, 32>(FIRMWARE).image, expected);
    assert_eq!(decode::<37, 32>(FIRMWARE).image, expected);
    assert_eq!(decode::<100, 48>(FIRMWARE).image, expected);
    assert_eq!(decode::<512, 64>(FIRMWARE).image, expected);
    assert_eq!(decode::<4096, 1024>(FIRMWARE).image, expected);
}

#[test]
fn firmware_in_one_large_block() {
    let flash = decode::<4096, 1024>(FIRMWARE);

    assert_eq!(flash.blocks, 1);
}

#[test]
fn crlf_and_lower_case() {
    let text = FIRMWARE.to_lowercase().replace('\n', "\r\n");

    assert_eq!(decode::<512, 256>(&text).image, reference(FIRMWARE));
}

fn record_type() -> impl Strategy<Value = RecordType> {
    prop_oneof![
        Just(RecordType::Data),
        Just(RecordType::EndOfFile),
        Just(RecordType::ExtendedSegmentAddress),
        Just(RecordType::StartSegmentAddress),
        Just(RecordType::ExtendedLinearAddress),
        Just(RecordType::StartLinearAddress),
        (6u8..).prop_map(RecordType::Unknown),
    ]
}

proptest! {
    #[test]
    fn arbitrary_read_sizes(sizes in prop::collection::vec(1usize..600, 1..16)) {
        let mut flash = Flash::default();
        let source = Chunked { input: FIRMWARE.as_bytes(), sizes, next: 0 };
        let mut driver = ChunkDriver::new(source, &mut flash);

        let summary = driver.run().unwrap();
        drop(driver);

        prop_assert_eq!(summary.bytes, FIRMWARE_LEN);
        prop_assert_eq!(flash.image, reference(FIRMWARE));
    }

    #[test]
    fn serialized_records_reassemble(
        kind in record_type(),
        address: u16,
        data in prop::collection::vec(any::<u8>(), 0..=MAX_DATA),
    ) {
        let record = Record::new(kind, address, &data).unwrap();
        let mut text = [0; 0x100];
        let length = record.serialize(&mut text).unwrap();

        let mut state = AssemblyState::new();
        for &byte in &text[..length] {
            prop_assert!(state.push(byte).is_none());
        }
        let line = state.push(b'\n').unwrap().unwrap();

        prop_assert_eq!(Record::from_bytes(line), Ok(record));
    }
}
