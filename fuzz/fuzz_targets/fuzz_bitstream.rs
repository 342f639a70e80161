#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use wallframe_core::{BitReader, ByteReader};

#[derive(Arbitrary, Debug)]
struct ReaderInput {
    data: Vec<u8>,
    operations: Vec<Operation>,
}

#[derive(Arbitrary, Debug)]
enum Operation {
    ReadBits(u8),
    ReadU16Le,
    ReadU32Be,
    Skip(u8),
    SubBlocks,
}

fuzz_target!(|input: ReaderInput| {
    let mut bits = BitReader::new(&input.data);
    let mut bytes = ByteReader::new(&input.data);

    for op in input.operations.iter().take(100) {
        match op {
            Operation::ReadBits(n) => {
                let width = (*n % 16) + 1;
                let _ = bits.read_bits(width);
            }
            Operation::ReadU16Le => {
                let _ = bytes.read_u16_le();
            }
            Operation::ReadU32Be => {
                let _ = bytes.read_u32_be();
            }
            Operation::Skip(n) => {
                let _ = bytes.skip(*n as usize);
            }
            Operation::SubBlocks => {
                let _ = bytes.read_sub_blocks();
            }
        }
        assert!(bytes.position() <= input.data.len());
    }
});
