#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use wallframe_images::gif::lzw;

#[derive(Arbitrary, Debug)]
struct LzwInput {
    min_code_size: u8,
    expected: u16,
    data: Vec<u8>,
}

fuzz_target!(|input: LzwInput| {
    if let Ok(indices) = lzw::decode(input.min_code_size, &input.data, input.expected as usize) {
        assert!(indices.len() <= input.expected as usize);
    }
});
