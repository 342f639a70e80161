//! Variable-width LZW decompression as used by GIF image data.

use wallframe_core::BitReader;

use crate::error::{ImageError, Result};

/// Smallest accepted minimum code size.
pub const MIN_CODE_SIZE: u8 = 2;
/// Largest accepted minimum code size.
pub const MAX_MIN_CODE_SIZE: u8 = 8;
/// Code width never grows beyond 12 bits.
pub const MAX_CODE_SIZE: u8 = 12;

const MAX_ENTRIES: usize = 1 << MAX_CODE_SIZE;

/// Code-to-string table. Index `i` holds the string for code `i`; the clear
/// and end codes occupy their slots with empty placeholders.
struct Dictionary {
    entries: Vec<Vec<u8>>,
    clear_code: u16,
}

impl Dictionary {
    fn new(clear_code: u16) -> Self {
        let mut dict = Self {
            entries: Vec::with_capacity(MAX_ENTRIES),
            clear_code,
        };
        dict.reset();
        dict
    }

    fn reset(&mut self) {
        self.entries.clear();
        self.entries
            .extend((0..self.clear_code).map(|i| vec![i as u8]));
        self.entries.push(Vec::new());
        self.entries.push(Vec::new());
    }

    fn next_code(&self) -> u16 {
        self.entries.len() as u16
    }

    fn get(&self, code: u16) -> Option<&[u8]> {
        self.entries.get(code as usize).map(Vec::as_slice)
    }

    fn push(&mut self, entry: Vec<u8>) {
        if self.entries.len() < MAX_ENTRIES {
            self.entries.push(entry);
        }
    }
}

/// Upper bound on the initial output buffer, in indices per input byte.
const OUTPUT_RESERVE_RATIO: usize = 8;

fn output_reserve(expected: usize, input_len: usize) -> usize {
    expected.min(input_len.saturating_mul(OUTPUT_RESERVE_RATIO))
}

/// Decode a GIF LZW stream into palette indices.
///
/// Decoding stops at the end code, when the input runs out of whole codes, or
/// as soon as `expected` indices have been produced; the result never holds
/// more than `expected` indices but may hold fewer.
pub fn decode(min_code_size: u8, data: &[u8], expected: usize) -> Result<Vec<u8>> {
    if !(MIN_CODE_SIZE..=MAX_MIN_CODE_SIZE).contains(&min_code_size) {
        return Err(ImageError::MalformedGif(format!(
            "LZW minimum code size {min_code_size}"
        )));
    }

    let clear_code = 1u16 << min_code_size;
    let end_code = clear_code + 1;

    let mut dict = Dictionary::new(clear_code);
    let mut code_size = min_code_size + 1;
    let mut reader = BitReader::new(data);
    let mut output = Vec::with_capacity(output_reserve(expected, data.len()));
    let mut prev_code: Option<u16> = None;

    while output.len() < expected && reader.remaining_bits() >= code_size as usize {
        let code = reader.read_bits(code_size)?;

        if code == clear_code {
            dict.reset();
            code_size = min_code_size + 1;
            prev_code = None;
            continue;
        }
        if code == end_code {
            break;
        }

        let entry = match (dict.get(code), prev_code) {
            (Some(entry), _) => entry.to_vec(),
            (None, Some(prev)) if code == dict.next_code() => {
                let mut entry = dict.entries[prev as usize].clone();
                entry.push(entry[0]);
                entry
            }
            _ => {
                return Err(ImageError::InvalidLzwCode {
                    code,
                    next_code: dict.next_code(),
                })
            }
        };

        output.extend_from_slice(&entry);

        if let Some(prev) = prev_code {
            let mut new_entry = dict.entries[prev as usize].clone();
            new_entry.push(entry[0]);
            dict.push(new_entry);

            if dict.next_code() >= 1 << code_size && code_size < MAX_CODE_SIZE {
                code_size += 1;
            }
        }

        prev_code = Some(code);
    }

    output.truncate(expected);
    Ok(output)
}
