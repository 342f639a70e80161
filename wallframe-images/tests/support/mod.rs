#![allow(dead_code)]

//! Fixture builders shared by the integration tests.

use std::collections::HashMap;
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use wallframe_core::BitWriter;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Build a PNG chunk with a zero CRC (the decoder does not check it).
pub fn png_chunk(kind: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 12);
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(data);
    out.extend_from_slice(&[0, 0, 0, 0]);
    out
}

pub fn zlib(raw: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(raw).unwrap();
    encoder.finish().unwrap()
}

/// Build an 8-bit PNG from filtered scanlines (each prefixed by its filter byte).
pub fn png(width: u32, height: u32, color_type: u8, scanlines: &[u8]) -> Vec<u8> {
    let mut ihdr = Vec::new();
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&height.to_be_bytes());
    ihdr.extend_from_slice(&[8, color_type, 0, 0, 0]);

    let mut out = PNG_SIGNATURE.to_vec();
    out.extend(png_chunk(b"IHDR", &ihdr));
    out.extend(png_chunk(b"IDAT", &zlib(scanlines)));
    out.extend(png_chunk(b"IEND", &[]));
    out
}

/// Prefix every `stride`-byte row with filter type 0.
pub fn unfiltered(rows: &[u8], stride: usize) -> Vec<u8> {
    rows.chunks(stride)
        .flat_map(|row| std::iter::once(0).chain(row.iter().copied()))
        .collect()
}

/// Encode indices as an LZW stream that never grows its dictionary: every
/// literal is preceded by a clear code.
pub fn lzw_uncompressed(min_code_size: u8, indices: &[u8]) -> Vec<u8> {
    let clear = 1u16 << min_code_size;
    let width = min_code_size + 1;
    let mut writer = BitWriter::new();
    for &index in indices {
        writer.write_bits(clear, width).unwrap();
        writer.write_bits(index as u16, width).unwrap();
    }
    writer.write_bits(clear + 1, width).unwrap();
    writer.into_data()
}

/// A compressed LZW stream plus the encoder state it finished in.
pub struct LzwStream {
    pub data: Vec<u8>,
    pub final_code_size: u8,
    pub dictionary_len: usize,
}

/// Greedy GIF LZW encoder. Emits one leading clear code and never clears
/// again, so long inputs fill the 4096-entry table and stay at 12 bits.
pub fn lzw_compress(min_code_size: u8, indices: &[u8]) -> LzwStream {
    let clear = 1u16 << min_code_size;
    let mut writer = BitWriter::new();
    let mut code_size = min_code_size + 1;
    let mut table: HashMap<(u16, u8), u16> = HashMap::new();
    let mut next_code = clear + 2;
    // Table size as seen by a decoder, which lags the encoder by one code.
    let mut decoder_next = clear + 2;
    let mut emitted = 0usize;

    writer.write_bits(clear, code_size).unwrap();
    let mut emit = |writer: &mut BitWriter, code: u16, code_size: &mut u8| {
        writer.write_bits(code, *code_size).unwrap();
        if emitted > 0 {
            if decoder_next < 4096 {
                decoder_next += 1;
            }
            if decoder_next >= 1 << *code_size && *code_size < 12 {
                *code_size += 1;
            }
        }
        emitted += 1;
    };

    if let Some((&first, rest)) = indices.split_first() {
        let mut prefix = first as u16;
        for &index in rest {
            match table.get(&(prefix, index)) {
                Some(&code) => prefix = code,
                None => {
                    emit(&mut writer, prefix, &mut code_size);
                    if next_code < 4096 {
                        table.insert((prefix, index), next_code);
                        next_code += 1;
                    }
                    prefix = index as u16;
                }
            }
        }
        emit(&mut writer, prefix, &mut code_size);
    }
    writer.write_bits(clear + 1, code_size).unwrap();

    LzwStream {
        data: writer.into_data(),
        final_code_size: code_size,
        dictionary_len: next_code as usize,
    }
}

/// Deterministic xorshift bytes masked to `mask`.
pub fn noise(len: usize, mut state: u32, mask: u8) -> Vec<u8> {
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8 & mask
        })
        .collect()
}

fn sub_blocks(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    for chunk in data.chunks(255) {
        out.push(chunk.len() as u8);
        out.extend_from_slice(chunk);
    }
    out.push(0);
    out
}

/// Color table padded with black to the next power of two (at least 2).
/// Returns the table bytes and its 3-bit size field.
fn color_table(colors: &[[u8; 3]]) -> (Vec<u8>, u8) {
    let mut size_field = 0u8;
    while (2usize << size_field) < colors.len() {
        size_field += 1;
    }
    let mut bytes: Vec<u8> = colors.iter().flatten().copied().collect();
    bytes.resize((2usize << size_field) * 3, 0);
    (bytes, size_field)
}

/// Image block placement and options.
#[derive(Debug, Clone, Copy, Default)]
pub struct Block<'a> {
    pub left: u16,
    pub top: u16,
    pub width: u16,
    pub height: u16,
    pub local_table: Option<&'a [[u8; 3]]>,
    pub interlaced: bool,
}

impl<'a> Block<'a> {
    pub fn at(left: u16, top: u16, width: u16, height: u16) -> Self {
        Self {
            left,
            top,
            width,
            height,
            ..Self::default()
        }
    }
}

/// Incremental GIF89a writer for test fixtures.
pub struct GifBuilder {
    data: Vec<u8>,
}

impl GifBuilder {
    pub fn new(width: u16, height: u16, global_table: Option<&[[u8; 3]]>, background: u8) -> Self {
        let mut data = b"GIF89a".to_vec();
        data.extend_from_slice(&width.to_le_bytes());
        data.extend_from_slice(&height.to_le_bytes());
        match global_table {
            Some(colors) => {
                let (table, size_field) = color_table(colors);
                data.extend_from_slice(&[0x80 | size_field, background, 0]);
                data.extend(table);
            }
            None => data.extend_from_slice(&[0, background, 0]),
        }
        Self { data }
    }

    pub fn graphic_control(mut self, disposal: u8, transparent: Option<u8>, delay_cs: u16) -> Self {
        let flags = (disposal & 0x07) << 2 | transparent.is_some() as u8;
        self.data.extend_from_slice(&[0x21, 0xF9, 4, flags]);
        self.data.extend_from_slice(&delay_cs.to_le_bytes());
        self.data.extend_from_slice(&[transparent.unwrap_or(0), 0]);
        self
    }

    pub fn comment(mut self, text: &[u8]) -> Self {
        self.data.extend_from_slice(&[0x21, 0xFE]);
        self.data.extend(sub_blocks(text));
        self
    }

    /// Append an image block whose `indices` are in storage order.
    pub fn image(mut self, block: Block<'_>, indices: &[u8]) -> Self {
        self.data.push(0x2C);
        for value in [block.left, block.top, block.width, block.height] {
            self.data.extend_from_slice(&value.to_le_bytes());
        }

        let mut flags = if block.interlaced { 0x40 } else { 0 };
        let table = block.local_table.map(color_table);
        if let Some((_, size_field)) = &table {
            flags |= 0x80 | size_field;
        }
        self.data.push(flags);
        if let Some((bytes, _)) = table {
            self.data.extend(bytes);
        }

        let max_index = indices.iter().copied().max().unwrap_or(0);
        let min_code_size = if max_index < 4 { 2 } else { 8 };
        self.data.push(min_code_size);
        self.data
            .extend(sub_blocks(&lzw_uncompressed(min_code_size, indices)));
        self
    }

    /// Raw bytes appended verbatim.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.data.push(0x3B);
        self.data
    }

    pub fn finish_without_trailer(self) -> Vec<u8> {
        self.data
    }
}
