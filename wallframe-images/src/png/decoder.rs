//! PNG decoder implementation.

use std::io::Read;

use flate2::read::ZlibDecoder;
use tracing::{debug, trace};
use wallframe_core::ByteReader;

use super::filter::{unfilter_row, FilterType};
use super::{ChunkType, ColorType, PngHeader, IHDR_LENGTH, PNG_SIGNATURE};
use crate::config::DecoderConfig;
use crate::error::{ImageError, Result};
use crate::image::{pack_argb, Frame, Image};

/// PNG decoder.
///
/// Holds configuration only; every call to [`PngDecoder::decode`] owns its
/// scratch buffers.
#[derive(Debug, Clone, Default)]
pub struct PngDecoder {
    config: DecoderConfig,
}

/// A chunk borrowed from the input buffer.
struct Chunk<'a> {
    kind: ChunkType,
    data: &'a [u8],
    offset: usize,
}

impl PngDecoder {
    /// Create a new PNG decoder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new PNG decoder with custom configuration.
    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Get the decoder configuration.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode a PNG image into a single-frame [`Image`].
    pub fn decode(&self, data: &[u8]) -> Result<Image> {
        if data.len() < PNG_SIGNATURE.len() || data[..PNG_SIGNATURE.len()] != PNG_SIGNATURE {
            return Err(ImageError::NotPng);
        }

        let (header, compressed) = read_chunks(data)?;
        self.config.check_dimensions(header.width, header.height)?;

        let raw = inflate(&compressed, header.expected_data_len())?;
        let pixels = reconstruct(&header, &raw)?;

        debug!(
            width = header.width,
            height = header.height,
            color_type = ?header.color_type,
            compressed_len = compressed.len(),
            "Decoded PNG"
        );

        Image::new(
            header.width,
            header.height,
            vec![Frame::new(self.config.default_frame_duration_ms, pixels)],
        )
    }
}

/// Read one `length + type + data + crc` chunk. The CRC is skipped unchecked.
fn read_chunk<'a>(reader: &mut ByteReader<'a>) -> Result<Chunk<'a>> {
    let offset = reader.position();
    let truncated = |chunk: String| ImageError::TruncatedChunk { chunk, offset };

    let (length, kind) = match (reader.read_u32_be(), reader.read_array::<4>()) {
        (Ok(length), Ok(kind)) => (length as usize, ChunkType::new(kind)),
        _ => return Err(truncated("????".into())),
    };

    let data = reader
        .read_bytes(length)
        .map_err(|_| truncated(kind.to_string()))?;
    reader.skip(4).map_err(|_| truncated(kind.to_string()))?;

    Ok(Chunk { kind, data, offset })
}

/// Walk the chunk stream: parse IHDR and gather IDAT payloads up to IEND.
fn read_chunks(data: &[u8]) -> Result<(PngHeader, Vec<u8>)> {
    let mut reader = ByteReader::with_position(data, PNG_SIGNATURE.len());
    let mut header: Option<PngHeader> = None;
    let mut compressed = Vec::new();

    while !reader.is_eof() {
        let chunk = read_chunk(&mut reader)?;
        trace!(chunk = %chunk.kind, offset = chunk.offset, len = chunk.data.len(), "PNG chunk");

        if header.is_none() {
            if chunk.kind != ChunkType::IHDR {
                return Err(ImageError::UnsupportedPng(format!(
                    "first chunk is {}, expected IHDR",
                    chunk.kind
                )));
            }
            if chunk.data.len() < IHDR_LENGTH {
                return Err(ImageError::TruncatedChunk {
                    chunk: chunk.kind.to_string(),
                    offset: chunk.offset,
                });
            }
            if chunk.data.len() > IHDR_LENGTH {
                return Err(ImageError::UnsupportedPng(format!(
                    "IHDR length {}",
                    chunk.data.len()
                )));
            }
            header = Some(PngHeader::parse(chunk.data)?);
            continue;
        }

        match chunk.kind {
            ChunkType::IDAT => compressed.extend_from_slice(chunk.data),
            ChunkType::IEND => break,
            _ => {}
        }
    }

    let header = header.ok_or_else(|| ImageError::UnsupportedPng("missing IHDR".into()))?;
    Ok((header, compressed))
}

/// Upper bound on the initial inflate buffer, as a multiple of the input size.
const INFLATE_RESERVE_RATIO: usize = 4;

/// Initial capacity for inflated data; the buffer grows past it as needed.
fn inflate_reserve(expected: usize, compressed_len: usize) -> usize {
    expected.min(compressed_len.saturating_mul(INFLATE_RESERVE_RATIO))
}

/// Inflate the zlib stream, requiring exactly `expected` output bytes.
fn inflate(compressed: &[u8], expected: usize) -> Result<Vec<u8>> {
    let mut raw = Vec::with_capacity(inflate_reserve(expected, compressed.len()));
    // One extra byte is enough to detect an oversized stream.
    ZlibDecoder::new(compressed)
        .take(expected as u64 + 1)
        .read_to_end(&mut raw)
        .map_err(|e| ImageError::CorruptCompressedData(e.to_string()))?;

    if raw.len() != expected {
        return Err(ImageError::CorruptCompressedData(format!(
            "inflated {} bytes, expected {}",
            raw.len(),
            expected
        )));
    }
    Ok(raw)
}

/// Reverse the row filters and expand every row to ARGB32.
fn reconstruct(header: &PngHeader, raw: &[u8]) -> Result<Vec<u32>> {
    let stride = header.stride();
    let bytes_per_pixel = header.color_type.bytes_per_pixel();

    let mut pixels = Vec::with_capacity(header.width as usize * header.height as usize);
    let mut previous = vec![0u8; stride];
    let mut current = vec![0u8; stride];

    for (y, line) in raw.chunks_exact(stride + 1).enumerate() {
        let filter_type = FilterType::from_u8(line[0]).ok_or_else(|| {
            ImageError::UnsupportedPng(format!("filter type {} on row {}", line[0], y))
        })?;

        current.copy_from_slice(&line[1..]);
        unfilter_row(filter_type, &mut current, &previous, bytes_per_pixel);
        expand_row(&current, header.color_type, &mut pixels);

        std::mem::swap(&mut previous, &mut current);
    }

    Ok(pixels)
}

/// Append one reconstructed row as ARGB32; RGB rows get alpha 255.
fn expand_row(row: &[u8], color_type: ColorType, out: &mut Vec<u32>) {
    match color_type {
        ColorType::Rgb => out.extend(
            row.chunks_exact(3)
                .map(|px| pack_argb(0xFF, px[0], px[1], px[2])),
        ),
        ColorType::Rgba => out.extend(
            row.chunks_exact(4)
                .map(|px| pack_argb(px[3], px[0], px[1], px[2])),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn chunk(kind: &[u8; 4], data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(kind);
        out.extend_from_slice(data);
        out.extend_from_slice(&[0, 0, 0, 0]);
        out
    }

    fn ihdr(width: u32, height: u32, color_type: u8) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&[8, color_type, 0, 0, 0]);
        chunk(b"IHDR", &data)
    }

    fn zlib(raw: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(raw).unwrap();
        encoder.finish().unwrap()
    }

    fn png(width: u32, height: u32, color_type: u8, raw: &[u8]) -> Vec<u8> {
        let mut out = PNG_SIGNATURE.to_vec();
        out.extend(ihdr(width, height, color_type));
        out.extend(chunk(b"IDAT", &zlib(raw)));
        out.extend(chunk(b"IEND", &[]));
        out
    }

    #[test]
    fn test_inflate_reserve_follows_input() {
        assert_eq!(inflate_reserve(100, 10), 40);
        assert_eq!(inflate_reserve(100, 1000), 100);
        assert_eq!(inflate_reserve(1 << 28, 20), 80);
        assert_eq!(inflate_reserve(1 << 20, usize::MAX), 1 << 20);
    }

    #[test]
    fn test_tiny_stream_with_huge_header() {
        // 8192x8192 RGBA fits the default pixel limit; the stream holds one row.
        let width = 8192u32;
        let row = vec![0u8; width as usize * 4 + 1];
        let data = png(width, width, 6, &row);
        assert!(data.len() < 1024);
        assert!(matches!(
            PngDecoder::new().decode(&data),
            Err(ImageError::CorruptCompressedData(_))
        ));
    }

    #[test]
    fn test_invalid_signature() {
        let decoder = PngDecoder::new();
        assert_eq!(decoder.decode(&[0, 1, 2, 3, 4, 5, 6, 7]), Err(ImageError::NotPng));
        assert_eq!(decoder.decode(&PNG_SIGNATURE[..4]), Err(ImageError::NotPng));
    }

    #[test]
    fn test_decode_rgb_black_white() {
        let data = png(2, 1, 2, &[0, 0, 0, 0, 255, 255, 255]);
        let image = PngDecoder::new().decode(&data).unwrap();
        assert_eq!(image.width(), 2);
        assert_eq!(image.height(), 1);
        assert_eq!(image.frames().len(), 1);
        assert_eq!(image.frames()[0].duration_ms(), 100);
        assert_eq!(image.frames()[0].pixels(), &[0xFF00_0000, 0xFFFF_FFFF]);
    }

    #[test]
    fn test_decode_rgba_sub_filter() {
        // Second pixel stored as a delta from the first.
        let raw = [1, 10, 20, 30, 128, 5, 5, 5, 1];
        let image = PngDecoder::new().decode(&png(2, 1, 6, &raw)).unwrap();
        assert_eq!(image.frames()[0].pixels(), &[0x800A_141E, 0x810F_1923]);
    }

    #[test]
    fn test_decode_up_filter_across_rows() {
        let raw = [0, 10, 20, 30, 2, 1, 1, 1];
        let image = PngDecoder::new().decode(&png(1, 2, 2, &raw)).unwrap();
        assert_eq!(image.frames()[0].pixels(), &[0xFF0A_141E, 0xFF0B_151F]);
    }

    #[test]
    fn test_split_idat_chunks() {
        let compressed = zlib(&[0, 1, 2, 3, 0, 4, 5, 6]);
        let (a, b) = compressed.split_at(compressed.len() / 2);
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend(ihdr(1, 2, 2));
        data.extend(chunk(b"IDAT", a));
        data.extend(chunk(b"tEXt", b"Comment\0hello"));
        data.extend(chunk(b"IDAT", b));
        data.extend(chunk(b"IEND", &[]));

        let image = PngDecoder::new().decode(&data).unwrap();
        assert_eq!(image.frames()[0].pixels(), &[0xFF01_0203, 0xFF04_0506]);
    }

    #[test]
    fn test_chunks_after_iend_ignored() {
        let mut data = png(1, 1, 2, &[0, 9, 9, 9]);
        data.extend(chunk(b"IDAT", &[0xDE, 0xAD]));
        assert!(PngDecoder::new().decode(&data).is_ok());
    }

    #[test]
    fn test_unknown_filter_type() {
        let data = png(1, 1, 2, &[5, 0, 0, 0]);
        assert!(matches!(
            PngDecoder::new().decode(&data),
            Err(ImageError::UnsupportedPng(_))
        ));
    }

    #[test]
    fn test_size_mismatch() {
        let data = png(2, 2, 2, &[0, 0, 0, 0, 0, 0, 0]);
        assert!(matches!(
            PngDecoder::new().decode(&data),
            Err(ImageError::CorruptCompressedData(_))
        ));
    }

    #[test]
    fn test_corrupt_zlib() {
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend(ihdr(1, 1, 2));
        data.extend(chunk(b"IDAT", &[0x78, 0x9C, 0xFF, 0xFF, 0xFF]));
        data.extend(chunk(b"IEND", &[]));
        assert!(matches!(
            PngDecoder::new().decode(&data),
            Err(ImageError::CorruptCompressedData(_))
        ));
    }

    #[test]
    fn test_truncated_ihdr() {
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend_from_slice(&ihdr(1, 1, 2)[..12]);
        assert!(matches!(
            PngDecoder::new().decode(&data),
            Err(ImageError::TruncatedChunk { ref chunk, offset: 8 }) if chunk == "IHDR"
        ));

        let mut data = PNG_SIGNATURE.to_vec();
        data.extend(chunk(b"IHDR", &[0, 0, 0, 1, 0, 0, 0, 1, 8, 2]));
        assert!(matches!(
            PngDecoder::new().decode(&data),
            Err(ImageError::TruncatedChunk { .. })
        ));
    }

    #[test]
    fn test_truncated_chunk_header() {
        let mut data = png(1, 1, 2, &[0, 0, 0, 0]);
        data.truncate(data.len() - 10);
        assert!(matches!(
            PngDecoder::new().decode(&data),
            Err(ImageError::TruncatedChunk { .. })
        ));
    }

    #[test]
    fn test_first_chunk_must_be_ihdr() {
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend(chunk(b"IDAT", &zlib(&[0, 0, 0, 0])));
        data.extend(ihdr(1, 1, 2));
        assert!(matches!(
            PngDecoder::new().decode(&data),
            Err(ImageError::UnsupportedPng(_))
        ));

        assert!(matches!(
            PngDecoder::new().decode(&PNG_SIGNATURE),
            Err(ImageError::UnsupportedPng(_))
        ));
    }

    #[test]
    fn test_zero_width() {
        let data = png(0, 1, 2, &[0]);
        assert_eq!(
            PngDecoder::new().decode(&data),
            Err(ImageError::InvalidDimensions { width: 0, height: 1 })
        );
    }

    #[test]
    fn test_config_duration_and_limit() {
        let data = png(2, 1, 2, &[0, 0, 0, 0, 255, 255, 255]);
        let config = DecoderConfig::new().with_default_frame_duration(40);
        let image = PngDecoder::with_config(config).decode(&data).unwrap();
        assert_eq!(image.frames()[0].duration_ms(), 40);

        let limited = PngDecoder::with_config(DecoderConfig::new().with_max_pixels(1));
        assert!(matches!(
            limited.decode(&data),
            Err(ImageError::DimensionsExceeded { .. })
        ));
    }
}
