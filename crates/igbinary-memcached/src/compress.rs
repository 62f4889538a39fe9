//! Decompression of cache values.

use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::error::CodecError;
use crate::fastlz;

/// Decompresses cache values.
///
/// Implement this trait to plug in additional algorithms (zstd, lz4,
/// snappy, …) via the codec builder.
pub trait Compressor {
    /// Decompresses `data` and returns the original bytes.
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;
}

/// FastLZ, the memcached extension's default compressor.
///
/// Expects the PHP framing: a 4-byte little-endian uncompressed length
/// followed by one FastLZ block.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastlzCompressor;

impl Compressor for FastlzCompressor {
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        let (expected, block) = split_length_prefix(data)?;
        let out = fastlz::decompress(block, expected)?;
        if out.len() != expected {
            return Err(CodecError::LengthMismatch {
                expected,
                actual: out.len(),
            });
        }
        Ok(out)
    }
}

/// zlib decompressor.
#[derive(Debug, Clone, Copy)]
pub struct ZlibCompressor {
    /// Whether the payload starts with the 4-byte little-endian
    /// uncompressed-length prefix the PHP memcached extension writes.
    /// When set, a payload that fails to inflate past the prefix is
    /// retried as a bare zlib stream.
    length_prefixed: bool,
}

impl ZlibCompressor {
    pub fn new(length_prefixed: bool) -> Self {
        Self { length_prefixed }
    }
}

impl Default for ZlibCompressor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Compressor for ZlibCompressor {
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        if !self.length_prefixed {
            if data.len() < 4 {
                return Err(CodecError::CompressedTooShort { len: data.len() });
            }
            return inflate(data, None);
        }

        let (expected, stream) = split_length_prefix(data)?;
        match inflate(stream, Some(expected)) {
            Ok(out) => Ok(out),
            // Some writers omit the prefix; retry with the whole payload.
            Err(_) => inflate(data, None),
        }
    }
}

fn split_length_prefix(data: &[u8]) -> Result<(usize, &[u8]), CodecError> {
    if data.len() < 4 {
        return Err(CodecError::CompressedTooShort { len: data.len() });
    }
    let expected = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
    Ok((expected, &data[4..]))
}

// Pre-allocation cap; the length prefix is attacker-controlled.
const MAX_PREALLOC: usize = 1 << 20;

fn inflate(data: &[u8], size_hint: Option<usize>) -> Result<Vec<u8>, CodecError> {
    let hint = size_hint.unwrap_or(data.len() * 2).min(MAX_PREALLOC);
    let mut out = Vec::with_capacity(hint);
    ZlibDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}
