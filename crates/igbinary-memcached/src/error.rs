//! Codec error type.

use thiserror::Error;

use crate::fastlz::FastlzError;

/// Error type for cache-value decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("no compressor registered for flags 0x{flags:08x}")]
    NoCompressor { flags: u32 },

    #[error("no serializer registered for type {serializer} (flags 0x{flags:08x})")]
    NoSerializer { serializer: u32, flags: u32 },

    #[error("compressed data too short: {len} bytes")]
    CompressedTooShort { len: usize },

    #[error("decompressed length mismatch: header says {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("fastlz: {0}")]
    Fastlz(#[from] FastlzError),

    #[error("zlib: {0}")]
    Zlib(#[from] std::io::Error),

    #[error(transparent)]
    Igbinary(#[from] igbinary::DecodeError),

    #[error("json deserialize: {0}")]
    Json(#[from] serde_json::Error),

    #[error("long deserialize {input:?}: {source}")]
    InvalidLong {
        input: String,
        source: std::num::ParseIntError,
    },

    #[error("double deserialize {input:?}: {source}")]
    InvalidDouble {
        input: String,
        source: std::num::ParseFloatError,
    },
}
