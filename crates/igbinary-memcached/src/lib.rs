//! Codec for decoding PHP memcached cache entries.
//!
//! PHP's memcached PECL extension stores each cache value alongside a
//! 32-bit flags word that names the serializer and compression algorithm
//! used. This crate implements the two-stage pipeline (decompress, then
//! deserialize) behind pluggable traits, with built-in support for
//! igbinary, JSON, and the PHP scalar encodings, plus FastLZ and zlib
//! decompression.
//!
//! # Quick start
//!
//! ```
//! use igbinary_memcached::{flags, Codec};
//!
//! let codec = Codec::new();
//! // igbinary header + int(42), stored uncompressed.
//! let data = [0x00, 0x00, 0x00, 0x02, 0x06, 0x2a];
//! let value = codec.decode(&data, flags::FLAG_IGBINARY).unwrap();
//! assert_eq!(value.as_i64(), Some(42));
//! ```

mod codec;
mod compress;
mod error;
mod fastlz;
mod serialize;

pub mod flags;

pub use codec::{Codec, CodecBuilder};
pub use compress::{Compressor, FastlzCompressor, ZlibCompressor};
pub use error::CodecError;
pub use fastlz::FastlzError;
pub use serialize::{
    BoolSerializer, DoubleSerializer, IgbinarySerializer, JsonSerializer, LongSerializer,
    Serializer, StringSerializer,
};
