//! Flag-driven cache-value codec: decompress, then deserialize.

use std::collections::HashMap;

use igbinary::Value;

use crate::compress::{Compressor, FastlzCompressor, ZlibCompressor};
use crate::error::CodecError;
use crate::flags;
use crate::serialize::{
    BoolSerializer, DoubleSerializer, IgbinarySerializer, JsonSerializer, LongSerializer,
    Serializer, StringSerializer,
};

/// Decodes raw cache values by reading the 32-bit flags word stored next
/// to every entry: decompress with the algorithm named by the compression
/// bits, then deserialize with the plugin registered for the type nibble.
///
/// [`Codec::new`] wires up the standard PHP memcached defaults; use
/// [`Codec::builder`] for custom registrations.
pub struct Codec {
    compressors: HashMap<u32, Box<dyn Compressor>>,
    serializers: HashMap<u32, Box<dyn Serializer>>,
    fallback_compressor: Option<Box<dyn Compressor>>,
    fallback_serializer: Option<Box<dyn Serializer>>,
}

impl Codec {
    /// Codec with the standard PHP memcached defaults: FastLZ and zlib
    /// decompression, and all built-in serializers.
    pub fn new() -> Self {
        Codec::builder()
            .with_compressor(flags::FLAG_FASTLZ, FastlzCompressor)
            .with_compressor(flags::FLAG_ZLIB, ZlibCompressor::new(true))
            .with_serializer(flags::FLAG_IGBINARY, IgbinarySerializer::new())
            .with_serializer(flags::FLAG_STRING, StringSerializer)
            .with_serializer(flags::FLAG_LONG, LongSerializer)
            .with_serializer(flags::FLAG_DOUBLE, DoubleSerializer)
            .with_serializer(flags::FLAG_BOOL, BoolSerializer)
            .with_serializer(flags::FLAG_JSON, JsonSerializer)
            .with_fallback_compressor(FastlzCompressor)
            .with_fallback_serializer(IgbinarySerializer::new())
            .build()
    }

    pub fn builder() -> CodecBuilder {
        CodecBuilder::new()
    }

    /// Decodes one cache value.
    ///
    /// Empty payloads are dispatched like any other; the scalar
    /// serializers define their empty-input semantics (PHP stores `false`
    /// as zero bytes, `0` as an empty long, and so on).
    pub fn decode(&self, data: &[u8], flags: u32) -> Result<Value, CodecError> {
        let decompressed;
        let mut payload = data;
        if flags::is_compressed(flags) {
            let compressor = self
                .resolve_compressor(flags)
                .ok_or(CodecError::NoCompressor { flags })?;
            decompressed = compressor.decompress(data)?;
            payload = &decompressed;
        }

        let serializer =
            self.resolve_serializer(flags)
                .ok_or_else(|| CodecError::NoSerializer {
                    serializer: flags::serializer_type(flags),
                    flags,
                })?;
        serializer.deserialize(payload)
    }

    fn resolve_compressor(&self, flags: u32) -> Option<&dyn Compressor> {
        self.compressors
            .iter()
            .find(|(flag, _)| flags & **flag != 0)
            .map(|(_, compressor)| compressor.as_ref())
            .or(self.fallback_compressor.as_deref())
    }

    fn resolve_serializer(&self, flags: u32) -> Option<&dyn Serializer> {
        self.serializers
            .get(&flags::serializer_type(flags))
            .map(|serializer| serializer.as_ref())
            .or(self.fallback_serializer.as_deref())
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

/// Fluent construction of a [`Codec`] with custom compressor and
/// serializer registrations.
///
/// ```
/// use igbinary_memcached::{flags, Codec, FastlzCompressor, JsonSerializer};
///
/// let codec = Codec::builder()
///     .with_compressor(flags::FLAG_FASTLZ, FastlzCompressor)
///     .with_serializer(flags::FLAG_JSON, JsonSerializer)
///     .build();
/// let value = codec.decode(br#"{"k":1}"#, flags::FLAG_JSON).unwrap();
/// assert!(value.as_map().is_some());
/// ```
#[derive(Default)]
pub struct CodecBuilder {
    compressors: HashMap<u32, Box<dyn Compressor>>,
    serializers: HashMap<u32, Box<dyn Serializer>>,
    fallback_compressor: Option<Box<dyn Compressor>>,
    fallback_serializer: Option<Box<dyn Serializer>>,
}

impl CodecBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a compressor for one compression bit flag
    /// ([`flags::FLAG_FASTLZ`], [`flags::FLAG_ZLIB`], [`flags::FLAG_ZSTD`]).
    pub fn with_compressor(mut self, flag: u32, compressor: impl Compressor + 'static) -> Self {
        self.compressors.insert(flag, Box::new(compressor));
        self
    }

    /// Registers a serializer for one type value ([`flags::FLAG_IGBINARY`],
    /// [`flags::FLAG_JSON`], …).
    pub fn with_serializer(mut self, flag: u32, serializer: impl Serializer + 'static) -> Self {
        self.serializers.insert(flag, Box::new(serializer));
        self
    }

    /// Compressor used when the compressed bit is set but no registered
    /// algorithm bit matches.
    pub fn with_fallback_compressor(mut self, compressor: impl Compressor + 'static) -> Self {
        self.fallback_compressor = Some(Box::new(compressor));
        self
    }

    /// Serializer used when the type nibble has no registration.
    pub fn with_fallback_serializer(mut self, serializer: impl Serializer + 'static) -> Self {
        self.fallback_serializer = Some(Box::new(serializer));
        self
    }

    pub fn build(self) -> Codec {
        Codec {
            compressors: self.compressors,
            serializers: self.serializers,
            fallback_compressor: self.fallback_compressor,
            fallback_serializer: self.fallback_serializer,
        }
    }
}
