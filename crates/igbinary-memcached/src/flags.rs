//! PHP memcached flags word.
//!
//! The memcached PECL extension stores a 32-bit flags field next to every
//! cache value: the low nibble carries the serializer type, the next
//! nibble carries compression bits.

/// Serializer type values (low 4 bits of the flags word).
pub const FLAG_STRING: u32 = 0;
pub const FLAG_LONG: u32 = 1;
pub const FLAG_DOUBLE: u32 = 2;
pub const FLAG_BOOL: u32 = 3;
pub const FLAG_PHP_SERIALIZED: u32 = 4;
pub const FLAG_IGBINARY: u32 = 5;
pub const FLAG_JSON: u32 = 6;
pub const FLAG_MSGPACK: u32 = 7;

/// Compression bit flags (next nibble).
pub const FLAG_COMPRESSED: u32 = 1 << 4;
pub const FLAG_ZLIB: u32 = 1 << 5;
pub const FLAG_FASTLZ: u32 = 1 << 6;
pub const FLAG_ZSTD: u32 = 1 << 7;

pub const SERIALIZER_MASK: u32 = 0x0f;
pub const COMPRESSION_MASK: u32 = FLAG_ZLIB | FLAG_FASTLZ | FLAG_ZSTD;

/// Extracts the serializer type nibble.
pub fn serializer_type(flags: u32) -> u32 {
    flags & SERIALIZER_MASK
}

/// Whether the compressed bit is set.
pub fn is_compressed(flags: u32) -> bool {
    flags & FLAG_COMPRESSED != 0
}

/// Human-readable name of the serializer type.
pub fn serializer_name(flags: u32) -> &'static str {
    match serializer_type(flags) {
        FLAG_STRING => "string",
        FLAG_LONG => "long",
        FLAG_DOUBLE => "double",
        FLAG_BOOL => "bool",
        FLAG_PHP_SERIALIZED => "php_serialize",
        FLAG_IGBINARY => "igbinary",
        FLAG_JSON => "json",
        FLAG_MSGPACK => "msgpack",
        _ => "unknown",
    }
}

/// Human-readable name of the compression algorithm.
pub fn compression_name(flags: u32) -> &'static str {
    if !is_compressed(flags) {
        return "none";
    }
    if flags & FLAG_FASTLZ != 0 {
        "fastlz"
    } else if flags & FLAG_ZLIB != 0 {
        "zlib"
    } else if flags & FLAG_ZSTD != 0 {
        "zstd"
    } else {
        "unknown"
    }
}

/// One-line description of a flags word, for diagnostics.
pub fn explain_flags(flags: u32) -> String {
    format!(
        "type={}({}) compressed={} compression={} (raw=0x{flags:08x})",
        serializer_name(flags),
        serializer_type(flags),
        is_compressed(flags),
        compression_name(flags),
    )
}
