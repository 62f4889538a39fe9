// Tag bytes for igbinary format version 2. All multi-byte payloads are
// big-endian.

/// Format version accepted in the 4-byte payload header (`00 00 00 02`).
pub const FORMAT_VERSION: u8 = 2;

/// Length of the payload header.
pub const HEADER_LEN: usize = 4;

pub const TAG_NULL: u8 = 0x00;

pub const TAG_ARRAY_REF8: u8 = 0x01;
pub const TAG_ARRAY_REF16: u8 = 0x02;
pub const TAG_ARRAY_REF32: u8 = 0x03;

pub const TAG_FALSE: u8 = 0x04;
pub const TAG_TRUE: u8 = 0x05;

pub const TAG_POS_INT8: u8 = 0x06;
pub const TAG_NEG_INT8: u8 = 0x07;
pub const TAG_POS_INT16: u8 = 0x08;
pub const TAG_NEG_INT16: u8 = 0x09;
pub const TAG_POS_INT32: u8 = 0x0A;
pub const TAG_NEG_INT32: u8 = 0x0B;

pub const TAG_DOUBLE: u8 = 0x0C;

/// Empty string. Never occupies a string-table slot.
pub const TAG_STRING_EMPTY: u8 = 0x0D;

pub const TAG_STRING_ID8: u8 = 0x0E;
pub const TAG_STRING_ID16: u8 = 0x0F;
pub const TAG_STRING_ID32: u8 = 0x10;

pub const TAG_STRING8: u8 = 0x11;
pub const TAG_STRING16: u8 = 0x12;
pub const TAG_STRING32: u8 = 0x13;

pub const TAG_ARRAY8: u8 = 0x14;
pub const TAG_ARRAY16: u8 = 0x15;
pub const TAG_ARRAY32: u8 = 0x16;

pub const TAG_OBJECT8: u8 = 0x17;
pub const TAG_OBJECT16: u8 = 0x18;
pub const TAG_OBJECT32: u8 = 0x19;

pub const TAG_OBJECT_ID8: u8 = 0x1A;
pub const TAG_OBJECT_ID16: u8 = 0x1B;
pub const TAG_OBJECT_ID32: u8 = 0x1C;

pub const TAG_OBJECT_SER8: u8 = 0x1D;
pub const TAG_OBJECT_SER16: u8 = 0x1E;
pub const TAG_OBJECT_SER32: u8 = 0x1F;

pub const TAG_POS_INT64: u8 = 0x20;
pub const TAG_NEG_INT64: u8 = 0x21;

pub const TAG_OBJECT_REF8: u8 = 0x22;
pub const TAG_OBJECT_REF16: u8 = 0x23;
pub const TAG_OBJECT_REF32: u8 = 0x24;

/// Simple PHP reference (`&$var`). Decodes to null outside strict mode.
pub const TAG_SIMPLE_REF: u8 = 0x25;

/// Map key carrying the class name of decoded object values.
pub const CLASS_KEY: &str = "__class";

/// Map key carrying the raw payload of serialized-blob objects.
pub const SERIALIZED_DATA_KEY: &str = "__serialized_raw";
