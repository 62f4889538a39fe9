//! The igbinary decoder: header validation, tag dispatch, and the
//! per-call decode session.

use crate::constants::*;
use crate::error::DecodeError;
use crate::reader::Reader;
use crate::tables::{StringTable, ValueTable};
use crate::value::{Value, ValueMap};

/// Options for constructing a [`Decoder`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderOptions {
    /// In strict mode the decoder refuses constructs it would otherwise
    /// paper over: the simple-reference tag becomes an error instead of
    /// decoding to null.
    pub strict: bool,
}

/// Decoder for igbinary-serialized binary data.
///
/// A `Decoder` holds only configuration and is immutable after
/// construction; every call to [`Decoder::decode`] allocates a fresh
/// session (cursor plus intern tables), so one decoder may be shared
/// freely across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    strict: bool,
}

impl Decoder {
    /// Creates a decoder with default (permissive) options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder from explicit options.
    pub fn with_options(options: DecoderOptions) -> Self {
        Self {
            strict: options.strict,
        }
    }

    /// Whether strict mode is enabled.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Decodes one igbinary payload into a [`Value`].
    ///
    /// The payload must start with the 4-byte header `00 00 00 02`;
    /// exactly one top-level value is decoded and surplus trailing bytes
    /// are ignored.
    pub fn decode(&self, data: &[u8]) -> Result<Value, DecodeError> {
        if data.len() < HEADER_LEN + 1 {
            return Err(DecodeError::ShortInput { len: data.len() });
        }
        if data[0] != 0x00 || data[1] != 0x00 || data[2] != 0x00 || data[3] != FORMAT_VERSION {
            return Err(DecodeError::BadHeader {
                got: [data[0], data[1], data[2], data[3]],
            });
        }

        let mut session = Session {
            reader: Reader::new(data, HEADER_LEN),
            strings: StringTable::new(),
            values: ValueTable::new(),
            strict: self.strict,
        };
        session.decode_value()
    }
}

/// Decodes one igbinary payload with the default decoder configuration.
///
/// ```
/// let data = [0x00, 0x00, 0x00, 0x02, 0x06, 0x2a]; // int(42)
/// let value = igbinary::decode(&data).unwrap();
/// assert_eq!(value.as_i64(), Some(42));
/// ```
pub fn decode(data: &[u8]) -> Result<Value, DecodeError> {
    Decoder::new().decode(data)
}

// Cap on speculative map pre-sizing; declared element counts are
// attacker-controlled and may exceed what the input can actually hold.
const MAX_PREALLOC_ENTRIES: usize = 1 << 16;

/// Mutable state for a single decode call.
struct Session<'a> {
    reader: Reader<'a>,
    strings: StringTable,
    values: ValueTable,
    strict: bool,
}

impl Session<'_> {
    /// Decodes one value at the cursor. This is the single dispatch point
    /// for every tag; containers recurse back through it.
    fn decode_value(&mut self) -> Result<Value, DecodeError> {
        let tag_pos = self.reader.pos();
        let tag = self.reader.u8()?;

        match tag {
            TAG_NULL => Ok(Value::Null),
            TAG_FALSE => Ok(Value::Bool(false)),
            TAG_TRUE => Ok(Value::Bool(true)),

            TAG_POS_INT8 => Ok(Value::Int(self.reader.u8()? as i64)),
            TAG_POS_INT16 => Ok(Value::Int(self.reader.u16()? as i64)),
            TAG_POS_INT32 => Ok(Value::Int(self.reader.u32()? as i64)),
            // Magnitudes above i64::MAX wrap, matching the two's-complement
            // cast every deployed decoder applies.
            TAG_POS_INT64 => Ok(Value::Int(self.reader.u64()? as i64)),

            TAG_NEG_INT8 => Ok(Value::Int(-(self.reader.u8()? as i64))),
            TAG_NEG_INT16 => Ok(Value::Int(-(self.reader.u16()? as i64))),
            TAG_NEG_INT32 => Ok(Value::Int(-(self.reader.u32()? as i64))),
            TAG_NEG_INT64 => Ok(Value::Int((self.reader.u64()? as i64).wrapping_neg())),

            TAG_DOUBLE => Ok(Value::Double(self.reader.f64()?)),

            // The empty string never occupies a string-table slot; later
            // string ids must resolve as if it was never seen.
            TAG_STRING_EMPTY => Ok(Value::Str(String::new())),

            TAG_STRING8 => {
                let len = self.reader.u8()? as usize;
                Ok(Value::Str(self.fresh_string(len)?))
            }
            TAG_STRING16 => {
                let len = self.reader.u16()? as usize;
                Ok(Value::Str(self.fresh_string(len)?))
            }
            TAG_STRING32 => {
                let len = self.reader.u32()? as usize;
                Ok(Value::Str(self.fresh_string(len)?))
            }

            TAG_STRING_ID8 => {
                let pos = self.reader.pos();
                let id = self.reader.u8()? as usize;
                Ok(Value::Str(self.lookup_string(id, pos)?))
            }
            TAG_STRING_ID16 => {
                let pos = self.reader.pos();
                let id = self.reader.u16()? as usize;
                Ok(Value::Str(self.lookup_string(id, pos)?))
            }
            TAG_STRING_ID32 => {
                let pos = self.reader.pos();
                let id = self.reader.u32()? as usize;
                Ok(Value::Str(self.lookup_string(id, pos)?))
            }

            TAG_ARRAY8 => {
                let count = self.reader.u8()? as usize;
                self.decode_map(count)
            }
            TAG_ARRAY16 => {
                let count = self.reader.u16()? as usize;
                self.decode_map(count)
            }
            TAG_ARRAY32 => {
                let count = self.reader.u32()? as usize;
                self.decode_map(count)
            }

            TAG_OBJECT8 => {
                let len = self.reader.u8()? as usize;
                self.decode_object_inline(len)
            }
            TAG_OBJECT16 => {
                let len = self.reader.u16()? as usize;
                self.decode_object_inline(len)
            }
            TAG_OBJECT32 => {
                let len = self.reader.u32()? as usize;
                self.decode_object_inline(len)
            }

            TAG_OBJECT_ID8 => {
                let pos = self.reader.pos();
                let id = self.reader.u8()? as usize;
                self.decode_object_by_id(id, pos)
            }
            TAG_OBJECT_ID16 => {
                let pos = self.reader.pos();
                let id = self.reader.u16()? as usize;
                self.decode_object_by_id(id, pos)
            }
            TAG_OBJECT_ID32 => {
                let pos = self.reader.pos();
                let id = self.reader.u32()? as usize;
                self.decode_object_by_id(id, pos)
            }

            TAG_OBJECT_SER8 => {
                let len = self.reader.u8()? as usize;
                self.decode_object_serialized(len)
            }
            TAG_OBJECT_SER16 => {
                let len = self.reader.u16()? as usize;
                self.decode_object_serialized(len)
            }
            TAG_OBJECT_SER32 => {
                let len = self.reader.u32()? as usize;
                self.decode_object_serialized(len)
            }

            // Array and object back-references share the value table; the
            // tag split only mirrors the encoder's intent.
            TAG_ARRAY_REF8 | TAG_OBJECT_REF8 => {
                let pos = self.reader.pos();
                let id = self.reader.u8()? as usize;
                self.decode_ref(id, pos)
            }
            TAG_ARRAY_REF16 | TAG_OBJECT_REF16 => {
                let pos = self.reader.pos();
                let id = self.reader.u16()? as usize;
                self.decode_ref(id, pos)
            }
            TAG_ARRAY_REF32 | TAG_OBJECT_REF32 => {
                let pos = self.reader.pos();
                let id = self.reader.u32()? as usize;
                self.decode_ref(id, pos)
            }

            TAG_SIMPLE_REF => {
                if self.strict {
                    Err(DecodeError::UnsupportedFeature {
                        pos: tag_pos,
                        what: "simple reference",
                    })
                } else {
                    // The pointed-to value is not recoverable here.
                    Ok(Value::Null)
                }
            }

            _ => Err(DecodeError::UnknownTag { pos: tag_pos, tag }),
        }
    }

    /// Reads `len` bytes as a fresh string and interns it.
    fn fresh_string(&mut self, len: usize) -> Result<String, DecodeError> {
        let s = self.reader.utf8(len)?.to_owned();
        self.strings.register(s.clone());
        Ok(s)
    }

    fn lookup_string(&mut self, id: usize, pos: usize) -> Result<String, DecodeError> {
        self.strings
            .get(id)
            .map(str::to_owned)
            .ok_or(DecodeError::StringIdOutOfRange {
                pos,
                id,
                len: self.strings.len(),
            })
    }

    fn decode_map(&mut self, count: usize) -> Result<Value, DecodeError> {
        let map = ValueMap::with_capacity(count.min(MAX_PREALLOC_ENTRIES));
        // Register before populating so nested values can back-reference
        // this container, including the self-reference case.
        self.values.register(map.clone());

        for _ in 0..count {
            let key = self.decode_key()?;
            let value = self.decode_value()?;
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }

    /// Decodes a map key. String keys go through the normal interning
    /// rules; integer keys are projected to their base-10 text.
    fn decode_key(&mut self) -> Result<String, DecodeError> {
        let tag_pos = self.reader.pos();
        let tag = self.reader.u8()?;

        match tag {
            TAG_STRING_EMPTY => Ok(String::new()),

            TAG_STRING8 => {
                let len = self.reader.u8()? as usize;
                self.fresh_string(len)
            }
            TAG_STRING16 => {
                let len = self.reader.u16()? as usize;
                self.fresh_string(len)
            }
            TAG_STRING32 => {
                let len = self.reader.u32()? as usize;
                self.fresh_string(len)
            }

            TAG_STRING_ID8 => {
                let pos = self.reader.pos();
                let id = self.reader.u8()? as usize;
                self.lookup_string(id, pos)
            }
            TAG_STRING_ID16 => {
                let pos = self.reader.pos();
                let id = self.reader.u16()? as usize;
                self.lookup_string(id, pos)
            }
            TAG_STRING_ID32 => {
                let pos = self.reader.pos();
                let id = self.reader.u32()? as usize;
                self.lookup_string(id, pos)
            }

            TAG_POS_INT8 => Ok(self.reader.u8()?.to_string()),
            TAG_POS_INT16 => Ok(self.reader.u16()?.to_string()),
            TAG_POS_INT32 => Ok(self.reader.u32()?.to_string()),
            TAG_POS_INT64 => Ok(self.reader.u64()?.to_string()),

            TAG_NEG_INT8 => Ok(negative_key(self.reader.u8()? as u64)),
            TAG_NEG_INT16 => Ok(negative_key(self.reader.u16()? as u64)),
            TAG_NEG_INT32 => Ok(negative_key(self.reader.u32()? as u64)),
            TAG_NEG_INT64 => Ok(negative_key(self.reader.u64()?)),

            _ => Err(DecodeError::UnsupportedKeyType { pos: tag_pos, tag }),
        }
    }

    fn decode_object_inline(&mut self, name_len: usize) -> Result<Value, DecodeError> {
        // The inline class name joins the string table and participates
        // in later back-references.
        let class_name = self.fresh_string(name_len)?;
        self.decode_object_properties(class_name)
    }

    fn decode_object_by_id(&mut self, id: usize, pos: usize) -> Result<Value, DecodeError> {
        let class_name = self.lookup_string(id, pos)?;
        self.decode_object_properties(class_name)
    }

    /// Reads an object's property block: a map-opening tag with the
    /// property count, then key-value pairs.
    fn decode_object_properties(&mut self, class_name: String) -> Result<Value, DecodeError> {
        let tag_pos = self.reader.pos();
        let tag = self.reader.u8()?;
        let count = match tag {
            TAG_ARRAY8 => self.reader.u8()? as usize,
            TAG_ARRAY16 => self.reader.u16()? as usize,
            TAG_ARRAY32 => self.reader.u32()? as usize,
            _ => return Err(DecodeError::InvalidObjectProperties { pos: tag_pos, tag }),
        };

        let map = ValueMap::with_capacity(count.min(MAX_PREALLOC_ENTRIES) + 1);
        // Class name goes in before the properties, so a successful decode
        // carries count + 1 entries.
        map.insert(CLASS_KEY.to_owned(), Value::Str(class_name));
        self.values.register(map.clone());

        for _ in 0..count {
            let key = self.decode_key()?;
            let value = self.decode_value()?;
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }

    fn decode_object_serialized(&mut self, name_len: usize) -> Result<Value, DecodeError> {
        let class_name = self.fresh_string(name_len)?;

        // The payload length is framed like a fresh string, but the bytes
        // are kept opaque and never interned.
        let tag_pos = self.reader.pos();
        let tag = self.reader.u8()?;
        let data_len = match tag {
            TAG_STRING8 => self.reader.u8()? as usize,
            TAG_STRING16 => self.reader.u16()? as usize,
            TAG_STRING32 => self.reader.u32()? as usize,
            _ => return Err(DecodeError::InvalidSerializedBlob { pos: tag_pos, tag }),
        };
        let raw = self.reader.bytes(data_len)?.to_vec();

        let map = ValueMap::with_capacity(2);
        map.insert(CLASS_KEY.to_owned(), Value::Str(class_name));
        map.insert(SERIALIZED_DATA_KEY.to_owned(), Value::Bytes(raw));
        self.values.register(map.clone());
        Ok(Value::Map(map))
    }

    fn decode_ref(&mut self, id: usize, pos: usize) -> Result<Value, DecodeError> {
        self.values
            .get(id)
            .map(Value::Map)
            .ok_or(DecodeError::ValueRefOutOfRange {
                pos,
                id,
                len: self.values.len(),
            })
    }
}

/// Base-10 projection of a negative integer key with magnitude `m`.
/// A negative-tagged zero is still zero.
fn negative_key(m: u64) -> String {
    if m == 0 {
        "0".to_owned()
    } else {
        format!("-{m}")
    }
}
