//! Deserialization of cache values.

use igbinary::Value;

use crate::error::CodecError;

/// Deserializes cache values into [`Value`] trees.
///
/// Implement this trait to plug in additional formats (msgpack, PHP
/// `serialize()`, protobuf, …) via the codec builder.
pub trait Serializer {
    /// Converts raw bytes into a value.
    fn deserialize(&self, data: &[u8]) -> Result<Value, CodecError>;
}

/// Deserializes igbinary payloads with the core decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgbinarySerializer {
    decoder: igbinary::Decoder,
}

impl IgbinarySerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses an explicitly configured decoder (e.g. strict mode).
    pub fn with_decoder(decoder: igbinary::Decoder) -> Self {
        Self { decoder }
    }
}

impl Serializer for IgbinarySerializer {
    fn deserialize(&self, data: &[u8]) -> Result<Value, CodecError> {
        Ok(self.decoder.decode(data)?)
    }
}

/// Returns the raw bytes unchanged: UTF-8 payloads become strings,
/// anything else is kept as bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringSerializer;

impl Serializer for StringSerializer {
    fn deserialize(&self, data: &[u8]) -> Result<Value, CodecError> {
        match std::str::from_utf8(data) {
            Ok(s) => Ok(Value::Str(s.to_owned())),
            Err(_) => Ok(Value::Bytes(data.to_vec())),
        }
    }
}

/// Parses scalar integers stored as their decimal text (PHP stores the
/// integer 42 as the bytes `"42"`). Empty input is zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongSerializer;

impl Serializer for LongSerializer {
    fn deserialize(&self, data: &[u8]) -> Result<Value, CodecError> {
        let text = String::from_utf8_lossy(data);
        let text = text.trim();
        if text.is_empty() {
            return Ok(Value::Int(0));
        }
        text.parse::<i64>()
            .map(Value::Int)
            .map_err(|source| CodecError::InvalidLong {
                input: text.to_owned(),
                source,
            })
    }
}

/// Parses scalar floats stored as their decimal text. Empty input is zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleSerializer;

impl Serializer for DoubleSerializer {
    fn deserialize(&self, data: &[u8]) -> Result<Value, CodecError> {
        let text = String::from_utf8_lossy(data);
        let text = text.trim();
        if text.is_empty() {
            return Ok(Value::Double(0.0));
        }
        text.parse::<f64>()
            .map(Value::Double)
            .map_err(|source| CodecError::InvalidDouble {
                input: text.to_owned(),
                source,
            })
    }
}

/// Parses booleans: PHP stores `true` as `"1"` and `false` as zero bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolSerializer;

impl Serializer for BoolSerializer {
    fn deserialize(&self, data: &[u8]) -> Result<Value, CodecError> {
        Ok(Value::Bool(data == b"1"))
    }
}

/// Deserializes JSON payloads; arrays project to maps keyed `"0"`, `"1"`, …
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn deserialize(&self, data: &[u8]) -> Result<Value, CodecError> {
        let json: serde_json::Value = serde_json::from_slice(data)?;
        Ok(Value::from(json))
    }
}
