//! Decoder for PHP's igbinary serialization format.
//!
//! igbinary is a compact binary replacement for PHP's `serialize()`,
//! commonly paired with the memcached extension to store cache entries.
//! This crate decodes igbinary version 2 payloads into a [`Value`] tree
//! of native primitives, resolving the format's string and compound
//! back-references along the way.
//!
//! # Quick start
//!
//! ```
//! let data = [0x00, 0x00, 0x00, 0x02, 0x06, 0x2a]; // igbinary-encoded int(42)
//! let value = igbinary::decode(&data).unwrap();
//! assert_eq!(value.as_i64(), Some(42));
//! ```
//!
//! For strict decoding (no permissive fallbacks), configure a [`Decoder`]:
//!
//! ```
//! use igbinary::{Decoder, DecoderOptions};
//!
//! let decoder = Decoder::with_options(DecoderOptions { strict: true });
//! let data = [0x00, 0x00, 0x00, 0x02, 0x25]; // simple reference
//! assert!(decoder.decode(&data).is_err());
//! ```
//!
//! PHP arrays and objects both decode to [`Value::Map`]; objects carry
//! their class name under the reserved `"__class"` key, and integer
//! array keys are projected to their base-10 text.

mod constants;
mod decoder;
mod error;
mod reader;
mod tables;
mod value;

pub use constants::{CLASS_KEY, FORMAT_VERSION, SERIALIZED_DATA_KEY};
pub use decoder::{decode, Decoder, DecoderOptions};
pub use error::{DecodeError, ErrorKind};
pub use value::{Value, ValueMap};
