//! Decoder error type.

use thiserror::Error;

/// Error type for igbinary decoding operations.
///
/// Every variant records the byte offset in the input at which the
/// condition was detected, plus enough detail to reconstruct what was
/// expected. Use [`DecodeError::kind`] to match on the class of failure
/// without destructuring.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("input too short: {len} bytes (need at least 5)")]
    ShortInput { len: usize },

    #[error("invalid header: got {got:02x?}, want [00, 00, 00, 02]")]
    BadHeader { got: [u8; 4] },

    #[error("unexpected end of input at pos {pos}: need {need} bytes, have {have}")]
    UnexpectedEnd { pos: usize, need: usize, have: usize },

    #[error("unknown type tag 0x{tag:02x} at pos {pos}")]
    UnknownTag { pos: usize, tag: u8 },

    #[error("string id {id} out of range at pos {pos} (table size {len})")]
    StringIdOutOfRange { pos: usize, id: usize, len: usize },

    #[error("value ref {id} out of range at pos {pos} (table size {len})")]
    ValueRefOutOfRange { pos: usize, id: usize, len: usize },

    #[error("invalid object property block at pos {pos}: expected array tag, got 0x{tag:02x}")]
    InvalidObjectProperties { pos: usize, tag: u8 },

    #[error("invalid serialized object data at pos {pos}: expected string tag, got 0x{tag:02x}")]
    InvalidSerializedBlob { pos: usize, tag: u8 },

    #[error("unsupported map key tag 0x{tag:02x} at pos {pos}")]
    UnsupportedKeyType { pos: usize, tag: u8 },

    #[error("unsupported feature at pos {pos}: {what}")]
    UnsupportedFeature { pos: usize, what: &'static str },

    #[error("invalid UTF-8 in string at pos {pos}")]
    InvalidUtf8 { pos: usize },
}

/// Field-free classification of a [`DecodeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ShortInput,
    BadHeader,
    UnexpectedEnd,
    UnknownTag,
    StringIdOutOfRange,
    ValueRefOutOfRange,
    InvalidObjectProperties,
    InvalidSerializedBlob,
    UnsupportedKeyType,
    UnsupportedFeature,
    InvalidUtf8,
}

impl DecodeError {
    /// Returns the stable kind token for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::ShortInput { .. } => ErrorKind::ShortInput,
            DecodeError::BadHeader { .. } => ErrorKind::BadHeader,
            DecodeError::UnexpectedEnd { .. } => ErrorKind::UnexpectedEnd,
            DecodeError::UnknownTag { .. } => ErrorKind::UnknownTag,
            DecodeError::StringIdOutOfRange { .. } => ErrorKind::StringIdOutOfRange,
            DecodeError::ValueRefOutOfRange { .. } => ErrorKind::ValueRefOutOfRange,
            DecodeError::InvalidObjectProperties { .. } => ErrorKind::InvalidObjectProperties,
            DecodeError::InvalidSerializedBlob { .. } => ErrorKind::InvalidSerializedBlob,
            DecodeError::UnsupportedKeyType { .. } => ErrorKind::UnsupportedKeyType,
            DecodeError::UnsupportedFeature { .. } => ErrorKind::UnsupportedFeature,
            DecodeError::InvalidUtf8 { .. } => ErrorKind::InvalidUtf8,
        }
    }

    /// Byte offset in the input at which the error was detected.
    ///
    /// `ShortInput` and `BadHeader` are detected before the cursor is
    /// seeded and report offset 0.
    pub fn pos(&self) -> usize {
        match self {
            DecodeError::ShortInput { .. } | DecodeError::BadHeader { .. } => 0,
            DecodeError::UnexpectedEnd { pos, .. }
            | DecodeError::UnknownTag { pos, .. }
            | DecodeError::StringIdOutOfRange { pos, .. }
            | DecodeError::ValueRefOutOfRange { pos, .. }
            | DecodeError::InvalidObjectProperties { pos, .. }
            | DecodeError::InvalidSerializedBlob { pos, .. }
            | DecodeError::UnsupportedKeyType { pos, .. }
            | DecodeError::UnsupportedFeature { pos, .. }
            | DecodeError::InvalidUtf8 { pos } => *pos,
        }
    }
}
