//! Per-session intern tables for back-reference resolution.
//!
//! The format assigns implicit indices to interned strings and to
//! compound values in encounter order; later tags refer back to those
//! indices. Both tables are append-only and live for exactly one decode
//! call.

use crate::value::ValueMap;

/// Append-only table of strings seen so far, addressable by zero-based
/// index.
///
/// The empty-string tag never goes through this table: registering it
/// would shift every later index by one.
#[derive(Debug, Default)]
pub struct StringTable {
    strings: Vec<String>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a string and returns its assigned index, which equals the
    /// table length immediately before the append.
    pub fn register(&mut self, s: String) -> usize {
        let id = self.strings.len();
        self.strings.push(s);
        id
    }

    /// Returns the string at `id`, or `None` when `id` was never assigned.
    pub fn get(&self, id: usize) -> Option<&str> {
        self.strings.get(id).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }
}

/// Append-only table of compound values (maps and map-shaped objects).
///
/// A container is registered at allocation time, before any of its
/// entries are decoded, so children can legally reference their own
/// ancestors.
#[derive(Debug, Default)]
pub struct ValueTable {
    values: Vec<ValueMap>,
}

impl ValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a map handle and returns its assigned index.
    pub fn register(&mut self, map: ValueMap) -> usize {
        let id = self.values.len();
        self.values.push(map);
        id
    }

    /// Returns the map handle at `id`, or `None` when `id` was never
    /// assigned.
    pub fn get(&self, id: usize) -> Option<ValueMap> {
        self.values.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}
