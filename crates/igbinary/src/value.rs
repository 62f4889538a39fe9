//! [`Value`], the decoded value tree.

use std::cell::{Ref, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use crate::constants::{CLASS_KEY, SERIALIZED_DATA_KEY};

thread_local! {
    // Map handles on the current Debug-format stack, keyed by allocation
    // address. A handle seen twice is a cycle.
    static DEBUG_SEEN: RefCell<HashSet<usize>> = RefCell::new(HashSet::new());
    // Handle pairs on the current comparison stack. A pair seen twice is
    // a cycle and is taken as equal; the outer frames still compare every
    // non-cyclic entry.
    static EQ_SEEN: RefCell<HashSet<(usize, usize)>> = RefCell::new(HashSet::new());
}

/// A decoded igbinary value.
///
/// PHP types map as follows:
///
/// - PHP array   → [`Value::Map`] (integer keys projected to strings)
/// - PHP string  → [`Value::Str`]
/// - PHP integer → [`Value::Int`]
/// - PHP float   → [`Value::Double`]
/// - PHP boolean → [`Value::Bool`]
/// - PHP NULL    → [`Value::Null`]
/// - PHP object  → [`Value::Map`] with the class name under `"__class"`
///
/// Objects that were serialized through PHP's `Serializable` interface
/// carry their raw payload as [`Value::Bytes`] under `"__serialized_raw"`.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(String),
    /// Opaque bytes (serialized-object payloads).
    Bytes(Vec<u8>),
    /// Shared handle to a map; back-references alias the same map.
    Map(ValueMap),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Class name of a decoded object value, if this is one.
    pub fn class_name(&self) -> Option<String> {
        let map = self.as_map()?;
        match map.get(CLASS_KEY)? {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Raw payload of a serialized-blob object, if this is one.
    pub fn serialized_data(&self) -> Option<Vec<u8>> {
        let map = self.as_map()?;
        match map.get(SERIALIZED_DATA_KEY)? {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

/// Shared, mutable, ordered string-keyed map.
///
/// Cloning a `ValueMap` clones the handle, not the entries: back-
/// references to a container and the container itself observe the same
/// storage, including self-referential layouts. Entries keep encounter
/// order; re-inserting an existing key overwrites in place.
#[derive(Clone, Default)]
pub struct ValueMap {
    entries: Rc<RefCell<Vec<(String, Value)>>>,
}

impl ValueMap {
    /// Creates an empty map pre-sized for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Rc::new(RefCell::new(Vec::with_capacity(capacity))),
        }
    }

    /// Inserts `(key, value)`; the last insert for a given key wins and
    /// keeps the key's original position.
    pub fn insert(&self, key: String, value: Value) {
        let mut entries = self.entries.borrow_mut();
        if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            entries.push((key, value));
        }
    }

    /// Returns a clone of the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .borrow()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Borrows the entry list in encounter order.
    ///
    /// The borrow must be released before mutating the same map through
    /// another handle.
    pub fn entries(&self) -> Ref<'_, Vec<(String, Value)>> {
        self.entries.borrow()
    }

    /// Keys in encounter order.
    pub fn keys(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Whether two handles alias the same underlying map.
    pub fn ptr_eq(&self, other: &ValueMap) -> bool {
        Rc::ptr_eq(&self.entries, &other.entries)
    }
}

impl ValueMap {
    #[inline]
    fn addr(&self) -> usize {
        Rc::as_ptr(&self.entries) as usize
    }
}

impl PartialEq for ValueMap {
    /// Handle identity first, then structural equality. Pairs already on
    /// the comparison stack are taken as equal, so two independently
    /// decoded cyclic trees compare without recursing forever.
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let pair = (self.addr(), other.addr());
        let first_visit = EQ_SEEN.with(|seen| seen.borrow_mut().insert(pair));
        if !first_visit {
            return true;
        }
        let equal = *self.entries.borrow() == *other.entries.borrow();
        EQ_SEEN.with(|seen| seen.borrow_mut().remove(&pair));
        equal
    }
}

impl fmt::Debug for ValueMap {
    /// Entry-by-entry formatting with a cycle guard: a handle already on
    /// the format stack prints as `<cycle>` instead of recursing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let addr = self.addr();
        let first_visit = DEBUG_SEEN.with(|seen| seen.borrow_mut().insert(addr));
        if !first_visit {
            return f.write_str("<cycle>");
        }
        let result = f
            .debug_map()
            .entries(self.entries.borrow().iter().map(|(k, v)| (k, v)))
            .finish();
        DEBUG_SEEN.with(|seen| seen.borrow_mut().remove(&addr));
        result
    }
}

impl From<serde_json::Value> for Value {
    /// JSON arrays project to maps keyed `"0"`, `"1"`, …, matching the
    /// integer-key projection the decoder applies to PHP arrays.
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Double(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(arr) => {
                let map = ValueMap::with_capacity(arr.len());
                for (i, item) in arr.into_iter().enumerate() {
                    map.insert(i.to_string(), Value::from(item));
                }
                Value::Map(map)
            }
            serde_json::Value::Object(obj) => {
                let map = ValueMap::with_capacity(obj.len());
                for (k, v) in obj {
                    map.insert(k, Value::from(v));
                }
                Value::Map(map)
            }
        }
    }
}
