use std::collections::BTreeMap;

use tnet_wire::Tag;

use crate::error::TypeError;

/// Dict payloads map byte-string keys to values. Key order on the wire is
/// not significant.
pub type Dict = BTreeMap<Vec<u8>, TnetValue>;

/// A fully decoded TNET value.
///
/// ```text
/// ┌───────────┬─────┬──────────────────────────────┐
/// │ Variant   │ Tag │ Rust payload                 │
/// ├───────────┼─────┼──────────────────────────────┤
/// │ Null      │ ~   │ —                            │
/// │ Boolean   │ !   │ bool                         │
/// │ Integer   │ #   │ i64                          │
/// │ Float     │ ^   │ f64                          │
/// │ String    │ ,   │ Vec<u8> (verbatim bytes)     │
/// │ List      │ ]   │ Vec<TnetValue>               │
/// │ Dict      │ }   │ BTreeMap<Vec<u8>, TnetValue> │
/// └───────────┴─────┴──────────────────────────────┘
/// ```
///
/// Strings keep their raw bytes; UTF-8 is only checked when the value is
/// read as text ([`as_str`](Self::as_str), JSON rendering).
#[derive(Clone, Debug, PartialEq)]
pub enum TnetValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(Vec<u8>),
    List(Vec<TnetValue>),
    Dict(Dict),
}

impl TnetValue {
    /// The wire tag this value encodes with.
    #[must_use]
    pub fn tag(&self) -> Tag {
        match self {
            Self::Null => Tag::Null,
            Self::Boolean(_) => Tag::Boolean,
            Self::Integer(_) => Tag::Integer,
            Self::Float(_) => Tag::Float,
            Self::String(_) => Tag::String,
            Self::List(_) => Tag::List,
            Self::Dict(_) => Tag::Dict,
        }
    }

    /// Borrow a string value as UTF-8 text.
    ///
    /// Returns `Ok(None)` for non-string values.
    ///
    /// # Errors
    ///
    /// [`TypeError::InvalidUtf8`] if the string bytes are not UTF-8.
    pub fn as_str(&self) -> Result<Option<&str>, TypeError> {
        match self {
            Self::String(bytes) => std::str::from_utf8(bytes)
                .map(Some)
                .map_err(|e| TypeError::InvalidUtf8 {
                    valid_up_to: e.valid_up_to(),
                }),
            _ => Ok(None),
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::String(bytes) => Some(bytes),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Build a dict from `(key, value)` pairs. Later duplicates win.
    pub fn dict<K, I>(pairs: I) -> Self
    where
        K: Into<Vec<u8>>,
        I: IntoIterator<Item = (K, TnetValue)>,
    {
        Self::Dict(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<bool> for TnetValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i64> for TnetValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<f64> for TnetValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for TnetValue {
    fn from(s: &str) -> Self {
        Self::String(s.as_bytes().to_vec())
    }
}

impl From<String> for TnetValue {
    fn from(s: String) -> Self {
        Self::String(s.into_bytes())
    }
}

impl From<Vec<TnetValue>> for TnetValue {
    fn from(items: Vec<TnetValue>) -> Self {
        Self::List(items)
    }
}

impl From<Dict> for TnetValue {
    fn from(map: Dict) -> Self {
        Self::Dict(map)
    }
}
