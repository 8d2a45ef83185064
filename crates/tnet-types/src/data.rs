use std::collections::BTreeMap;

use crate::value::TnetValue;

/// The shared result structure parsers commit into.
///
/// Entries are keyed by dotted path: a size parser running at path
/// `"machinery"` with field `"size"` commits under `"machinery.size"`.
/// A child parser that needs a value its parent committed (a repeat count,
/// say) reads it by key; it never writes to an entry it did not create.
///
/// ```text
/// ┌──────────────────┬──────────────────────────┐
/// │ key              │ value                    │
/// ├──────────────────┼──────────────────────────┤
/// │ machinery.size   │ Integer(123)             │
/// │ machinery.data   │ String(b"aaa…")          │
/// └──────────────────┴──────────────────────────┘
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParseData {
    entries: BTreeMap<String, TnetValue>,
}

impl ParseData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Join a parser path and field name into an entry key.
    #[must_use]
    pub fn key(path: &str, field: &str) -> String {
        if path.is_empty() {
            field.to_owned()
        } else {
            format!("{path}.{field}")
        }
    }

    /// Commit `value` under `path.field`, replacing any earlier entry.
    pub fn commit(&mut self, path: &str, field: &str, value: TnetValue) {
        self.entries.insert(Self::key(path, field), value);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TnetValue> {
        self.entries.get(key)
    }

    /// Read a committed size (a non-negative integer entry).
    #[must_use]
    pub fn size(&self, key: &str) -> Option<usize> {
        self.get(key)?.as_i64().and_then(|n| usize::try_from(n).ok())
    }

    /// Drop every entry under `path` (the path itself and `path.*`).
    pub fn clear_path(&mut self, path: &str) {
        let prefix = format!("{path}.");
        self.entries
            .retain(|key, _| key != path && !key.starts_with(&prefix));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_joins_path_and_field() {
        let mut data = ParseData::new();
        data.commit("machinery", "size", TnetValue::Integer(123));
        assert_eq!(data.size("machinery.size"), Some(123));
        data.commit("", "top", TnetValue::Null);
        assert_eq!(data.get("top"), Some(&TnetValue::Null));
    }

    #[test]
    fn size_rejects_negative_and_non_integer() {
        let mut data = ParseData::new();
        data.commit("a", "neg", TnetValue::Integer(-1));
        data.commit("a", "str", TnetValue::from("3"));
        assert_eq!(data.size("a.neg"), None);
        assert_eq!(data.size("a.str"), None);
        assert_eq!(data.size("a.missing"), None);
    }

    #[test]
    fn clear_path_leaves_siblings() {
        let mut data = ParseData::new();
        data.commit("x", "size", TnetValue::Integer(1));
        data.commit("x", "data", TnetValue::Null);
        data.commit("xy", "size", TnetValue::Integer(2));
        data.clear_path("x");
        assert_eq!(data.len(), 1);
        assert_eq!(data.size("xy.size"), Some(2));
    }
}
