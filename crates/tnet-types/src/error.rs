use tnet_wire::Tag;

/// Errors raised when a payload does not fit the interpretation its tag
/// demands.
///
/// These are higher-level than [`WireError`](tnet_wire::WireError): the
/// framing (`<SIZE>:<PAYLOAD><TAG>`) was intact, but the payload bytes are
/// wrong for the declared type. They are permanent for the value that
/// produced them and never affect siblings that were already committed.
///
/// ```text
/// ┌──────────────────┬──────────────────────────────────────────────┐
/// │ Variant          │ Cause                                        │
/// ├──────────────────┼──────────────────────────────────────────────┤
/// │ InvalidInteger   │ `#` payload is not a base-10 i64             │
/// │ InvalidFloat     │ `^` payload is not a base-10 float           │
/// │ InvalidBoolean   │ `!` payload is neither `true` nor `false`    │
/// │ NonEmptyNull     │ `~` payload has bytes                        │
/// │ OddDictArity     │ `}` payload holds a key without a value      │
/// │ NonStringKey     │ `}` key element is not tagged `,`            │
/// │ InvalidUtf8      │ string bytes are not UTF-8 (text boundary)   │
/// └──────────────────┴──────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
  #[error("invalid integer payload {payload:?}")]
  InvalidInteger { payload: String },

  #[error("invalid float payload {payload:?}")]
  InvalidFloat { payload: String },

  #[error("invalid boolean payload {payload:?}")]
  InvalidBoolean { payload: String },

  #[error("null payload must be empty, found {len} bytes")]
  NonEmptyNull { len: usize },

  /// The dict payload ended after a key, with no value element.
  #[error("dict payload has {elements} elements, expected an even count")]
  OddDictArity { elements: usize },

  #[error("dict key must be a string, found {found:?}")]
  NonStringKey { found: Tag },

  /// A string value was asked for as text but its bytes are not UTF-8.
  ///
  /// Strings are stored verbatim, so this only surfaces at a text
  /// boundary such as JSON rendering.
  #[error("string is not valid UTF-8 (first bad byte at {valid_up_to})")]
  InvalidUtf8 { valid_up_to: usize },
}

impl TypeError {
  /// Lossy text of a payload, for diagnostics.
  #[must_use]
  pub fn payload_text(payload: &[u8]) -> String {
    String::from_utf8_lossy(payload).into_owned()
  }
}
