use tnet_types::TypeError;
use tnet_wire::WireError;

/// Errors that can occur while decoding TNET strings.
///
/// Every variant means *malformed* (or, for `Incomplete`, "the stream
/// closed mid-value"). A value that is merely waiting for more bytes is
/// never an error: the machine reports [`Step::Pending`](crate::Step)
/// instead, and only [`TnetMachine::finish`](crate::TnetMachine::finish)
/// turns a still-pending state into `Incomplete`.
///
/// Error hierarchy:
///
/// ```text
///   DecodeError
///   ├── Wire(WireError)      ← bad size byte, empty size, unknown tag
///   ├── Type { .. }          ← payload does not fit its tag
///   ├── SizeLimit            ← declared size above DecoderOptions::max_size
///   ├── TooDeep              ← containers nested past max_depth
///   ├── TruncatedElement     ← container payload ends inside an element
///   ├── UnboundRepeat        ← repeat count key not committed
///   ├── Poisoned             ← machine stepped again after failing
///   ├── Spent                ← parser or machine reused after its value
///   ├── Incomplete           ← stream closed before the value completed
///   ├── TrailingData         ← bytes left after a one-shot decode
///   └── Io(std::io::Error)   ← from the underlying reader (streaming)
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error(transparent)]
    Wire(#[from] WireError),

    /// The payload starting at `offset` is wrong for its tag.
    #[error("{source} (payload at offset {offset})")]
    Type { source: TypeError, offset: usize },

    #[error("declared size {size} exceeds limit {limit} at offset {offset}")]
    SizeLimit { size: usize, limit: usize, offset: usize },

    #[error("nesting depth {depth} exceeds limit at offset {offset}")]
    TooDeep { depth: usize, offset: usize },

    /// A container's declared payload ended partway through an element.
    /// The element began at `offset`.
    #[error("container payload ends inside the element at offset {offset}")]
    TruncatedElement { offset: usize },

    #[error("repeat count {key:?} has not been committed")]
    UnboundRepeat { key: String },

    #[error("machine failed at offset {offset}; reset before reuse")]
    Poisoned { offset: usize },

    /// The value was already produced; the parser or machine must be
    /// reset (or replaced) before it can read another.
    #[error("value already produced before offset {offset}; reset before reuse")]
    Spent { offset: usize },

    #[error("input ended before the value completed (offset {offset})")]
    Incomplete { offset: usize },

    #[error("unexpected data after value ({extra_bytes} bytes at offset {offset})")]
    TrailingData { extra_bytes: usize, offset: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    /// Absolute stream offset the error points at, when it has one.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Wire(e) => Some(e.offset()),
            Self::Type { offset, .. }
            | Self::SizeLimit { offset, .. }
            | Self::TooDeep { offset, .. }
            | Self::TruncatedElement { offset }
            | Self::Poisoned { offset }
            | Self::Spent { offset }
            | Self::Incomplete { offset }
            | Self::TrailingData { offset, .. } => Some(*offset),
            Self::UnboundRepeat { .. } | Self::Io(_) => None,
        }
    }

    /// `true` for grammar violations, as opposed to truncation, reuse,
    /// or I/O.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        !matches!(self, Self::Incomplete { .. } | Self::Spent { .. } | Self::Io(_))
    }
}
