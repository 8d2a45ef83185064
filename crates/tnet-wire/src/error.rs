/// Framing errors raised while reading the `<SIZE>:` prefix or the
/// trailing tag byte of a TNET string.
///
/// Every variant carries the absolute stream offset of the offending
/// byte, so a caller holding a multi-megabyte capture can jump straight
/// to the fault.
///
/// Running out of input is deliberately *not* represented here: a
/// truncated prefix is a "need more bytes" condition, reported by the
/// parsers as a pending result rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// A byte other than an ASCII digit or `:` appeared in the size prefix.
    #[error("invalid size byte {byte:#04X} at offset {offset}")]
    InvalidSizeByte { byte: u8, offset: usize },

    /// The delimiter `:` was seen before any digit.
    #[error("empty size prefix at offset {offset}")]
    EmptySize { offset: usize },

    /// More digits than the size prefix allows.
    #[error("size prefix exceeds {max_digits} digits at offset {offset}")]
    SizeTooLong { max_digits: usize, offset: usize },

    /// The byte following the payload is not one of the known type tags.
    #[error("unknown type tag {byte:#04X} at offset {offset}")]
    UnknownTag { byte: u8, offset: usize },
}

impl WireError {
    /// Absolute stream offset at which the error was detected.
    #[must_use]
    pub fn offset(&self) -> usize {
        match self {
            Self::InvalidSizeByte { offset, .. }
            | Self::EmptySize { offset }
            | Self::SizeTooLong { offset, .. }
            | Self::UnknownTag { offset, .. } => *offset,
        }
    }
}
