use crate::cursor::ByteCursor;
use crate::error::WireError;

/// Byte terminating the decimal size prefix.
pub const SIZE_DELIMITER: u8 = b':';

/// Maximum number of digits accepted in a size prefix.
///
/// Nine digits caps a single payload just under 1 GB, and lets the
/// parser reject absurd prefixes before a single payload byte arrives.
pub const MAX_SIZE_DIGITS: usize = 9;

/// Resumable reader for the `<SIZE>:` prefix of a TNET string.
///
/// ```text
///   "1" "2" "3" ":"
///    │   │   │   └─ delimiter → Ok(Some(123))
///    └───┴───┴───── digits accumulate across calls
/// ```
///
/// The accumulator survives across calls to [`advance`](Self::advance), so
/// a prefix split over several socket reads (`"12"` then `"3:"`) yields
/// the same size as one delivered whole.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SizePrefix {
    value: usize,
    digits: usize,
}

impl SizePrefix {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of digits consumed so far.
    #[must_use]
    pub fn digits(&self) -> usize {
        self.digits
    }

    /// Consume digits from `cursor` until the delimiter.
    ///
    /// # Returns
    ///
    /// `Ok(Some(size))` once `:` has been consumed, or `Ok(None)` if the
    /// cursor ran dry first. In the latter case call again after more
    /// bytes have been appended.
    ///
    /// # Errors
    ///
    /// - [`WireError::InvalidSizeByte`] for a non-digit, non-delimiter byte.
    /// - [`WireError::EmptySize`] for `:` with no preceding digit.
    /// - [`WireError::SizeTooLong`] past [`MAX_SIZE_DIGITS`] digits.
    pub fn advance(&mut self, cursor: &mut ByteCursor) -> Result<Option<usize>, WireError> {
        loop {
            let offset = cursor.position();
            let Some(byte) = cursor.next() else {
                return Ok(None);
            };
            match byte {
                b'0'..=b'9' => {
                    if self.digits == MAX_SIZE_DIGITS {
                        return Err(WireError::SizeTooLong {
                            max_digits: MAX_SIZE_DIGITS,
                            offset,
                        });
                    }
                    self.value = self.value * 10 + usize::from(byte - b'0');
                    self.digits += 1;
                }
                SIZE_DELIMITER if self.digits == 0 => {
                    return Err(WireError::EmptySize { offset });
                }
                SIZE_DELIMITER => return Ok(Some(self.value)),
                _ => return Err(WireError::InvalidSizeByte { byte, offset }),
            }
        }
    }
}
