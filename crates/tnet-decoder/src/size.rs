use tnet_types::{ParseData, TnetValue};
use tnet_wire::{ByteCursor, SizePrefix};

use crate::error::DecodeError;

/// Reads a `<SIZE>:` prefix and commits the size into [`ParseData`].
///
/// The size lands under `path.field`, where `path` is supplied per call by
/// the owning machine and `field` is fixed at construction. Sibling
/// parsers pick it up from there through a
/// [`RepeatBinding`](crate::RepeatBinding).
#[derive(Clone, Debug)]
pub struct SizeParser {
    field: String,
    prefix: SizePrefix,
}

impl SizeParser {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            prefix: SizePrefix::new(),
        }
    }

    /// `true` until the first digit has been consumed.
    #[must_use]
    pub fn is_untouched(&self) -> bool {
        self.prefix.digits() == 0
    }

    /// Consume the size prefix and commit it.
    ///
    /// # Returns
    ///
    /// `Ok(Some(size))` once the delimiter is consumed and the size is
    /// committed; `Ok(None)` if more bytes are needed.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Wire`] for a malformed prefix.
    pub fn advance(
        &mut self,
        cursor: &mut ByteCursor,
        data: &mut ParseData,
        path: &str,
    ) -> Result<Option<usize>, DecodeError> {
        let Some(size) = self.prefix.advance(cursor)? else {
            return Ok(None);
        };
        // At most nine digits, so the size always fits.
        #[allow(clippy::cast_possible_wrap)]
        data.commit(path, &self.field, TnetValue::Integer(size as i64));
        Ok(Some(size))
    }

    pub fn reset(&mut self) {
        self.prefix = SizePrefix::new();
    }
}
