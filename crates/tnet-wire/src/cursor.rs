/// Appendable, position-tracking view over the bytes of one parse session.
///
/// The transport appends bytes as they arrive (`append`), and parsers pull
/// them one at a time (`next`) or look ahead without consuming (`peek`).
/// End of input is an ordinary `None`, not a fault: it only means "no more
/// bytes *yet*".
///
/// ```text
///   discarded by compact()      consumed         unread
///  ┌───────────────────────┬─────────────────┬──────────────┐
///  │ base                  │ buf[..off]      │ buf[off..]   │
///  └───────────────────────┴─────────────────┴──────────────┘
///                                            ^ position() = base + off
/// ```
///
/// `position()` is an absolute offset into the stream and only ever grows,
/// even across [`compact`](Self::compact).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ByteCursor {
    buf: Vec<u8>,
    off: usize,
    base: usize,
}

impl ByteCursor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A cursor over `buf` whose positions start at `base`.
    ///
    /// Used for container payloads: nested elements are parsed from their
    /// own cursor, but offsets still point into the enclosing stream.
    #[must_use]
    pub fn with_base(buf: Vec<u8>, base: usize) -> Self {
        Self { buf, off: 0, base }
    }

    /// Append newly received bytes. Nothing is consumed.
    pub fn append(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Consume and return the next byte, or `None` at end of input.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<u8> {
        let byte = *self.buf.get(self.off)?;
        self.off += 1;
        Some(byte)
    }

    /// Return the next byte without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.buf.get(self.off).copied()
    }

    /// Total number of bytes consumed since the cursor was created.
    #[must_use]
    pub fn position(&self) -> usize {
        self.base + self.off
    }

    /// Number of bytes appended but not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.off
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.off == self.buf.len()
    }

    /// The unread bytes.
    #[must_use]
    pub fn unread(&self) -> &[u8] {
        &self.buf[self.off..]
    }

    /// Consume up to `max` bytes at once, returning the consumed slice.
    pub fn take(&mut self, max: usize) -> &[u8] {
        let end = self.off + max.min(self.remaining());
        let start = std::mem::replace(&mut self.off, end);
        &self.buf[start..end]
    }

    /// Drop the consumed prefix from memory. `position()` is unchanged.
    pub fn compact(&mut self) {
        if self.off == 0 {
            return;
        }
        self.buf.drain(..self.off);
        self.base += self.off;
        self.off = 0;
    }
}

impl From<&[u8]> for ByteCursor {
    fn from(bytes: &[u8]) -> Self {
        Self::from(bytes.to_vec())
    }
}

impl From<Vec<u8>> for ByteCursor {
    fn from(buf: Vec<u8>) -> Self {
        Self { buf, off: 0, base: 0 }
    }
}
