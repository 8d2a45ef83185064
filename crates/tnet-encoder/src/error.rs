/// Errors that can occur while encoding values as TNET strings.
///
/// ```text
///   EncodeError
///   ├── PayloadTooLarge   ← payload needs more than 9 size digits
///   └── Io(std::io::Error) ← from the underlying writer
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("payload of {size} bytes exceeds the size prefix limit ({limit} bytes)")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
