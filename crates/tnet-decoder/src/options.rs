/// Maximum container nesting depth accepted by default.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Maximum declared payload size accepted by default (16 MiB).
pub const DEFAULT_MAX_SIZE: usize = 16 * 1024 * 1024;

/// Limits applied while decoding untrusted input.
///
/// ```text
/// ┌───────────┬──────────┬──────────────────────────────────────────┐
/// │ Field     │ Default  │ Effect                                   │
/// ├───────────┼──────────┼──────────────────────────────────────────┤
/// │ max_depth │ 64       │ deeper list/dict nesting is malformed    │
/// │ max_size  │ 16 MiB   │ larger declared sizes are malformed      │
/// └───────────┴──────────┴──────────────────────────────────────────┘
/// ```
///
/// The size check fires on the prefix, before any payload is buffered.
/// The depth check fires when a non-empty container payload is dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecoderOptions {
    pub max_depth: usize,
    pub max_size: usize,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}
