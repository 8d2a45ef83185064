use tnet_decoder::DecodeError;
use tnet_encoder::EncodeError;
use tnet_types::TypeError;

/// Errors that can occur while exchanging TNET values over a connection.
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────────────────┐
/// │ Variant      │ Cause                                                │
/// ├──────────────┼──────────────────────────────────────────────────────┤
/// │ Io           │ socket connect, read, write, or shutdown failed      │
/// │ ServerClosed │ peer closed while a value was still being sent       │
/// │ Cancelled    │ the cancellation token fired mid-exchange            │
/// │ Stalled      │ a write made no progress within idle_timeout         │
/// │ Decode       │ peer sent malformed or truncated TNET input          │
/// │ Encode       │ an outgoing value could not be encoded               │
/// │ Render       │ a value has no JSON rendering (non-UTF-8 string)     │
/// │ Task         │ a spawned client or connection task panicked         │
/// └──────────────┴──────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("server closed connection")]
    ServerClosed,

    #[error("exchange cancelled")]
    Cancelled,

    #[error("peer stalled for {0:?}")]
    Stalled(std::time::Duration),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("cannot render reply: {0}")]
    Render(#[from] TypeError),

    #[error("task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
