use std::net::SocketAddr;

use tnet_encoder::encode;
use tnet_types::TnetValue;
use tnet_types::json::render;
use tokio_util::sync::CancellationToken;

use crate::config::DriverConfig;
use crate::error::TransportError;
use crate::server::REPLY_DELIMITER;
use crate::transport::Transport;

/// What one client session sent and got back.
///
/// Two failure signals are kept apart: a test value with no reply at all
/// ([`missing`](Self::missing), the server could not decode it) and a reply
/// that does not equal the expected JSON (`mismatched`).
///
/// ```text
/// ┌──────────────┬─────────────────────────────────────────────────────┐
/// │ Field        │ Meaning                                             │
/// ├──────────────┼─────────────────────────────────────────────────────┤
/// │ expected     │ JSON rendering of each test value, in send order    │
/// │ replies      │ received text split on "\n\n"                       │
/// │ matched      │ replies equal to the expected rendering             │
/// │ mismatched   │ replies present but different                       │
/// │ drained      │ bytes collected after the write side was closed     │
/// │ drain_closed │ the server closed (false: the drain timed out)      │
/// │ error        │ why the exchange stopped early, if it did           │
/// └──────────────┴─────────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientReport {
    pub expected: Vec<String>,
    pub replies: Vec<String>,
    pub matched: usize,
    pub mismatched: usize,
    pub drained: usize,
    pub drain_closed: bool,
    pub error: Option<String>,
}

impl ClientReport {
    /// Compare `received` against the expected renderings.
    #[must_use]
    pub fn evaluate(expected: Vec<String>, received: &[u8]) -> Self {
        let text = String::from_utf8_lossy(received);
        let replies: Vec<String> = text.split_terminator(REPLY_DELIMITER).map(str::to_owned).collect();
        let matched = expected.iter().zip(&replies).filter(|(e, r)| e == r).count();
        let mismatched = expected.len().min(replies.len()) - matched;
        Self {
            expected,
            replies,
            matched,
            mismatched,
            ..Self::default()
        }
    }

    /// Test values that got no reply.
    #[must_use]
    pub fn missing(&self) -> usize {
        self.expected.len().saturating_sub(self.replies.len())
    }

    /// `true` unless every test value got exactly its expected reply.
    #[must_use]
    pub fn failed(&self) -> bool {
        self.error.is_some() || self.matched != self.expected.len() || self.replies.len() != self.expected.len()
    }
}

/// Send each test value to the echo server at `addr` and check the replies.
///
/// Values are sent one after another in random fragments. Whatever happens
/// during the exchange (success, error, or cancellation), the connection
/// is then drained so replies still in flight are counted.
///
/// # Errors
///
/// - [`TransportError::Render`] or [`TransportError::Encode`] if a test
///   value cannot be prepared (nothing is sent).
/// - [`TransportError::Io`] if the connection cannot be made.
///
/// Failures during the exchange itself are recorded in
/// [`ClientReport::error`] instead.
pub async fn run_client(
    addr: SocketAddr,
    tests: &[TnetValue],
    config: &DriverConfig,
    cancel: &CancellationToken,
) -> Result<ClientReport, TransportError> {
    let expected = tests.iter().map(render).collect::<Result<Vec<_>, _>>()?;
    let messages = tests.iter().map(encode).collect::<Result<Vec<_>, _>>()?;

    tracing::info!(%addr, tests = tests.len(), "client connecting");
    let mut transport = Transport::connect(addr, config.clone()).await?;

    let mut error = None;
    for (i, (msg, json)) in messages.iter().zip(&expected).enumerate() {
        tracing::info!(test = i, len = msg.len(), expect = %json, "sending");
        if let Err(e) = transport.send(msg, cancel).await {
            tracing::warn!(test = i, error = %e, "client exchange failed");
            error = Some(e.to_string());
            break;
        }
    }

    let drained = transport.drain().await;
    let mut report = ClientReport::evaluate(expected, transport.received());
    report.drained = drained.bytes;
    report.drain_closed = drained.closed;
    report.error = error;

    for (i, (expect, reply)) in report.expected.iter().zip(&report.replies).enumerate() {
        if expect != reply {
            tracing::warn!(test = i, expect = %expect, got = %reply, "reply mismatch");
        }
    }
    if report.failed() {
        tracing::warn!(
            matched = report.matched,
            tests = report.expected.len(),
            missing = report.missing(),
            "client failed"
        );
    } else {
        tracing::info!(matched = report.matched, "client succeeded");
    }
    Ok(report)
}
