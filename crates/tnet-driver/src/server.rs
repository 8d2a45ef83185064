use std::net::SocketAddr;

use tnet_decoder::StreamingDecoder;
use tnet_types::json::{render, render_lossy};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::DriverConfig;
use crate::error::TransportError;

/// Terminates every reply the echo server writes.
pub const REPLY_DELIMITER: &str = "\n\n";

/// Run the echo server until `cancel` fires.
///
/// Each accepted connection gets its own task and decoder; nothing
/// is shared between connections. On cancellation the listener stops
/// accepting, connection tasks are cancelled through child tokens, and the
/// call returns once they have all finished.
///
/// # Errors
///
/// Only listener-level failures. Per-connection errors are logged.
pub async fn serve(
    listener: TcpListener,
    config: DriverConfig,
    cancel: CancellationToken,
) -> Result<(), TransportError> {
    tracing::info!(addr = %listener.local_addr()?, "tnet echo server listening");
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    if let Err(e) = stream.set_nodelay(true) {
                        tracing::debug!(%peer, error = %e, "set_nodelay failed");
                    }
                    let config = config.clone();
                    let cancel = cancel.child_token();
                    connections.spawn(async move {
                        if let Err(e) = serve_connection(stream, peer, &config, &cancel).await {
                            tracing::warn!(%peer, error = %e, "connection closed with error");
                        }
                    });
                }
                Err(e) => tracing::error!(error = %e, "failed to accept connection"),
            },
            Some(joined) = connections.join_next(), if !connections.is_empty() => {
                if let Err(e) = joined {
                    tracing::warn!(error = %e, "connection task failed");
                }
            }
            () = cancel.cancelled() => {
                tracing::info!("tnet echo server received cancellation signal");
                break;
            }
        }
    }

    tracing::info!(inflight = connections.len(), "waiting for connections to finish");
    while let Some(joined) = connections.join_next().await {
        if let Err(e) = joined {
            tracing::warn!(error = %e, "connection task failed");
        }
    }
    Ok(())
}

/// Serve one connection: decode values as their bytes arrive and answer
/// each with its JSON rendering followed by [`REPLY_DELIMITER`].
///
/// The read side is a [`StreamingDecoder`], so values may straddle reads
/// at any byte. Returns the number of values answered once the peer
/// closes cleanly, stays silent for `idle_timeout` between values, or
/// `cancel` fires.
///
/// A string that is not UTF-8 is answered with its lossy rendering, which
/// the client sees as a mismatch rather than a missing reply.
///
/// # Errors
///
/// - [`TransportError::Decode`] on malformed input (the connection is then
///   closed), or on EOF or `idle_timeout` partway through a value.
/// - [`TransportError::Stalled`] if a reply cannot be written within
///   `idle_timeout`.
/// - [`TransportError::Io`] on a socket failure.
pub async fn serve_connection<S>(
    stream: S,
    peer: SocketAddr,
    config: &DriverConfig,
    cancel: &CancellationToken,
) -> Result<usize, TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    tracing::info!(%peer, "connection accepted");
    let (reader, mut writer) = tokio::io::split(stream);
    let mut values = StreamingDecoder::with_options(reader, config.decoder);
    let idle = config.idle_timeout;
    let mut replies = 0;

    loop {
        let next = tokio::select! {
            () = cancel.cancelled() => {
                tracing::debug!(%peer, "connection cancelled");
                break;
            }
            next = tokio::time::timeout(idle, values.next()) => next,
        };

        let value = match next {
            Ok(Some(Ok(value))) => value,
            Ok(None) => break,
            Ok(Some(Err(e))) => {
                if e.is_malformed() {
                    tracing::warn!(%peer, offset = ?e.offset(), error = %e, "malformed TNET input");
                } else {
                    tracing::warn!(%peer, offset = values.position(), error = %e, "peer closed mid-value");
                }
                return Err(e.into());
            }
            Err(_) => {
                tracing::warn!(%peer, offset = values.position(), ?idle, "peer idle, closing");
                values.close()?;
                break;
            }
        };

        let mut reply = render(&value).unwrap_or_else(|e| {
            tracing::warn!(%peer, end = values.position(), error = %e, "value has no exact JSON form");
            render_lossy(&value)
        });
        reply.push_str(REPLY_DELIMITER);
        tokio::time::timeout(idle, writer.write_all(reply.as_bytes()))
            .await
            .map_err(|_| TransportError::Stalled(idle))??;
        replies += 1;
        tracing::info!(%peer, end = values.position(), reply = reply.trim_end(), "value answered");
    }

    if let Err(e) = writer.shutdown().await {
        tracing::debug!(%peer, error = %e, "shutdown failed");
    }
    tracing::info!(%peer, replies, "connection closed");
    Ok(replies)
}
