use std::net::SocketAddr;
use std::time::Duration;

use rand::Rng;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio_util::sync::CancellationToken;

use crate::config::DriverConfig;
use crate::error::TransportError;

/// Outcome of one bounded read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Recv {
    /// Nothing arrived within the timeout.
    Timeout,
    /// The peer closed its sending side.
    Closed,
    /// One read's worth of bytes.
    Data(Vec<u8>),
}

/// Result of [`Transport::drain`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Drained {
    /// Bytes collected while draining.
    pub bytes: usize,
    /// `true` if the peer closed; `false` if the drain gave up on a timeout
    /// or read error.
    pub closed: bool,
}

/// Client side of one connection: fragmented sends, bounded receives, and a
/// half-close drain.
///
/// Every byte received, whether during a send or the drain, is appended to
/// one buffer available from [`received`](Self::received).
///
/// ```text
///   send(msg):   ┌ chunk ┐ recv(char_delay) ┌ chunk ┐ ... ┌ last ┐ recv(drain_delay)
///   drain():     shutdown(write) ─▶ recv(drain_delay) ─▶ ... ─▶ Closed | Timeout
/// ```
pub struct Transport<R, W> {
    reader: R,
    writer: W,
    config: DriverConfig,
    buf: Vec<u8>,
    received: Vec<u8>,
}

impl Transport<OwnedReadHalf, OwnedWriteHalf> {
    /// Connect over TCP with Nagle disabled, so small fragments leave
    /// immediately.
    ///
    /// # Errors
    ///
    /// [`TransportError::Io`] if the connection cannot be made.
    pub async fn connect(addr: SocketAddr, config: DriverConfig) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        let (reader, writer) = stream.into_split();
        Ok(Self::new(reader, writer, config))
    }
}

impl<R, W> Transport<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, config: DriverConfig) -> Self {
        Self {
            reader,
            writer,
            buf: vec![0; config.recv_buffer.max(1)],
            config,
            received: Vec::new(),
        }
    }

    /// Everything received so far.
    #[must_use]
    pub fn received(&self) -> &[u8] {
        &self.received
    }

    /// Wait at most `timeout` for one read.
    ///
    /// # Errors
    ///
    /// [`TransportError::Io`] if the read itself fails.
    pub async fn recv(&mut self, timeout: Duration) -> Result<Recv, TransportError> {
        match tokio::time::timeout(timeout, self.reader.read(&mut self.buf)).await {
            Err(_) => Ok(Recv::Timeout),
            Ok(Ok(0)) => Ok(Recv::Closed),
            Ok(Ok(n)) => Ok(Recv::Data(self.buf[..n].to_vec())),
            Ok(Err(e)) => Err(e.into()),
        }
    }

    /// Write `msg` in random fragments, waiting for replies in between.
    ///
    /// After each fragment the transport waits `char_delay` for a reply if
    /// more of the message remains, otherwise `drain_delay`. Replies that
    /// arrive are appended to [`received`](Self::received).
    ///
    /// # Errors
    ///
    /// - [`TransportError::ServerClosed`] if the peer closes mid-message.
    /// - [`TransportError::Cancelled`] if `cancel` fires.
    /// - [`TransportError::Stalled`] if a fragment cannot be written within
    ///   `idle_timeout`.
    /// - [`TransportError::Io`] on a socket failure.
    pub async fn send(&mut self, msg: &[u8], cancel: &CancellationToken) -> Result<(), TransportError> {
        let idle = self.config.idle_timeout;
        let mut rest = msg;
        while !rest.is_empty() {
            let (chunk, tail) = rest.split_at(self.chunk_len(rest.len()));
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(TransportError::Cancelled),
                written = tokio::time::timeout(idle, self.writer.write_all(chunk)) => {
                    written.map_err(|_| TransportError::Stalled(idle))??;
                }
            }
            rest = tail;

            let wait = if rest.is_empty() {
                self.config.drain_delay
            } else {
                self.config.char_delay
            };
            let reply = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(TransportError::Cancelled),
                reply = self.recv(wait) => reply?,
            };
            match reply {
                Recv::Data(bytes) => {
                    tracing::debug!(len = bytes.len(), "recv");
                    self.received.extend_from_slice(&bytes);
                }
                Recv::Closed => return Err(TransportError::ServerClosed),
                Recv::Timeout => {}
            }
        }
        Ok(())
    }

    /// Half-close the connection and collect whatever is still in flight.
    ///
    /// Reads until the peer closes, or until one read waits longer than
    /// `drain_delay`. Never fails: problems are logged and reported as an
    /// unclean drain.
    pub async fn drain(&mut self) -> Drained {
        if let Err(e) = self.writer.shutdown().await {
            tracing::debug!(error = %e, "shutdown before drain failed");
        }

        let mut bytes = 0;
        loop {
            match self.recv(self.config.drain_delay).await {
                Ok(Recv::Data(data)) => {
                    tracing::debug!(len = data.len(), "drain");
                    bytes += data.len();
                    self.received.extend_from_slice(&data);
                }
                Ok(Recv::Closed) => return Drained { bytes, closed: true },
                Ok(Recv::Timeout) => {
                    tracing::warn!(bytes, delay = ?self.config.drain_delay, "drain timed out before EOF");
                    return Drained { bytes, closed: false };
                }
                Err(e) => {
                    tracing::warn!(bytes, error = %e, "drain read failed");
                    return Drained { bytes, closed: false };
                }
            }
        }
    }

    fn chunk_len(&self, remaining: usize) -> usize {
        let (lo, hi) = self.config.chunk_bounds();
        rand::rng().random_range(lo..=hi).min(remaining)
    }
}
