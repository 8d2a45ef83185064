use tnet_types::{ParseData, TnetValue};
use tnet_wire::ByteCursor;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::DecodeError;
use crate::machine::{Stage, Step, TnetMachine};
use crate::options::DecoderOptions;

const READ_CHUNK: usize = 4096;

/// Asynchronous streaming decoder: yields TNET values one at a time as
/// their bytes arrive from any `AsyncRead` source.
///
/// Reads are made only when the buffered bytes cannot complete the next
/// value, so backpressure falls out of the caller's `await`s. Values may
/// straddle reads at any byte boundary; the machine simply resumes.
///
/// ```text
///   reader ──read()──▶ ByteCursor ──step()──▶ TnetMachine ──▶ TnetValue
///                          ▲                       │
///                          └──── compact() ◀── terminal, reset
/// ```
///
/// # Example
///
/// ```rust,no_run
/// use tnet_decoder::StreamingDecoder;
/// use tokio::io::AsyncRead;
///
/// async fn print_values(reader: impl AsyncRead + Unpin) {
///     let mut stream = StreamingDecoder::new(reader);
///     while let Some(value) = stream.next().await.transpose().unwrap() {
///         println!("{value:?}");
///     }
/// }
/// ```
pub struct StreamingDecoder<R> {
    reader: R,
    cursor: ByteCursor,
    data: ParseData,
    machine: TnetMachine,
    buf: Vec<u8>,
    eof: bool,
    done: bool,
}

impl<R: AsyncRead + Unpin> StreamingDecoder<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, DecoderOptions::default())
    }

    #[must_use]
    pub fn with_options(reader: R, options: DecoderOptions) -> Self {
        Self {
            reader,
            cursor: ByteCursor::new(),
            data: ParseData::new(),
            machine: TnetMachine::with_options("stream", options),
            buf: vec![0; READ_CHUNK],
            eof: false,
            done: false,
        }
    }

    /// Absolute stream offset of the next unread byte.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Read the next value from the stream.
    ///
    /// Returns `Some(Ok(value))` per decoded value, `None` once the reader
    /// is at EOF with nothing pending, or `Some(Err(_))` on malformed input,
    /// I/O failure, or EOF partway through a value. After an error the
    /// stream is finished and keeps returning `None`.
    pub async fn next(&mut self) -> Option<Result<TnetValue, DecodeError>> {
        if self.done {
            return None;
        }
        match self.read_value().await {
            Ok(Some(value)) => Some(Ok(value)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }

    /// Stop reading and resolve whatever is buffered, as EOF would.
    ///
    /// Used when the caller gives up on a silent reader. Afterwards
    /// [`next`](Self::next) returns `None`.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Incomplete`] if a value was partway through.
    pub fn close(&mut self) -> Result<(), DecodeError> {
        let was_done = std::mem::replace(&mut self.done, true);
        if was_done || (self.machine.is_untouched() && self.cursor.is_exhausted()) {
            return Ok(());
        }
        tracing::debug!(offset = self.cursor.position(), "stream abandoned mid-value");
        self.machine.finish(&self.cursor).map(drop)
    }

    async fn read_value(&mut self) -> Result<Option<TnetValue>, DecodeError> {
        loop {
            if self.drive()? {
                let value = self.machine.take_value();
                self.machine.reset();
                self.data.clear_path(self.machine.path());
                self.cursor.compact();
                return Ok(value);
            }

            if self.eof {
                if self.machine.is_untouched() && self.cursor.is_exhausted() {
                    return Ok(None);
                }
                tracing::debug!(offset = self.cursor.position(), "stream closed mid-value");
                return self.machine.finish(&self.cursor).map(Some);
            }

            let n = self.reader.read(&mut self.buf).await?;
            if n == 0 {
                self.eof = true;
            } else {
                self.cursor.compact();
                self.cursor.append(&self.buf[..n]);
            }
        }
    }

    /// Step the machine until it is terminal (`true`) or starved (`false`).
    fn drive(&mut self) -> Result<bool, DecodeError> {
        loop {
            match self.machine.step(&mut self.cursor, &mut self.data)? {
                Step::Advanced(Stage::Terminal) => return Ok(true),
                Step::Advanced(_) => {}
                Step::Pending => return Ok(false),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tnet_encoder::TnetEncoder;
    use tokio::io::AsyncWriteExt;

    async fn collect<R: AsyncRead + Unpin>(stream: &mut StreamingDecoder<R>) -> Vec<TnetValue> {
        let mut values = Vec::new();
        while let Some(value) = stream.next().await {
            values.push(value.unwrap());
        }
        values
    }

    #[tokio::test]
    async fn yields_each_value_in_order() {
        let bytes = TnetEncoder::new()
            .add(TnetValue::from("hello"))
            .add(TnetValue::Integer(-7))
            .add(TnetValue::dict([("k", TnetValue::Boolean(false))]))
            .encode()
            .unwrap();

        let mut stream = StreamingDecoder::new(bytes.as_slice());
        let values = collect(&mut stream).await;

        assert_eq!(values.len(), 3);
        assert_eq!(values[1], TnetValue::Integer(-7));
        assert_eq!(stream.position(), bytes.len());
    }

    #[tokio::test]
    async fn values_straddling_reads_are_reassembled() {
        let (mut tx, rx) = tokio::io::duplex(64);
        let writer = tokio::spawn(async move {
            for fragment in [&b"3:1"[..], b"23", b"#1:", b"a,"] {
                tx.write_all(fragment).await.unwrap();
                tokio::task::yield_now().await;
            }
        });

        let mut stream = StreamingDecoder::new(rx);
        let values = collect(&mut stream).await;
        writer.await.unwrap();

        assert_eq!(values, vec![TnetValue::Integer(123), TnetValue::from("a")]);
    }

    #[tokio::test]
    async fn empty_reader_yields_nothing() {
        let mut stream = StreamingDecoder::new(&b""[..]);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn eof_mid_value_is_incomplete() {
        let mut stream = StreamingDecoder::new(&b"0:~5:ab"[..]);
        assert_eq!(stream.next().await.unwrap().unwrap(), TnetValue::Null);
        let err = stream.next().await.unwrap().unwrap_err();
        assert!(matches!(err, DecodeError::Incomplete { offset: 7 }));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn close_resolves_a_silent_reader() {
        let (mut tx, rx) = tokio::io::duplex(64);
        tx.write_all(b"1:a,5:ab").await.unwrap();

        let mut stream = StreamingDecoder::new(rx);
        assert_eq!(stream.next().await.unwrap().unwrap(), TnetValue::from("a"));
        let waited = tokio::time::timeout(std::time::Duration::from_millis(50), stream.next()).await;
        assert!(waited.is_err());

        assert!(matches!(stream.close(), Err(DecodeError::Incomplete { offset: 8 })));
        assert!(stream.next().await.is_none());
        drop(tx);
    }

    #[tokio::test]
    async fn close_at_value_boundary_is_clean() {
        let (mut tx, rx) = tokio::io::duplex(64);
        tx.write_all(b"0:~").await.unwrap();

        let mut stream = StreamingDecoder::new(rx);
        assert_eq!(stream.next().await.unwrap().unwrap(), TnetValue::Null);
        stream.close().unwrap();
        assert!(stream.next().await.is_none());
        drop(tx);
    }

    #[tokio::test]
    async fn malformed_input_ends_the_stream() {
        let mut stream = StreamingDecoder::new(&b"1:a,1:b?1:c,"[..]);
        assert_eq!(stream.next().await.unwrap().unwrap(), TnetValue::from("a"));
        let err = stream.next().await.unwrap().unwrap_err();
        assert_eq!(err.offset(), Some(7));
        assert!(stream.next().await.is_none());
    }
}
