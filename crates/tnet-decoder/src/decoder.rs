use tnet_types::{ParseData, TnetValue};
use tnet_wire::ByteCursor;

use crate::data::{DataParser, RepeatBinding};
use crate::error::DecodeError;
use crate::machine::TnetMachine;
use crate::options::DecoderOptions;

/// Path under which one-shot decodes commit their sizes.
const ROOT_PATH: &str = "value";

/// Path under which [`TnetDecoder::decode_count`] commits its count.
const STREAM_PATH: &str = "stream";

/// Synchronous TNET decoder for input that is already fully in memory.
///
/// A thin driver over [`TnetMachine`]: the whole input goes into one
/// cursor, the machine runs to completion, and anything left in the
/// cursor afterwards is reported.
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────────────┐
/// │ Entry point  │ Accepts                                          │
/// ├──────────────┼──────────────────────────────────────────────────┤
/// │ decode       │ exactly one value, nothing after it              │
/// │ decode_all   │ zero or more back-to-back values                 │
/// │ decode_count │ exactly K back-to-back values, nothing after     │
/// └──────────────┴──────────────────────────────────────────────────┘
/// ```
///
/// # Example
///
/// ```rust
/// use tnet_decoder::TnetDecoder;
/// use tnet_types::TnetValue;
///
/// let value = TnetDecoder::decode(b"12:1:a,1:1#0:~]").unwrap();
/// assert_eq!(
///     value,
///     TnetValue::List(vec![TnetValue::from("a"), TnetValue::Integer(1), TnetValue::Null]),
/// );
/// ```
pub struct TnetDecoder;

impl TnetDecoder {
    /// Decode exactly one TNET value with default [`DecoderOptions`].
    ///
    /// # Errors
    ///
    /// - Any malformed-input [`DecodeError`].
    /// - [`DecodeError::Incomplete`] if the input ends mid-value.
    /// - [`DecodeError::TrailingData`] if bytes follow the value.
    pub fn decode(bytes: &[u8]) -> Result<TnetValue, DecodeError> {
        Self::decode_with(bytes, DecoderOptions::default())
    }

    /// Same as [`decode`](Self::decode) with explicit limits.
    ///
    /// # Errors
    ///
    /// See [`decode`](Self::decode).
    pub fn decode_with(bytes: &[u8], options: DecoderOptions) -> Result<TnetValue, DecodeError> {
        let mut cursor = ByteCursor::from(bytes);
        let mut data = ParseData::new();
        let mut machine = TnetMachine::with_options(ROOT_PATH, options);

        let value = next_value(&mut machine, &mut cursor, &mut data)?;
        reject_trailing(&cursor)?;
        Ok(value)
    }

    /// Decode every value in `bytes`, in order.
    ///
    /// Empty input yields an empty vector.
    ///
    /// # Errors
    ///
    /// The first error encountered. [`DecodeError::Incomplete`] if the last
    /// value is cut short.
    pub fn decode_all(bytes: &[u8]) -> Result<Vec<TnetValue>, DecodeError> {
        let mut cursor = ByteCursor::from(bytes);
        let mut data = ParseData::new();
        let mut machine = TnetMachine::new(ROOT_PATH);
        let mut values = Vec::new();

        while !cursor.is_exhausted() {
            values.push(next_value(&mut machine, &mut cursor, &mut data)?);
        }
        Ok(values)
    }

    /// Decode exactly `count` back-to-back values.
    ///
    /// The count is committed into [`ParseData`] like any parsed size and
    /// bound into a [`DataParser`] in elements mode, so the repetition
    /// stops after the `count`-th value.
    ///
    /// # Errors
    ///
    /// - Any malformed-input [`DecodeError`].
    /// - [`DecodeError::Incomplete`] if fewer than `count` values arrive.
    /// - [`DecodeError::TrailingData`] if bytes follow the last value.
    pub fn decode_count(bytes: &[u8], count: usize) -> Result<Vec<TnetValue>, DecodeError> {
        let mut cursor = ByteCursor::from(bytes);
        let mut data = ParseData::new();
        data.commit(
            STREAM_PATH,
            "count",
            TnetValue::Integer(i64::try_from(count).unwrap_or(i64::MAX)),
        );
        let binding = RepeatBinding::capture(&data, &ParseData::key(STREAM_PATH, "count"))?;
        let mut parser = DataParser::elements(ROOT_PATH, binding, DecoderOptions::default());

        let Some(list) = parser.advance(&mut cursor, &mut data, STREAM_PATH)? else {
            return Err(DecodeError::Incomplete { offset: cursor.position() });
        };
        reject_trailing(&cursor)?;
        match list {
            TnetValue::List(values) => Ok(values),
            other => Ok(vec![other]),
        }
    }
}

/// Run `machine` over `cursor` to the end of one value, leaving it reset.
fn next_value(
    machine: &mut TnetMachine,
    cursor: &mut ByteCursor,
    data: &mut ParseData,
) -> Result<TnetValue, DecodeError> {
    let mut session = machine.session();
    for snapshot in session.run(cursor, data) {
        snapshot?;
    }
    session.finish(cursor)
}

fn reject_trailing(cursor: &ByteCursor) -> Result<(), DecodeError> {
    if cursor.is_exhausted() {
        Ok(())
    } else {
        Err(DecodeError::TrailingData {
            extra_bytes: cursor.remaining(),
            offset: cursor.position(),
        })
    }
}
