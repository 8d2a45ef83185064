use std::io::Write;

use tnet_types::TnetValue;
use tnet_wire::SIZE_DELIMITER;

use crate::error::EncodeError;

/// Largest payload a 9-digit size prefix can declare.
pub const MAX_PAYLOAD_SIZE: usize = 999_999_999;

/// Encode a single value as one TNET string.
///
/// ```text
///   3:123#            ← Integer(123)
///   5:hello,          ← String("hello")
///   0:]               ← List([])
///   14:1:a,4:1:b,]0:~]  ← ["a", ["b"], null]  (nested units)
/// ```
///
/// # Errors
///
/// [`EncodeError::PayloadTooLarge`] if any (nested) payload exceeds
/// [`MAX_PAYLOAD_SIZE`].
pub fn encode(value: &TnetValue) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    write_value(value, &mut out)?;
    Ok(out)
}

/// Builder for a stream of consecutive TNET strings.
///
/// Values are framed back-to-back with no separator, exactly as a peer
/// would send several messages on one connection.
///
/// ```rust
/// use tnet_encoder::TnetEncoder;
/// use tnet_types::TnetValue;
///
/// let bytes = TnetEncoder::new()
///     .add(TnetValue::Integer(1))
///     .add(TnetValue::from("a"))
///     .encode()
///     .unwrap();
/// assert_eq!(bytes, b"1:1#1:a,");
/// ```
#[derive(Clone, Debug, Default)]
pub struct TnetEncoder {
    values: Vec<TnetValue>,
}

impl TnetEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: TnetValue) -> &mut Self {
        self.values.push(value);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Encode every added value, in order, into one buffer.
    ///
    /// # Errors
    ///
    /// [`EncodeError::PayloadTooLarge`] as for [`encode`].
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut out = Vec::new();
        for value in &self.values {
            write_value(value, &mut out)?;
        }
        Ok(out)
    }

    /// Encode every added value into `w`.
    ///
    /// # Returns
    ///
    /// Total number of bytes written.
    ///
    /// # Errors
    ///
    /// [`EncodeError::PayloadTooLarge`] or any I/O error from `w`.
    pub fn write_to(&self, w: &mut impl Write) -> Result<usize, EncodeError> {
        let bytes = self.encode()?;
        w.write_all(&bytes)?;
        Ok(bytes.len())
    }
}

/// Append the full `<SIZE>:<PAYLOAD><TAG>` unit for `value` to `out`.
fn write_value(value: &TnetValue, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    let payload = payload(value)?;
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(EncodeError::PayloadTooLarge {
            size: payload.len(),
            limit: MAX_PAYLOAD_SIZE,
        });
    }
    out.extend_from_slice(payload.len().to_string().as_bytes());
    out.push(SIZE_DELIMITER);
    out.extend_from_slice(&payload);
    out.push(value.tag().to_byte());
    Ok(())
}

fn payload(value: &TnetValue) -> Result<Vec<u8>, EncodeError> {
    Ok(match value {
        TnetValue::Null => Vec::new(),
        TnetValue::Boolean(b) => b.to_string().into_bytes(),
        TnetValue::Integer(n) => n.to_string().into_bytes(),
        // Debug keeps the fractional part ("1.0") and uses exponents for
        // large magnitudes, both of which parse back to the same f64.
        TnetValue::Float(f) => format!("{f:?}").into_bytes(),
        TnetValue::String(bytes) => bytes.clone(),
        TnetValue::List(items) => {
            let mut out = Vec::new();
            for item in items {
                write_value(item, &mut out)?;
            }
            out
        }
        TnetValue::Dict(map) => {
            let mut out = Vec::new();
            for (key, item) in map {
                write_value(&TnetValue::String(key.clone()), &mut out)?;
                write_value(item, &mut out)?;
            }
            out
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(value: &TnetValue) -> Vec<u8> {
        encode(value).unwrap()
    }

    #[test]
    fn integer() {
        assert_eq!(enc(&TnetValue::Integer(123)), b"3:123#");
        assert_eq!(enc(&TnetValue::Integer(-5)), b"2:-5#");
    }

    #[test]
    fn scalars() {
        assert_eq!(enc(&TnetValue::Null), b"0:~");
        assert_eq!(enc(&TnetValue::Boolean(true)), b"4:true!");
        assert_eq!(enc(&TnetValue::Boolean(false)), b"5:false!");
        assert_eq!(enc(&TnetValue::Float(1.0)), b"3:1.0^");
        assert_eq!(enc(&TnetValue::Float(0.25)), b"4:0.25^");
    }

    #[test]
    fn utf8_string_size_counts_bytes_not_chars() {
        let text = "The π character is called pi";
        let encoded = enc(&TnetValue::from(text));
        // π is two bytes in UTF-8, so 28 chars become 29 bytes.
        assert_eq!(text.chars().count(), 28);
        let mut expected = b"29:".to_vec();
        expected.extend_from_slice(text.as_bytes());
        expected.push(b',');
        assert_eq!(encoded, expected);
    }

    #[test]
    fn empty_containers() {
        assert_eq!(enc(&TnetValue::List(vec![])), b"0:]");
        assert_eq!(enc(&TnetValue::dict::<&str, _>([])), b"0:}");
        assert_eq!(enc(&TnetValue::from("")), b"0:,");
    }

    #[test]
    fn nested_list() {
        let value = TnetValue::List(vec![
            TnetValue::from("a"),
            TnetValue::List(vec![TnetValue::from("b")]),
            TnetValue::Null,
        ]);
        assert_eq!(enc(&value), b"14:1:a,4:1:b,]0:~]");
    }

    #[test]
    fn dict_emits_key_value_pairs() {
        let value = TnetValue::dict([("k", TnetValue::Integer(1))]);
        assert_eq!(enc(&value), b"8:1:k,1:1#}");
    }

    #[test]
    fn builder_concatenates_and_writes() {
        let mut encoder = TnetEncoder::new();
        encoder.add(TnetValue::Integer(1)).add(TnetValue::Null);
        assert_eq!(encoder.len(), 2);

        let mut sink = Vec::new();
        let written = encoder.write_to(&mut sink).unwrap();
        assert_eq!(sink, b"1:1#0:~");
        assert_eq!(written, sink.len());
    }
}
