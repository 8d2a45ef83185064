use tnet_types::{Dict, ParseData, TnetValue, TypeError};
use tnet_wire::{ByteCursor, Tag};

use crate::error::DecodeError;
use crate::machine::{Stage, Step, TnetMachine};
use crate::options::DecoderOptions;

/// Turns a complete `(payload, tag)` pair into a [`TnetValue`].
///
/// Scalars are interpreted in place. Lists and dicts recurse: their
/// payload is a concatenation of complete TNET strings, parsed by a nested
/// [`TnetMachine`] one element at a time until the payload is used up.
/// Since the whole payload is already in hand, an element that the nested
/// machine cannot finish is a [`DecodeError::TruncatedElement`], never a
/// pending state.
///
/// ```text
///   payload "1:a,1:1#"  tag '}'
///            └──┬─┘└─┬┘
///              key  value   → Dict { "a": 1 }
/// ```
#[derive(Clone, Copy, Debug)]
pub struct TypeDispatcher {
    depth: usize,
    options: DecoderOptions,
}

impl TypeDispatcher {
    /// A dispatcher for a value nested `depth` containers deep.
    #[must_use]
    pub fn new(depth: usize, options: DecoderOptions) -> Self {
        Self { depth, options }
    }

    /// Interpret `payload` according to `tag`.
    ///
    /// `offset` is the absolute stream offset of the first payload byte and
    /// is used for error reporting only.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::Type`] when the payload does not fit the tag.
    /// - [`DecodeError::TooDeep`] when a container would exceed
    ///   `max_depth`.
    /// - Any error from a nested element.
    pub fn dispatch(&self, payload: Vec<u8>, tag: Tag, offset: usize) -> Result<TnetValue, DecodeError> {
        let type_err = |source: TypeError| DecodeError::Type { source, offset };
        match tag {
            Tag::String => Ok(TnetValue::String(payload)),
            Tag::Integer => ascii(&payload)
                .and_then(|s| s.parse::<i64>().ok())
                .map(TnetValue::Integer)
                .ok_or_else(|| {
                    type_err(TypeError::InvalidInteger {
                        payload: TypeError::payload_text(&payload),
                    })
                }),
            Tag::Float => ascii(&payload)
                .and_then(|s| s.parse::<f64>().ok())
                .map(TnetValue::Float)
                .ok_or_else(|| {
                    type_err(TypeError::InvalidFloat {
                        payload: TypeError::payload_text(&payload),
                    })
                }),
            Tag::Boolean => match payload.as_slice() {
                b"true" => Ok(TnetValue::Boolean(true)),
                b"false" => Ok(TnetValue::Boolean(false)),
                other => Err(type_err(TypeError::InvalidBoolean {
                    payload: TypeError::payload_text(other),
                })),
            },
            Tag::Null if payload.is_empty() => Ok(TnetValue::Null),
            Tag::Null => Err(type_err(TypeError::NonEmptyNull { len: payload.len() })),
            Tag::List => {
                let items = self.elements(payload, offset)?;
                Ok(TnetValue::List(items.into_iter().map(|(_, v)| v).collect()))
            }
            Tag::Dict => self.dict(payload, offset),
        }
    }

    fn dict(&self, payload: Vec<u8>, offset: usize) -> Result<TnetValue, DecodeError> {
        let items = self.elements(payload, offset)?;
        if items.len() % 2 != 0 {
            return Err(DecodeError::Type {
                source: TypeError::OddDictArity { elements: items.len() },
                offset,
            });
        }

        let mut map = Dict::new();
        let mut items = items.into_iter();
        while let (Some((key_offset, key)), Some((_, value))) = (items.next(), items.next()) {
            let TnetValue::String(key) = key else {
                return Err(DecodeError::Type {
                    source: TypeError::NonStringKey { found: key.tag() },
                    offset: key_offset,
                });
            };
            map.insert(key, value);
        }
        Ok(TnetValue::Dict(map))
    }

    /// Parse every element of a container payload, with each element's
    /// starting offset.
    fn elements(&self, payload: Vec<u8>, offset: usize) -> Result<Vec<(usize, TnetValue)>, DecodeError> {
        if payload.is_empty() {
            return Ok(Vec::new());
        }
        let depth = self.depth + 1;
        if depth > self.options.max_depth {
            return Err(DecodeError::TooDeep { depth, offset });
        }

        let mut cursor = ByteCursor::with_base(payload, offset);
        let mut scratch = ParseData::new();
        let mut machine = TnetMachine::nested(depth, self.options);
        let mut items = Vec::new();

        while !cursor.is_exhausted() {
            let start = cursor.position();
            let mut session = machine.session();
            loop {
                match session.step(&mut cursor, &mut scratch)? {
                    Step::Advanced(Stage::Terminal) => break,
                    Step::Advanced(_) => {}
                    Step::Pending => return Err(DecodeError::TruncatedElement { offset: start }),
                }
            }
            let value = session
                .take_value()
                .ok_or(DecodeError::TruncatedElement { offset: start })?;
            items.push((start, value));
        }
        Ok(items)
    }
}

/// Numeric payloads must be ASCII; anything else cannot parse.
fn ascii(payload: &[u8]) -> Option<&str> {
    if payload.is_ascii() {
        std::str::from_utf8(payload).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatch(payload: &[u8], tag: Tag) -> Result<TnetValue, DecodeError> {
        TypeDispatcher::new(0, DecoderOptions::default()).dispatch(payload.to_vec(), tag, 0)
    }

    #[test]
    fn scalars() {
        assert_eq!(dispatch(b"hi", Tag::String).unwrap(), TnetValue::from("hi"));
        assert_eq!(dispatch(b"-42", Tag::Integer).unwrap(), TnetValue::Integer(-42));
        assert_eq!(dispatch(b"2.5", Tag::Float).unwrap(), TnetValue::Float(2.5));
        assert_eq!(dispatch(b"true", Tag::Boolean).unwrap(), TnetValue::Boolean(true));
        assert_eq!(dispatch(b"false", Tag::Boolean).unwrap(), TnetValue::Boolean(false));
        assert_eq!(dispatch(b"", Tag::Null).unwrap(), TnetValue::Null);
    }

    #[test]
    fn string_bytes_are_kept_verbatim() {
        let value = dispatch(&[0xFF, 0x00], Tag::String).unwrap();
        assert_eq!(value, TnetValue::String(vec![0xFF, 0x00]));
    }

    #[test]
    fn bad_scalar_payloads() {
        assert!(matches!(
            dispatch(b"12a", Tag::Integer),
            Err(DecodeError::Type { source: TypeError::InvalidInteger { .. }, offset: 0 })
        ));
        assert!(matches!(
            dispatch(b"99999999999999999999", Tag::Integer),
            Err(DecodeError::Type { source: TypeError::InvalidInteger { .. }, .. })
        ));
        assert!(matches!(
            dispatch(b"one", Tag::Float),
            Err(DecodeError::Type { source: TypeError::InvalidFloat { .. }, .. })
        ));
        assert!(matches!(
            dispatch(b"True", Tag::Boolean),
            Err(DecodeError::Type { source: TypeError::InvalidBoolean { .. }, .. })
        ));
        assert!(matches!(
            dispatch(b"x", Tag::Null),
            Err(DecodeError::Type { source: TypeError::NonEmptyNull { len: 1 }, .. })
        ));
    }

    #[test]
    fn list_of_mixed_elements() {
        let value = dispatch(b"1:a,1:7#0:~", Tag::List).unwrap();
        assert_eq!(
            value,
            TnetValue::List(vec![TnetValue::from("a"), TnetValue::Integer(7), TnetValue::Null])
        );
    }

    #[test]
    fn empty_containers() {
        assert_eq!(dispatch(b"", Tag::List).unwrap(), TnetValue::List(vec![]));
        assert_eq!(dispatch(b"", Tag::Dict).unwrap(), TnetValue::dict::<&str, _>([]));
    }

    #[test]
    fn dict_pairs() {
        let value = dispatch(b"1:a,1:1#1:b,0:]", Tag::Dict).unwrap();
        assert_eq!(
            value,
            TnetValue::dict([("a", TnetValue::Integer(1)), ("b", TnetValue::List(vec![]))])
        );
    }

    #[test]
    fn dict_with_odd_arity() {
        assert!(matches!(
            dispatch(b"1:a,1:1#1:b,", Tag::Dict),
            Err(DecodeError::Type { source: TypeError::OddDictArity { elements: 3 }, .. })
        ));
    }

    #[test]
    fn dict_with_non_string_key_points_at_key() {
        let err = TypeDispatcher::new(0, DecoderOptions::default())
            .dispatch(b"1:a,1:1#1:2#1:b,".to_vec(), Tag::Dict, 100)
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Type { source: TypeError::NonStringKey { found: Tag::Integer }, offset: 108 }
        ));
    }

    #[test]
    fn trailing_partial_element_is_truncated() {
        // "3:ab" claims three bytes but the container payload ends first.
        let err = dispatch(b"1:a,3:ab", Tag::List).unwrap_err();
        assert!(matches!(err, DecodeError::TruncatedElement { offset: 4 }));
    }

    #[test]
    fn depth_limit() {
        let options = DecoderOptions { max_depth: 1, ..DecoderOptions::default() };
        // One level of nesting is fine...
        let ok = TypeDispatcher::new(0, options).dispatch(b"0:]".to_vec(), Tag::List, 0);
        assert_eq!(ok.unwrap(), TnetValue::List(vec![TnetValue::List(vec![])]));
        // ...two is not.
        let err = TypeDispatcher::new(0, options)
            .dispatch(b"4:1:a,]".to_vec(), Tag::List, 0)
            .unwrap_err();
        assert!(matches!(err, DecodeError::TooDeep { depth: 2, .. }));
    }

    #[test]
    fn nested_error_keeps_absolute_offset() {
        // Unknown tag 'x' sits at payload offset 3, stream offset 13.
        let err = TypeDispatcher::new(0, DecoderOptions::default())
            .dispatch(b"1:ax".to_vec(), Tag::List, 10)
            .unwrap_err();
        assert_eq!(err.offset(), Some(13));
    }
}
