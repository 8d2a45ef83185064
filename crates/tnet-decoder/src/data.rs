use tnet_types::{ParseData, TnetValue};
use tnet_wire::{ByteCursor, Tag};

use crate::dispatch::TypeDispatcher;
use crate::error::DecodeError;
use crate::machine::{Stage, Step, TnetMachine};
use crate::options::DecoderOptions;

/// A repeat count captured from a size another parser already committed.
///
/// The count is copied out of [`ParseData`] once, at capture time. Later
/// writes to that entry do not move the bound of a repetition already in
/// progress, and the child holding the binding has no way to write back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepeatBinding {
    key: String,
    count: usize,
}

impl RepeatBinding {
    /// Capture the size committed under `key`.
    ///
    /// # Errors
    ///
    /// [`DecodeError::UnboundRepeat`] if no non-negative integer has been
    /// committed under `key`.
    pub fn capture(data: &ParseData, key: &str) -> Result<Self, DecodeError> {
        let count = data
            .size(key)
            .ok_or_else(|| DecodeError::UnboundRepeat { key: key.to_owned() })?;
        Ok(Self { key: key.to_owned(), count })
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }
}

/// What one repetition of a [`DataParser`] consumes.
#[derive(Debug)]
enum Mode {
    /// `count` payload octets, then the tag byte, then dispatch.
    Payload {
        buf: Vec<u8>,
        start: Option<usize>,
        depth: usize,
    },
    /// `count` complete TNET strings, each through a nested machine.
    Elements {
        items: Vec<TnetValue>,
        current: Option<Box<TnetMachine>>,
    },
}

/// Reads exactly as much as a [`RepeatBinding`] allows.
///
/// ```text
///   Payload mode, binding = 3          Elements mode, binding = 2
///
///   "abc"  ","                         "1:a,"  "2:42#"
///    └┬──┘  └─ tag → TypeDispatcher     └─┬─┘   └─┬──┘
///   3 octets                           element 1  element 2 → List
/// ```
///
/// Both modes are resumable: when the cursor runs dry the parser keeps
/// what it has and returns `Ok(None)`; call again after appending bytes.
#[derive(Debug)]
pub struct DataParser {
    field: String,
    binding: RepeatBinding,
    options: DecoderOptions,
    mode: Mode,
    done: bool,
}

impl DataParser {
    /// Payload mode: `binding.count()` octets followed by a tag byte.
    pub fn payload(field: impl Into<String>, binding: RepeatBinding, options: DecoderOptions) -> Self {
        Self::payload_at(field, binding, 0, options)
    }

    pub(crate) fn payload_at(
        field: impl Into<String>,
        binding: RepeatBinding,
        depth: usize,
        options: DecoderOptions,
    ) -> Self {
        Self {
            field: field.into(),
            options,
            mode: Mode::Payload {
                buf: Vec::with_capacity(binding.count.min(4096)),
                start: None,
                depth,
            },
            binding,
            done: false,
        }
    }

    /// Elements mode: exactly `binding.count()` complete TNET strings,
    /// collected into a list.
    pub fn elements(field: impl Into<String>, binding: RepeatBinding, options: DecoderOptions) -> Self {
        Self {
            field: field.into(),
            options,
            mode: Mode::Elements {
                items: Vec::with_capacity(binding.count.min(1024)),
                current: None,
            },
            binding,
            done: false,
        }
    }

    #[must_use]
    pub fn binding(&self) -> &RepeatBinding {
        &self.binding
    }

    /// Repetitions completed so far (octets or elements).
    #[must_use]
    pub fn completed(&self) -> usize {
        match &self.mode {
            Mode::Payload { buf, .. } => buf.len(),
            Mode::Elements { items, .. } => items.len(),
        }
    }

    /// Consume from `cursor` towards the bound.
    ///
    /// # Returns
    ///
    /// `Ok(Some(value))` once the bound is reached (and, in payload mode,
    /// the tag byte has been consumed and dispatched); `Ok(None)` if more
    /// bytes are needed.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::Wire`] for an unknown tag byte.
    /// - [`DecodeError::Spent`] if the bound was already reached; a parser
    ///   yields one value only.
    /// - Any dispatch or nested-element error.
    pub fn advance(
        &mut self,
        cursor: &mut ByteCursor,
        data: &mut ParseData,
        path: &str,
    ) -> Result<Option<TnetValue>, DecodeError> {
        if self.done {
            return Err(DecodeError::Spent { offset: cursor.position() });
        }
        let count = self.binding.count;
        let value = match &mut self.mode {
            Mode::Payload { buf, start, depth } => {
                let start = *start.get_or_insert(cursor.position());
                let want = count - buf.len();
                buf.extend_from_slice(cursor.take(want));
                if buf.len() < count {
                    return Ok(None);
                }

                let tag_offset = cursor.position();
                let Some(byte) = cursor.next() else {
                    return Ok(None);
                };
                let tag = Tag::from_byte(byte, tag_offset)?;
                let payload = std::mem::take(buf);
                TypeDispatcher::new(*depth, self.options).dispatch(payload, tag, start)?
            }
            Mode::Elements { items, current } => {
                let element_path = ParseData::key(path, &self.field);
                while items.len() < count {
                    let machine = current.get_or_insert_with(|| {
                        Box::new(TnetMachine::with_options(element_path.clone(), self.options))
                    });
                    match machine.step(cursor, data)? {
                        Step::Advanced(Stage::Terminal) => {
                            if let Some(value) = machine.take_value() {
                                items.push(value);
                            }
                            machine.reset();
                        }
                        Step::Advanced(_) => {}
                        Step::Pending => return Ok(None),
                    }
                }
                TnetValue::List(std::mem::take(items))
            }
        };
        self.done = true;
        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tnet_wire::WireError;

    fn bound(data: &mut ParseData, count: i64) -> RepeatBinding {
        data.commit("t", "size", TnetValue::Integer(count));
        RepeatBinding::capture(data, "t.size").unwrap()
    }

    #[test]
    fn binds_literal_size_before_consuming_payload() {
        use crate::size::SizeParser;

        let mut data = ParseData::new();
        let mut cursor = ByteCursor::from(&b"123:"[..]);
        let size = SizeParser::new("size")
            .advance(&mut cursor, &mut data, "machinery")
            .unwrap();
        assert_eq!(size, Some(123));

        let binding = RepeatBinding::capture(&data, "machinery.size").unwrap();
        assert_eq!(binding.count(), 123);

        let mut parser = DataParser::payload("data", binding, DecoderOptions::default());
        assert_eq!(parser.advance(&mut cursor, &mut data, "machinery").unwrap(), None);

        cursor.append(&[b'a'; 123]);
        assert_eq!(parser.advance(&mut cursor, &mut data, "machinery").unwrap(), None);
        assert_eq!(parser.completed(), 123);
        assert_eq!(cursor.position(), 4 + 123);

        cursor.append(b",");
        let value = parser.advance(&mut cursor, &mut data, "machinery").unwrap();
        assert_eq!(value, Some(TnetValue::String(vec![b'a'; 123])));
        assert_eq!(cursor.position(), 4 + 123 + 1);
    }

    #[test]
    fn payload_mode_stops_exactly_at_bound() {
        let mut data = ParseData::new();
        let binding = bound(&mut data, 3);
        let mut cursor = ByteCursor::from(&b"abc,def"[..]);
        let mut parser = DataParser::payload("data", binding, DecoderOptions::default());

        let value = parser.advance(&mut cursor, &mut data, "t").unwrap();
        assert_eq!(value, Some(TnetValue::from("abc")));
        assert_eq!(cursor.unread(), b"def");
    }

    #[test]
    fn parser_yields_one_value_only() {
        let mut data = ParseData::new();
        let binding = bound(&mut data, 3);
        let mut cursor = ByteCursor::from(&b"abc,1:a,"[..]);
        let mut payload = DataParser::payload("data", binding, DecoderOptions::default());
        assert!(payload.advance(&mut cursor, &mut data, "t").unwrap().is_some());
        let err = payload.advance(&mut cursor, &mut data, "t").unwrap_err();
        assert!(matches!(err, DecodeError::Spent { offset: 4 }));
        assert!(!err.is_malformed());
        assert_eq!(cursor.unread(), b"1:a,");

        let mut elements = DataParser::elements("items", bound(&mut data, 1), DecoderOptions::default());
        assert!(elements.advance(&mut cursor, &mut data, "t").unwrap().is_some());
        assert!(matches!(
            elements.advance(&mut cursor, &mut data, "t"),
            Err(DecodeError::Spent { offset: 8 })
        ));
    }

    #[test]
    fn payload_mode_rejects_unknown_tag() {
        let mut data = ParseData::new();
        let binding = bound(&mut data, 1);
        let mut cursor = ByteCursor::from(&b"a?"[..]);
        let err = DataParser::payload("data", binding, DecoderOptions::default())
            .advance(&mut cursor, &mut data, "t")
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Wire(WireError::UnknownTag { byte: b'?', offset: 1 })
        ));
    }

    #[test]
    fn elements_mode_parses_declared_count() {
        let mut data = ParseData::new();
        let binding = bound(&mut data, 2);
        let mut cursor = ByteCursor::from(&b"1:a,2:"[..]);
        let mut parser = DataParser::elements("items", binding, DecoderOptions::default());

        assert_eq!(parser.advance(&mut cursor, &mut data, "t").unwrap(), None);
        assert_eq!(parser.completed(), 1);

        cursor.append(b"42#0:~");
        let value = parser.advance(&mut cursor, &mut data, "t").unwrap();
        assert_eq!(
            value,
            Some(TnetValue::List(vec![TnetValue::from("a"), TnetValue::Integer(42)]))
        );
        // The third value is not part of the repetition.
        assert_eq!(cursor.unread(), b"0:~");
    }

    #[test]
    fn count_is_fixed_when_repetition_begins() {
        let mut data = ParseData::new();
        let binding = bound(&mut data, 1);
        let mut parser = DataParser::elements("items", binding, DecoderOptions::default());
        let mut cursor = ByteCursor::new();
        assert_eq!(parser.advance(&mut cursor, &mut data, "t").unwrap(), None);

        // Rewriting the source entry does not move the bound.
        data.commit("t", "size", TnetValue::Integer(5));
        cursor.append(b"0:~0:~");
        let value = parser.advance(&mut cursor, &mut data, "t").unwrap();
        assert_eq!(value, Some(TnetValue::List(vec![TnetValue::Null])));
        assert_eq!(parser.binding().count(), 1);
    }

    #[test]
    fn zero_count_elements_complete_immediately() {
        let mut data = ParseData::new();
        let binding = bound(&mut data, 0);
        let mut cursor = ByteCursor::new();
        let value = DataParser::elements("items", binding, DecoderOptions::default())
            .advance(&mut cursor, &mut data, "t")
            .unwrap();
        assert_eq!(value, Some(TnetValue::List(vec![])));
    }

    #[test]
    fn capture_requires_committed_size() {
        let data = ParseData::new();
        assert!(matches!(
            RepeatBinding::capture(&data, "nowhere.size"),
            Err(DecodeError::UnboundRepeat { .. })
        ));
    }
}
