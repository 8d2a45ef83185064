use std::ops::{Deref, DerefMut};

use tnet_types::{ParseData, TnetValue};
use tnet_wire::ByteCursor;

use crate::data::{DataParser, RepeatBinding};
use crate::error::DecodeError;
use crate::options::DecoderOptions;
use crate::size::SizeParser;

/// Field the machine commits its size prefix under.
pub const SIZE_FIELD: &str = "size";

/// Field name of the payload parser (also the element path suffix).
pub const DATA_FIELD: &str = "data";

/// Phase of a [`TnetMachine`].
///
/// ```text
///   Size ──(size committed)──▶ Data ──(tag dispatched)──▶ Terminal
///     │                          │
///     └──────── malformed ───────┴──▶ (failed until reset)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Size,
    Data,
    Terminal,
}

/// Whether a complete value is available.
///
/// `NonTerminal` covers both "need more bytes" and "failed"; the two are
/// told apart by whether [`TnetMachine::step`] returned an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MachineState {
    NonTerminal,
    Terminal,
}

/// Outcome of one [`TnetMachine::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// The machine moved into `Stage`.
    Advanced(Stage),
    /// No progress is possible with the bytes currently in the cursor.
    Pending,
}

/// One item yielded by [`TnetMachine::run`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub stage: Stage,
    pub state: MachineState,
    /// Cursor position after the transition.
    pub offset: usize,
}

#[derive(Debug)]
enum Phase {
    Size(SizeParser),
    Data(DataParser),
    Terminal,
    Failed { offset: usize },
}

/// The composite TNET state machine: a [`SizeParser`] chained into a
/// [`DataParser`], recursing through the
/// [`TypeDispatcher`](crate::TypeDispatcher) for containers.
///
/// The machine never blocks. Each [`step`](Self::step) either advances a
/// phase, reports [`Step::Pending`] when the cursor has run dry, or fails
/// permanently. Driving it across partial inputs looks like:
///
/// ```rust
/// use tnet_decoder::{MachineState, TnetMachine};
/// use tnet_types::{ParseData, TnetValue};
/// use tnet_wire::ByteCursor;
///
/// let mut machine = TnetMachine::new("msg");
/// let mut data = ParseData::new();
/// let mut cursor = ByteCursor::new();
///
/// for fragment in [&b"3:1"[..], b"23", b"#"] {
///     cursor.append(fragment);
///     for snapshot in machine.run(&mut cursor, &mut data) {
///         snapshot.unwrap();
///     }
/// }
/// assert_eq!(machine.state(), MachineState::Terminal);
/// assert_eq!(machine.take_value(), Some(TnetValue::Integer(123)));
/// ```
///
/// Once terminal, the cursor sits exactly one byte past the tag; anything
/// after that belongs to the next value. Reset the machine (or let a
/// [`Session`] do it) before parsing that next value.
#[derive(Debug)]
pub struct TnetMachine {
    path: String,
    depth: usize,
    options: DecoderOptions,
    phase: Phase,
    value: Option<TnetValue>,
}

impl TnetMachine {
    /// A top-level machine committing under `path`, with default limits.
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_options(path, DecoderOptions::default())
    }

    pub fn with_options(path: impl Into<String>, options: DecoderOptions) -> Self {
        Self {
            path: path.into(),
            depth: 0,
            options,
            phase: Phase::Size(SizeParser::new(SIZE_FIELD)),
            value: None,
        }
    }

    /// A machine for elements inside a container `depth` levels deep.
    pub(crate) fn nested(depth: usize, options: DecoderOptions) -> Self {
        Self {
            depth,
            ..Self::with_options(String::new(), options)
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        match self.phase {
            Phase::Size(_) | Phase::Failed { .. } => Stage::Size,
            Phase::Data(_) => Stage::Data,
            Phase::Terminal => Stage::Terminal,
        }
    }

    #[must_use]
    pub fn state(&self) -> MachineState {
        if matches!(self.phase, Phase::Terminal) {
            MachineState::Terminal
        } else {
            MachineState::NonTerminal
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.phase, Phase::Failed { .. })
    }

    /// `true` before the first byte of a value has been consumed.
    #[must_use]
    pub fn is_untouched(&self) -> bool {
        matches!(&self.phase, Phase::Size(size) if size.is_untouched())
    }

    /// Take the decoded value. `Some` at most once per terminal state.
    pub fn take_value(&mut self) -> Option<TnetValue> {
        self.value.take()
    }

    /// Advance as far as the bytes in `cursor` allow, by one phase at most.
    ///
    /// A terminal machine makes no further progress and keeps returning
    /// [`Step::Pending`]; reset it to parse the next value.
    ///
    /// # Errors
    ///
    /// Any malformed-input [`DecodeError`]. The machine then stays failed:
    /// later calls return [`DecodeError::Poisoned`] until [`reset`](Self::reset).
    pub fn step(&mut self, cursor: &mut ByteCursor, data: &mut ParseData) -> Result<Step, DecodeError> {
        let start = cursor.position();
        let result = self.advance(cursor, data);
        if let Err(ref e) = result {
            let offset = e.offset().unwrap_or(start);
            tracing::debug!(path = %self.path, offset, error = %e, "tnet machine failed");
            self.phase = Phase::Failed { offset };
        }
        result
    }

    fn advance(&mut self, cursor: &mut ByteCursor, data: &mut ParseData) -> Result<Step, DecodeError> {
        match &mut self.phase {
            Phase::Size(size) => {
                let offset = cursor.position();
                let Some(declared) = size.advance(cursor, data, &self.path)? else {
                    return Ok(Step::Pending);
                };
                if declared > self.options.max_size {
                    return Err(DecodeError::SizeLimit {
                        size: declared,
                        limit: self.options.max_size,
                        offset,
                    });
                }
                let key = ParseData::key(&self.path, SIZE_FIELD);
                let binding = RepeatBinding::capture(data, &key)?;
                tracing::trace!(path = %self.path, size = declared, "size committed");
                self.phase = Phase::Data(DataParser::payload_at(
                    DATA_FIELD,
                    binding,
                    self.depth,
                    self.options,
                ));
                Ok(Step::Advanced(Stage::Data))
            }
            Phase::Data(parser) => {
                let Some(value) = parser.advance(cursor, data, &self.path)? else {
                    return Ok(Step::Pending);
                };
                tracing::trace!(path = %self.path, tag = ?value.tag(), end = cursor.position(), "value complete");
                self.value = Some(value);
                self.phase = Phase::Terminal;
                Ok(Step::Advanced(Stage::Terminal))
            }
            Phase::Terminal => Ok(Step::Pending),
            Phase::Failed { offset } => Err(DecodeError::Poisoned { offset: *offset }),
        }
    }

    /// Iterate state snapshots until no further progress is possible.
    ///
    /// The iterator ends after the terminal snapshot, after an error, or
    /// when the cursor runs dry. It borrows the machine, so a fresh run
    /// over the same machine continues where the previous one stopped.
    pub fn run<'a>(&'a mut self, cursor: &'a mut ByteCursor, data: &'a mut ParseData) -> Run<'a> {
        Run {
            machine: self,
            cursor,
            data,
            done: false,
        }
    }

    /// Resolve the machine at end of stream.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::Incomplete`] if the value never completed.
    /// - [`DecodeError::Spent`] if the value was already taken.
    /// - [`DecodeError::Poisoned`] if the machine had failed.
    pub fn finish(&mut self, cursor: &ByteCursor) -> Result<TnetValue, DecodeError> {
        let offset = cursor.position();
        match self.phase {
            Phase::Failed { offset } => Err(DecodeError::Poisoned { offset }),
            Phase::Terminal => self.value.take().ok_or(DecodeError::Spent { offset }),
            Phase::Size(_) | Phase::Data(_) => Err(DecodeError::Incomplete { offset }),
        }
    }

    /// Return to the initial `Size` stage, discarding any partial value.
    pub fn reset(&mut self) {
        self.phase = Phase::Size(SizeParser::new(SIZE_FIELD));
        self.value = None;
    }

    /// Scope a parse: the returned guard resets the machine when dropped,
    /// whichever way the caller leaves the scope.
    pub fn session(&mut self) -> Session<'_> {
        Session { machine: self }
    }
}

/// Scoped use of a [`TnetMachine`]; resets it on drop.
///
/// Take the value out with [`TnetMachine::take_value`] (through deref)
/// before the guard goes away.
#[derive(Debug)]
pub struct Session<'m> {
    machine: &'m mut TnetMachine,
}

impl Deref for Session<'_> {
    type Target = TnetMachine;

    fn deref(&self) -> &TnetMachine {
        self.machine
    }
}

impl DerefMut for Session<'_> {
    fn deref_mut(&mut self) -> &mut TnetMachine {
        self.machine
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        self.machine.reset();
    }
}

/// Iterator returned by [`TnetMachine::run`].
pub struct Run<'a> {
    machine: &'a mut TnetMachine,
    cursor: &'a mut ByteCursor,
    data: &'a mut ParseData,
    done: bool,
}

impl Iterator for Run<'_> {
    type Item = Result<Snapshot, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.machine.step(self.cursor, self.data) {
            Ok(Step::Advanced(stage)) => {
                self.done = stage == Stage::Terminal;
                Some(Ok(Snapshot {
                    stage,
                    state: self.machine.state(),
                    offset: self.cursor.position(),
                }))
            }
            Ok(Step::Pending) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
