#![warn(clippy::pedantic)]

pub mod data;
pub mod decoder;
pub mod dispatch;
pub mod error;
pub mod machine;
pub mod options;
pub mod size;
pub mod streaming;

pub use data::{DataParser, RepeatBinding};
pub use decoder::TnetDecoder;
pub use dispatch::TypeDispatcher;
pub use error::DecodeError;
pub use machine::{MachineState, Run, Session, Snapshot, Stage, Step, TnetMachine};
pub use options::DecoderOptions;
pub use size::SizeParser;
pub use streaming::StreamingDecoder;
