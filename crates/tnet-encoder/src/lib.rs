#![warn(clippy::pedantic)]

pub mod encoder;
pub mod error;

pub use encoder::{encode, TnetEncoder, MAX_PAYLOAD_SIZE};
pub use error::EncodeError;
