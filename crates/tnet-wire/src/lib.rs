#![warn(clippy::pedantic)]

pub mod cursor;
pub mod error;
pub mod size;
pub mod tag;

pub use cursor::ByteCursor;
pub use error::WireError;
pub use size::{SizePrefix, MAX_SIZE_DIGITS, SIZE_DELIMITER};
pub use tag::Tag;
