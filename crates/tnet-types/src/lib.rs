#![warn(clippy::pedantic)]

pub mod data;
pub mod error;
pub mod json;
pub mod value;

pub use data::ParseData;
pub use error::TypeError;
pub use value::{Dict, TnetValue};
