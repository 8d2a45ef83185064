#![warn(clippy::pedantic)]

pub mod bench;
pub mod client;
pub mod config;
pub mod error;
pub mod server;
pub mod transport;

pub use bench::{bench, BenchReport};
pub use client::{run_client, ClientReport};
pub use config::DriverConfig;
pub use error::TransportError;
pub use server::{serve, serve_connection, REPLY_DELIMITER};
pub use transport::{Drained, Recv, Transport};
