//! Stderr logging for the `tnet` binary.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Environment variable holding filter directives, e.g. `tnet_driver=debug`.
const FILTER_ENV: &str = "RUST_LOG";

/// Install the global subscriber. Call once, before any command runs.
///
/// `RUST_LOG` directives win; without them the level is `info`, or `debug`
/// when `verbose` is set.
pub fn init(verbose: bool) {
    let default = if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .with_env_var(FILTER_ENV)
        .from_env_lossy();

    let layer = fmt::layer()
        .event_format(fmt::format().compact())
        .with_writer(std::io::stderr)
        .with_filter(filter);
    tracing_subscriber::registry().with(layer).init();
}
