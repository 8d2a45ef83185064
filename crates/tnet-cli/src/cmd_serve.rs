/// Implementation of `tnet serve`: run the echo server until Ctrl-C.
use std::time::Duration;

use anyhow::{Context, Result};
use tnet_driver::{serve, DriverConfig};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::ServeArgs;

/// Run the `tnet serve` command.
///
/// # Errors
///
/// Returns an error if the address cannot be bound.
pub async fn run(args: &ServeArgs) -> Result<()> {
    let mut config = DriverConfig {
        idle_timeout: Duration::from_millis(args.idle_timeout),
        ..DriverConfig::default()
    };
    if let Some(depth) = args.max_depth {
        config.decoder.max_depth = depth;
    }
    if let Some(size) = args.max_size {
        config.decoder.max_size = size;
    }

    let listener = TcpListener::bind(args.addr)
        .await
        .with_context(|| format!("cannot listen on {}", args.addr))?;
    let cancel = cancel_on_ctrl_c();
    serve(listener, config, cancel).await?;
    Ok(())
}

/// A token cancelled by the first Ctrl-C.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted");
            token.cancel();
        }
    });
    cancel
}
