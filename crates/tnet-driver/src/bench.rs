use std::sync::Arc;

use tnet_types::TnetValue;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::client::{run_client, ClientReport};
use crate::config::DriverConfig;
use crate::error::TransportError;
use crate::server::serve;

/// Reports from every client of one [`bench`] run, in client order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BenchReport {
    pub clients: Vec<ClientReport>,
}

impl BenchReport {
    /// Number of clients whose session failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.clients.iter().filter(|c| c.failed()).count()
    }

    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.failed() == 0
    }
}

/// Start an echo server on an ephemeral local port, run `clients`
/// concurrent client sessions against it, then shut the server down.
///
/// Cancelling `cancel` moves every client straight to its drain; the
/// server keeps answering until all of them have finished draining.
///
/// # Errors
///
/// - [`TransportError::Io`] if the listener cannot be bound or a client
///   cannot connect.
/// - [`TransportError::Task`] if a client task panics.
/// - Any error from preparing the test values.
pub async fn bench(
    config: DriverConfig,
    clients: usize,
    tests: Vec<TnetValue>,
    cancel: CancellationToken,
) -> Result<BenchReport, TransportError> {
    let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
    let addr = listener.local_addr()?;
    let shutdown = CancellationToken::new();
    let server = tokio::spawn(serve(listener, config.clone(), shutdown.clone()));

    let tests = Arc::new(tests);
    let mut sessions = JoinSet::new();
    for number in 0..clients {
        let tests = Arc::clone(&tests);
        let config = config.clone();
        let cancel = cancel.child_token();
        sessions.spawn(async move {
            let report = run_client(addr, &tests, &config, &cancel).await;
            (number, report)
        });
    }

    let mut reports = Vec::with_capacity(clients);
    let mut first_error = None;
    while let Some(joined) = sessions.join_next().await {
        match joined {
            Ok((number, Ok(report))) => reports.push((number, report)),
            Ok((number, Err(e))) => {
                tracing::warn!(client = number, error = %e, "client could not run");
                first_error.get_or_insert(e);
            }
            Err(e) => {
                first_error.get_or_insert(TransportError::Task(e));
            }
        }
    }

    shutdown.cancel();
    server.await??;

    if let Some(e) = first_error {
        return Err(e);
    }
    reports.sort_by_key(|(number, _)| *number);
    let report = BenchReport {
        clients: reports.into_iter().map(|(_, r)| r).collect(),
    };
    if report.succeeded() {
        tracing::info!(clients, "bench succeeded");
    } else {
        tracing::warn!(clients, failed = report.failed(), "bench failed");
    }
    Ok(report)
}
