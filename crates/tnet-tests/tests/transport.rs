//! End-to-end transport tests over real loopback TCP.
//!
//! The echo server and the fragmenting client run in the same process.
//! Delays are shortened so each test finishes quickly, but the exchange is
//! the same: random 2–10 byte fragments, a reply once each value is
//! complete, then a half-close and drain.

use std::time::Duration;

use tnet_driver::{bench, run_client, serve, DriverConfig, Recv, Transport};
use tnet_encoder::encode;
use tnet_tests::{default_tests, every_type, nested, PI_TEXT};
use tnet_types::TnetValue;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

fn fast_config() -> DriverConfig {
    DriverConfig {
        char_delay: Duration::from_millis(1),
        drain_delay: Duration::from_millis(500),
        ..DriverConfig::default()
    }
}

async fn start_server(config: DriverConfig) -> (std::net::SocketAddr, CancellationToken, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let handle = tokio::spawn(async move {
        serve(listener, config, token).await.unwrap();
    });
    (addr, cancel, handle)
}

// ── Fragmented exchange ───────────────────────────────────────────────────────

#[tokio::test]
async fn fragmented_values_roundtrip_with_clean_drain() {
    let report = bench(fast_config(), 1, default_tests(), CancellationToken::new()).await.unwrap();

    assert!(report.succeeded());
    let client = &report.clients[0];
    assert_eq!(client.replies, vec!["1", "\"a\"", "\"a\""]);
    assert_eq!(client.matched, 3);
    assert!(client.drain_closed);
    assert_eq!(client.drained, 0);
    assert_eq!(client.error, None);
}

#[tokio::test]
async fn concurrent_clients_do_not_interfere() {
    let tests = vec![TnetValue::from(PI_TEXT), every_type(), nested(4, 6), TnetValue::Float(-2.5)];
    let report = bench(fast_config(), 4, tests, CancellationToken::new()).await.unwrap();

    assert_eq!(report.clients.len(), 4);
    assert_eq!(report.failed(), 0);
    for client in &report.clients {
        assert_eq!(client.matched, 4);
    }
}

#[tokio::test]
async fn cancelled_bench_drains_every_client() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let report = bench(fast_config(), 3, default_tests(), cancel).await.unwrap();

    assert_eq!(report.failed(), 3);
    for client in &report.clients {
        assert_eq!(client.error.as_deref(), Some("exchange cancelled"));
        assert!(client.drain_closed);
    }
}

// ── Failure signals ───────────────────────────────────────────────────────────

#[tokio::test]
async fn non_utf8_value_is_answered_lossily() {
    let (addr, cancel, server) = start_server(fast_config()).await;

    // The server has no exact JSON for the non-UTF-8 string, so it replies
    // with U+FFFD and keeps reading.
    let tests = [TnetValue::Integer(7), TnetValue::String(vec![0xFF]), TnetValue::Null];
    let mut transport = Transport::connect(addr, fast_config()).await.unwrap();
    let client_cancel = CancellationToken::new();
    for test in &tests {
        transport.send(&encode(test).unwrap(), &client_cancel).await.unwrap();
    }
    let drained = transport.drain().await;

    assert!(drained.closed);
    assert_eq!(transport.received(), "7\n\n\"\u{FFFD}\"\n\nnull\n\n".as_bytes());

    cancel.cancel();
    server.await.unwrap();
}

#[tokio::test]
async fn malformed_input_closes_connection() {
    let (addr, cancel, server) = start_server(fast_config()).await;

    // The stream ends on the bad tag byte, so nothing is written after the
    // server has closed.
    let mut transport = Transport::connect(addr, fast_config()).await.unwrap();
    let _ = transport.send(b"0:~1:a?", &CancellationToken::new()).await;

    let drained = transport.drain().await;
    assert!(drained.closed);
    assert_eq!(transport.received(), b"null\n\n");

    cancel.cancel();
    server.await.unwrap();
}

#[tokio::test]
async fn mismatch_and_missing_are_separate_signals() {
    // A server that answers only the first value, and wrongly.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut first = [0; 4];
        stream.read_exact(&mut first).await.unwrap();
        stream.write_all(b"2\n\n").await.unwrap();
        let mut rest = Vec::new();
        stream.read_to_end(&mut rest).await.unwrap();
    });

    let tests = vec![TnetValue::Integer(1), TnetValue::Integer(3)];
    let report = run_client(addr, &tests, &fast_config(), &CancellationToken::new())
        .await
        .unwrap();
    server.await.unwrap();

    assert_eq!(report.matched, 0);
    assert_eq!(report.mismatched, 1);
    assert_eq!(report.missing(), 1);
    assert!(report.drain_closed);
    assert!(report.failed());
}

// ── Drain ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn drain_collects_replies_still_in_flight() {
    // A slow server: it only answers after the client has half-closed.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut got = Vec::new();
        stream.read_to_end(&mut got).await.unwrap();
        stream.write_all(b"1\n\n").await.unwrap();
        got
    });

    let config = DriverConfig { drain_delay: Duration::from_millis(50), ..fast_config() };
    let report = run_client(addr, &[TnetValue::Integer(1)], &config, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(server.await.unwrap(), b"1:1#");
    assert_eq!(report.drained, 3);
    assert!(report.drain_closed);
    assert_eq!(report.matched, 1);
    assert!(!report.failed());
}

#[tokio::test]
async fn cancelled_client_still_drains() {
    let (addr, cancel, server) = start_server(fast_config()).await;

    let client_cancel = CancellationToken::new();
    client_cancel.cancel();
    let report = run_client(addr, &default_tests(), &fast_config(), &client_cancel)
        .await
        .unwrap();

    assert_eq!(report.error.as_deref(), Some("exchange cancelled"));
    assert!(report.replies.is_empty());
    assert!(report.drain_closed);

    cancel.cancel();
    server.await.unwrap();
}

#[tokio::test]
async fn recv_times_out_on_idle_server() {
    let (addr, cancel, server) = start_server(fast_config()).await;

    let mut transport = Transport::connect(addr, fast_config()).await.unwrap();
    assert_eq!(transport.recv(Duration::from_millis(20)).await.unwrap(), Recv::Timeout);

    cancel.cancel();
    server.await.unwrap();
    assert_eq!(transport.recv(Duration::from_millis(500)).await.unwrap(), Recv::Closed);
}
