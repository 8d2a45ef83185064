/// Implementation of `tnet client`.
///
/// Sends each test value to the echo server in random fragments, drains
/// the connection, and prints one line per test.
///
/// ```text
/// ✓ #0 1
/// ✓ #1 "a"
/// ✗ #2 "a" (no reply)
/// ```
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value;
use tnet_driver::{ClientReport, run_client};
use tnet_types::TnetValue;
use tnet_types::json::from_json;

use crate::ClientArgs;
use crate::cmd_serve::cancel_on_ctrl_c;

/// Run the `tnet client` command.
///
/// # Errors
///
/// Returns an error if the tests cannot be loaded, the server cannot be
/// reached, or any test does not get its expected reply.
pub async fn run(args: &ClientArgs) -> Result<()> {
    let tests = load_tests(args.tests.as_deref())?;
    let cancel = cancel_on_ctrl_c();
    let report = run_client(args.addr, &tests, &args.driver.config(), &cancel)
        .await
        .with_context(|| format!("client session with {} failed", args.addr))?;

    print_report(&report);
    if report.failed() {
        return Err(anyhow!("{}/{} tests succeeded", report.matched, report.expected.len()));
    }
    Ok(())
}

/// Test values from a JSON array file, or the default `[1, "a", "a"]`.
pub fn load_tests(path: Option<&Path>) -> Result<Vec<TnetValue>> {
    let Some(path) = path else {
        return Ok(vec![TnetValue::Integer(1), TnetValue::from("a"), TnetValue::from("a")]);
    };
    let text = fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    let json: Value =
        serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))?;
    match json {
        Value::Array(items) => Ok(items.iter().map(from_json).collect()),
        _ => bail!("{} must hold a JSON array of test values", path.display()),
    }
}

pub fn print_report(report: &ClientReport) {
    for (i, expected) in report.expected.iter().enumerate() {
        match report.replies.get(i) {
            Some(reply) if reply == expected => println!("✓ #{i} {expected}"),
            Some(reply) => println!("✗ #{i} {expected} (got {reply})"),
            None => println!("✗ #{i} {expected} (no reply)"),
        }
    }
    if let Some(error) = &report.error {
        println!("✗ exchange stopped early: {error}");
    }
    if !report.drain_closed {
        println!("✗ drain timed out before the server closed");
    }
}
