/// Implementation of `tnet bench`: an in-process echo server on an
/// ephemeral port against `--clients` concurrent client sessions.
use anyhow::{Result, anyhow};
use tnet_driver::bench;

use crate::BenchArgs;
use crate::cmd_client::{load_tests, print_report};
use crate::cmd_serve::cancel_on_ctrl_c;

/// Run the `tnet bench` command.
///
/// # Errors
///
/// Returns an error if the bench cannot start or any client fails.
pub async fn run(args: &BenchArgs) -> Result<()> {
    let tests = load_tests(args.tests.as_deref())?;
    let report = bench(args.driver.config(), args.clients, tests, cancel_on_ctrl_c()).await?;

    for (number, client) in report.clients.iter().enumerate() {
        println!("── client {number} ──");
        print_report(client);
    }

    let failed = report.failed();
    if failed > 0 {
        return Err(anyhow!("{failed}/{} clients failed", report.clients.len()));
    }
    println!("✓ {} clients succeeded", report.clients.len());
    Ok(())
}
