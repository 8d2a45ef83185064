/// TNET command-line tool: encode, decode, and validate TNET strings, and
/// run the fragmenting echo server, client, and bench.
///
/// # Command overview
///
/// ```text
/// tnet <COMMAND> [OPTIONS]
///
/// Commands:
///   encode     Encode JSON as TNET
///   decode     Print the TNET values in a file as JSON
///   validate   Check a TNET file and report the first bad byte
///   serve      Run the echo server
///   client     Send test values to an echo server and check the replies
///   bench      Run an in-process server against concurrent clients
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Log at debug level (RUST_LOG overrides)
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                        |
/// |------|------------------------------------------------|
/// | 0    | Success                                        |
/// | 1    | Error (I/O failure, malformed input, failed test) |
///
/// Logs and error details go to stderr so stdout can be piped cleanly.
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tnet_driver::DriverConfig;

mod cmd_bench;
mod cmd_client;
mod cmd_decode;
mod cmd_encode;
mod cmd_serve;
mod cmd_validate;
mod logging;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// The TNET command-line tool.
#[derive(Parser)]
#[command(name = "tnet", version, about = "TNET string codec and echo transport")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Encode JSON as TNET.
    Encode(EncodeArgs),
    /// Print the TNET values in a file as JSON, one per line.
    Decode(DecodeArgs),
    /// Check a TNET file and report the first bad byte.
    Validate(ValidateArgs),
    /// Run the echo server until interrupted.
    Serve(ServeArgs),
    /// Send test values to an echo server and check the replies.
    Client(ClientArgs),
    /// Run an in-process echo server against concurrent clients.
    Bench(BenchArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `tnet encode`.
///
/// ```text
/// ┌─────────────┬─────────────────────────────────────────────────────┐
/// │ Flag        │ Effect                                              │
/// ├─────────────┼─────────────────────────────────────────────────────┤
/// │ INPUT       │ JSON file; stdin when omitted                       │
/// │ -o FILE     │ write TNET to FILE instead of stdout                │
/// │ --each      │ top-level array: one TNET value per element         │
/// └─────────────┴─────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct EncodeArgs {
    /// JSON input file. Reads stdin when omitted.
    pub input: Option<PathBuf>,

    /// Output file. Writes stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Encode each element of a top-level JSON array as its own value.
    #[arg(long)]
    pub each: bool,
}

/// Arguments for `tnet decode`.
#[derive(clap::Args)]
pub struct DecodeArgs {
    /// TNET input file.
    pub file: PathBuf,

    /// Expect exactly this many back-to-back values.
    #[arg(long)]
    pub count: Option<usize>,

    /// Pretty-print each value.
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments for `tnet validate`.
///
/// Decodes every value in the file and prints `✓` lines, or a `✗` line
/// naming the byte offset of the first problem.
#[derive(clap::Args)]
pub struct ValidateArgs {
    /// TNET input file.
    pub file: PathBuf,
}

/// Fragmenting and timing knobs shared by `client` and `bench`.
///
/// ```text
/// ┌──────────────┬─────────┬──────────────────────────────────────────┐
/// │ Flag         │ Default │ Effect                                   │
/// ├──────────────┼─────────┼──────────────────────────────────────────┤
/// │ --chunk-min  │ 2       │ smallest fragment in bytes               │
/// │ --chunk-max  │ 10      │ largest fragment in bytes                │
/// │ --char-delay │ 10      │ ms to wait for a reply between fragments │
/// │ --drain-delay│ 2000    │ ms to wait after the last fragment       │
/// └──────────────┴─────────┴──────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct DriverArgs {
    #[arg(long, default_value_t = 2)]
    pub chunk_min: usize,

    #[arg(long, default_value_t = 10)]
    pub chunk_max: usize,

    /// Milliseconds.
    #[arg(long, default_value_t = 10)]
    pub char_delay: u64,

    /// Milliseconds.
    #[arg(long, default_value_t = 2000)]
    pub drain_delay: u64,
}

impl DriverArgs {
    pub fn config(&self) -> DriverConfig {
        DriverConfig {
            chunk_min: self.chunk_min,
            chunk_max: self.chunk_max,
            char_delay: Duration::from_millis(self.char_delay),
            drain_delay: Duration::from_millis(self.drain_delay),
            ..DriverConfig::default()
        }
    }
}

/// Arguments for `tnet serve`.
#[derive(clap::Args)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8008")]
    pub addr: SocketAddr,

    /// Deepest container nesting accepted.
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Largest declared payload size accepted, in bytes.
    #[arg(long)]
    pub max_size: Option<usize>,

    /// Milliseconds a connection may sit idle before it is closed.
    #[arg(long, default_value_t = 30_000)]
    pub idle_timeout: u64,
}

/// Arguments for `tnet client`.
#[derive(clap::Args)]
pub struct ClientArgs {
    /// Echo server address.
    #[arg(long, default_value = "127.0.0.1:8008")]
    pub addr: SocketAddr,

    /// JSON file holding an array of test values. Defaults to `[1, "a", "a"]`.
    #[arg(long)]
    pub tests: Option<PathBuf>,

    #[command(flatten)]
    pub driver: DriverArgs,
}

/// Arguments for `tnet bench`.
#[derive(clap::Args)]
pub struct BenchArgs {
    /// Number of concurrent clients.
    #[arg(long, default_value_t = 1)]
    pub clients: usize,

    /// JSON file holding an array of test values. Defaults to `[1, "a", "a"]`.
    #[arg(long)]
    pub tests: Option<PathBuf>,

    #[command(flatten)]
    pub driver: DriverArgs,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Encode(args) => cmd_encode::run(&args),
        Commands::Decode(args) => cmd_decode::run(&args),
        Commands::Validate(args) => cmd_validate::run(&args),
        Commands::Serve(args) => cmd_serve::run(&args).await,
        Commands::Client(args) => cmd_client::run(&args).await,
        Commands::Bench(args) => cmd_bench::run(&args).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
