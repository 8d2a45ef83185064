/// Implementation of `tnet encode`.
///
/// Parses JSON from a file or stdin and writes the TNET encoding. With
/// `--each`, a top-level array becomes back-to-back values (the input
/// format of `tnet decode` and of the echo server) instead of one list.
///
/// ```text
/// ┌───────────────┬──────────────────────────────────────────────┐
/// │ JSON          │ TNET                                         │
/// ├───────────────┼──────────────────────────────────────────────┤
/// │ 123           │ 3:123#                                       │
/// │ "a"           │ 1:a,                                         │
/// │ [1, null]     │ 7:1:1#0:~]                                   │
/// │ --each [1, 2] │ 1:1#1:2#                                     │
/// └───────────────┴──────────────────────────────────────────────┘
/// ```
use std::fs;
use std::io::{self, Read as _, Write as _};

use anyhow::{Context, Result};
use serde_json::Value;
use tnet_encoder::TnetEncoder;
use tnet_types::json::from_json;

use crate::EncodeArgs;

/// Run the `tnet encode` command.
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed as JSON, or the
/// output cannot be written.
pub fn run(args: &EncodeArgs) -> Result<()> {
    let text = match &args.input {
        Some(path) => fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).context("cannot read stdin")?;
            text
        }
    };
    let json: Value = serde_json::from_str(&text).context("input is not valid JSON")?;

    let mut encoder = TnetEncoder::new();
    match json {
        Value::Array(items) if args.each => {
            for item in &items {
                encoder.add(from_json(item));
            }
        }
        other => {
            encoder.add(from_json(&other));
        }
    }
    let bytes = encoder.encode().context("failed to encode")?;

    match &args.output {
        Some(path) => {
            fs::write(path, &bytes).with_context(|| format!("cannot write {}", path.display()))?;
            tracing::info!(values = encoder.len(), bytes = bytes.len(), path = %path.display(), "encoded");
        }
        None => io::stdout().write_all(&bytes).context("cannot write stdout")?,
    }
    Ok(())
}
