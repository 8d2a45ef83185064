/// Implementation of `tnet decode`.
///
/// Decodes every TNET value in a file and prints each as one line of
/// JSON. With `--count K` the file must hold exactly K values.
use std::fs;

use anyhow::{Context, Result};
use tnet_decoder::TnetDecoder;
use tnet_types::json::to_json;

use crate::DecodeArgs;

/// Run the `tnet decode` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a value is malformed or
/// truncated, the value count does not match `--count`, or a string is
/// not UTF-8 and so has no JSON form.
pub fn run(args: &DecodeArgs) -> Result<()> {
    let bytes = fs::read(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;

    let values = match args.count {
        Some(count) => TnetDecoder::decode_count(&bytes, count),
        None => TnetDecoder::decode_all(&bytes),
    }
    .with_context(|| format!("failed to decode {}", args.file.display()))?;

    for (i, value) in values.iter().enumerate() {
        let json = to_json(value).with_context(|| format!("value #{i} has no JSON form"))?;
        let line = if args.pretty {
            serde_json::to_string_pretty(&json)?
        } else {
            json.to_string()
        };
        println!("{line}");
    }
    Ok(())
}
