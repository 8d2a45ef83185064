/// Implementation of `tnet validate`.
///
/// Decodes every value in the file and reports either success checkmarks
/// or a single diagnostic line with the byte offset of the problem.
///
/// # Success output
///
/// ```text
/// ✓ Values: 3 parsed successfully
/// ✓ Boundary: input ends after the last value (17 bytes)
/// ```
///
/// # Failure output
///
/// ```text
/// ✗ Error at byte 4: unknown type tag 0x3F at offset 4
/// ```
use std::fs;

use anyhow::{Context, Result, anyhow};
use tnet_decoder::{DecodeError, TnetDecoder};

use crate::ValidateArgs;

/// Run the `tnet validate` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not validate.
pub fn run(args: &ValidateArgs) -> Result<()> {
    let bytes = fs::read(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;

    match TnetDecoder::decode_all(&bytes) {
        Ok(values) => {
            println!(
                "✓ Values: {} parsed successfully",
                values.len()
            );
            println!("✓ Boundary: input ends after the last value ({} bytes)", bytes.len());
            Ok(())
        }
        Err(e) => {
            println!("✗ {}", diagnostic(&e));
            Err(anyhow!("validation failed"))
        }
    }
}

// ── Error formatting ──────────────────────────────────────────────────────────

fn diagnostic(e: &DecodeError) -> String {
    match (e, e.offset()) {
        (DecodeError::Incomplete { offset }, _) => format!("Truncated: input ends inside the value at byte {offset}"),
        (_, Some(offset)) => format!("Error at byte {offset}: {e}"),
        (_, None) => format!("Error: {e}"),
    }
}
