/// Implementation of `relic crc`.
///
/// Prints the checksum as zero-padded hex followed by the file name, in
/// the style of `sha256sum`:
///
/// ```text
/// BB3D  payload.arc
/// ```
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};

use anyhow::{Context, Result, anyhow};
use relic_wire::crc::{Crc, CrcParams};
use tracing::debug;

use crate::CrcArgs;

/// Run the `relic crc` command.
///
/// # Errors
///
/// Returns an error if a parameter is malformed or out of range for the
/// width, or the file cannot be read.
pub fn run(args: &CrcArgs) -> Result<()> {
    let params = build_params(args)?;
    let crc = Crc::new(params).context("invalid CRC parameters")?;
    debug!(?params, "computing CRC");

    let file =
        File::open(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;
    let mut reader = BufReader::new(file);
    let mut digest = crc.digest();
    let mut buf = [0u8; 8192];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(e).with_context(|| format!("cannot read {}", args.file.display()));
            }
        };
        digest.update(&buf[..n]);
    }

    let digits = usize::from(params.width).div_ceil(4);
    println!(
        "{:0digits$X}  {}",
        digest.finalize(),
        args.file.display()
    );
    Ok(())
}

/// Start from the preset and apply any explicit overrides.
fn build_params(args: &CrcArgs) -> Result<CrcParams> {
    let mut params = CrcParams::preset(&args.preset)?;
    if let Some(width) = args.width {
        params.width = width;
    }
    if let Some(poly) = &args.poly {
        params.poly = parse_value("--poly", poly)?;
    }
    if let Some(init) = &args.init {
        params.init = parse_value("--init", init)?;
    }
    if let Some(xor_out) = &args.xor_out {
        params.xor_out = parse_value("--xor-out", xor_out)?;
    }
    if let Some(reflect_in) = args.reflect_in {
        params.reflect_in = reflect_in;
    }
    if let Some(reflect_out) = args.reflect_out {
        params.reflect_out = reflect_out;
    }
    Ok(params)
}

/// Parses `0x`-prefixed hex or plain decimal.
fn parse_value(flag: &str, s: &str) -> Result<u64> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => s.replace('_', "").parse(),
    };
    parsed.map_err(|e| anyhow!("invalid value {s:?} for {flag}: {e}"))
}
