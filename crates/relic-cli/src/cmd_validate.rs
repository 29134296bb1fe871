/// Implementation of `relic validate`.
///
/// Decodes the file in two independent ways and compares them:
///
/// ```text
/// 1. Batch    DecoderConfig::decode_all over the whole buffer
/// 2. Stream   incremental decoder, one byte per read
/// ```
///
/// Both must succeed and agree byte for byte. The report is printed as
/// checkmark lines or, with `--json`, as a single JSON object.
///
/// # Success output
///
/// ```text
/// ✓ Format: rle90 (non-buffering)
/// ✓ Decoded: 1024 bytes from 312 encoded bytes
/// ✓ Piecewise: byte-at-a-time decode matches
/// ✓ CRC-32: 0x1C291CA3
/// ```
///
/// # Failure output
///
/// ```text
/// ✗ Error: expected run length, got end of stream (at byte 311)
/// ```
use std::fs;

use anyhow::{Context, Result, anyhow};
use relic_decoder::{DecodeError, DecoderConfig, DecodingStream, Format};
use relic_wire::crc::{CRC_32_ISO_HDLC, Crc};
use serde::Serialize;

use crate::ValidateArgs;

/// Machine-readable validation result, emitted with `--json`.
#[derive(Serialize)]
struct Report {
    file: String,
    format: String,
    dialect: Option<String>,
    encoded_bytes: usize,
    decoded_bytes: usize,
    crc32: String,
    piecewise_match: bool,
}

/// Run the `relic validate` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read, fails to decode, or the
/// two decode paths disagree.
pub fn run(args: &ValidateArgs) -> Result<()> {
    let bytes =
        fs::read(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;
    let config = args.format.config();

    let decoded = match config.decode_all(&bytes) {
        Ok(decoded) => decoded,
        Err(e) => {
            println!("✗ Error: {e}");
            return Err(anyhow!("validation failed"));
        }
    };

    let piecewise = match decode_piecewise(&config, &bytes) {
        Ok(piecewise) => piecewise,
        Err(e) => {
            println!("✗ Error (byte-at-a-time): {e}");
            return Err(anyhow!("validation failed"));
        }
    };
    let piecewise_match = piecewise == decoded;

    let crc = Crc::new(CRC_32_ISO_HDLC)?.checksum(&decoded);
    let dialect = (config.format == Format::Rle90).then(|| config.dialect.to_string());

    if args.json {
        let report = Report {
            file: args.file.display().to_string(),
            format: config.format.to_string(),
            dialect,
            encoded_bytes: bytes.len(),
            decoded_bytes: decoded.len(),
            crc32: format!("{crc:#010X}"),
            piecewise_match,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match &dialect {
            Some(d) => println!("✓ Format: {} ({d})", config.format),
            None => println!("✓ Format: {}", config.format),
        }
        println!(
            "✓ Decoded: {} bytes from {} encoded bytes",
            decoded.len(),
            bytes.len()
        );
        if piecewise_match {
            println!("✓ Piecewise: byte-at-a-time decode matches");
        } else {
            println!("✗ Piecewise: byte-at-a-time decode differs");
        }
        println!("✓ CRC-32: {crc:#010X}");
    }

    if piecewise_match {
        Ok(())
    } else {
        Err(anyhow!("validation failed"))
    }
}

/// Decode through the incremental decoder, one byte per read.
fn decode_piecewise(config: &DecoderConfig, bytes: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut stream = config.open(bytes)?;
    let mut out = Vec::new();
    let mut byte = [0u8; 1];
    while stream.read(&mut byte, 0, 1)? == 1 {
        out.push(byte[0]);
    }
    stream.close();
    Ok(out)
}
