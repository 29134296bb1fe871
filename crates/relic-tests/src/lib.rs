//! Shared helpers for the relic integration tests and benches.
//!
//! # Golden fixtures
//!
//! `tests/golden/` holds one reference plaintext and two encodings of it,
//! produced by an independent encoder and committed as-is:
//!
//! ```text
//! ┌────────────────┬──────────────────────────────────────────────────────┐
//! │ File           │ Contents                                             │
//! ├────────────────┼──────────────────────────────────────────────────────┤
//! │ reference.bin  │ plaintext: text, long runs, 0x90 bytes, 0x00..=0xFF  │
//! │ reference.rle  │ ARC-style RLE90 of reference.bin                     │
//! │ reference.hqx  │ BinHex4 six-bit text of reference.rle, 64-col lines  │
//! └────────────────┴──────────────────────────────────────────────────────┘
//! ```
//!
//! The RLE90 encoding never starts a run right after an escaped marker, so
//! it decodes identically under both dialects.

use std::path::Path;

use relic_decoder::{DecodeError, DecoderConfig, DecodingStream};

/// CRC-16/ARC of `reference.bin`.
pub const REFERENCE_CRC16_ARC: u64 = 0x0BBF;

/// CRC-32 of `reference.bin`.
pub const REFERENCE_CRC32: u64 = 0xC42F_D600;

/// Read a fixture from `tests/golden/<name>`.
///
/// # Panics
///
/// If the fixture is missing.
pub fn golden(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/golden")
        .join(name);
    std::fs::read(&path)
        .unwrap_or_else(|e| panic!("failed to read golden fixture {}: {e}", path.display()))
}

/// Decode `input` through the incremental decoder, `chunk` bytes per read.
///
/// # Errors
///
/// The first error any read reports.
pub fn decode_chunked(
    config: &DecoderConfig,
    input: &[u8],
    chunk: usize,
) -> Result<Vec<u8>, DecodeError> {
    let mut stream = config.open(input)?;
    let mut out = Vec::new();
    let mut buf = vec![0u8; chunk];
    loop {
        let n = stream.read(&mut buf, 0, chunk)?;
        if n == 0 {
            break;
        }
        out.extend_from_slice(&buf[..n]);
    }
    stream.close();
    Ok(out)
}
