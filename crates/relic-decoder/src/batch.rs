//! Whole-buffer decoders.
//!
//! These decode a complete in-memory input in one call. They share the
//! run bookkeeping and bit accumulator with the incremental decoders but
//! carry no state between calls, so they are the simplest way to decode a
//! payload that is already in memory. Errors report the same offsets the
//! incremental decoders would.

use relic_wire::binhex::{BitAccumulator, END_MARKER, START_MARKER, is_line_break, six_bit_value};
use relic_wire::rle90::{MARKER, Rle90Dialect};

use crate::error::DecodeError;
use crate::rle90::{Expansion, RunState};

/// Decode a complete RLE90 buffer.
///
/// # Errors
///
/// - [`DecodeError::RunBeforeLiteral`] if a run has no fill byte.
/// - [`DecodeError::MissingRunLength`] if the input ends on a marker.
///
/// # Example
///
/// ```rust
/// use relic_decoder::{decode_rle90, Rle90Dialect};
///
/// let out = decode_rle90(&[0x2D, 0x90, 0x03, 0x90, 0x00], Rle90Dialect::NonBuffering).unwrap();
/// assert_eq!(out, [0x2D, 0x2D, 0x2D, 0x90]);
/// ```
pub fn decode_rle90(input: &[u8], dialect: Rle90Dialect) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::with_capacity(input.len());
    let mut state = RunState::new(dialect);
    let mut bytes = (0u64..).zip(input.iter().copied());

    while let Some((offset, byte)) = bytes.next() {
        if byte != MARKER {
            out.push(state.literal(byte));
            continue;
        }

        let Some((_, count)) = bytes.next() else {
            return Err(DecodeError::MissingRunLength {
                offset: input.len() as u64,
            });
        };

        match state.escape(count) {
            Some(Expansion::Literal(literal)) => out.push(literal),
            Some(Expansion::Repeat { fill, extra }) => out.resize(out.len() + extra, fill),
            None => return Err(DecodeError::RunBeforeLiteral { offset }),
        }
    }

    Ok(out)
}

/// Decode a complete BinHex4 buffer, from the opening `:` to the closing
/// one. Bytes after the closing `:` are ignored.
///
/// # Errors
///
/// - [`DecodeError::MissingStartMarker`] if `input` does not start with `:`.
/// - [`DecodeError::InvalidCharacter`] for a byte outside the alphabet.
/// - [`DecodeError::MissingEndMarker`] if the closing `:` is absent.
pub fn decode_binhex4(input: &[u8]) -> Result<Vec<u8>, DecodeError> {
    match input.first() {
        Some(&START_MARKER) => {}
        found => {
            return Err(DecodeError::MissingStartMarker {
                found: found.copied(),
            });
        }
    }

    let mut out = Vec::with_capacity(input.len() / 4 * 3);
    let mut bits = BitAccumulator::new();

    for (offset, &byte) in (0u64..).zip(input).skip(1) {
        if is_line_break(byte) {
            continue;
        }
        if byte == END_MARKER {
            bits.discard();
            return Ok(out);
        }

        let value = six_bit_value(byte).ok_or(DecodeError::InvalidCharacter { byte, offset })?;
        if let Some(decoded) = bits.push(value) {
            out.push(decoded);
        }
    }

    Err(DecodeError::MissingEndMarker {
        offset: input.len() as u64,
    })
}
