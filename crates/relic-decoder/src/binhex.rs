use std::io::Read;

use relic_wire::binhex::{BitAccumulator, END_MARKER, START_MARKER, is_line_break, six_bit_value};
use tracing::debug;

use crate::config::Format;
use crate::error::DecodeError;
use crate::source::{ByteSource, Ownership};
use crate::stream::DecodingStream;

/// Incremental BinHex4 decoder.
///
/// The stream is validated eagerly: construction consumes the opening `:`
/// and fails if it is missing. After that each read pulls characters until
/// the request is satisfied or the closing `:` is seen.
///
/// ```text
///   :B@*M5'N:
///    ││││││└┴─ 2 bytes + 2 leftover bits (discarded at ':')
///    └┴┴┴───── 4 symbols = 24 bits = "abc"
///
///   decoded: "abcHi"
/// ```
///
/// Decoding stops at the closing marker, so anything after it is never
/// read from the source.
///
/// # Example
///
/// ```rust
/// use relic_decoder::{BinHex4Decoder, DecodingStream};
///
/// let mut decoder = BinHex4Decoder::new(&b":B@*M\n5'N:"[..]).unwrap();
/// let mut out = Vec::new();
/// decoder.read_to_end(&mut out).unwrap();
/// assert_eq!(out, b"abcHi");
/// ```
#[derive(Debug)]
pub struct BinHex4Decoder<R> {
    source: ByteSource<R>,
    bits: BitAccumulator,
    finished: bool,
    emitted: u64,
}

impl<R: Read> BinHex4Decoder<R> {
    /// Open a BinHex4 stream, closing `reader` when the decoder is closed
    /// or dropped.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::MissingStartMarker`] if the first byte is not `:`.
    /// - [`DecodeError::Io`] if the first byte cannot be read.
    pub fn new(reader: R) -> Result<Self, DecodeError> {
        Self::with_ownership(reader, Ownership::Owned)
    }

    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_ownership(reader: R, ownership: Ownership) -> Result<Self, DecodeError> {
        let mut source = ByteSource::new(reader, ownership);
        match source.next_byte()? {
            Some(START_MARKER) => {}
            found => return Err(DecodeError::MissingStartMarker { found }),
        }

        debug!(?ownership, "opening BinHex4 decoder");
        Ok(Self {
            source,
            bits: BitAccumulator::new(),
            finished: false,
            emitted: 0,
        })
    }
}

impl<R> BinHex4Decoder<R> {
    /// Whether the closing `:` has been consumed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Recover the source; see [`ByteSource::into_inner`].
    pub fn into_inner(self) -> Option<R> {
        self.source.into_inner()
    }
}

impl<R: Read> DecodingStream for BinHex4Decoder<R> {
    fn decode_step(&mut self, out: &mut [u8]) -> Result<usize, DecodeError> {
        if self.finished {
            return Ok(0);
        }

        let mut written = 0;
        while written < out.len() {
            let byte = self
                .source
                .next_byte()?
                .ok_or(DecodeError::MissingEndMarker {
                    offset: self.source.consumed(),
                })?;

            if is_line_break(byte) {
                continue;
            }

            if byte == END_MARKER {
                self.finished = true;
                let dropped = self.bits.discard();
                debug!(
                    emitted = self.emitted + written as u64,
                    dropped_bits = dropped,
                    "BinHex4 end marker reached"
                );
                break;
            }

            let value = six_bit_value(byte).ok_or(DecodeError::InvalidCharacter {
                byte,
                offset: self.source.consumed() - 1,
            })?;

            if let Some(decoded) = self.bits.push(value) {
                out[written] = decoded;
                written += 1;
            }
        }

        self.emitted += written as u64;
        Ok(written)
    }

    fn format(&self) -> Format {
        Format::BinHex4
    }

    fn close(&mut self) {
        if self.source.close() {
            debug!(emitted = self.emitted, "closed BinHex4 decoder");
        }
    }

    fn is_closed(&self) -> bool {
        self.source.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn decode_with(input: &[u8], chunk: usize) -> Result<Vec<u8>, DecodeError> {
        let mut decoder = BinHex4Decoder::new(input)?;
        let mut out = Vec::new();
        let mut buf = vec![0u8; chunk];
        loop {
            let n = decoder.read(&mut buf, 0, chunk)?;
            if n == 0 {
                return Ok(out);
            }
            out.extend_from_slice(&buf[..n]);
        }
    }

    #[test]
    fn decodes_between_markers() {
        assert_eq!(decode_with(b":B@*M:", 64).unwrap(), b"abc");
    }

    #[test]
    fn empty_body() {
        assert_eq!(decode_with(b"::", 64).unwrap(), b"");
    }

    #[test]
    fn line_breaks_are_skipped() {
        assert_eq!(decode_with(b":B@\r\n*M\n:", 64).unwrap(), b"abc");
    }

    #[test]
    fn residual_bits_are_discarded() {
        // 7 symbols = 42 bits = 5 bytes + 2 dropped bits
        assert_eq!(decode_with(b":D'9XE'm:", 64).unwrap(), b"hello");
    }

    #[test]
    fn one_byte_reads_match_whole_read() {
        let input = b":D'9XE'p\nKBQ0)\r\nD3:";
        assert_eq!(decode_with(input, 1).unwrap(), decode_with(input, 4096).unwrap());
        assert_eq!(decode_with(input, 1).unwrap(), b"helloabcHi");
    }

    #[test]
    fn missing_start_marker_fails_at_construction() {
        let err = BinHex4Decoder::new(&b"B@*M:"[..]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MissingStartMarker { found: Some(b'B') }
        ));

        let err = BinHex4Decoder::new(&b""[..]).unwrap_err();
        assert!(matches!(err, DecodeError::MissingStartMarker { found: None }));
    }

    #[test]
    fn missing_end_marker_only_when_needed() {
        let mut decoder = BinHex4Decoder::new(&b":B@*M"[..]).unwrap();
        let mut buf = [0u8; 3];
        assert_eq!(decoder.read(&mut buf, 0, 3).unwrap(), 3);
        assert_eq!(&buf, b"abc");

        let err = decoder.read(&mut buf, 0, 1).unwrap_err();
        assert!(matches!(err, DecodeError::MissingEndMarker { offset: 5 }));
    }

    #[test]
    fn invalid_character_reported_with_offset() {
        let err = decode_with(b":B@7M:", 64).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidCharacter {
                byte: b'7',
                offset: 3
            }
        ));
    }

    #[test]
    fn reads_after_end_are_clean_eof() {
        let mut decoder = BinHex4Decoder::new(&b":B@*M:trailing junk"[..]).unwrap();
        let mut buf = [0u8; 16];
        assert_eq!(decoder.read(&mut buf, 0, 16).unwrap(), 3);
        assert!(decoder.is_finished());
        assert_eq!(decoder.read(&mut buf, 0, 16).unwrap(), 0);
        assert_eq!(decoder.read(&mut buf, 0, 16).unwrap(), 0);
    }

    #[test]
    fn stops_reading_source_at_end_marker() {
        let cursor = Cursor::new(b":B@*M:rest".to_vec());
        let mut decoder = BinHex4Decoder::with_ownership(cursor, Ownership::LeaveOpen).unwrap();
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        decoder.close();

        let cursor = decoder.into_inner().expect("source retained");
        assert_eq!(cursor.position(), 6);
    }
}
