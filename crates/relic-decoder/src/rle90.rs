use std::io::Read;

use relic_wire::rle90::{LITERAL_COUNT, MARKER, Rle90Dialect};
use tracing::{debug, trace};

use crate::backlog::Backlog;
use crate::config::Format;
use crate::error::DecodeError;
use crate::source::{ByteSource, Ownership};
use crate::stream::DecodingStream;

/// What a marker sequence expands to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Expansion {
    /// `0x90 0x00`: one literal marker byte.
    Literal(u8),
    /// `0x90 N`: `extra` more copies of `fill` (N - 1, since one copy was
    /// already emitted as a literal).
    Repeat { fill: u8, extra: usize },
}

/// Fill-byte bookkeeping shared by the streaming and batch decoders.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RunState {
    last_byte: Option<u8>,
    dialect: Rle90Dialect,
}

impl RunState {
    pub(crate) fn new(dialect: Rle90Dialect) -> Self {
        Self {
            last_byte: None,
            dialect,
        }
    }

    /// Record a plain literal and hand it back for output.
    pub(crate) fn literal(&mut self, byte: u8) -> u8 {
        self.last_byte = Some(byte);
        byte
    }

    /// Resolve a marker followed by `count`.
    ///
    /// Returns `None` when the sequence is a run but no literal has been
    /// recorded to fill it with.
    pub(crate) fn escape(&mut self, count: u8) -> Option<Expansion> {
        if count == LITERAL_COUNT {
            if self.dialect.buffers_literal_marker() {
                self.last_byte = Some(MARKER);
            }
            return Some(Expansion::Literal(MARKER));
        }

        let fill = self.last_byte?;
        Some(Expansion::Repeat {
            fill,
            extra: usize::from(count) - 1,
        })
    }
}

/// Incremental RLE90 decoder.
///
/// Pulls encoded bytes from the source one at a time and writes decoded
/// bytes into whatever buffer the caller supplies. A run that does not fit
/// is split: the part that fits is written now, the rest is parked in a
/// backlog and delivered first by the next read.
///
/// ```text
///   encoded:   41 90 05 42
///   decoded:   41 41 41 41 41 42
///
///   read(2) → 41 41          backlog: 41 41 41
///   read(2) → 41 41          backlog: 41
///   read(2) → 41 42          backlog: (absent)
///   read(2) → Ok(0)
/// ```
///
/// # Example
///
/// ```rust
/// use relic_decoder::{DecodingStream, Rle90Decoder, Rle90Dialect};
///
/// let encoded: &[u8] = &[0x41, 0x90, 0x05, 0x42];
/// let mut decoder = Rle90Decoder::new(encoded, Rle90Dialect::NonBuffering);
///
/// let mut out = Vec::new();
/// decoder.read_to_end(&mut out).unwrap();
/// assert_eq!(out, b"AAAAAB");
/// ```
#[derive(Debug)]
pub struct Rle90Decoder<R> {
    source: ByteSource<R>,
    state: RunState,
    backlog: Backlog,
}

impl<R: Read> Rle90Decoder<R> {
    /// Decode `reader`, closing it when the decoder is closed or dropped.
    pub fn new(reader: R, dialect: Rle90Dialect) -> Self {
        Self::with_ownership(reader, dialect, Ownership::Owned)
    }

    pub fn with_ownership(reader: R, dialect: Rle90Dialect, ownership: Ownership) -> Self {
        debug!(%dialect, ?ownership, "opening RLE90 decoder");
        Self {
            source: ByteSource::new(reader, ownership),
            state: RunState::new(dialect),
            backlog: Backlog::default(),
        }
    }
}

impl<R> Rle90Decoder<R> {
    pub fn dialect(&self) -> Rle90Dialect {
        self.state.dialect
    }

    /// Decoded bytes waiting to be delivered by the next read.
    pub fn pending(&self) -> usize {
        self.backlog.len()
    }

    /// Recover the source; see [`ByteSource::into_inner`].
    pub fn into_inner(self) -> Option<R> {
        self.source.into_inner()
    }
}

impl<R: Read> DecodingStream for Rle90Decoder<R> {
    fn decode_step(&mut self, out: &mut [u8]) -> Result<usize, DecodeError> {
        let mut written = self.backlog.drain_into(out);

        while written < out.len() {
            let Some(byte) = self.source.next_byte()? else {
                break;
            };

            if byte != MARKER {
                out[written] = self.state.literal(byte);
                written += 1;
                continue;
            }

            let marker_offset = self.source.consumed() - 1;
            let count = self
                .source
                .next_byte()?
                .ok_or(DecodeError::MissingRunLength {
                    offset: self.source.consumed(),
                })?;

            match self.state.escape(count) {
                Some(Expansion::Literal(literal)) => {
                    out[written] = literal;
                    written += 1;
                }
                Some(Expansion::Repeat { fill, extra }) => {
                    let now = extra.min(out.len() - written);
                    out[written..written + now].fill(fill);
                    written += now;
                    if extra > now {
                        trace!(fill, spill = extra - now, "run spills into backlog");
                        self.backlog.stash_run(fill, extra - now);
                    }
                }
                None => {
                    return Err(DecodeError::RunBeforeLiteral {
                        offset: marker_offset,
                    });
                }
            }
        }

        Ok(written)
    }

    fn format(&self) -> Format {
        Format::Rle90
    }

    fn close(&mut self) {
        if self.source.close() {
            debug!(consumed = self.source.consumed(), "closed RLE90 decoder");
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

    fn decode_with(input: &[u8], dialect: Rle90Dialect, chunk: usize) -> Result<Vec<u8>, DecodeError> {
        let mut decoder = Rle90Decoder::new(input, dialect);
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

    fn decode(input: &[u8]) -> Vec<u8> {
        decode_with(input, Rle90Dialect::NonBuffering, 4096).unwrap()
    }

    #[test]
    fn literals_pass_through() {
        assert_eq!(decode(b"hello"), b"hello");
    }

    #[test]
    fn empty_input_is_clean_eof() {
        assert_eq!(decode(b""), b"");
    }

    #[test]
    fn zero_count_read_is_not_end_of_stream() {
        let mut decoder = Rle90Decoder::new(&b"abc"[..], Rle90Dialect::NonBuffering);
        let mut buf = [0u8; 3];

        assert_eq!(decoder.read(&mut buf, 0, 0).unwrap(), 0);
        assert_eq!(decoder.source.consumed(), 0);

        assert_eq!(decoder.read(&mut buf, 0, 3).unwrap(), 3);
        assert_eq!(&buf, b"abc");
    }

    #[test]
    fn run_repeats_previous_byte() {
        assert_eq!(decode(&[0x41, 0x90, 0x04]), b"AAAA");
    }

    #[test]
    fn run_of_one_adds_nothing() {
        assert_eq!(decode(&[0x41, 0x90, 0x01, 0x42]), b"AB");
    }

    #[test]
    fn escaped_marker_is_literal() {
        assert_eq!(decode(&[0x41, 0x90, 0x00, 0x42]), &[0x41, 0x90, 0x42]);
    }

    #[test]
    fn maximum_run() {
        let out = decode(&[0x00, 0x90, 0xFF]);
        assert_eq!(out, vec![0x00; 255]);
    }

    #[test]
    fn non_buffering_run_after_escape_uses_earlier_literal() {
        let out = decode(&[0x41, 0x90, 0x00, 0x90, 0x03]);
        assert_eq!(out, &[0x41, 0x90, 0x41, 0x41]);
    }

    #[test]
    fn buffering_run_after_escape_repeats_marker() {
        let out = decode_with(&[0x41, 0x90, 0x00, 0x90, 0x03], Rle90Dialect::Buffering, 64).unwrap();
        assert_eq!(out, &[0x41, 0x90, 0x90, 0x90]);
    }

    #[test]
    fn dialects_diverge_without_prior_literal() {
        let input = [0x90, 0x00, 0x90, 0x02];

        let err = decode_with(&input, Rle90Dialect::NonBuffering, 64).unwrap_err();
        assert!(matches!(err, DecodeError::RunBeforeLiteral { offset: 2 }));

        let out = decode_with(&input, Rle90Dialect::Buffering, 64).unwrap();
        assert_eq!(out, &[0x90, 0x90]);
    }

    #[test]
    fn leading_run_is_corrupt() {
        let err = decode_with(&[0x90, 0x03], Rle90Dialect::Buffering, 8).unwrap_err();
        assert!(matches!(err, DecodeError::RunBeforeLiteral { offset: 0 }));
    }

    #[test]
    fn trailing_marker_is_corrupt_not_eof() {
        let err = decode_with(&[0x41, 0x42, 0x90], Rle90Dialect::NonBuffering, 8).unwrap_err();
        assert!(matches!(err, DecodeError::MissingRunLength { offset: 3 }));
    }

    #[test]
    fn backlog_spans_several_reads() {
        let input = [0x41, 0x90, 0x05, 0x42];
        let mut decoder = Rle90Decoder::new(&input[..], Rle90Dialect::NonBuffering);
        let mut buf = [0u8; 2];

        assert_eq!(decoder.read(&mut buf, 0, 2).unwrap(), 2);
        assert_eq!(decoder.pending(), 3);
        assert_eq!(decoder.read(&mut buf, 0, 2).unwrap(), 2);
        assert_eq!(decoder.pending(), 1);
        assert_eq!(decoder.read(&mut buf, 0, 2).unwrap(), 2);
        assert_eq!(buf, [0x41, 0x42]);
        assert_eq!(decoder.pending(), 0);
        assert_eq!(decoder.read(&mut buf, 0, 2).unwrap(), 0);
    }

    #[test]
    fn chunking_does_not_change_output() {
        let input = [
            0x10, 0x90, 0x08, 0x90, 0x00, 0x20, 0x90, 0x03, 0x90, 0x00, 0x90, 0x02, 0x30,
        ];
        let whole = decode(&input);
        for chunk in 1..=12 {
            assert_eq!(
                decode_with(&input, Rle90Dialect::NonBuffering, chunk).unwrap(),
                whole,
                "chunk size {chunk}"
            );
        }
    }

    #[test]
    fn overread_returns_short_count() {
        let input = [0x61, 0x90, 0x04];
        let mut decoder = Rle90Decoder::new(&input[..], Rle90Dialect::NonBuffering);
        let mut buf = vec![0u8; 4 + 256];
        assert_eq!(decoder.read(&mut buf, 0, 4 + 256).unwrap(), 4);
        assert_eq!(&buf[..4], b"aaaa");
        assert_eq!(decoder.read(&mut buf, 0, 4 + 256).unwrap(), 0);
    }

    #[test]
    fn leave_open_returns_source() {
        let cursor = Cursor::new(vec![0x41, 0x42]);
        let mut decoder =
            Rle90Decoder::with_ownership(cursor, Rle90Dialect::NonBuffering, Ownership::LeaveOpen);
        let mut buf = [0u8; 1];
        decoder.read(&mut buf, 0, 1).unwrap();
        decoder.close();
        decoder.close();

        let cursor = decoder.into_inner().expect("source retained");
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn owned_source_released_on_close() {
        let mut decoder = Rle90Decoder::new(Cursor::new(vec![0x41]), Rle90Dialect::NonBuffering);
        decoder.close();
        assert!(decoder.is_closed());
        assert!(decoder.into_inner().is_none());
    }
}
