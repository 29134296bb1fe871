use std::io::{self, Read, SeekFrom};

use crate::config::Format;
use crate::error::DecodeError;

/// Size of the scratch buffer used by [`DecodingStream::read_to_end`].
const READ_CHUNK: usize = 4096;

/// A pull-based, forward-only stream of decoded bytes.
///
/// Each format implements a single step, [`decode_step`](Self::decode_step),
/// which fills a caller-provided slice. Everything else (argument checks,
/// the closed check, the operations a decoder refuses) is provided here so
/// formats cannot disagree on the contract:
///
/// ```text
///   read(buf, offset, count)
///     │
///     ├─ validate_range(buf.len(), offset, count)   ← ArgumentOutOfRange
///     ├─ is_closed()?                               ← Closed
///     ├─ count == 0 → Ok(0)
///     └─ decode_step(&mut buf[offset..offset + count])
///           ├─ Ok(n), 0 < n ≤ count   bytes produced
///           ├─ Ok(0)                  source exhausted, nothing pending
///           └─ Err(corruption | io)
/// ```
///
/// The byte sequence a stream produces never depends on how reads are
/// chunked: reading one byte at a time and reading everything at once give
/// identical output.
pub trait DecodingStream {
    /// Decode into `out`, returning the number of bytes written.
    ///
    /// This is the hook formats implement; callers go through
    /// [`read`](Self::read), which performs the range and closed checks
    /// first and never passes an empty `out`. Called directly with an empty
    /// slice, `Ok(0)` does not mean the stream is exhausted.
    ///
    /// Implementations may return fewer bytes than `out.len()` only when the
    /// source is exhausted, and `Ok(0)` only when nothing at all remains.
    ///
    /// # Errors
    ///
    /// Corruption errors and I/O errors from the source.
    #[doc(hidden)]
    fn decode_step(&mut self, out: &mut [u8]) -> Result<usize, DecodeError>;

    /// Which format this stream decodes.
    fn format(&self) -> Format;

    /// Release the underlying source. Idempotent.
    fn close(&mut self);

    fn is_closed(&self) -> bool;

    /// Decode up to `count` bytes into `buf[offset..]`.
    ///
    /// A zero-length request returns `Ok(0)` without touching the source;
    /// otherwise `Ok(0)` means the stream is exhausted.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::ArgumentOutOfRange`] if the range does not fit in
    ///   `buf`. No decoder state is touched.
    /// - [`DecodeError::Closed`] after [`close`](Self::close).
    /// - Anything [`decode_step`](Self::decode_step) returns.
    fn read(&mut self, buf: &mut [u8], offset: usize, count: usize) -> Result<usize, DecodeError> {
        validate_range(buf.len(), offset, count)?;
        if self.is_closed() {
            return Err(DecodeError::Closed);
        }
        if count == 0 {
            return Ok(0);
        }
        self.decode_step(&mut buf[offset..offset + count])
    }

    /// Decode everything that remains, appending to `out`.
    ///
    /// # Errors
    ///
    /// Stops at the first error; bytes decoded before it stay in `out`.
    fn read_to_end(&mut self, out: &mut Vec<u8>) -> Result<usize, DecodeError> {
        let mut chunk = [0u8; READ_CHUNK];
        let mut total = 0;
        loop {
            let n = self.read(&mut chunk, 0, READ_CHUNK)?;
            if n == 0 {
                return Ok(total);
            }
            out.extend_from_slice(&chunk[..n]);
            total += n;
        }
    }

    fn can_read(&self) -> bool {
        !self.is_closed()
    }

    fn can_seek(&self) -> bool {
        false
    }

    fn can_write(&self) -> bool {
        false
    }

    /// # Errors
    ///
    /// Always [`DecodeError::Unsupported`].
    fn seek(&mut self, _pos: SeekFrom) -> Result<u64, DecodeError> {
        Err(DecodeError::Unsupported { operation: "seek" })
    }

    /// # Errors
    ///
    /// Always [`DecodeError::Unsupported`].
    fn write(&mut self, _buf: &[u8]) -> Result<usize, DecodeError> {
        Err(DecodeError::Unsupported { operation: "write" })
    }

    /// Decoded length is unknown until the stream has been read to the end.
    ///
    /// # Errors
    ///
    /// Always [`DecodeError::Unsupported`].
    fn length(&self) -> Result<u64, DecodeError> {
        Err(DecodeError::Unsupported { operation: "length" })
    }

    /// # Errors
    ///
    /// Always [`DecodeError::Unsupported`].
    fn position(&self) -> Result<u64, DecodeError> {
        Err(DecodeError::Unsupported {
            operation: "position",
        })
    }
}

/// Check that `offset..offset + count` lies inside a buffer of `len` bytes.
///
/// # Errors
///
/// [`DecodeError::ArgumentOutOfRange`] if it does not (including when
/// `offset + count` would overflow).
pub fn validate_range(len: usize, offset: usize, count: usize) -> Result<(), DecodeError> {
    match offset.checked_add(count) {
        Some(end) if end <= len => Ok(()),
        _ => Err(DecodeError::ArgumentOutOfRange { offset, count, len }),
    }
}

impl<S: DecodingStream + ?Sized> DecodingStream for Box<S> {
    fn decode_step(&mut self, out: &mut [u8]) -> Result<usize, DecodeError> {
        (**self).decode_step(out)
    }

    fn format(&self) -> Format {
        (**self).format()
    }

    fn close(&mut self) {
        (**self).close();
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }

    fn read(&mut self, buf: &mut [u8], offset: usize, count: usize) -> Result<usize, DecodeError> {
        (**self).read(buf, offset, count)
    }
}

/// Adapts a [`DecodingStream`] to [`std::io::Read`], so decoded output can
/// feed `io::copy`, `BufReader` and friends.
///
/// Corruption errors surface as [`io::ErrorKind::InvalidData`].
#[derive(Debug)]
pub struct IoReader<S> {
    stream: S,
}

impl<S: DecodingStream> IoReader<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: DecodingStream> Read for IoReader<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len();
        Ok(DecodingStream::read(&mut self.stream, buf, 0, len)?)
    }
}
