use std::io;

/// Errors that can occur while decoding an RLE90 or BinHex4 stream.
///
/// There are three families, and callers treat them differently:
///
/// ```text
///   DecodeError
///   ├── argument errors      ← caller misuse, decoder state untouched
///   │   ├── ArgumentOutOfRange
///   │   ├── Unsupported
///   │   └── Closed
///   ├── corruption errors    ← fatal to the current read
///   │   ├── RunBeforeLiteral
///   │   ├── MissingRunLength
///   │   ├── MissingStartMarker
///   │   ├── MissingEndMarker
///   │   └── InvalidCharacter
///   └── Io(std::io::Error)   ← from the underlying source
/// ```
///
/// End of stream is never an error: it is reported as a short read,
/// down to `Ok(0)`.
///
/// Offsets count raw (encoded) bytes from the start of the source,
/// zero-based.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// `offset`/`count` do not describe a range inside the caller's buffer.
    #[error("read range out of bounds: offset {offset} + count {count} exceeds buffer length {len}")]
    ArgumentOutOfRange {
        offset: usize,
        count: usize,
        len: usize,
    },

    /// Decoding streams are forward-only and read-only.
    #[error("{operation} is not supported on a decoding stream")]
    Unsupported { operation: &'static str },

    /// The stream was read after [`close`](crate::DecodingStream::close).
    #[error("decoding stream is closed")]
    Closed,

    /// An RLE90 run appeared before any literal byte could serve as its
    /// fill value.
    #[error("run before any literal was buffered (marker at byte {offset})")]
    RunBeforeLiteral { offset: u64 },

    /// An RLE90 marker was the final byte of the source.
    #[error("expected run length, got end of stream (at byte {offset})")]
    MissingRunLength { offset: u64 },

    /// A BinHex4 stream did not open with `:`.
    #[error("BinHex4 stream must start with ':', found {}", describe_found(.found))]
    MissingStartMarker { found: Option<u8> },

    /// A BinHex4 stream ran out before its closing `:`.
    #[error("BinHex4 stream ended before the closing ':' (at byte {offset})")]
    MissingEndMarker { offset: u64 },

    /// A byte outside the BinHex4 alphabet appeared between the markers.
    #[error("invalid BinHex4 character {} at byte {offset}", describe_char(.byte))]
    InvalidCharacter { byte: u8, offset: u64 },

    /// An I/O error from the underlying source.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl DecodeError {
    /// Whether this error means the encoded data itself is malformed.
    ///
    /// The decoder is not poisoned by one: a further read resumes at the
    /// next encoded byte, but its output is no longer meaningful.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::RunBeforeLiteral { .. }
                | Self::MissingRunLength { .. }
                | Self::MissingStartMarker { .. }
                | Self::MissingEndMarker { .. }
                | Self::InvalidCharacter { .. }
        )
    }

    /// Whether this error was caused by the caller rather than the data.
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            Self::ArgumentOutOfRange { .. } | Self::Unsupported { .. } | Self::Closed
        )
    }
}

#[allow(clippy::ref_option)]
fn describe_found(found: &Option<u8>) -> String {
    match found {
        None => "end of stream".to_string(),
        Some(b) => describe_char(b),
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn describe_char(byte: &u8) -> String {
    if byte.is_ascii_graphic() {
        format!("{:?} ({byte:#04X})", char::from(*byte))
    } else {
        format!("{byte:#04X}")
    }
}

impl From<DecodeError> for io::Error {
    fn from(err: DecodeError) -> Self {
        let kind = if err.is_corruption() {
            io::ErrorKind::InvalidData
        } else if matches!(err, DecodeError::Unsupported { .. }) {
            io::ErrorKind::Unsupported
        } else {
            io::ErrorKind::InvalidInput
        };

        match err {
            DecodeError::Io(inner) => inner,
            other => io::Error::new(kind, other),
        }
    }
}
