use std::io::{self, Read};

use crate::error::DecodeError;

/// Who is responsible for the underlying source once the decoder is closed.
///
/// ```text
/// ┌───────────┬─────────────────────────────────────────────────────────┐
/// │ Variant   │ On close() / drop                                       │
/// ├───────────┼─────────────────────────────────────────────────────────┤
/// │ Owned     │ the source is dropped (files and sockets are closed)    │
/// │ LeaveOpen │ the source is kept and handed back by `into_inner`      │
/// └───────────┴─────────────────────────────────────────────────────────┘
/// ```
///
/// Passing `&mut R` as the source is the other way to keep ownership with
/// the caller: `Read` is implemented for mutable references, and dropping
/// the reference never closes anything.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Ownership {
    #[default]
    Owned,
    LeaveOpen,
}

/// Forward-only, byte-at-a-time view of an underlying reader.
///
/// Decoders pull their input exclusively through this type. It never seeks
/// and never looks ahead, so the only cursor is the count of bytes consumed,
/// which decoders use for error offsets.
///
/// Reads are issued one byte at a time; wrap slow readers (files, sockets)
/// in a [`std::io::BufReader`] first.
#[derive(Debug)]
pub struct ByteSource<R> {
    inner: Option<R>,
    ownership: Ownership,
    closed: bool,
    consumed: u64,
}

impl<R: Read> ByteSource<R> {
    pub fn new(inner: R, ownership: Ownership) -> Self {
        Self {
            inner: Some(inner),
            ownership,
            closed: false,
            consumed: 0,
        }
    }

    /// Pull the next raw byte.
    ///
    /// Returns `Ok(None)` once the reader is exhausted. Interrupted reads
    /// are retried.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::Closed`] after [`close`](Self::close).
    /// - [`DecodeError::Io`] for any other reader failure.
    pub fn next_byte(&mut self) -> Result<Option<u8>, DecodeError> {
        if self.closed {
            return Err(DecodeError::Closed);
        }
        let Some(inner) = self.inner.as_mut() else {
            return Err(DecodeError::Closed);
        };

        let mut byte = [0u8; 1];
        loop {
            match inner.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.consumed += 1;
                    return Ok(Some(byte[0]));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(DecodeError::Io(e)),
            }
        }
    }
}

impl<R> ByteSource<R> {
    /// Number of raw bytes handed out so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Release the source according to its [`Ownership`].
    ///
    /// Returns `true` if this call did the closing, `false` if the source
    /// was already closed. Calling it again is harmless.
    pub fn close(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.closed = true;
        if self.ownership == Ownership::Owned {
            drop(self.inner.take());
        }
        true
    }

    /// Borrow the underlying reader, if it has not been released.
    pub fn get_ref(&self) -> Option<&R> {
        self.inner.as_ref()
    }

    /// Take back the underlying reader.
    ///
    /// Always succeeds while the source is open. After `close`, only a
    /// [`Ownership::LeaveOpen`] source still has a reader to return.
    pub fn into_inner(self) -> Option<R> {
        self.inner
    }
}
