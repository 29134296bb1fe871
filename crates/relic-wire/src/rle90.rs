use std::fmt;
use std::str::FromStr;

use crate::error::WireError;

/// The RLE90 escape byte.
///
/// Every run in an RLE90 stream is introduced by this byte followed by a
/// one-byte count:
///
/// | Encoded           | Decoded                                           |
/// |-------------------|---------------------------------------------------|
/// | `0x90 0x00`       | a single literal `0x90`                           |
/// | `0x90 N` (N ≥ 1)  | the previous output byte, N times in total        |
/// | any other byte    | itself                                            |
///
/// The previous output byte has already been emitted once when the marker
/// is seen, so a count of `N` contributes `N - 1` new bytes.
pub const MARKER: u8 = 0x90;

/// The count byte that turns a marker into an escaped literal.
pub const LITERAL_COUNT: u8 = 0x00;

/// Largest run a single marker sequence can express.
pub const MAX_RUN: usize = 0xFF;

/// How an escaped literal marker (`0x90 0x00`) affects the run fill byte.
///
/// Historical RLE90 encoders disagree on this one case. Both dialects emit
/// the literal `0x90`; they differ only in whether that literal becomes the
/// fill value for a run that immediately follows it.
///
/// ```text
///   input: 90 00 90 02
///
///   NonBuffering:  90 | error: run before any literal
///   Buffering:     90 | 90
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Rle90Dialect {
    /// An escaped marker is emitted but never becomes the fill byte.
    #[default]
    NonBuffering,

    /// An escaped marker is emitted and becomes the fill byte.
    Buffering,
}

impl Rle90Dialect {
    /// Whether an escaped literal marker updates the fill byte.
    pub fn buffers_literal_marker(self) -> bool {
        matches!(self, Self::Buffering)
    }

    /// Canonical lowercase name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Self::NonBuffering => "non-buffering",
            Self::Buffering => "buffering",
        }
    }
}

impl fmt::Display for Rle90Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Rle90Dialect {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "non-buffering" | "nonbuffering" | "plain" => Ok(Self::NonBuffering),
            "buffering" | "buffered" => Ok(Self::Buffering),
            _ => Err(WireError::UnknownName {
                kind: "RLE90 dialect",
                name: s.to_string(),
            }),
        }
    }
}
