use std::fmt;
use std::io::Read;
use std::str::FromStr;

use relic_wire::WireError;
use relic_wire::rle90::Rle90Dialect;

use crate::batch::{decode_binhex4, decode_rle90};
use crate::binhex::BinHex4Decoder;
use crate::error::DecodeError;
use crate::rle90::Rle90Decoder;
use crate::source::Ownership;
use crate::stream::DecodingStream;

/// The encodings this crate can decode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Format {
    /// `0x90`-escaped run-length encoding (ARC, BinHex4 payloads).
    #[default]
    Rle90,
    /// BinHex 4.0 six-bit ASCII transport encoding.
    BinHex4,
}

impl Format {
    pub fn name(self) -> &'static str {
        match self {
            Self::Rle90 => "rle90",
            Self::BinHex4 => "binhex4",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rle90" | "rle" => Ok(Self::Rle90),
            "binhex4" | "binhex" | "hqx" => Ok(Self::BinHex4),
            _ => Err(WireError::UnknownName {
                kind: "format",
                name: s.to_string(),
            }),
        }
    }
}

/// How to build a decoder.
///
/// ```text
/// ┌───────────┬───────────────────────────────────────────────────────┐
/// │ Field     │ Purpose                                               │
/// ├───────────┼───────────────────────────────────────────────────────┤
/// │ format    │ Which decoder `open` / `decode_all` dispatch to       │
/// │ dialect   │ RLE90 escaped-marker behaviour (ignored for BinHex4)  │
/// │ ownership │ Whether closing the decoder releases the source       │
/// └───────────┴───────────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecoderConfig {
    pub format: Format,
    pub dialect: Rle90Dialect,
    pub ownership: Ownership,
}

impl DecoderConfig {
    pub fn new(format: Format) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_dialect(mut self, dialect: Rle90Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    #[must_use]
    pub fn with_ownership(mut self, ownership: Ownership) -> Self {
        self.ownership = ownership;
        self
    }

    /// Build an incremental decoder over `reader`.
    ///
    /// # Errors
    ///
    /// Only BinHex4 can fail here, when the start marker is missing.
    pub fn open<'a, R: Read + 'a>(
        &self,
        reader: R,
    ) -> Result<Box<dyn DecodingStream + 'a>, DecodeError> {
        let stream: Box<dyn DecodingStream + 'a> = match self.format {
            Format::Rle90 => Box::new(Rle90Decoder::with_ownership(
                reader,
                self.dialect,
                self.ownership,
            )),
            Format::BinHex4 => Box::new(BinHex4Decoder::with_ownership(reader, self.ownership)?),
        };
        Ok(stream)
    }

    /// Decode a complete buffer with the matching batch decoder.
    ///
    /// # Errors
    ///
    /// Whatever the batch decoder reports.
    pub fn decode_all(&self, input: &[u8]) -> Result<Vec<u8>, DecodeError> {
        match self.format {
            Format::Rle90 => decode_rle90(input, self.dialect),
            Format::BinHex4 => decode_binhex4(input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_owned_non_buffering_rle90() {
        let config = DecoderConfig::default();
        assert_eq!(config.format, Format::Rle90);
        assert_eq!(config.dialect, Rle90Dialect::NonBuffering);
        assert_eq!(config.ownership, Ownership::Owned);
    }

    #[test]
    fn parse_formats() {
        assert_eq!("RLE90".parse::<Format>().unwrap(), Format::Rle90);
        assert_eq!("hqx".parse::<Format>().unwrap(), Format::BinHex4);
        assert!("zip".parse::<Format>().is_err());
        assert_eq!(Format::BinHex4.to_string(), "binhex4");
    }

    #[test]
    fn open_dispatches_by_format() {
        let config = DecoderConfig::new(Format::BinHex4);
        let mut stream = config.open(&b":B@*M:"[..]).unwrap();
        assert_eq!(stream.format(), Format::BinHex4);

        let mut out = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"abc");
    }

    #[test]
    fn open_reports_binhex_start_error() {
        let config = DecoderConfig::new(Format::BinHex4);
        assert!(matches!(
            config.open(&b"nope"[..]),
            Err(DecodeError::MissingStartMarker { .. })
        ));
    }

    #[test]
    fn stream_and_batch_agree() {
        let config = DecoderConfig::new(Format::Rle90).with_dialect(Rle90Dialect::Buffering);
        let input = [0x90, 0x00, 0x90, 0x04, 0x33];

        let mut out = Vec::new();
        config.open(&input[..]).unwrap().read_to_end(&mut out).unwrap();
        assert_eq!(out, config.decode_all(&input).unwrap());
        assert_eq!(out, [0x90, 0x90, 0x90, 0x90, 0x33]);
    }
}
