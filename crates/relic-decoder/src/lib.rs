#![warn(clippy::pedantic)]

pub mod batch;
pub mod binhex;
pub mod config;
pub mod error;
pub mod rle90;
pub mod source;
pub mod stream;

mod backlog;

pub use batch::{decode_binhex4, decode_rle90};
pub use binhex::BinHex4Decoder;
pub use config::{DecoderConfig, Format};
pub use error::DecodeError;
pub use relic_wire::rle90::Rle90Dialect;
pub use rle90::Rle90Decoder;
pub use source::{ByteSource, Ownership};
pub use stream::{DecodingStream, IoReader};
