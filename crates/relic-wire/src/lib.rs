#![warn(clippy::pedantic)]

pub mod binhex;
pub mod crc;
pub mod error;
pub mod rle90;

pub use error::WireError;
