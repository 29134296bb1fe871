/// Errors raised by the format-level building blocks in this crate.
///
/// Everything here is pure and in-memory, so the only failure mode is a
/// caller handing in parameters that cannot describe a valid codec.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// CRC width outside the supported 1..=64 bit range.
    #[error("unsupported CRC width {width}: expected 1..=64 bits")]
    InvalidCrcWidth { width: u8 },

    /// A CRC parameter (poly, init, xor-out) has bits set above `width`.
    #[error("CRC {field} value {value:#X} does not fit in {width} bits")]
    CrcValueTooWide {
        field: &'static str,
        value: u64,
        width: u8,
    },

    /// A format name did not match any known codec.
    #[error("unknown {kind} {name:?}")]
    UnknownName { kind: &'static str, name: String },
}
