/// The character that opens a BinHex4 stream.
pub const START_MARKER: u8 = b':';

/// The character that closes a BinHex4 stream.
pub const END_MARKER: u8 = b':';

/// The 64-symbol BinHex4 alphabet. A symbol's index is its 6-bit value.
///
/// Not a contiguous ASCII range: `7`, `O`, `W`, `g`, `n`, `o` and others
/// are missing.
pub const ALPHABET: &[u8; 64] =
    b"!\"#$%&'()*+,-012345689@ABCDEFGHIJKLMNPQRSTUVXYZ[`abcdefhijklmpqr";

/// Table entry for bytes outside the alphabet.
pub const INVALID: u8 = 0xFF;

/// Input byte → 6-bit value, or [`INVALID`].
///
/// Built at compile time and shared by every decoder.
pub static SIX_BIT: [u8; 256] = build_six_bit_table();

#[allow(clippy::cast_possible_truncation)]
const fn build_six_bit_table() -> [u8; 256] {
    let mut table = [INVALID; 256];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
}

/// Look up the 6-bit value of an alphabet character.
pub fn six_bit_value(byte: u8) -> Option<u8> {
    match SIX_BIT[usize::from(byte)] {
        INVALID => None,
        value => Some(value),
    }
}

/// Line breaks may appear anywhere between the markers and carry no bits.
pub fn is_line_break(byte: u8) -> bool {
    byte == b'\n' || byte == b'\r'
}

/// Sliding window of not-yet-emitted bits.
///
/// Six-bit groups are shifted in at the bottom; once eight or more bits are
/// resident the top eight leave as one output byte. Because at most one
/// byte can complete per group, the window never holds more than 12 bits
/// between pushes:
///
/// ```text
///   held before push │ after push │ emitted │ held after
///   ─────────────────┼────────────┼─────────┼───────────
///          0         │     6      │   no    │     6
///          6         │    12      │   yes   │     4
///          4         │    10      │   yes   │     2
///          2         │     8      │   yes   │     0
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BitAccumulator {
    bits: u16,
    held: u8,
}

impl BitAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift in one 6-bit group, returning a byte if one completed.
    #[allow(clippy::cast_possible_truncation)]
    pub fn push(&mut self, value: u8) -> Option<u8> {
        debug_assert!(value < 64, "six-bit group out of range: {value}");
        self.bits = (self.bits << 6) | u16::from(value & 0x3F);
        self.held += 6;

        if self.held < 8 {
            return None;
        }

        self.held -= 8;
        let byte = (self.bits >> self.held) as u8;
        self.bits &= (1u16 << self.held) - 1;
        Some(byte)
    }

    /// Number of bits waiting for more input.
    pub fn held(&self) -> u8 {
        self.held
    }

    /// Drop the residual bits, returning how many were discarded.
    ///
    /// A terminated stream never zero-pads its tail into an extra byte.
    pub fn discard(&mut self) -> u8 {
        let dropped = self.held;
        self.bits = 0;
        self.held = 0;
        dropped
    }
}
