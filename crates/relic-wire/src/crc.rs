use crate::error::WireError;

/// Parameters of a CRC in the Rocksoft/Williams model.
///
/// ```text
/// ┌─────────────┬────────────────────────────────────────────────────┐
/// │ Field       │ Meaning                                            │
/// ├─────────────┼────────────────────────────────────────────────────┤
/// │ width       │ register width in bits, 1..=64                     │
/// │ poly        │ generator polynomial, normal (MSB-first) form      │
/// │ init        │ register value before the first byte               │
/// │ reflect_in  │ feed each input byte LSB-first                     │
/// │ reflect_out │ bit-reverse the register before the final XOR      │
/// │ xor_out     │ XORed into the register to produce the result      │
/// └─────────────┴────────────────────────────────────────────────────┘
/// ```
///
/// Every value is given in normal orientation even for reflected CRCs;
/// the engine reflects internally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CrcParams {
    pub width: u8,
    pub poly: u64,
    pub init: u64,
    pub reflect_in: bool,
    pub reflect_out: bool,
    pub xor_out: u64,
}

/// CRC-16 used by ARC and LHA archives.
pub const CRC_16_ARC: CrcParams = CrcParams {
    width: 16,
    poly: 0x8005,
    init: 0x0000,
    reflect_in: true,
    reflect_out: true,
    xor_out: 0x0000,
};

/// CRC-16/XMODEM, the checksum BinHex4 uses for its header and forks.
pub const CRC_16_XMODEM: CrcParams = CrcParams {
    width: 16,
    poly: 0x1021,
    init: 0x0000,
    reflect_in: false,
    reflect_out: false,
    xor_out: 0x0000,
};

/// The ubiquitous CRC-32 of zip, PNG and Ethernet.
pub const CRC_32_ISO_HDLC: CrcParams = CrcParams {
    width: 32,
    poly: 0x04C1_1DB7,
    init: 0xFFFF_FFFF,
    reflect_in: true,
    reflect_out: true,
    xor_out: 0xFFFF_FFFF,
};

impl CrcParams {
    /// Look up a named preset (`arc`, `xmodem`, `crc32`, or the full
    /// catalogue names).
    ///
    /// # Errors
    ///
    /// [`WireError::UnknownName`] if the name is not a known preset.
    pub fn preset(name: &str) -> Result<Self, WireError> {
        match name.to_ascii_lowercase().as_str() {
            "arc" | "crc-16/arc" | "crc16" => Ok(CRC_16_ARC),
            "xmodem" | "crc-16/xmodem" | "binhex" => Ok(CRC_16_XMODEM),
            "crc32" | "crc-32" | "crc-32/iso-hdlc" => Ok(CRC_32_ISO_HDLC),
            _ => Err(WireError::UnknownName {
                kind: "CRC preset",
                name: name.to_string(),
            }),
        }
    }

    /// Mask selecting the low `width` bits.
    ///
    /// Widths outside 1..=64 saturate: 0 gives an empty mask and anything
    /// above 64 gives all ones. [`validate`](Self::validate) rejects both.
    pub fn mask(&self) -> u64 {
        match self.width {
            0 => 0,
            w if w >= 64 => u64::MAX,
            w => (1u64 << w) - 1,
        }
    }

    /// Check that the width is supported and every value fits in it.
    ///
    /// # Errors
    ///
    /// - [`WireError::InvalidCrcWidth`] if `width` is 0 or above 64.
    /// - [`WireError::CrcValueTooWide`] if `poly`, `init` or `xor_out`
    ///   has bits set above `width`.
    pub fn validate(&self) -> Result<(), WireError> {
        if self.width == 0 || self.width > 64 {
            return Err(WireError::InvalidCrcWidth { width: self.width });
        }

        let mask = self.mask();
        for (field, value) in [
            ("poly", self.poly),
            ("init", self.init),
            ("xor_out", self.xor_out),
        ] {
            if value & !mask != 0 {
                return Err(WireError::CrcValueTooWide {
                    field,
                    value,
                    width: self.width,
                });
            }
        }
        Ok(())
    }
}

/// Reverse the low `width` bits of `value`.
fn reflect(value: u64, width: u8) -> u64 {
    value.reverse_bits() >> (64 - u32::from(width))
}

/// A table-driven CRC engine for one parameter set.
///
/// Non-reflected CRCs keep the register left-aligned in 64 bits so that a
/// single byte-at-a-time table works for any width, including widths
/// narrower than a byte. Reflected CRCs keep it right-aligned.
#[derive(Clone, Debug)]
pub struct Crc {
    params: CrcParams,
    table: [u64; 256],
}

impl Crc {
    /// Build the lookup table for `params`.
    ///
    /// # Errors
    ///
    /// Whatever [`CrcParams::validate`] rejects.
    pub fn new(params: CrcParams) -> Result<Self, WireError> {
        params.validate()?;

        let mut table = [0u64; 256];
        if params.reflect_in {
            let poly = reflect(params.poly, params.width);
            for (i, slot) in (0u64..).zip(table.iter_mut()) {
                let mut crc = i;
                for _ in 0..8 {
                    crc = if crc & 1 != 0 { (crc >> 1) ^ poly } else { crc >> 1 };
                }
                *slot = crc;
            }
        } else {
            let poly = params.poly << (64 - u32::from(params.width));
            for (i, slot) in (0u64..).zip(table.iter_mut()) {
                let mut crc = i << 56;
                for _ in 0..8 {
                    crc = if crc & (1 << 63) != 0 {
                        (crc << 1) ^ poly
                    } else {
                        crc << 1
                    };
                }
                *slot = crc;
            }
        }

        Ok(Self { params, table })
    }

    pub fn params(&self) -> &CrcParams {
        &self.params
    }

    /// Checksum a complete buffer.
    pub fn checksum(&self, data: &[u8]) -> u64 {
        let mut digest = self.digest();
        digest.update(data);
        digest.finalize()
    }

    /// Start an incremental computation.
    pub fn digest(&self) -> Digest<'_> {
        let register = if self.params.reflect_in {
            reflect(self.params.init, self.params.width)
        } else {
            self.params.init << (64 - u32::from(self.params.width))
        };
        Digest {
            crc: self,
            register,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn step(&self, register: u64, byte: u8) -> u64 {
        if self.params.reflect_in {
            let index = (register as u8) ^ byte;
            (register >> 8) ^ self.table[usize::from(index)]
        } else {
            let index = ((register >> 56) as u8) ^ byte;
            (register << 8) ^ self.table[usize::from(index)]
        }
    }
}

/// An in-progress CRC computation. Feed it with [`update`](Self::update)
/// as many times as needed, then call [`finalize`](Self::finalize).
#[derive(Clone, Debug)]
pub struct Digest<'a> {
    crc: &'a Crc,
    register: u64,
}

impl Digest<'_> {
    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.register = self.crc.step(self.register, byte);
        }
    }

    /// The CRC of everything fed so far.
    pub fn finalize(&self) -> u64 {
        let params = &self.crc.params;
        let mut value = if params.reflect_in {
            self.register
        } else {
            self.register >> (64 - u32::from(params.width))
        };
        if params.reflect_in != params.reflect_out {
            value = reflect(value, params.width);
        }
        (value ^ params.xor_out) & params.mask()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECK_INPUT: &[u8] = b"123456789";

    fn check(params: CrcParams) -> u64 {
        Crc::new(params).unwrap().checksum(CHECK_INPUT)
    }

    #[test]
    fn arc_check_value() {
        assert_eq!(check(CRC_16_ARC), 0xBB3D);
    }

    #[test]
    fn xmodem_check_value() {
        assert_eq!(check(CRC_16_XMODEM), 0x31C3);
    }

    #[test]
    fn crc32_check_value() {
        assert_eq!(check(CRC_32_ISO_HDLC), 0xCBF4_3926);
    }

    #[test]
    fn narrow_reflected_width() {
        // CRC-5/USB
        let params = CrcParams {
            width: 5,
            poly: 0x05,
            init: 0x1F,
            reflect_in: true,
            reflect_out: true,
            xor_out: 0x1F,
        };
        assert_eq!(check(params), 0x19);
    }

    #[test]
    fn narrow_normal_width() {
        // CRC-7/MMC
        let params = CrcParams {
            width: 7,
            poly: 0x09,
            init: 0x00,
            reflect_in: false,
            reflect_out: false,
            xor_out: 0x00,
        };
        assert_eq!(check(params), 0x75);
    }

    #[test]
    fn mixed_reflection() {
        // CRC-12/UMTS reflects the output but not the input.
        let params = CrcParams {
            width: 12,
            poly: 0x80F,
            init: 0x000,
            reflect_in: false,
            reflect_out: true,
            xor_out: 0x000,
        };
        assert_eq!(check(params), 0xDAF);
    }

    #[test]
    fn full_width() {
        // CRC-64/XZ
        let params = CrcParams {
            width: 64,
            poly: 0x42F0_E1EB_A9EA_3693,
            init: u64::MAX,
            reflect_in: true,
            reflect_out: true,
            xor_out: u64::MAX,
        };
        assert_eq!(check(params), 0x995D_C9BB_DF19_39FA);
    }

    #[test]
    fn incremental_matches_one_shot() {
        let crc = Crc::new(CRC_16_ARC).unwrap();
        let mut digest = crc.digest();
        for chunk in CHECK_INPUT.chunks(2) {
            digest.update(chunk);
        }
        assert_eq!(digest.finalize(), crc.checksum(CHECK_INPUT));
    }

    #[test]
    fn empty_input_is_init_after_xor() {
        assert_eq!(Crc::new(CRC_16_ARC).unwrap().checksum(b""), 0);
        assert_eq!(Crc::new(CRC_32_ISO_HDLC).unwrap().checksum(b""), 0);
    }

    #[test]
    fn reject_zero_width() {
        let params = CrcParams {
            width: 0,
            ..CRC_16_ARC
        };
        assert!(matches!(
            Crc::new(params),
            Err(WireError::InvalidCrcWidth { width: 0 })
        ));
    }

    #[test]
    fn mask_saturates_outside_supported_widths() {
        let with_width = |width| CrcParams { width, ..CRC_16_ARC };
        assert_eq!(with_width(0).mask(), 0);
        assert_eq!(with_width(1).mask(), 0x1);
        assert_eq!(with_width(16).mask(), 0xFFFF);
        assert_eq!(with_width(63).mask(), u64::MAX >> 1);
        assert_eq!(with_width(64).mask(), u64::MAX);
        assert_eq!(with_width(65).mask(), u64::MAX);
        assert_eq!(with_width(u8::MAX).mask(), u64::MAX);

        assert!(matches!(
            with_width(65).validate(),
            Err(WireError::InvalidCrcWidth { width: 65 })
        ));
    }

    #[test]
    fn reject_oversized_poly() {
        let params = CrcParams {
            width: 8,
            ..CRC_16_ARC
        };
        assert!(matches!(
            Crc::new(params),
            Err(WireError::CrcValueTooWide { field: "poly", .. })
        ));
    }

    #[test]
    fn presets_by_name() {
        assert_eq!(CrcParams::preset("ARC").unwrap(), CRC_16_ARC);
        assert_eq!(CrcParams::preset("binhex").unwrap(), CRC_16_XMODEM);
        assert_eq!(CrcParams::preset("crc32").unwrap(), CRC_32_ISO_HDLC);
        assert!(CrcParams::preset("adler").is_err());
    }
}
