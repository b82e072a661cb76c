//! CRC-8 checksum (polynomial 0x07)
//!
//! Bit-serial CRC with an 8-bit accumulator, initial value 0, no reflection
//! and no final XOR. This parameter set is also known as CRC-8/SMBUS.

/// Generator polynomial (x^8 + x^2 + x + 1, top bit implicit)
pub const CRC8_POLY: u8 = 0x07;

/// Compute the CRC-8 of `data`
pub const fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0x00;
    let mut i = 0;
    while i < data.len() {
        crc ^= data[i];
        let mut bit = 0;
        while bit < 8 {
            if crc & 0x80 != 0 {
                crc = (crc << 1) ^ CRC8_POLY;
            } else {
                crc <<= 1;
            }
            bit += 1;
        }
        i += 1;
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SMBUS: ::crc::Crc<u8> = ::crc::Crc::<u8>::new(&::crc::CRC_8_SMBUS);

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(crc8(&[]), 0x00);
    }

    #[test]
    fn test_known_values() {
        // Catalogue check value for CRC-8/SMBUS
        assert_eq!(crc8(b"123456789"), 0xF4);
        // Single byte equals its own table entry
        assert_eq!(crc8(&[0x01]), 0x07);
        assert_eq!(crc8(&[0x80]), 0x89);
        assert_eq!(crc8(b"Hi"), 0xEB);
        assert_eq!(crc8(b"Hello"), 0xF6);
    }

    #[test]
    fn test_usable_in_const_context() {
        const HELLO: u8 = crc8(b"Hello");
        assert_eq!(HELLO, SMBUS.checksum(b"Hello"));
    }

    proptest! {
        #[test]
        fn matches_reference_implementation(data in proptest::collection::vec(any::<u8>(), 0..300)) {
            prop_assert_eq!(crc8(&data), SMBUS.checksum(&data));
        }

        #[test]
        fn is_deterministic(data in proptest::collection::vec(any::<u8>(), 0..64)) {
            prop_assert_eq!(crc8(&data), crc8(&data));
        }

        #[test]
        fn detects_single_bit_errors(
            data in proptest::collection::vec(any::<u8>(), 1..64),
            index in any::<prop::sample::Index>(),
            bit in 0u8..8,
        ) {
            let mut corrupted = data.clone();
            let i = index.index(corrupted.len());
            corrupted[i] ^= 1 << bit;
            prop_assert_ne!(crc8(&data), crc8(&corrupted));
        }
    }
}
