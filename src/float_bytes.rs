//! Big-endian byte view of a single-precision float.
//!
//! Used both for RAM float access and for the four-byte immediates of the
//! float-constant-load opcodes. The encoding is mandatory and observable;
//! callers (including the assembler) depend on most-significant-byte-first
//! ordering.

/// Encode `x` as four big-endian IEEE-754 bytes.
pub fn float_to_bytes(x: f32) -> [u8; 4] {
    x.to_be_bytes()
}

/// Decode four big-endian IEEE-754 bytes back into a float.
pub fn bytes_to_float(bytes: [u8; 4]) -> f32 {
    f32::from_be_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_positive_value() {
        let bytes = float_to_bytes(1.5);
        assert_eq!(bytes_to_float(bytes), 1.5);
    }

    #[test]
    fn round_trips_a_negative_value() {
        let bytes = float_to_bytes(-8.58);
        assert_eq!(bytes_to_float(bytes), -8.58f32);
    }

    #[test]
    fn most_significant_byte_first() {
        // 1.0f32 = 0x3F800000
        assert_eq!(float_to_bytes(1.0), [0x3F, 0x80, 0x00, 0x00]);
    }

    #[quickcheck_macros::quickcheck]
    fn round_trips_every_finite_value(x: f32) -> bool {
        if !x.is_finite() {
            return true;
        }
        bytes_to_float(float_to_bytes(x)) == x
    }
}
