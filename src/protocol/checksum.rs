//! Frame-data checksum for the XBee API protocol.
//!
//! The checksum covers the unescaped frame-data bytes (API-ID through the
//! last payload byte) and is defined as `0xFF - (sum mod 256)`.

/// Computes the checksum over a byte range.
///
/// An empty range yields `0xFF`.
#[must_use]
pub fn compute(data: &[u8]) -> u8 {
    let sum = data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    0xFF - sum
}

/// Verifies a stamped byte range.
///
/// The last byte is taken as the checksum of everything before it.
/// Returns `false` for an empty slice.
#[must_use]
pub fn verify(data: &[u8]) -> bool {
    match data.split_last() {
        Some((&checksum, body)) => compute(body) == checksum,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_empty() {
        assert_eq!(compute(&[]), 0xFF);
    }

    #[test]
    fn test_compute_known_value() {
        // Example from the Digi documentation: AT command "NJ" with value 0xFF.
        // 0x08 + 0x01 + 0x4E + 0x4A + 0xFF = 0x1A0, low byte 0xA0, 0xFF - 0xA0 = 0x5F
        assert_eq!(compute(&[0x08, 0x01, 0x4E, 0x4A, 0xFF]), 0x5F);
    }

    #[test]
    fn test_compute_wraps_modulo_256() {
        assert_eq!(compute(&[0xFF, 0xFF]), 0xFF - 0xFE);
    }

    #[test]
    fn test_verify_stamped() {
        let mut data = vec![0x08, 0x01, 0x4E, 0x4A, 0xFF];
        data.push(compute(&data));
        assert!(verify(&data));
    }

    #[test]
    fn test_verify_detects_single_bit_flip() {
        let mut data = vec![0x10, 0x01, 0x00, 0x13, 0xA2, 0x00, b'H', b'i'];
        data.push(compute(&data[..8]));
        assert!(verify(&data));

        for byte in 0..data.len() - 1 {
            for bit in 0..8 {
                let mut corrupted = data.clone();
                corrupted[byte] ^= 1 << bit;
                assert!(!verify(&corrupted), "flip at byte {byte} bit {bit}");
            }
        }
    }

    #[test]
    fn test_verify_empty() {
        assert!(!verify(&[]));
    }
}
