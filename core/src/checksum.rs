//! Frame checksums.
//!
//! Buffered directed commands append a 16- or 32-bit checksum over the
//! trailing message text so the receiver can validate a multi-frame body.
//! The 16-bit variant is CRC-16/KERMIT, the 32-bit variant CRC-32/BZIP2;
//! both are carried over the air as base-41 packed characters.

use crate::alphabet::{pack16bits, pack32bits, unpack16bits, unpack32bits};

/// CRC-16/KERMIT: reflected, poly 0x1021, init 0, no final xor.
pub fn crc16_kermit(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= u16::from(byte);
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0x8408;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// CRC-32/BZIP2: unreflected, poly 0x04C11DB7, init and final xor all-ones.
pub fn crc32_bzip2(data: &[u8]) -> u32 {
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in data {
        crc ^= u32::from(byte) << 24;
        for _ in 0..8 {
            if crc & 0x8000_0000 != 0 {
                crc = (crc << 1) ^ 0x04C1_1DB7;
            } else {
                crc <<= 1;
            }
        }
    }
    crc ^ 0xFFFF_FFFF
}

/// CRC-12 used by the tone sequencer, poly 0xC06 over the message bits.
pub fn crc12(data: u128, width: u32) -> u16 {
    let mut crc: u16 = 0;
    for i in (0..width).rev() {
        let bit = ((data >> i) & 1) as u16;
        let top = (crc >> 11) & 1;
        crc = (crc << 1) & 0x0FFF;
        if bit ^ top != 0 {
            crc ^= 0xC06;
        }
    }
    crc
}

/// 16-bit checksum of `input`, packed to three base-41 characters.
pub fn checksum16(input: &str) -> String {
    pack16bits(crc16_kermit(input.as_bytes()))
}

pub fn checksum16_valid(checksum: &str, input: &str) -> bool {
    checksum.len() >= 3 && unpack16bits(checksum) == crc16_kermit(input.as_bytes())
}

/// 32-bit checksum of `input`, packed to six base-41 characters.
pub fn checksum32(input: &str) -> String {
    pack32bits(crc32_bzip2(input.as_bytes()))
}

pub fn checksum32_valid(checksum: &str, input: &str) -> bool {
    checksum.len() >= 6 && unpack32bits(checksum) == crc32_bzip2(input.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc16_check_value() {
        // Standard CRC-16/KERMIT check string.
        assert_eq!(crc16_kermit(b"123456789"), 0x2189);
    }

    #[test]
    fn crc32_check_value() {
        assert_eq!(crc32_bzip2(b"123456789"), 0xFC89_1918);
    }

    #[test]
    fn checksum16_round_trip() {
        let sum = checksum16("HELLO WORLD");
        assert_eq!(sum.len(), 3);
        assert!(checksum16_valid(&sum, "HELLO WORLD"));
        assert!(!checksum16_valid(&sum, "HELLO WORLE"));
    }

    #[test]
    fn checksum32_round_trip() {
        let sum = checksum32("QUERY MSGS");
        assert_eq!(sum.len(), 6);
        assert!(checksum32_valid(&sum, "QUERY MSGS"));
        assert!(!checksum32_valid(&sum, "QUERY MSG"));
    }

    #[test]
    fn single_bit_flip_detected() {
        let input = b"THE QUICK BROWN FOX".to_vec();
        let sum = crc16_kermit(&input);
        for i in 0..input.len() * 8 {
            let mut flipped = input.clone();
            flipped[i / 8] ^= 1 << (i % 8);
            assert_ne!(crc16_kermit(&flipped), sum, "undetected flip at bit {i}");
        }
    }

    #[test]
    fn crc12_stays_in_range() {
        let c = crc12(0x1234_5678_9ABC_DEF0, 64);
        assert!(c < 1 << 12);
        assert_ne!(crc12(0x1234_5678_9ABC_DEF1, 64), c);
    }
}
