//! Small-radix alphabets and integer packings used by the wire format.
//!
//! Three character sets matter on the air: the 41-character alphabet that
//! carries packed checksums and numeric fields, the 72-character alphabet
//! that carries whole frames as 12 six-bit symbols, and the 39-character
//! alphanumeric set used by callsign and token packings.

/// Base-41 alphabet for packed numeric fields.
pub const ALPHABET41: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ+-./?";

/// 72-character frame alphabet; each symbol carries six bits.
pub const ALPHABET72: &str =
    "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-+/?.";

/// 39-character set for callsigns and flagged tokens.
pub const ALPHANUMERIC: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ /@";

const N41: u32 = 41;

fn index41(c: char) -> Option<u32> {
    ALPHABET41.find(c).map(|i| i as u32)
}

fn char41(v: u32) -> char {
    ALPHABET41.as_bytes()[v as usize] as char
}

pub(crate) fn index_alphanumeric(c: char) -> Option<u64> {
    ALPHANUMERIC.find(c).map(|i| i as u64)
}

pub(crate) fn char_alphanumeric(v: u64) -> char {
    ALPHANUMERIC.as_bytes()[v as usize % ALPHANUMERIC.len()] as char
}

/// Packs a 5-bit value as one base-41 character.
pub fn pack5bits(packed: u8) -> String {
    char41(u32::from(packed) % 32).to_string()
}

pub fn unpack5bits(value: &str) -> u8 {
    value
        .chars()
        .next()
        .and_then(index41)
        .map(|v| v as u8)
        .unwrap_or(0)
}

/// Packs a 6-bit value as one base-41 character.
pub fn pack6bits(packed: u8) -> String {
    char41(u32::from(packed) % N41).to_string()
}

pub fn unpack6bits(value: &str) -> u8 {
    unpack5bits(value)
}

/// Packs a 16-bit value as three base-41 characters.
pub fn pack16bits(packed: u16) -> String {
    let packed = u32::from(packed);
    let a = packed / (N41 * N41);
    let b = (packed - a * N41 * N41) / N41;
    let c = packed % N41;
    let mut out = String::with_capacity(3);
    out.push(char41(a));
    out.push(char41(b));
    out.push(char41(c));
    out
}

pub fn unpack16bits(value: &str) -> u16 {
    let mut chars = value.chars();
    let (Some(a), Some(b), Some(c)) = (chars.next(), chars.next(), chars.next()) else {
        return 0;
    };
    let (Some(a), Some(b), Some(c)) = (index41(a), index41(b), index41(c)) else {
        return 0;
    };
    let unpacked = N41 * N41 * a + N41 * b + c;
    if unpacked > u32::from(u16::MAX) {
        return 0;
    }
    unpacked as u16
}

/// Packs a 32-bit value as six base-41 characters.
pub fn pack32bits(packed: u32) -> String {
    let mut out = pack16bits((packed >> 16) as u16);
    out.push_str(&pack16bits((packed & 0xFFFF) as u16));
    out
}

pub fn unpack32bits(value: &str) -> u32 {
    if value.len() < 6 {
        return 0;
    }
    (u32::from(unpack16bits(&value[..3])) << 16) | u32::from(unpack16bits(&value[3..6]))
}

/// Packs a 64-bit value as twelve base-41 characters.
pub fn pack64bits(packed: u64) -> String {
    let mut out = pack32bits((packed >> 32) as u32);
    out.push_str(&pack32bits((packed & 0xFFFF_FFFF) as u32));
    out
}

pub fn unpack64bits(value: &str) -> u64 {
    if value.len() < 12 {
        return 0;
    }
    (u64::from(unpack32bits(&value[..6])) << 32) | u64::from(unpack32bits(&value[6..12]))
}

/// Packs a 64-bit payload plus an 8-bit remainder into 12 frame symbols.
///
/// The first ten symbols carry 60 bits MSB-first; the last two interleave
/// the low four payload bits with the remainder.
pub fn pack72bits(value: u64, rem: u8) -> String {
    let mut packed = ['0'; 12];
    let alphabet = ALPHABET72.as_bytes();

    let rem_high = (((value & 0xF) << 2) | u64::from(rem >> 6)) as usize;
    let rem_low = (rem & 0x3F) as usize;
    let mut value = value >> 4;

    packed[11] = alphabet[rem_low] as char;
    packed[10] = alphabet[rem_high] as char;
    for i in 0..10 {
        packed[9 - i] = alphabet[(value & 0x3F) as usize] as char;
        value >>= 6;
    }

    packed.iter().collect()
}

/// Inverse of [`pack72bits`]; `None` when a symbol is not in the alphabet.
pub fn unpack72bits(value: &str) -> Option<(u64, u8)> {
    let chars: Vec<char> = value.chars().take(12).collect();
    if chars.len() < 12 {
        return None;
    }

    let mut decoded: u64 = 0;
    for (i, &c) in chars.iter().take(10).enumerate() {
        let idx = ALPHABET72.find(c)? as u64;
        decoded |= idx << (58 - 6 * i);
    }

    let rem_high = ALPHABET72.find(chars[10])? as u8;
    let rem_low = ALPHABET72.find(chars[11])? as u8;

    decoded |= u64::from(rem_high >> 2);
    let rem = ((rem_high & 0x3) << 6) | rem_low;
    Some((decoded, rem))
}

/// Packs a short token (up to 4 characters) plus one flag bit into 22 bits.
pub fn pack_alphanumeric22(value: &str, is_flag: bool) -> u32 {
    let mut padded: Vec<char> = value.chars().collect();
    while padded.len() < 4 {
        padded.push(' ');
    }
    let idx = |c: char| index_alphanumeric(c).unwrap_or(0) as u32;

    let mut packed = idx(padded[0]);
    packed = packed.wrapping_mul(37).wrapping_add(idx(padded[1]));
    packed = packed.wrapping_mul(27).wrapping_add(idx(padded[2]).wrapping_sub(10));
    packed = packed.wrapping_mul(27).wrapping_add(idx(padded[3]).wrapping_sub(10));
    if is_flag {
        packed |= 1 << 21;
    }
    packed
}

pub fn unpack_alphanumeric22(packed: u32) -> (String, bool) {
    let is_flag = packed & (1 << 21) != 0;
    let mut packed = packed & !(1 << 21);

    let mut word = [' '; 4];
    word[3] = char_alphanumeric(u64::from(packed % 27 + 10));
    packed /= 27;
    word[2] = char_alphanumeric(u64::from(packed % 27 + 10));
    packed /= 27;
    word[1] = char_alphanumeric(u64::from(packed % 37));
    packed /= 37;
    word[0] = char_alphanumeric(u64::from(packed));
    (word.iter().collect(), is_flag)
}

/// Packs up to 11 alphanumeric characters (with slash fields at positions
/// 3 and 7) into 50 bits, the layout used by compound frames.
pub fn pack_alphanumeric50(value: &str) -> u64 {
    let mut clean: Vec<char> = value
        .chars()
        .filter(|&c| index_alphanumeric(c).is_some())
        .collect();

    // Slash fields occupy fixed positions; shift other characters past them.
    if clean.len() > 3 && clean[3] != '/' {
        clean.insert(3, ' ');
    }
    if clean.len() > 7 && clean[7] != '/' {
        clean.insert(7, ' ');
    }
    while clean.len() < 11 {
        clean.push(' ');
    }

    let idx = |i: usize| index_alphanumeric(clean[i]).unwrap_or(0);
    const B: u64 = 38;

    let mut packed = idx(0);
    packed = packed * B + idx(1);
    packed = packed * B + idx(2);
    packed = packed * 2 + u64::from(clean[3] == '/');
    packed = packed * B + idx(4);
    packed = packed * B + idx(5);
    packed = packed * B + idx(6);
    packed = packed * 2 + u64::from(clean[7] == '/');
    packed = packed * B + idx(8);
    packed = packed * B + idx(9);
    packed * B + idx(10)
}

pub fn unpack_alphanumeric50(packed: u64) -> String {
    let mut packed = packed;
    let mut next = |base: u64, slash_field: bool| -> char {
        let tmp = packed % base;
        packed /= base;
        if slash_field {
            if tmp != 0 {
                '/'
            } else {
                ' '
            }
        } else {
            char_alphanumeric(tmp)
        }
    };

    let mut word = [' '; 11];
    word[10] = next(38, false);
    word[9] = next(38, false);
    word[8] = next(38, false);
    word[7] = next(2, true);
    word[6] = next(38, false);
    word[5] = next(38, false);
    word[4] = next(38, false);
    word[3] = next(2, true);
    word[2] = next(38, false);
    word[1] = next(38, false);
    word[0] = next(39, false);

    word.iter().filter(|&&c| c != ' ').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack16_round_trip() {
        for v in [0u16, 1, 41, 1680, 0x1234, u16::MAX] {
            assert_eq!(unpack16bits(&pack16bits(v)), v);
        }
    }

    #[test]
    fn pack32_round_trip() {
        for v in [0u32, 0xDEAD_BEEF, u32::MAX] {
            assert_eq!(unpack32bits(&pack32bits(v)), v);
        }
    }

    #[test]
    fn pack64_round_trip() {
        for v in [0u64, 0x0123_4567_89AB_CDEF, u64::MAX] {
            assert_eq!(unpack64bits(&pack64bits(v)), v);
        }
    }

    #[test]
    fn pack72_round_trip() {
        for (value, rem) in [
            (0u64, 0u8),
            (u64::MAX, u8::MAX),
            (0x6123_4567_89AB_CDEF, 0x5A),
        ] {
            let frame = pack72bits(value, rem);
            assert_eq!(frame.chars().count(), 12);
            assert_eq!(unpack72bits(&frame), Some((value, rem)));
        }
    }

    #[test]
    fn unpack72_rejects_foreign_symbols() {
        assert_eq!(unpack72bits("ABCDEFGHIJK "), None);
        assert_eq!(unpack72bits("SHORT"), None);
    }

    #[test]
    fn alphanumeric50_plain_callsign() {
        let packed = pack_alphanumeric50("KN4CRD");
        assert_eq!(unpack_alphanumeric50(packed), "KN4CRD");
    }

    #[test]
    fn alphanumeric50_keeps_slashes() {
        let packed = pack_alphanumeric50("VE3/KN4CRD");
        assert_eq!(unpack_alphanumeric50(packed), "VE3/KN4CRD");
    }

    #[test]
    fn alphanumeric50_group_call() {
        let packed = pack_alphanumeric50("@ALLCALL");
        assert_eq!(unpack_alphanumeric50(packed), "@ALLCALL");
    }

    #[test]
    fn alphanumeric22_round_trip() {
        let packed = pack_alphanumeric22("A1RT", true);
        let (word, flag) = unpack_alphanumeric22(packed);
        assert_eq!(word.trim_end(), "A1RT");
        assert!(flag);

        let (word, flag) = unpack_alphanumeric22(pack_alphanumeric22("CQ", false));
        assert_eq!(word.trim_end(), "CQ");
        assert!(!flag);
    }
}
