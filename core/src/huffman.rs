//! Fixed Huffman code for plain text payloads.
//!
//! The table is frequency-ordered for English ragchew text. Encoding is
//! greedy over the table keys; decoding walks the bitstream and stops at
//! the first prefix that matches nothing, which is how padding is shed.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::bits::BitVec;

/// Character to code table, most frequent first.
pub static HUFF_TABLE: &[(&str, &str)] = &[
    (" ", "01"),
    ("E", "100"),
    ("T", "1101"),
    ("A", "0011"),
    ("O", "11111"),
    ("I", "11100"),
    ("N", "10111"),
    ("S", "10100"),
    ("H", "00011"),
    ("R", "00000"),
    ("D", "111011"),
    ("L", "110011"),
    ("C", "110001"),
    ("U", "101101"),
    ("M", "101011"),
    ("W", "001011"),
    ("F", "001001"),
    ("G", "000101"),
    ("Y", "000011"),
    ("P", "1111011"),
    ("B", "1111001"),
    (".", "1110100"),
    ("V", "1100101"),
    ("K", "1100100"),
    ("-", "1100001"),
    ("+", "1100000"),
    ("?", "1011001"),
    ("!", "1011000"),
    ("\"", "1010101"),
    ("X", "1010100"),
    ("0", "0010101"),
    ("J", "0010100"),
    ("1", "0010001"),
    ("Q", "0010000"),
    ("2", "0001001"),
    ("Z", "0001000"),
    ("3", "0000101"),
    ("5", "0000100"),
    ("4", "11110101"),
    ("9", "11110100"),
    ("8", "11110001"),
    ("6", "11110000"),
    ("7", "11101011"),
    ("/", "11101010"),
];

static DECODE_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| HUFF_TABLE.iter().map(|&(c, code)| (code, c)).collect());

static MAX_CODE_LEN: Lazy<usize> =
    Lazy::new(|| HUFF_TABLE.iter().map(|&(_, code)| code.len()).max().unwrap_or(0));

/// Returns the characters the code can carry.
pub fn valid_chars() -> impl Iterator<Item = &'static str> {
    HUFF_TABLE.iter().map(|&(c, _)| c)
}

/// Encodes text, skipping characters outside the table. Each element
/// pairs a code with the number of source characters it consumed.
pub fn encode(text: &str) -> Vec<(usize, BitVec)> {
    let mut out = Vec::new();
    for c in text.chars() {
        let key = c.to_string();
        if let Some(&(_, code)) = HUFF_TABLE.iter().find(|&&(k, _)| k == key) {
            let mut bits = BitVec::new();
            for b in code.chars() {
                bits.push(b == '1');
            }
            out.push((1, bits));
        }
    }
    out
}

/// Decodes a bitstream, stopping at the first unmatched prefix.
pub fn decode(bits: &[bool]) -> String {
    let bitstr: String = bits.iter().map(|&b| if b { '1' } else { '0' }).collect();
    let mut text = String::new();
    let mut pos = 0;
    'outer: while pos < bitstr.len() {
        let end = (pos + *MAX_CODE_LEN).min(bitstr.len());
        for len in 2..=(end - pos) {
            if let Some(&c) = DECODE_MAP.get(&bitstr[pos..pos + len]) {
                text.push_str(c);
                pos += len;
                continue 'outer;
            }
        }
        break;
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(text: &str) -> String {
        let mut bits = Vec::new();
        for (_, code) in encode(text) {
            bits.extend(code.to_bools());
        }
        decode(&bits)
    }

    #[test]
    fn codes_are_prefix_free() {
        for (i, &(_, a)) in HUFF_TABLE.iter().enumerate() {
            for &(_, b) in &HUFF_TABLE[i + 1..] {
                assert!(!a.starts_with(b) && !b.starts_with(a), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn encode_decode_plain_text() {
        assert_eq!(round_trip("HELLO WORLD"), "HELLO WORLD");
        assert_eq!(round_trip("CQ CQ CQ DE KN4CRD"), "CQ CQ CQ DE KN4CRD");
    }

    #[test]
    fn unsupported_chars_are_dropped() {
        assert_eq!(round_trip("H*I"), "HI");
    }

    #[test]
    fn decode_stops_at_unmatched_tail() {
        // "E" = 100, then "11" completes no code.
        let bits = [true, false, false, true, true];
        assert_eq!(decode(&bits), "E");
    }
}
