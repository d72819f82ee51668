//! Varicoded dictionary coder for data payloads.
//!
//! Words map to indices in a rank-ordered dictionary. An index becomes a
//! variable-length string of 4-bit groups: groups at or above `S` continue
//! the index, a group below `S` terminates it and carries one extra
//! separator bit that re-inserts the space the word splitter removed.

use crate::bits::BitVec;
use crate::jsc_words::WORDS;

const B: u32 = 4;
const S: u32 = 7;
const C: u32 = (1 << B) - S;

/// Longest dictionary entry that prefixes `w`.
fn lookup(w: &str) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, entry) in WORDS.iter().enumerate() {
        if w.starts_with(entry) {
            match best {
                Some(b) if WORDS[b].len() >= entry.len() => {}
                _ => best = Some(i),
            }
        }
    }
    best
}

/// Emits the codeword for a dictionary index, with the separator bit set
/// when the word ends with an implied space.
fn codeword(index: u32, separate: bool) -> BitVec {
    let mut groups = Vec::new();
    let mut x = index / S;
    while x > 0 {
        x -= 1;
        groups.push((x % C) + S);
        x /= C;
    }
    groups.reverse();

    let mut out = BitVec::new();
    for g in groups {
        out.push_uint(u64::from(g), B);
    }
    let terminal = ((index % S) << 1) + u32::from(separate);
    out.push_uint(u64::from(terminal), B + 1);
    out
}

/// Compresses text into codewords. Each pair carries the emitted bits and
/// the number of source characters they consumed, so a caller filling a
/// fixed-size frame can tell how much of the text it packed.
pub fn compress(text: &str) -> Vec<(BitVec, usize)> {
    let words: Vec<&str> = text.split(' ').collect();
    let mut out = Vec::new();

    for (i, &word) in words.iter().enumerate() {
        let is_last_word = i == words.len() - 1;
        let mut is_space_character = false;
        let mut w = word;
        if w.is_empty() && !is_last_word {
            w = " ";
            is_space_character = true;
        }

        while !w.is_empty() {
            let Some(index) = lookup(w) else {
                break;
            };
            w = &w[WORDS[index].len()..];
            let is_last = w.is_empty();
            let should_append_space = is_last && !is_space_character && !is_last_word;
            out.push((
                codeword(index as u32, should_append_space),
                WORDS[index].len() + usize::from(should_append_space),
            ));
        }
    }
    out
}

/// Decompresses a bitstream, ignoring trailing bits that do not complete
/// a codeword. Used directly on unpacked frame payloads, where the tail
/// is padding.
pub fn decompress(bits: &[bool]) -> String {
    let size = WORDS.len() as u32;

    let mut base = [0u32; 8];
    base[1] = S;
    for k in 2..8 {
        base[k] = base[k - 1] + S * C.pow(k as u32 - 1);
    }

    let mut bytes: Vec<u32> = Vec::new();
    let mut separators: Vec<usize> = Vec::new();

    let mut i = 0;
    while i + 4 <= bits.len() {
        let mut byte = 0u32;
        for &b in &bits[i..i + 4] {
            byte = (byte << 1) | u32::from(b);
        }
        bytes.push(byte);
        i += 4;
        if byte < S {
            if i < bits.len() && bits[i] {
                separators.push(bytes.len() - 1);
            }
            i += 1;
        }
    }

    let mut out = String::new();
    let mut sep_iter = separators.into_iter().peekable();
    let mut start = 0;
    while start < bytes.len() {
        let mut k = 0;
        let mut j = 0u32;
        while start + k < bytes.len() && bytes[start + k] >= S {
            j = j * C + (bytes[start + k] - S);
            k += 1;
        }
        if j >= size || start + k >= bytes.len() {
            break;
        }
        j = j * S + bytes[start + k] + base[k];
        if j >= size {
            break;
        }

        out.push_str(WORDS[j as usize]);
        if sep_iter.peek() == Some(&(start + k)) {
            out.push(' ');
            sep_iter.next();
        }
        start += k + 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(text: &str) -> String {
        let mut bits = Vec::new();
        for (code, _) in compress(text) {
            bits.extend(code.to_bools());
        }
        decompress(&bits)
    }

    #[test]
    fn single_word() {
        assert_eq!(round_trip("HELLO"), "HELLO");
    }

    #[test]
    fn words_with_spaces() {
        assert_eq!(round_trip("HELLO WORLD"), "HELLO WORLD");
        assert_eq!(round_trip("THE QUICK BROWN FOX"), "THE QUICK BROWN FOX");
    }

    #[test]
    fn double_space_survives() {
        assert_eq!(round_trip("A  B"), "A  B");
    }

    #[test]
    fn punctuation_and_case() {
        assert_eq!(round_trip("Hi! How are you?"), "Hi! How are you?");
    }

    #[test]
    fn char_accounting_sums_to_input() {
        let text = "TNX FER QSO 73";
        let total: usize = compress(text).iter().map(|(_, n)| n).sum();
        assert_eq!(total, text.len());
    }

    #[test]
    fn empty_input() {
        assert!(compress("").is_empty());
        assert_eq!(decompress(&[]), "");
    }

    #[test]
    fn low_rank_words_get_short_codewords() {
        let (code, _) = &compress("E")[0];
        assert_eq!(code.len(), 5);
        let (code, _) = &compress("~")[0];
        assert!(code.len() > 5);
    }
}
