//! Costas synchronization arrays.
//!
//! Three 7-symbol sync rows sit at the start, middle, and end of the
//! 79-symbol transmission. The normal-speed mode keeps the classic
//! repeated array; the faster modes use three distinct rows.

use crate::{alphabet, checksum, NUM_SYMBOLS};

/// One sync row per third of the transmission.
pub type CostasArray = [[u8; 7]; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostasType {
    Original,
    Modified,
}

static ORIGINAL: CostasArray = [
    [4, 2, 5, 6, 1, 3, 0],
    [4, 2, 5, 6, 1, 3, 0],
    [4, 2, 5, 6, 1, 3, 0],
];

static MODIFIED: CostasArray = [
    [0, 6, 2, 3, 5, 4, 1],
    [1, 5, 0, 2, 3, 6, 4],
    [2, 5, 0, 6, 4, 1, 3],
];

pub fn costas(kind: CostasType) -> &'static CostasArray {
    match kind {
        CostasType::Original => &ORIGINAL,
        CostasType::Modified => &MODIFIED,
    }
}

/// Normal speed keeps the original array; every other selector uses the
/// modified rows.
pub fn for_wire_submode(submode: u32) -> CostasType {
    if submode == 0 {
        CostasType::Original
    } else {
        CostasType::Modified
    }
}

/// Gray map applied to each 3-bit data value before transmission.
const GRAY: [u8; 8] = [0, 1, 3, 2, 5, 6, 4, 7];

const PAYLOAD_BITS: u32 = 87;
const DATA_SYMBOLS: usize = 58;

/// Turns one packed wire frame into the 79-tone transmit sequence.
///
/// The engine takes this as an injected seam so an external channel coder
/// can replace the built-in sequencing without touching the transmit path.
pub trait ToneEncoder: Send {
    /// `frame` is the 12-symbol wire frame; `flags` carries the low 3
    /// transmit flag bits. Returns `None` when the frame is malformed.
    fn encode(&self, frame: &str, flags: u8, kind: CostasType) -> Option<[u8; NUM_SYMBOLS]>;
}

/// Built-in sequencer: 72 frame bits and 3 flag bits are protected by a
/// 12-bit CRC, the 87-bit payload is repeated across 174 channel bits,
/// and each 3-bit group becomes one Gray-coded tone. Sync rows occupy
/// symbols 0-6, 36-42, and 72-78.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToneSequencer;

impl ToneEncoder for ToneSequencer {
    fn encode(&self, frame: &str, flags: u8, kind: CostasType) -> Option<[u8; NUM_SYMBOLS]> {
        let (value, rem) = alphabet::unpack72bits(frame)?;

        let message: u128 = (u128::from(value) << 11) | (u128::from(rem) << 3) | u128::from(flags & 7);
        let crc = checksum::crc12(message, PAYLOAD_BITS - 12);
        let payload: u128 = (message << 12) | u128::from(crc);

        let mut symbols = [0u8; DATA_SYMBOLS];
        for (s, sym) in symbols.iter_mut().enumerate() {
            let mut val = 0u8;
            for b in 0..3 {
                let channel_pos = (s * 3 + b) % PAYLOAD_BITS as usize;
                let bit = (payload >> (PAYLOAD_BITS as usize - 1 - channel_pos)) & 1;
                val = (val << 1) | bit as u8;
            }
            *sym = GRAY[val as usize];
        }

        let rows = costas(kind);
        let mut tones = [0u8; NUM_SYMBOLS];
        tones[0..7].copy_from_slice(&rows[0]);
        tones[36..43].copy_from_slice(&rows[1]);
        tones[72..79].copy_from_slice(&rows[2]);
        tones[7..36].copy_from_slice(&symbols[0..29]);
        tones[43..72].copy_from_slice(&symbols[29..58]);
        Some(tones)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_tone_permutations() {
        for array in [&ORIGINAL, &MODIFIED] {
            for row in array.iter() {
                let mut seen = [false; 7];
                for &tone in row {
                    assert!(tone < 7);
                    assert!(!seen[tone as usize]);
                    seen[tone as usize] = true;
                }
            }
        }
    }

    #[test]
    fn selector_mapping() {
        assert_eq!(for_wire_submode(0), CostasType::Original);
        assert_eq!(for_wire_submode(1), CostasType::Modified);
        assert_eq!(for_wire_submode(8), CostasType::Modified);
    }

    #[test]
    fn sequencer_places_sync_rows() {
        let frame = alphabet::pack72bits(0x0123_4567_89AB_CDEF, 0x5A);
        let tones = ToneSequencer.encode(&frame, 1, CostasType::Original).unwrap();
        assert_eq!(&tones[0..7], &ORIGINAL[0]);
        assert_eq!(&tones[36..43], &ORIGINAL[1]);
        assert_eq!(&tones[72..79], &ORIGINAL[2]);
        assert!(tones.iter().all(|&t| t < 8));
    }

    #[test]
    fn sequencer_rejects_short_frame() {
        assert!(ToneSequencer.encode("ABC", 0, CostasType::Original).is_none());
    }

    #[test]
    fn flag_bits_change_data_symbols() {
        let frame = alphabet::pack72bits(42, 0);
        let a = ToneSequencer.encode(&frame, 1, CostasType::Modified).unwrap();
        let b = ToneSequencer.encode(&frame, 3, CostasType::Modified).unwrap();
        assert_ne!(a[7..36], b[7..36]);
        assert_eq!(a[0..7], b[0..7]);
    }
}
