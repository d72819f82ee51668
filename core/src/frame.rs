//! 72-bit frame layouts.
//!
//! Every transmission is a sequence of 72-bit frames rendered as twelve
//! symbols of the 72-character alphabet. The top three bits select the
//! frame kind; the remaining layout depends on it:
//!
//! * heartbeat / compound: `[3][50 callsign][11+5 extra][3 bits3]`
//! * directed:             `[3][28 from][28 to][5 cmd]` + 8-bit extra
//! * data / fast data:     flag bits plus coded text, padded

use crate::alphabet::{pack72bits, pack_alphanumeric50, unpack72bits, unpack_alphanumeric50};
use crate::bits::BitVec;
use crate::{huffman, jsc, FRAME_BITS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameType {
    Heartbeat = 0,
    Compound = 1,
    CompoundDirected = 2,
    Directed = 3,
    Data = 4,
    FastData = 6,
}

impl FrameType {
    pub fn from_bits(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Heartbeat),
            1 => Some(Self::Compound),
            2 => Some(Self::CompoundDirected),
            3 => Some(Self::Directed),
            4 => Some(Self::Data),
            6 => Some(Self::FastData),
            _ => None,
        }
    }
}

/// Decoded compound-family frame: heartbeat, compound, or
/// compound-directed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundFrame {
    pub callsign: String,
    pub frame_type: FrameType,
    /// 16-bit extra field: grid band, command band, or sentinel.
    pub num: u16,
    /// Low three bits of the trailing byte, used for frame sequencing.
    pub bits3: u8,
}

/// Decoded directed frame, still in packed callsign form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectedFrame {
    pub from: u32,
    pub to: u32,
    pub cmd: u8,
    pub num: u8,
    pub portable_from: bool,
    pub portable_to: bool,
}

fn frame_shaped(text: &str) -> bool {
    text.len() >= 12 && !text.contains(' ')
}

/// Packs a compound-family frame. Directed and data types do not use
/// this layout and are rejected.
pub fn pack_compound_frame(
    callsign: &str,
    frame_type: FrameType,
    num: u16,
    bits3: u8,
) -> Option<String> {
    if matches!(frame_type, FrameType::Directed | FrameType::Data | FrameType::FastData) {
        return None;
    }
    let packed_callsign = pack_alphanumeric50(callsign);
    if packed_callsign == 0 {
        return None;
    }

    let packed_11 = (num >> 5) & 0x7FF;
    let packed_5 = (num & 0x1F) as u8;
    let packed_8 = (packed_5 << 3) | (bits3 & 0x7);

    let mut bits = BitVec::new();
    bits.push_uint(u64::from(frame_type as u8), 3);
    bits.push_uint(packed_callsign, 50);
    bits.push_uint(u64::from(packed_11), 11);

    Some(pack72bits(bits.to_uint(), packed_8))
}

pub fn unpack_compound_frame(text: &str) -> Option<CompoundFrame> {
    if !frame_shaped(text) {
        return None;
    }
    let (value, packed_8) = unpack72bits(text)?;
    let bits = BitVec::from_uint(value, 64);

    let frame_type = FrameType::from_bits(bits.uint_at(0, 3) as u8)?;
    if matches!(frame_type, FrameType::Directed | FrameType::Data | FrameType::FastData) {
        return None;
    }

    let packed_callsign = bits.uint_at(3, 50);
    let packed_11 = bits.uint_at(53, 11) as u16;
    let packed_5 = u16::from(packed_8 >> 3);

    Some(CompoundFrame {
        callsign: unpack_alphanumeric50(packed_callsign),
        frame_type,
        num: (packed_11 << 5) | packed_5,
        bits3: packed_8 & 0x7,
    })
}

/// Packs a directed frame from already-packed callsigns. The 8-bit extra
/// carries portable flags in the top two bits and the numeric argument
/// below.
pub fn pack_directed_frame(frame: DirectedFrame) -> String {
    let extra = (u8::from(frame.portable_from) << 7)
        | (u8::from(frame.portable_to) << 6)
        | (frame.num & 0x3F);

    let mut bits = BitVec::new();
    bits.push_uint(u64::from(FrameType::Directed as u8), 3);
    bits.push_uint(u64::from(frame.from), 28);
    bits.push_uint(u64::from(frame.to), 28);
    bits.push_uint(u64::from(frame.cmd % 32), 5);

    pack72bits(bits.to_uint(), extra)
}

pub fn unpack_directed_frame(text: &str) -> Option<DirectedFrame> {
    if !frame_shaped(text) {
        return None;
    }
    let (value, extra) = unpack72bits(text)?;
    let bits = BitVec::from_uint(value, 64);

    if bits.uint_at(0, 3) as u8 != FrameType::Directed as u8 {
        return None;
    }

    Some(DirectedFrame {
        from: bits.uint_at(3, 28) as u32,
        to: bits.uint_at(31, 28) as u32,
        cmd: bits.uint_at(59, 5) as u8,
        num: extra & 0x3F,
        portable_from: (extra >> 7) & 1 == 1,
        portable_to: (extra >> 6) & 1 == 1,
    })
}

fn finish_data_frame(mut bits: BitVec) -> String {
    // Pad sentinel: first pad bit clear, the rest set. Stripping scans
    // backward for the last zero.
    let pad = FRAME_BITS - bits.len();
    for i in 0..pad {
        bits.push(i != 0);
    }
    pack72bits(bits.uint_at(0, 64), bits.uint_at(64, 8) as u8)
}

/// Packs as much of `text` as fits one standard data frame. Returns the
/// frame and the number of source characters consumed.
pub fn pack_data_frame(text: &str) -> (String, usize) {
    let mut bits = BitVec::new();
    bits.push(true); // data flag
    bits.push(true); // dictionary-coded

    let mut chars_used = 0;
    for (code, chars) in jsc::compress(text) {
        if bits.len() + code.len() >= FRAME_BITS {
            break;
        }
        bits.extend(&code);
        chars_used += chars;
    }
    (finish_data_frame(bits), chars_used)
}

pub fn unpack_data_frame(text: &str) -> Option<String> {
    if !frame_shaped(text) {
        return None;
    }
    let (value, rem) = unpack72bits(text)?;
    let mut bits = BitVec::from_uint(value, 64);
    bits.push_uint(u64::from(rem), 8);

    if !bits.get(0) {
        return None;
    }
    let compressed = bits.get(1);
    bits.drop_front(2);

    if let Some(last_zero) = bits.last_zero() {
        bits.truncate(last_zero);
    }
    if bits.is_empty() {
        return None;
    }

    Some(if compressed {
        jsc::decompress(&bits.to_bools())
    } else {
        huffman::decode(&bits.to_bools())
    })
}

/// Fast data frames spend no bits on flags; all 72 carry coded text.
pub fn pack_fast_data_frame(text: &str) -> (String, usize) {
    let mut bits = BitVec::new();
    let mut chars_used = 0;
    for (code, chars) in jsc::compress(text) {
        if bits.len() + code.len() >= FRAME_BITS {
            break;
        }
        bits.extend(&code);
        chars_used += chars;
    }
    (finish_data_frame(bits), chars_used)
}

pub fn unpack_fast_data_frame(text: &str) -> Option<String> {
    if !frame_shaped(text) {
        return None;
    }
    let (value, rem) = unpack72bits(text)?;
    let mut bits = BitVec::from_uint(value, 64);
    bits.push_uint(u64::from(rem), 8);

    if let Some(last_zero) = bits.last_zero() {
        bits.truncate(last_zero);
    }
    Some(jsc::decompress(&bits.to_bools()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callsign::{pack_callsign, NMAXGRID};

    #[test]
    fn compound_frame_round_trip() {
        let frame =
            pack_compound_frame("KN4CRD/P", FrameType::Compound, NMAXGRID, 5).unwrap();
        assert_eq!(frame.len(), 12);

        let unpacked = unpack_compound_frame(&frame).unwrap();
        assert_eq!(unpacked.callsign, "KN4CRD/P");
        assert_eq!(unpacked.frame_type, FrameType::Compound);
        assert_eq!(unpacked.num, NMAXGRID);
        assert_eq!(unpacked.bits3, 5);
    }

    #[test]
    fn compound_frame_rejects_directed_type() {
        assert!(pack_compound_frame("KN4CRD", FrameType::Directed, 0, 0).is_none());
    }

    #[test]
    fn directed_frame_round_trip() {
        let (from, portable_from) = pack_callsign("KN4CRD").unwrap();
        let (to, portable_to) = pack_callsign("VE7ABC/P").unwrap();
        let sent = DirectedFrame {
            from,
            to,
            cmd: 25,
            num: 36,
            portable_from,
            portable_to,
        };
        let frame = pack_directed_frame(sent);
        assert_eq!(unpack_directed_frame(&frame), Some(sent));
    }

    #[test]
    fn directed_frame_rejects_other_types() {
        let frame = pack_compound_frame("KN4CRD", FrameType::Heartbeat, 0, 0).unwrap();
        assert!(unpack_directed_frame(&frame).is_none());
        assert!(unpack_compound_frame(&frame).is_some());
    }

    #[test]
    fn data_frame_round_trip() {
        let (frame, used) = pack_data_frame("HELLO WORLD");
        assert_eq!(frame.len(), 12);
        assert!(used > 0);
        let text = unpack_data_frame(&frame).unwrap();
        assert_eq!(text, "HELLO WORLD"[..used].to_string());
    }

    #[test]
    fn fast_data_frame_exact_round_trip() {
        let (frame, used) = pack_fast_data_frame("TEST");
        assert_eq!(used, 4);
        assert_eq!(unpack_fast_data_frame(&frame).as_deref(), Some("TEST"));
    }

    #[test]
    fn data_frame_flag_required() {
        let empty = pack72bits(0, 0);
        assert!(unpack_data_frame(&empty).is_none());
    }
}
