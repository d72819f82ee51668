//! Fixed-capacity bit buffer used by the frame codec and text coders.
//!
//! Wire frames are exactly 72 bits and every intermediate bit stream in
//! this crate fits in 128, so the buffer is a single `u128` plus a length
//! instead of a heap-allocated boolean vector.

/// Append-only bit sequence, first-pushed bit is the most significant.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct BitVec {
    bits: u128,
    len: u32,
}

pub const BITVEC_CAPACITY: u32 = 128;

impl BitVec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a buffer holding the low `width` bits of `value`, MSB first.
    pub fn from_uint(value: u64, width: u32) -> Self {
        let mut v = Self::new();
        v.push_uint(value, width);
        v
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remaining capacity in bits.
    pub fn capacity_left(&self) -> usize {
        (BITVEC_CAPACITY - self.len) as usize
    }

    pub fn push(&mut self, bit: bool) {
        debug_assert!(self.len < BITVEC_CAPACITY);
        self.bits = (self.bits << 1) | u128::from(bit);
        self.len += 1;
    }

    /// Appends the low `width` bits of `value`, MSB first.
    pub fn push_uint(&mut self, value: u64, width: u32) {
        debug_assert!(self.len + width <= BITVEC_CAPACITY);
        if width == 0 {
            return;
        }
        let masked = if width >= 64 {
            u128::from(value)
        } else {
            u128::from(value & ((1u64 << width) - 1))
        };
        self.bits = (self.bits << width) | masked;
        self.len += width;
    }

    pub fn extend(&mut self, other: &BitVec) {
        debug_assert!(self.len + other.len <= BITVEC_CAPACITY);
        self.bits = (self.bits << other.len) | other.bits;
        self.len += other.len;
    }

    pub fn get(&self, index: usize) -> bool {
        debug_assert!(index < self.len());
        (self.bits >> (self.len as usize - 1 - index)) & 1 == 1
    }

    /// Reads `width` bits starting at `offset` as an integer.
    pub fn uint_at(&self, offset: usize, width: u32) -> u64 {
        debug_assert!(offset + width as usize <= self.len());
        let shift = self.len() - offset - width as usize;
        let mask = if width >= 64 {
            u64::MAX
        } else {
            (1u64 << width) - 1
        };
        ((self.bits >> shift) as u64) & mask
    }

    /// The whole buffer as an integer; at most 64 bits long.
    pub fn to_uint(&self) -> u64 {
        debug_assert!(self.len <= 64);
        self.bits as u64
    }

    /// Copies bits `start..end` into a new buffer.
    pub fn slice(&self, start: usize, end: usize) -> BitVec {
        debug_assert!(start <= end && end <= self.len());
        let mut out = BitVec::new();
        for i in start..end {
            out.push(self.get(i));
        }
        out
    }

    /// Drops `n` bits from the front.
    pub fn drop_front(&mut self, n: usize) {
        debug_assert!(n <= self.len());
        self.len -= n as u32;
        if self.len == 0 {
            self.bits = 0;
        } else {
            self.bits &= (1u128 << self.len) - 1;
        }
    }

    /// Truncates to the first `n` bits.
    pub fn truncate(&mut self, n: usize) {
        if n >= self.len() {
            return;
        }
        self.bits >>= self.len() - n;
        self.len = n as u32;
    }

    /// Index of the last zero bit, if any.
    pub fn last_zero(&self) -> Option<usize> {
        (0..self.len()).rev().find(|&i| !self.get(i))
    }

    /// Expands the buffer into individual bits.
    pub fn to_bools(&self) -> Vec<bool> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }
}

impl std::fmt::Debug for BitVec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for i in 0..self.len() {
            f.write_str(if self.get(i) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl std::str::FromStr for BitVec {
    type Err = ();

    /// Parses a "0101…" string; anything but '1' counts as zero.
    fn from_str(s: &str) -> Result<Self, ()> {
        let mut v = BitVec::new();
        for c in s.chars() {
            v.push(c == '1');
        }
        Ok(v)
    }
}

/// Forward cursor over a [`BitVec`].
pub struct BitReader<'a> {
    bits: &'a BitVec,
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bits: &'a BitVec) -> Self {
        Self { bits, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bits.len() - self.pos
    }

    pub fn read_bit(&mut self) -> Option<bool> {
        if self.pos >= self.bits.len() {
            return None;
        }
        let b = self.bits.get(self.pos);
        self.pos += 1;
        Some(b)
    }

    pub fn read_uint(&mut self, width: u32) -> Option<u64> {
        if self.remaining() < width as usize {
            return None;
        }
        let v = self.bits.uint_at(self.pos, width);
        self.pos += width as usize;
        Some(v)
    }

    pub fn position(&self) -> usize {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_read_back() {
        let mut v = BitVec::new();
        v.push(true);
        v.push(false);
        v.push(true);
        assert_eq!(v.len(), 3);
        assert!(v.get(0));
        assert!(!v.get(1));
        assert!(v.get(2));
        assert_eq!(v.to_uint(), 0b101);
    }

    #[test]
    fn uint_round_trip_with_leading_zeros() {
        let v = BitVec::from_uint(0x2A, 8);
        assert_eq!(v.len(), 8);
        assert_eq!(v.to_uint(), 0x2A);
        assert!(!v.get(0)); // leading zero preserved
    }

    #[test]
    fn uint_at_reads_interior_fields() {
        // [3 bits: 5][4 bits: 9][2 bits: 2]
        let mut v = BitVec::new();
        v.push_uint(5, 3);
        v.push_uint(9, 4);
        v.push_uint(2, 2);
        assert_eq!(v.uint_at(0, 3), 5);
        assert_eq!(v.uint_at(3, 4), 9);
        assert_eq!(v.uint_at(7, 2), 2);
    }

    #[test]
    fn extend_concatenates() {
        let mut a = BitVec::from_uint(0b110, 3);
        let b = BitVec::from_uint(0b01, 2);
        a.extend(&b);
        assert_eq!(a.len(), 5);
        assert_eq!(a.to_uint(), 0b11001);
    }

    #[test]
    fn last_zero_scans_backward() {
        let v: BitVec = "110111".parse().unwrap();
        assert_eq!(v.last_zero(), Some(2));
        let all_ones: BitVec = "1111".parse().unwrap();
        assert_eq!(all_ones.last_zero(), None);
    }

    #[test]
    fn truncate_and_drop_front() {
        let mut v: BitVec = "10110011".parse().unwrap();
        v.truncate(5);
        assert_eq!(format!("{v:?}"), "10110");
        v.drop_front(2);
        assert_eq!(format!("{v:?}"), "110");
    }

    #[test]
    fn reader_walks_fields() {
        let mut v = BitVec::new();
        v.push_uint(3, 3);
        v.push_uint(200, 28);
        let mut r = BitReader::new(&v);
        assert_eq!(r.read_uint(3), Some(3));
        assert_eq!(r.read_uint(28), Some(200));
        assert_eq!(r.read_uint(1), None);
    }

    #[test]
    fn full_72_bit_frame_fits() {
        let mut v = BitVec::new();
        for i in 0..72 {
            v.push(i % 2 == 0);
        }
        assert_eq!(v.len(), 72);
        assert_eq!(v.uint_at(0, 64), v.slice(0, 64).to_uint());
    }
}
