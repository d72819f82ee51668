//! Submode registry.
//!
//! Each submode trades speed against sensitivity by scaling the symbol
//! length. Periods are UTC-aligned: every submode starts its cycle on a
//! multiple of its period within the minute.

use crate::error::{CoreError, Result};
use crate::RX_SAMPLE_RATE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmodeId {
    A,
    B,
    C,
    E,
    I,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submode {
    pub id: SubmodeId,
    pub name: &'static str,
    /// Samples per symbol at the 12 kHz processing rate.
    pub symbol_samples: u32,
    /// Cycle period in seconds.
    pub tx_seconds: u32,
    /// Offset of the transmit window into the cycle.
    pub start_delay_ms: u32,
    pub enabled: bool,
}

pub static SUBMODES: &[Submode] = &[
    Submode { id: SubmodeId::A, name: "A", symbol_samples: 1920, tx_seconds: 15, start_delay_ms: 500, enabled: true },
    Submode { id: SubmodeId::B, name: "B", symbol_samples: 1200, tx_seconds: 10, start_delay_ms: 200, enabled: true },
    Submode { id: SubmodeId::C, name: "C", symbol_samples: 600, tx_seconds: 6, start_delay_ms: 100, enabled: true },
    Submode { id: SubmodeId::E, name: "E", symbol_samples: 3840, tx_seconds: 30, start_delay_ms: 500, enabled: true },
    // Disabled by default.
    Submode { id: SubmodeId::I, name: "I", symbol_samples: 384, tx_seconds: 4, start_delay_ms: 100, enabled: false },
];

impl Submode {
    pub fn period_ms(&self) -> u32 {
        self.tx_seconds * 1000
    }

    /// Frequency step between adjacent tones.
    pub fn tone_spacing_hz(&self) -> f64 {
        RX_SAMPLE_RATE as f64 / f64::from(self.symbol_samples)
    }
}

impl SubmodeId {
    pub const COUNT: usize = 5;

    /// Bit position used by the decode-enable mask.
    pub fn mask_bit(self) -> u32 {
        1 << (self as u32)
    }
}

pub fn by_id(id: SubmodeId) -> Submode {
    // The registry covers every id.
    SUBMODES
        .iter()
        .copied()
        .find(|m| m.id == id)
        .unwrap_or(SUBMODES[0])
}

pub fn by_name(name: &str) -> Option<Submode> {
    SUBMODES.iter().copied().find(|m| m.name == name)
}

/// Maps the wire-format speed selector to a submode.
pub fn from_wire(value: u32) -> Result<Submode> {
    let id = match value {
        0 => SubmodeId::A, // normal
        1 => SubmodeId::B, // fast
        2 => SubmodeId::C, // turbo
        4 => SubmodeId::E, // slow
        8 => SubmodeId::I, // ultra
        _ => return Err(CoreError::UnknownSubmode(value)),
    };
    Ok(by_id(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_selector_mapping() {
        assert_eq!(from_wire(0).unwrap().id, SubmodeId::A);
        assert_eq!(from_wire(1).unwrap().id, SubmodeId::B);
        assert_eq!(from_wire(2).unwrap().id, SubmodeId::C);
        assert_eq!(from_wire(4).unwrap().id, SubmodeId::E);
        assert_eq!(from_wire(8).unwrap().id, SubmodeId::I);
        assert!(from_wire(3).is_err());
    }

    #[test]
    fn tone_spacing_follows_symbol_length() {
        assert_eq!(by_id(SubmodeId::A).tone_spacing_hz(), 6.25);
        assert_eq!(by_id(SubmodeId::C).tone_spacing_hz(), 20.0);
    }

    #[test]
    fn periods_divide_the_minute() {
        for m in SUBMODES {
            assert_eq!(60 % m.tx_seconds, 0, "{}", m.name);
        }
    }

    #[test]
    fn mask_bits_are_distinct() {
        let mut mask = 0u32;
        for m in SUBMODES {
            assert_eq!(mask & m.id.mask_bit(), 0);
            mask |= m.id.mask_bit();
        }
    }
}
