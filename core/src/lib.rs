//! Protocol and real-time orchestration core for a weak-signal digital
//! text mode carried over audio tones.
//!
//! Short messages become fixed 72-bit wire frames (Huffman or dictionary
//! coded text, packed callsigns and grid locators); captured audio is
//! staged in a UTC-aligned circular buffer and handed to an external
//! demodulator one decode window at a time; transmit requests become
//! phase-continuous 8-tone audio synchronized to the period boundary.

pub mod alphabet;
pub mod bits;
pub mod callsign;
pub mod checksum;
pub mod commands;
pub mod costas;
pub mod decode_worker;
pub mod engine;
pub mod error;
pub mod event;
pub mod frame;
pub mod huffman;
pub mod jsc;
mod jsc_words;
pub mod message;
pub mod modulator;
pub mod platform;
pub mod resampler;
pub mod scheduler;
pub mod spectrum;
pub mod submode;

pub use engine::{Engine, EngineConfig, EngineCallbacks, EngineDeps};
pub use error::{CoreError, Result};
pub use event::Event;

/// Native protocol sample rate in Hz; all frame timing is defined here.
pub const RX_SAMPLE_RATE: usize = 12000;

/// Symbols per transmission: three 7-symbol sync blocks plus 58 data symbols.
pub const NUM_SYMBOLS: usize = 79;

/// Capture ring span in seconds (one UTC minute).
pub const RING_SECONDS: usize = 60;

/// Capture ring capacity in samples.
pub const RING_SAMPLES: usize = RING_SECONDS * RX_SAMPLE_RATE;

/// Fixed bin count of the display spectrum.
pub const SPECTRUM_BINS: usize = 6827;

/// Wire frame length in symbols over the 72-character alphabet.
pub const FRAME_SYMBOLS: usize = 12;

/// Wire frame length in bits.
pub const FRAME_BITS: usize = 72;

/// Default output device rate for the transmit path.
pub const TX_OUTPUT_RATE: usize = 48000;
