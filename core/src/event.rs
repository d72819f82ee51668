//! Events emitted by the engine toward the host application.

pub use crate::spectrum::Spectrum;

/// Sync search progress reported by the demodulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncState {
    /// A sync candidate at `frequency` Hz with its correlation score.
    Candidate {
        mode: i32,
        frequency: f32,
        dt: f32,
        sync: i32,
    },
    /// A candidate that went on to decode, with its soft sync quality.
    Decoded {
        mode: i32,
        frequency: f32,
        dt: f32,
        sync: f32,
    },
}

/// One successfully decoded transmission.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Decoded {
    /// UTC as HHMMSS.
    pub utc: i32,
    pub snr: i32,
    /// Time offset from the period boundary in seconds.
    pub xdt: f32,
    pub frequency: f32,
    /// Raw decoded text, still frame-encoded.
    pub data: String,
    pub frame_type: i32,
    pub quality: f32,
    pub mode: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A decode pass began over the submodes in this mask.
    DecodeStarted { submodes: u32 },
    /// The demodulator started scanning a window of the capture ring.
    SyncStart { position: i32, size: i32 },
    Sync(SyncState),
    Decoded(Decoded),
    /// A decode pass finished; `decoded` transmissions were produced.
    DecodeFinished { decoded: usize },
    Spectrum(Spectrum),
}
