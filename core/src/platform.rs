//! Capability traits the engine is composed against.
//!
//! Everything device- or OS-specific lives behind these interfaces so the
//! core stays portable: audio devices, transceiver control, wall-clock
//! time, key/value persistence, and UDP reporting are all injected by the
//! host. Adapters implementing them live outside this crate.

use std::time::{SystemTime, UNIX_EPOCH};

/// Sample encoding of an audio buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleType {
    #[default]
    Int16,
    Float32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AudioFormat {
    pub sample_rate: i32,
    pub channels: u16,
    pub sample_type: SampleType,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AudioStreamParams {
    pub format: AudioFormat,
    /// Zero lets the device pick its own buffer length.
    pub frames_per_buffer: usize,
}

/// Interleaved samples captured from an input device.
#[derive(Debug, Clone, Copy)]
pub enum Samples<'a> {
    Int16(&'a [i16]),
    Float32(&'a [f32]),
}

impl Samples<'_> {
    pub fn sample_type(&self) -> SampleType {
        match self {
            Samples::Int16(_) => SampleType::Int16,
            Samples::Float32(_) => SampleType::Float32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Samples::Int16(s) => s.len(),
            Samples::Float32(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One interleaved capture block with its device format.
#[derive(Debug, Clone, Copy)]
pub struct CaptureBlock<'a> {
    pub samples: Samples<'a>,
    pub format: AudioFormat,
}

/// Interleaved output buffer handed to the engine to fill.
#[derive(Debug)]
pub enum PlaybackSamples<'a> {
    Int16(&'a mut [i16]),
    Float32(&'a mut [f32]),
}

#[derive(Debug)]
pub struct PlaybackBlock<'a> {
    pub samples: PlaybackSamples<'a>,
    pub format: AudioFormat,
}

pub type CaptureHandler = Box<dyn FnMut(CaptureBlock<'_>) + Send>;
pub type PlaybackFill = Box<dyn FnMut(&mut PlaybackBlock<'_>) -> usize + Send>;
pub type ErrorHandler = Box<dyn FnMut(&str) + Send>;

pub trait AudioInput: Send {
    fn start(
        &mut self,
        params: &AudioStreamParams,
        on_frames: CaptureHandler,
        on_error: ErrorHandler,
    ) -> bool;
    fn stop(&mut self);
}

pub trait AudioOutput: Send {
    fn start(
        &mut self,
        params: &AudioStreamParams,
        fill: PlaybackFill,
        on_error: ErrorHandler,
    ) -> bool;
    fn stop(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RigMode {
    #[default]
    Unknown,
    Cw,
    CwR,
    Usb,
    Lsb,
    Fsk,
    FskR,
    DigU,
    DigL,
    Am,
    Fm,
    DigFm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Split {
    #[default]
    Unknown,
    Off,
    On,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RigState {
    pub online: bool,
    pub rx_frequency_hz: u64,
    pub tx_frequency_hz: u64,
    pub mode: RigMode,
    pub split: Split,
    pub ptt: bool,
}

pub type RigStateHandler = Box<dyn FnMut(&RigState) + Send>;

pub trait RigControl: Send {
    fn start(&mut self, on_state: RigStateHandler, on_error: ErrorHandler) -> bool;
    fn stop(&mut self);
    /// Non-blocking; results arrive through the state handler.
    fn apply(&mut self, desired: &RigState, sequence_number: u32);
    fn request_status(&mut self, sequence_number: u32);
}

/// Wall-clock access, injected so schedules and transmit timing can be
/// driven by a synthetic clock in tests.
pub trait TimeSource: Send + Sync {
    /// Milliseconds since the Unix epoch, UTC.
    fn now_ms(&self) -> i64;
}

/// System clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

pub trait Storage: Send {
    fn put(&mut self, key: &str, value: &[u8]) -> bool;
    fn get(&self, key: &str) -> Option<Vec<u8>>;
    fn erase(&mut self, key: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Datagram {
    pub destination: Endpoint,
    pub payload: Vec<u8>,
}

pub type DatagramHandler = Box<dyn FnMut(&Endpoint, &[u8]) + Send>;

pub trait UdpChannel: Send {
    fn bind(&mut self, listen_on: &Endpoint) -> bool;
    fn send(&mut self, datagram: &Datagram) -> bool;
    fn set_handlers(&mut self, on_receive: DatagramHandler, on_error: ErrorHandler);
    fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_time_source_advances() {
        let ts = SystemTimeSource;
        let a = ts.now_ms();
        assert!(a > 1_600_000_000_000); // after September 2020
        assert!(ts.now_ms() >= a);
    }

    #[test]
    fn samples_report_type_and_length() {
        let data = [0i16; 4];
        let s = Samples::Int16(&data);
        assert_eq!(s.sample_type(), SampleType::Int16);
        assert_eq!(s.len(), 4);
        assert!(!s.is_empty());
    }
}
