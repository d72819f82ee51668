//! Phase-continuous FSK tone synthesis for the transmit path.
//!
//! The modulator renders one 79-symbol transmission at the 12 kHz base
//! rate. Starting is two-phase: the caller passes the current wall-clock
//! milliseconds and the modulator counts down silence until the next
//! period boundary (plus the submode start delay and operator TX delay),
//! then runs the tone sequence with a single continuous phase
//! accumulator. The phase step changes only on symbol boundaries, so the
//! waveform has no discontinuities between tones.

use std::f64::consts::TAU;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::{NUM_SYMBOLS, RX_SAMPLE_RATE};

/// Fraction of the final symbol over which the amplitude ramps down.
const RAMP_START_SYMBOLS: f64 = NUM_SYMBOLS as f64 - 0.017;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum State {
    Idle = 0,
    Synchronizing = 1,
    Active = 2,
}

/// State lives in an atomic so `is_idle` can be polled from the render
/// callback without taking the transmit lock.
#[derive(Debug)]
pub struct Modulator {
    tones: [u8; NUM_SYMBOLS],
    state: AtomicU8,
    tuning: bool,
    symbol_samples: i64,
    tone_spacing: f64,
    audio_frequency: f64,
    audio_frequency0: f64,
    phi: f64,
    dphi: f64,
    amp: f64,
    silent_frames: i64,
    ic: u64,
    isym0: u64,
}

impl Default for Modulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Modulator {
    pub fn new() -> Self {
        Self {
            tones: [0; NUM_SYMBOLS],
            state: AtomicU8::new(State::Idle as u8),
            tuning: false,
            symbol_samples: 0,
            tone_spacing: 0.0,
            audio_frequency: 0.0,
            audio_frequency0: 0.0,
            phi: 0.0,
            dphi: 0.0,
            amp: 1.0,
            silent_frames: 0,
            ic: 0,
            isym0: u64::MAX,
        }
    }

    pub fn state(&self) -> State {
        match self.state.load(Ordering::Acquire) {
            1 => State::Synchronizing,
            2 => State::Active,
            _ => State::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state() == State::Idle
    }

    pub fn is_active(&self) -> bool {
        self.state() == State::Active
    }

    fn set_state(&self, state: State) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Arms a transmission. `now_ms` is wall-clock milliseconds since the
    /// epoch; the silent lead-in is computed from its phase within
    /// `period_ms`. In tuning mode the tone sequence is ignored beyond
    /// the first entry and synthesis starts immediately and runs until
    /// stopped.
    #[allow(clippy::too_many_arguments)]
    pub fn start(
        &mut self,
        tones: [u8; NUM_SYMBOLS],
        symbol_samples: i32,
        start_delay_ms: i32,
        period_ms: i32,
        audio_frequency_hz: f64,
        tx_delay_s: f64,
        tuning: bool,
        now_ms: i64,
    ) {
        if symbol_samples <= 0 || period_ms <= 0 {
            self.stop();
            return;
        }

        self.tones = tones;
        self.tuning = tuning;
        self.symbol_samples = i64::from(symbol_samples);
        self.tone_spacing = RX_SAMPLE_RATE as f64 / f64::from(symbol_samples);
        self.audio_frequency = audio_frequency_hz;
        self.audio_frequency0 = 0.0;
        self.phi = 0.0;
        self.dphi = 0.0;
        self.amp = 1.0;
        self.silent_frames = 0;
        self.ic = 0;
        self.isym0 = u64::MAX;

        if !tuning {
            let period_ms = i64::from(period_ms);
            let period_offset = now_ms.rem_euclid(period_ms);
            let mut start_time_ms = i64::from(start_delay_ms) + (tx_delay_s * 1000.0) as i64;
            if start_time_ms < 0 {
                start_time_ms = 0;
            }
            if start_time_ms >= period_ms {
                start_time_ms %= period_ms;
            }

            let wait_ms = if period_offset <= start_time_ms {
                start_time_ms - period_offset
            } else {
                period_ms - period_offset + start_time_ms
            };
            self.silent_frames = wait_ms * RX_SAMPLE_RATE as i64 / 1000;
        }

        self.set_state(if self.silent_frames > 0 {
            State::Synchronizing
        } else {
            State::Active
        });
    }

    pub fn stop(&mut self) {
        self.set_state(State::Idle);
        self.silent_frames = 0;
        self.ic = 0;
        self.phi = 0.0;
    }

    /// One base-rate sample. Returns zeros while idle or counting down
    /// the silent lead-in.
    pub fn next_sample(&mut self) -> f32 {
        match self.state() {
            State::Idle => return 0.0,
            State::Synchronizing => {
                if self.silent_frames > 0 {
                    self.silent_frames -= 1;
                    if self.silent_frames == 0 {
                        self.set_state(State::Active);
                    }
                    return 0.0;
                }
                self.set_state(State::Active);
            }
            State::Active => {}
        }

        let i0 = if self.tuning {
            i64::MAX
        } else {
            (RAMP_START_SYMBOLS * self.symbol_samples as f64) as i64
        };
        let i1 = if self.tuning {
            i64::MAX
        } else {
            NUM_SYMBOLS as i64 * self.symbol_samples
        };

        if self.ic as i64 >= i1 {
            self.set_state(State::Idle);
            self.phi = 0.0;
            return 0.0;
        }

        let isym = if self.tuning {
            0
        } else {
            self.ic / self.symbol_samples as u64
        };
        if isym != self.isym0 || self.audio_frequency != self.audio_frequency0 {
            let tone_frequency =
                self.audio_frequency + f64::from(self.tones[isym as usize]) * self.tone_spacing;
            self.dphi = TAU * tone_frequency / RX_SAMPLE_RATE as f64;
            self.isym0 = isym;
            self.audio_frequency0 = self.audio_frequency;
        }

        self.phi += self.dphi;
        if self.phi > TAU {
            self.phi -= TAU;
        }

        if self.ic as i64 > i0 {
            self.amp *= 0.98;
        }

        let sample = (self.amp * self.phi.sin()) as f32;
        self.ic += 1;

        if self.amp <= 0.0 {
            self.set_state(State::Idle);
            self.phi = 0.0;
        }

        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tones() -> [u8; NUM_SYMBOLS] {
        let mut t = [0u8; NUM_SYMBOLS];
        for (i, tone) in t.iter_mut().enumerate() {
            *tone = (i % 8) as u8;
        }
        t
    }

    #[test]
    fn waits_for_period_boundary() {
        let mut m = Modulator::new();
        // 3 s into a 15 s period with a 500 ms start delay: the next
        // transmit point is 12.5 s away.
        m.start(tones(), 1920, 500, 15_000, 1500.0, 0.0, false, 3_000);
        assert_eq!(m.state(), State::Synchronizing);

        let silent = 12_500i64 * 12;
        for _ in 0..silent {
            assert_eq!(m.next_sample(), 0.0);
        }
        assert_eq!(m.state(), State::Active);
        // First active sample is already non-silent tone audio.
        assert!(m.next_sample().abs() > 0.0);
    }

    #[test]
    fn starts_immediately_on_boundary() {
        let mut m = Modulator::new();
        m.start(tones(), 1920, 500, 15_000, 1500.0, 0.0, false, 500);
        assert_eq!(m.state(), State::Active);
    }

    #[test]
    fn runs_to_idle_after_all_symbols() {
        let mut m = Modulator::new();
        m.start(tones(), 384, 100, 4_000, 1000.0, 0.0, false, 100);
        assert_eq!(m.state(), State::Active);

        let total = NUM_SYMBOLS as i64 * 384;
        for _ in 0..total {
            m.next_sample();
        }
        assert!(m.is_active());
        assert_eq!(m.next_sample(), 0.0);
        assert!(m.is_idle());
    }

    #[test]
    fn phase_is_continuous_across_symbols() {
        let mut m = Modulator::new();
        m.start(tones(), 384, 100, 4_000, 1000.0, 0.0, false, 100);

        let mut prev = m.next_sample();
        let mut max_step = 0.0f32;
        for _ in 0..(4 * 384) {
            let s = m.next_sample();
            max_step = max_step.max((s - prev).abs());
            prev = s;
        }
        // Highest tone here is 1000 + 7*31.25 Hz; the largest per-sample
        // step of a continuous sinusoid at 12 kHz stays well under 0.7.
        assert!(max_step < 0.7, "max step {max_step}");
    }

    #[test]
    fn tuning_runs_until_stopped() {
        let mut m = Modulator::new();
        m.start([0; NUM_SYMBOLS], 1920, 500, 15_000, 1500.0, 0.0, true, 7_123);
        assert_eq!(m.state(), State::Active);
        for _ in 0..200_000 {
            m.next_sample();
        }
        assert!(m.is_active());
        m.stop();
        assert!(m.is_idle());
    }

    #[test]
    fn rejects_bad_geometry() {
        let mut m = Modulator::new();
        m.start(tones(), 0, 500, 15_000, 1500.0, 0.0, false, 0);
        assert!(m.is_idle());
    }
}
