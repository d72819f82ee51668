//! Streaming sample-rate conversion for the transmit audio path.
//!
//! The modulator synthesizes at the 12 kHz base rate while sound devices
//! commonly run at 44.1 or 48 kHz, so the output callback pulls base-rate
//! samples through a [`Resampler`] configured for the device rate. Integer
//! ratios use polyphase FIR interpolation (or FIR-filtered decimation); any
//! other ratio falls back to linear interpolation.

use std::f64::consts::PI;

const SINC_TAPS: usize = 32;

/// Fixed lowpass FIR taps for the 48 kHz to 12 kHz rate pair.
const FIR_48K_TO_12K: [f32; 49] = [
    0.000_861_074_040,
    0.010_051_920_210,
    0.010_161_983_649,
    0.011_363_155_076,
    0.008_706_594_219,
    0.002_613_872_664,
    -0.005_202_883_094,
    -0.011_720_748_164,
    -0.013_752_163_325,
    -0.009_431_602_741,
    0.000_539_063_909,
    0.012_636_767_098,
    0.021_494_659_597,
    0.021_951_235_065,
    0.011_564_169_382,
    -0.007_656_470_131,
    -0.028_965_787_341,
    -0.042_637_874_109,
    -0.039_203_309_748,
    -0.013_153_301_537,
    0.034_320_769_178,
    0.094_717_832_646,
    0.154_224_604_789,
    0.197_758_325_022,
    0.213_715_139_513,
    0.197_758_325_022,
    0.154_224_604_789,
    0.094_717_832_646,
    0.034_320_769_178,
    -0.013_153_301_537,
    -0.039_203_309_748,
    -0.042_637_874_109,
    -0.028_965_787_341,
    -0.007_656_470_131,
    0.011_564_169_382,
    0.021_951_235_065,
    0.021_494_659_597,
    0.012_636_767_098,
    0.000_539_063_909,
    -0.009_431_602_741,
    -0.013_752_163_325,
    -0.011_720_748_164,
    -0.005_202_883_094,
    0.002_613_872_664,
    0.008_706_594_219,
    0.011_363_155_076,
    0.010_161_983_649,
    0.010_051_920_210,
    0.000_861_074_040,
];

/// Anti-aliasing filter for the given rate pair. The 48k/12k pair returns
/// the fixed measured taps; everything else gets a Hamming-windowed sinc
/// normalized to unity DC gain.
pub fn make_lowpass_fir(input_rate: i32, target_rate: i32) -> Vec<f32> {
    if input_rate == 48_000 && target_rate == 12_000 {
        return FIR_48K_TO_12K.to_vec();
    }

    if input_rate <= 0 || target_rate <= 0 {
        return Vec::new();
    }

    let cutoff = (0.5 * f64::from(target_rate) / f64::from(input_rate)).clamp(0.0, 0.5);
    let mut taps = vec![0.0f32; SINC_TAPS];
    let mut sum = 0.0f64;

    for (i, tap) in taps.iter_mut().enumerate() {
        let n = i as f64 - (SINC_TAPS - 1) as f64 / 2.0;
        let sinc = if n == 0.0 {
            2.0 * cutoff
        } else {
            (2.0 * PI * cutoff * n).sin() / (PI * n)
        };
        let window = 0.54 - 0.46 * (2.0 * PI * i as f64 / (SINC_TAPS - 1) as f64).cos();
        *tap = (sinc * window) as f32;
        sum += f64::from(*tap);
    }

    if sum != 0.0 {
        for t in &mut taps {
            *t = (f64::from(*t) / sum) as f32;
        }
    }

    taps
}

fn build_polyphase(taps: &[f32], factor: i32, scale: bool) -> Vec<Vec<f32>> {
    let mut phases = vec![Vec::new(); factor as usize];
    for (p, phase) in phases.iter_mut().enumerate() {
        let mut i = p;
        while i < taps.len() {
            let mut value = taps[i];
            if scale {
                value *= factor as f32;
            }
            phase.push(value);
            i += factor as usize;
        }
    }
    phases
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Mode {
    #[default]
    Unconfigured,
    Passthrough,
    Upsample,
    Downsample,
    Fractional,
}

/// Pull-based streaming resampler. `process` fills an output span by drawing
/// however many input samples the configured ratio requires from a source
/// closure, so the caller never has to compute block sizes on either side.
#[derive(Debug, Default)]
pub struct Resampler {
    mode: Mode,
    input_rate: i32,
    output_rate: i32,
    factor: i32,
    taps: Vec<f32>,
    phase_taps: Vec<Vec<f32>>,
    ring: Vec<f32>,
    ring_pos: usize,
    phase: usize,
    step: f64,
    frac_pos: f64,
    curr: f32,
    next: f32,
    has_next: bool,
}

impl Resampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_rate(&self) -> i32 {
        self.input_rate
    }

    pub fn output_rate(&self) -> i32 {
        self.output_rate
    }

    pub fn configure(&mut self, input_rate: i32, output_rate: i32) {
        self.reset();
        self.input_rate = input_rate;
        self.output_rate = output_rate;

        if input_rate <= 0 || output_rate <= 0 {
            self.mode = Mode::Unconfigured;
            return;
        }

        if input_rate == output_rate {
            self.mode = Mode::Passthrough;
            return;
        }

        if output_rate % input_rate == 0 {
            self.mode = Mode::Upsample;
            self.factor = output_rate / input_rate;
            self.taps = make_lowpass_fir(input_rate.max(output_rate), input_rate.min(output_rate));
            self.phase_taps = build_polyphase(&self.taps, self.factor, true);
            self.ring = vec![0.0; self.taps.len()];
            return;
        }

        if input_rate % output_rate == 0 {
            self.mode = Mode::Downsample;
            self.factor = input_rate / output_rate;
            self.taps = make_lowpass_fir(input_rate.max(output_rate), input_rate.min(output_rate));
            self.ring = vec![0.0; self.taps.len()];
            return;
        }

        self.mode = Mode::Fractional;
        self.step = f64::from(input_rate) / f64::from(output_rate);
    }

    pub fn reset(&mut self) {
        *self = Self {
            factor: 1,
            ..Self::default()
        };
    }

    pub fn process<F>(&mut self, output: &mut [f32], mut next_input: F)
    where
        F: FnMut() -> f32,
    {
        match self.mode {
            Mode::Unconfigured => output.fill(0.0),
            Mode::Passthrough => {
                for v in output.iter_mut() {
                    *v = next_input();
                }
            }
            Mode::Upsample => self.upsample(output, &mut next_input),
            Mode::Downsample => self.downsample(output, &mut next_input),
            Mode::Fractional => self.fractional(output, &mut next_input),
        }
    }

    fn upsample<F>(&mut self, output: &mut [f32], next_input: &mut F)
    where
        F: FnMut() -> f32,
    {
        if self.phase_taps.is_empty() || self.ring.is_empty() {
            output.fill(0.0);
            return;
        }

        let len = self.ring.len();
        for v in output.iter_mut() {
            if self.phase == 0 {
                self.ring[self.ring_pos] = next_input();
                self.ring_pos = (self.ring_pos + 1) % len;
            }

            let taps = &self.phase_taps[self.phase];
            let mut acc = 0.0f64;
            let read_pos = (self.ring_pos + len - 1) % len;
            for (j, &tap) in taps.iter().enumerate() {
                let idx = (read_pos + len - j) % len;
                acc += f64::from(tap) * f64::from(self.ring[idx]);
            }
            *v = acc as f32;

            self.phase = (self.phase + 1) % self.factor as usize;
        }
    }

    fn downsample<F>(&mut self, output: &mut [f32], next_input: &mut F)
    where
        F: FnMut() -> f32,
    {
        if self.taps.is_empty() || self.ring.is_empty() {
            output.fill(0.0);
            return;
        }

        let len = self.ring.len();
        for v in output.iter_mut() {
            for _ in 0..self.factor {
                self.ring[self.ring_pos] = next_input();
                self.ring_pos = (self.ring_pos + 1) % len;
            }

            let mut acc = 0.0f64;
            let read_pos = (self.ring_pos + len - 1) % len;
            for (j, &tap) in self.taps.iter().enumerate() {
                let idx = (read_pos + len - j) % len;
                acc += f64::from(tap) * f64::from(self.ring[idx]);
            }
            *v = acc as f32;
        }
    }

    fn fractional<F>(&mut self, output: &mut [f32], next_input: &mut F)
    where
        F: FnMut() -> f32,
    {
        if self.step <= 0.0 {
            output.fill(0.0);
            return;
        }

        if !self.has_next {
            self.curr = next_input();
            self.next = next_input();
            self.has_next = true;
            self.frac_pos = 0.0;
        }

        for v in output.iter_mut() {
            *v = self.curr + self.frac_pos as f32 * (self.next - self.curr);
            self.frac_pos += self.step;
            while self.frac_pos >= 1.0 {
                self.curr = self.next;
                self.next = next_input();
                self.frac_pos -= 1.0;
            }
        }
    }
}
