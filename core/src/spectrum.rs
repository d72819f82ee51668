//! Waterfall spectrum estimation over captured audio blocks.

use rustfft::{num_complex::Complex, FftPlanner};

use crate::SPECTRUM_BINS;

/// One spectral snapshot of a capture block, resampled to the fixed bin
/// count the waterfall expects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spectrum {
    /// Linear power per bin, `SPECTRUM_BINS` entries when non-empty.
    pub bins: Vec<f32>,
    /// Width of one resampled bin in Hz.
    pub bin_hz: f32,
    /// Mean block power in dB relative to full scale i16.
    pub power_db: f32,
    /// Peak sample level in dB relative to full scale i16.
    pub peak_db: f32,
}

/// Windowed power spectrum of the first channel of an interleaved i16
/// block. Uses the largest power-of-two FFT that fits (capped at 4096);
/// blocks under 64 frames yield an empty spectrum.
pub fn compute_spectrum(data: &[i16], frames: usize, channels: usize, sample_rate: i32) -> Spectrum {
    let mut spec = Spectrum::default();
    if frames == 0 || channels == 0 || sample_rate <= 0 {
        return spec;
    }

    let max_n = frames.min(4096).min(data.len() / channels);
    let n = if max_n == 0 {
        0
    } else {
        1usize << (usize::BITS - 1 - max_n.leading_zeros())
    };
    if n < 64 {
        return spec;
    }

    let two_pi = 2.0 * std::f64::consts::PI;
    let mut fft_buf = vec![Complex::new(0.0f64, 0.0); n];
    let mut power_sum = 0.0f64;
    let mut peak = 0.0f64;
    for i in 0..n {
        let v = f64::from(data[i * channels]);
        power_sum += v * v;
        peak = peak.max(v.abs());
        let window = 0.5 * (1.0 - (two_pi * i as f64 / (n - 1) as f64).cos());
        fft_buf[i] = Complex::new(v * window, 0.0);
    }

    let mut planner = FftPlanner::new();
    planner.plan_fft_forward(n).process(&mut fft_buf);

    // Resample to the fixed display bin count so plot width is independent
    // of the FFT size used for this block.
    spec.bins.resize(SPECTRUM_BINS, 0.0);
    let scale = 1.0 / (n as f64 * n as f64);
    let source_bins = n / 2;
    let source_bin_hz = f64::from(sample_rate) / n as f64;
    let target_bin_hz = (f64::from(sample_rate) / 2.0) / SPECTRUM_BINS as f64;

    for (i, bin) in spec.bins.iter_mut().enumerate() {
        let pos = i as f64 * target_bin_hz / source_bin_hz;
        let idx = pos as usize;
        let frac = pos - idx as f64;
        let v0 = if idx < source_bins {
            (fft_buf[idx].norm_sqr() * scale) as f32
        } else {
            0.0
        };
        let v1 = if idx + 1 < source_bins {
            (fft_buf[idx + 1].norm_sqr() * scale) as f32
        } else {
            v0
        };
        *bin = v0 + frac as f32 * (v1 - v0);
    }

    spec.bin_hz = target_bin_hz as f32;
    spec.power_db = if power_sum > 0.0 {
        (10.0 * (power_sum / n as f64).log10()) as f32
    } else {
        0.0
    };
    spec.peak_db = if peak > 0.0 {
        (20.0 * peak.log10()) as f32
    } else {
        0.0
    };
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RX_SAMPLE_RATE;

    #[test]
    fn short_block_yields_empty_spectrum() {
        let data = vec![0i16; 32];
        let spec = compute_spectrum(&data, 32, 1, RX_SAMPLE_RATE as i32);
        assert!(spec.bins.is_empty());
    }

    #[test]
    fn tone_peaks_in_expected_bin() {
        let rate = RX_SAMPLE_RATE as i32;
        let freq = 1500.0f64;
        let n = 4096usize;
        let data: Vec<i16> = (0..n)
            .map(|i| {
                let t = i as f64 / f64::from(rate);
                (10_000.0 * (2.0 * std::f64::consts::PI * freq * t).sin()) as i16
            })
            .collect();

        let spec = compute_spectrum(&data, n, 1, rate);
        assert_eq!(spec.bins.len(), SPECTRUM_BINS);

        let peak_bin = spec
            .bins
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        let peak_hz = peak_bin as f32 * spec.bin_hz;
        assert!((peak_hz - freq as f32).abs() < 15.0, "peak at {peak_hz} Hz");

        assert!(spec.power_db > 0.0);
        assert!(spec.peak_db > 70.0 && spec.peak_db < 90.0);
    }

    #[test]
    fn stereo_uses_first_channel() {
        // Left channel silent, right channel loud: spectrum should be flat.
        let mut data = vec![0i16; 2048];
        for i in (1..data.len()).step_by(2) {
            data[i] = 20_000;
        }
        let spec = compute_spectrum(&data, 1024, 2, RX_SAMPLE_RATE as i32);
        assert!(spec.bins.iter().all(|&v| v == 0.0));
        assert_eq!(spec.peak_db, 0.0);
    }
}
