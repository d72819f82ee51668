//! UTC-aligned decode window scheduling.
//!
//! Each enabled submode owns a schedule that tracks where its current and
//! next decode windows start in the capture ring. Windows are anchored to
//! wall-clock period boundaries (0, 15, 30, 45 s for the 15 s mode) so a
//! receiver started mid-minute still lines up with everyone else. The
//! ready check is pure in the write cursor pair `(k, k0)`, which lets
//! tests drive it with synthetic positions instead of a live capture.

use crate::submode::Submode;
use crate::{NUM_SYMBOLS, RING_SAMPLES};

/// A decode window handed to the demodulator: absolute start position in
/// the (unwrapped) sample stream and the number of samples to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeWindow {
    pub start: i32,
    pub size: i32,
}

/// Per-submode decode window bookkeeping.
#[derive(Debug, Clone)]
pub struct SubmodeSchedule {
    submode: Submode,
    period_samples: i32,
    samples_needed: i32,
    start_offset_samples: i32,
    current_decode_start: i32,
    next_decode_start: i32,
}

impl SubmodeSchedule {
    /// `ms_into_minute` is wall-clock milliseconds past the top of the
    /// current UTC minute, used only to report phase at startup.
    pub fn new(submode: Submode, sample_rate: i32, ms_into_minute: i64) -> Self {
        let period_ms = i64::from(submode.period_ms());
        let ms_into_period = ms_into_minute % period_ms;
        let mut ms_until_next =
            (period_ms - ms_into_period + i64::from(submode.start_delay_ms)) % period_ms;
        if ms_until_next == 0 {
            ms_until_next = period_ms;
        }

        log::info!(
            "submode {}: period={}s delay={}ms next boundary in {}ms ({} samples)",
            submode.name,
            submode.tx_seconds,
            submode.start_delay_ms,
            ms_until_next,
            ms_until_next * i64::from(sample_rate) / 1000,
        );

        let samples_needed = submode.symbol_samples as i32 * NUM_SYMBOLS as i32
            + ((0.5 + f64::from(submode.start_delay_ms) / 1000.0) * f64::from(sample_rate)) as i32;

        Self {
            submode,
            period_samples: submode.tx_seconds as i32 * sample_rate,
            samples_needed,
            start_offset_samples: 0,
            current_decode_start: -1,
            next_decode_start: -1,
        }
    }

    pub fn submode(&self) -> &Submode {
        &self.submode
    }

    pub fn period_samples(&self) -> i32 {
        self.period_samples
    }

    pub fn samples_needed(&self) -> i32 {
        self.samples_needed
    }

    /// Whether a full decode window is available given the ring write
    /// cursor `k` and its value at the previous check `k0`. On a ring
    /// wrap, startup, or cursor discontinuity the window realigns to the
    /// period boundary for the cycle containing `k`. Returns the window
    /// and advances to the next period when ready.
    pub fn is_decode_ready(&mut self, k: i32, k0: i32) -> Option<DecodeWindow> {
        let cycle_frames = self.period_samples;
        let frames_needed = self.samples_needed;
        let max_frames = RING_SAMPLES as i32;

        let current_cycle = (k / cycle_frames) % (max_frames / cycle_frames);
        let delta = (k - k0).abs();

        let dead_air = k < self.current_decode_start
            && k < (self.current_decode_start - cycle_frames + frames_needed).max(0);

        if dead_air
            || k < k0
            || delta > cycle_frames
            || self.current_decode_start == -1
            || self.next_decode_start == -1
        {
            self.current_decode_start = self.start_offset_samples + current_cycle * cycle_frames;
            self.next_decode_start = self.current_decode_start + cycle_frames;
            log::debug!(
                "submode {} window realigned: current={} next={}",
                self.submode.name,
                self.current_decode_start,
                self.next_decode_start,
            );
        }

        if self.current_decode_start + frames_needed > k {
            return None;
        }

        let window = DecodeWindow {
            start: self.current_decode_start,
            size: frames_needed.max(k - self.current_decode_start),
        };
        self.current_decode_start = self.next_decode_start;
        self.next_decode_start = self.current_decode_start + cycle_frames;
        Some(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submode::{by_id, SubmodeId};
    use crate::RX_SAMPLE_RATE;

    fn schedule_a() -> SubmodeSchedule {
        SubmodeSchedule::new(by_id(SubmodeId::A), RX_SAMPLE_RATE as i32, 0)
    }

    #[test]
    fn samples_needed_covers_symbols_and_delay() {
        let sch = schedule_a();
        // 79 symbols of 1920 samples plus one second of guard (0.5 s
        // fixed plus the 500 ms start delay).
        assert_eq!(sch.samples_needed(), 79 * 1920 + 12_000);
        assert_eq!(sch.period_samples(), 15 * 12_000);
    }

    #[test]
    fn fires_once_per_period() {
        let mut sch = schedule_a();
        let period = sch.period_samples();
        let needed = sch.samples_needed();
        let chunk = 1200;

        let mut fired = Vec::new();
        let mut k0 = 0;
        let mut k = 0;
        while k < 3 * period {
            k += chunk;
            if let Some(win) = sch.is_decode_ready(k, k0) {
                fired.push(win);
            }
            k0 = k;
        }

        assert_eq!(fired.len(), 3);
        assert_eq!(fired[0].start, 0);
        assert_eq!(fired[1].start, period);
        assert_eq!(fired[2].start, 2 * period);
        for win in &fired {
            assert!(win.size >= needed);
        }
    }

    #[test]
    fn realigns_after_cursor_jump() {
        let mut sch = schedule_a();
        let period = sch.period_samples();

        assert!(sch.is_decode_ready(1200, 0).is_none());
        // Jump far ahead, as after a capture stall. The window must snap
        // to the period boundary of the cycle containing the new cursor.
        let k = 2 * period + 600;
        assert!(sch.is_decode_ready(k, 1200).is_none());
        let win = sch.is_decode_ready(2 * period + sch.samples_needed(), k);
        assert_eq!(win.map(|w| w.start), Some(2 * period));
    }

    #[test]
    fn realigns_on_ring_wrap() {
        let mut sch = schedule_a();
        let period = sch.period_samples();
        let near_end = (RING_SAMPLES as i32 / period) * period - 600;
        // First sighting near the end of the minute completes the last
        // full window of the ring.
        let win = sch.is_decode_ready(near_end, near_end - 1200);
        assert_eq!(win.map(|w| w.start), Some(near_end + 600 - period));

        // Cursor wraps to the ring start.
        assert!(sch.is_decode_ready(600, near_end).is_none());
        let win = sch.is_decode_ready(sch.samples_needed() + 600, 600);
        assert_eq!(win.map(|w| w.start), Some(0));
    }
}
