//! Engine orchestration: capture staging, decode scheduling, and the
//! transmit pipeline, composed against injected platform capabilities.
//!
//! Captured audio lands in a 60 s circular buffer whose write cursor is
//! aligned to the UTC minute at construction, so decode windows computed
//! from wall-clock period boundaries index straight into the ring. Each
//! capture block also produces a spectrum event and runs the per-submode
//! ready check; when any window completes, one merged snapshot of the
//! ring and parameters goes to the decode worker. Transmit requests
//! replace the queue as a whole and render through a single mutex-guarded
//! modulator/resampler pair pulled by the output device callback.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::costas::{self, ToneEncoder, ToneSequencer};
use crate::decode_worker::{DecodeSnapshot, DecodeWorker, Demodulator, NullDemodulator};
use crate::error::{CoreError, Result};
use crate::event::Event;
use crate::message::{self, MessageInfo};
use crate::modulator::Modulator;
use crate::platform::{
    AudioFormat, AudioInput, AudioOutput, AudioStreamParams, CaptureBlock, PlaybackBlock,
    PlaybackSamples, RigControl, SampleType, Samples, SystemTimeSource, TimeSource,
};
use crate::resampler::Resampler;
use crate::scheduler::SubmodeSchedule;
use crate::spectrum::compute_spectrum;
use crate::submode::{self, Submode};
use crate::{NUM_SYMBOLS, RING_SAMPLES, RING_SECONDS, RX_SAMPLE_RATE, TX_OUTPUT_RATE};

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Capture rate in Hz; zero means the native 12 kHz rate.
    pub sample_rate_hz: i32,
    /// Decode-enable mask; zero means every default-enabled submode.
    pub submodes: u32,
    pub tx_output_rate_hz: i32,
    /// Linear output gain, clamped to `0.0..=1.0` at render time.
    pub tx_output_gain: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 0,
            submodes: 0,
            tx_output_rate_hz: TX_OUTPUT_RATE as i32,
            tx_output_gain: 1.0,
        }
    }
}

#[derive(Default)]
pub struct EngineCallbacks {
    pub on_event: Option<Box<dyn FnMut(&Event) + Send>>,
    pub on_error: Option<Box<dyn FnMut(&str) + Send>>,
}

/// Injected capabilities. Devices are optional so a host can run
/// receive-only, transmit-only, or fully headless for tests.
pub struct EngineDeps {
    pub audio_in: Option<Box<dyn AudioInput>>,
    pub audio_out: Option<Box<dyn AudioOutput>>,
    pub rig: Option<Box<dyn RigControl>>,
    pub time: Arc<dyn TimeSource>,
    pub demodulator: Box<dyn Demodulator>,
    pub tone_encoder: Box<dyn ToneEncoder>,
}

impl Default for EngineDeps {
    fn default() -> Self {
        Self {
            audio_in: None,
            audio_out: None,
            rig: None,
            time: Arc::new(SystemTimeSource),
            demodulator: Box::new(NullDemodulator),
            tone_encoder: Box::new(ToneSequencer),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TxMessageRequest {
    pub text: String,
    pub my_call: String,
    pub my_grid: String,
    pub selected_call: String,
    /// Wire submode selector (0/1/2/4/8).
    pub submode: u32,
    pub audio_frequency_hz: f64,
    pub tx_delay_s: f64,
    pub force_identify: bool,
    pub force_data: bool,
}

#[derive(Debug, Clone)]
pub struct TxFrameRequest {
    /// Pre-packed 12-symbol wire frame.
    pub frame: String,
    pub flags: u8,
    pub submode: u32,
    pub audio_frequency_hz: f64,
    pub tx_delay_s: f64,
}

struct TxFrame {
    tones: [u8; NUM_SYMBOLS],
    frame: String,
}

#[derive(Debug, Clone, Copy, Default)]
struct TxSettings {
    submode: u32,
    audio_frequency_hz: f64,
    tx_delay_s: f64,
    tuning: bool,
}

struct RxState {
    snapshot: DecodeSnapshot,
    schedules: Vec<SubmodeSchedule>,
    k0: i32,
    total_samples: i64,
    capture_count: u64,
}

struct TxState {
    queue: VecDeque<TxFrame>,
    settings: TxSettings,
    modulator: Modulator,
    resampler: Resampler,
    float_buffer: Vec<f32>,
    render_count: u64,
    format_logged: bool,
}

type SharedCallbacks = Arc<Mutex<EngineCallbacks>>;

fn emit_event(callbacks: &SharedCallbacks, event: &Event) {
    if let Ok(mut cb) = callbacks.lock() {
        if let Some(on_event) = cb.on_event.as_mut() {
            on_event(event);
        }
    }
}

fn emit_error(callbacks: &SharedCallbacks, message: &str) {
    if let Ok(mut cb) = callbacks.lock() {
        if let Some(on_error) = cb.on_error.as_mut() {
            on_error(message);
        }
    }
}

pub struct Engine {
    config: EngineConfig,
    callbacks: SharedCallbacks,
    time: Arc<dyn TimeSource>,
    rx: Arc<Mutex<RxState>>,
    tx: Arc<Mutex<TxState>>,
    tx_active: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    worker: Arc<DecodeWorker>,
    tone_encoder: Box<dyn ToneEncoder>,
    audio_in: Option<Box<dyn AudioInput>>,
    audio_out: Option<Box<dyn AudioOutput>>,
    rig: Option<Box<dyn RigControl>>,
    tx_output_started: bool,
}

impl Engine {
    pub fn new(mut config: EngineConfig, callbacks: EngineCallbacks, deps: EngineDeps) -> Self {
        let sample_rate = effective_sample_rate(&config);
        let now_ms = deps.time.now_ms();

        if config.submodes == 0 {
            let mut mask = 0;
            for sm in submode::SUBMODES {
                if sm.enabled {
                    mask |= sm.id.mask_bit();
                }
            }
            config.submodes = mask;
        }

        // Align the ring write cursor to wall clock so windows computed
        // from UTC period boundaries land on the right samples.
        let ms_in_minute = now_ms.rem_euclid(RING_SECONDS as i64 * 1000);
        let aligned = (ms_in_minute * i64::from(sample_rate) / 1000) as i32;
        log::info!(
            "capture ring aligned to UTC minute: ms_in_minute={ms_in_minute} offset_samples={aligned} rate={sample_rate}"
        );

        let mut snapshot = DecodeSnapshot::default();
        snapshot.params.nfa = 200;
        snapshot.params.nfb = 2500;
        snapshot.params.nfqso = 1500;
        snapshot.params.kin = aligned;

        let schedules = submode::SUBMODES
            .iter()
            .filter(|sm| config.submodes & sm.id.mask_bit() != 0)
            .map(|sm| SubmodeSchedule::new(*sm, sample_rate, ms_in_minute))
            .collect();

        let callbacks = Arc::new(Mutex::new(callbacks));
        let worker_callbacks = Arc::clone(&callbacks);
        let worker = Arc::new(DecodeWorker::spawn(deps.demodulator, move |event| {
            emit_event(&worker_callbacks, &event);
        }));

        Self {
            config,
            callbacks,
            time: deps.time,
            rx: Arc::new(Mutex::new(RxState {
                snapshot,
                schedules,
                k0: aligned,
                total_samples: i64::from(aligned),
                capture_count: 0,
            })),
            tx: Arc::new(Mutex::new(TxState {
                queue: VecDeque::new(),
                settings: TxSettings::default(),
                modulator: Modulator::new(),
                resampler: Resampler::new(),
                float_buffer: Vec::new(),
                render_count: 0,
                format_logged: false,
            })),
            tx_active: Arc::new(AtomicBool::new(false)),
            running: Arc::new(AtomicBool::new(false)),
            worker,
            tone_encoder: deps.tone_encoder,
            audio_in: deps.audio_in,
            audio_out: deps.audio_out,
            rig: deps.rig,
            tx_output_started: false,
        }
    }

    /// Starts the capture stream and rig link. Missing devices are
    /// reported through `on_error` but do not fail the call; captures can
    /// still be submitted directly.
    pub fn start(&mut self) -> Result<()> {
        self.running.store(true, Ordering::Release);

        if let Some(audio_in) = self.audio_in.as_mut() {
            let params = AudioStreamParams {
                format: AudioFormat {
                    sample_rate: effective_sample_rate(&self.config),
                    channels: 1,
                    sample_type: SampleType::Int16,
                },
                frames_per_buffer: 0,
            };

            let running = Arc::clone(&self.running);
            let rx = Arc::clone(&self.rx);
            let callbacks = Arc::clone(&self.callbacks);
            let worker = Arc::clone(&self.worker);
            let time = Arc::clone(&self.time);
            let config = self.config;

            let error_callbacks = Arc::clone(&self.callbacks);
            let ok = audio_in.start(
                &params,
                Box::new(move |block| {
                    if running.load(Ordering::Acquire) {
                        let _ = submit_capture_shared(&config, &rx, &callbacks, &worker, &*time, &block);
                    }
                }),
                Box::new(move |message| emit_error(&error_callbacks, message)),
            );
            if !ok {
                emit_error(&self.callbacks, "failed to start audio input");
                return Err(CoreError::AudioInputStart);
            }
        }

        if let Some(rig) = self.rig.as_mut() {
            let error_callbacks = Arc::clone(&self.callbacks);
            rig.start(
                Box::new(|_state| {}),
                Box::new(move |message| emit_error(&error_callbacks, message)),
            );
        }

        Ok(())
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        self.stop_transmit();
        if let Some(audio_in) = self.audio_in.as_mut() {
            audio_in.stop();
        }
        if let Some(rig) = self.rig.as_mut() {
            rig.stop();
        }
    }

    /// Stages one capture block in the ring and schedules any decode
    /// windows it completes.
    pub fn submit_capture(&self, block: &CaptureBlock<'_>) -> Result<()> {
        submit_capture_shared(
            &self.config,
            &self.rx,
            &self.callbacks,
            &self.worker,
            &*self.time,
            block,
        )
    }

    /// Builds, encodes, and queues every frame of a text message, then
    /// starts the transmit output. Any frames already queued are dropped.
    pub fn transmit_message(&mut self, request: &TxMessageRequest) -> Result<MessageInfo> {
        let sm = submode::from_wire(request.submode)?;

        let (frames, info) = message::build_message_frames(
            &request.my_call,
            &request.my_grid,
            &request.selected_call,
            &request.text,
            request.force_identify,
            request.force_data,
            request.submode,
        );
        if frames.is_empty() {
            return Err(CoreError::EmptyMessage);
        }

        let kind = costas::for_wire_submode(request.submode);
        let mut built = Vec::with_capacity(frames.len());
        for (frame, flags) in &frames {
            if frame.len() < 12 {
                continue;
            }
            let frame = frame[..12].to_string();
            if let Some(tones) = self.tone_encoder.encode(&frame, *flags, kind) {
                built.push(TxFrame { tones, frame });
            }
        }
        if built.is_empty() {
            return Err(CoreError::EmptyMessage);
        }
        log::info!(
            "transmit: {} frame(s), submode {}, {:.1} Hz",
            built.len(),
            sm.name,
            request.audio_frequency_hz,
        );

        self.arm_transmit(
            built,
            TxSettings {
                submode: request.submode,
                audio_frequency_hz: request.audio_frequency_hz,
                tx_delay_s: request.tx_delay_s,
                tuning: false,
            },
        )?;
        Ok(info)
    }

    /// Queues a single pre-packed frame for transmission.
    pub fn transmit_frame(&mut self, request: &TxFrameRequest) -> Result<()> {
        submode::from_wire(request.submode)?;
        if request.frame.len() < 12 {
            return Err(CoreError::ShortFrame(request.frame.len()));
        }

        let kind = costas::for_wire_submode(request.submode);
        let frame = request.frame[..12].to_string();
        let tones = self
            .tone_encoder
            .encode(&frame, request.flags, kind)
            .ok_or(CoreError::ShortFrame(request.frame.len()))?;

        self.arm_transmit(
            vec![TxFrame { tones, frame }],
            TxSettings {
                submode: request.submode,
                audio_frequency_hz: request.audio_frequency_hz,
                tx_delay_s: request.tx_delay_s,
                tuning: false,
            },
        )
    }

    /// Holds a steady tone at the audio frequency until `stop_transmit`.
    pub fn start_tune(
        &mut self,
        audio_frequency_hz: f64,
        submode_selector: u32,
        tx_delay_s: f64,
    ) -> Result<()> {
        let sm = submode::from_wire(submode_selector)?;

        if let Ok(mut tx) = self.tx.lock() {
            tx.queue.clear();
            tx.settings = TxSettings {
                submode: submode_selector,
                audio_frequency_hz,
                tx_delay_s,
                tuning: true,
            };
            self.tx_active.store(true, Ordering::Release);
            tx.resampler.reset();
            let now_ms = self.time.now_ms();
            tx.modulator.start(
                [0; NUM_SYMBOLS],
                sm.symbol_samples as i32,
                sm.start_delay_ms as i32,
                sm.period_ms() as i32,
                audio_frequency_hz,
                tx_delay_s,
                true,
                now_ms,
            );
        }

        if let Err(e) = self.start_tx_output() {
            self.stop_transmit();
            return Err(e);
        }
        Ok(())
    }

    pub fn stop_transmit(&mut self) {
        self.tx_active.store(false, Ordering::Release);
        if let Ok(mut tx) = self.tx.lock() {
            tx.queue.clear();
            tx.settings.tuning = false;
            tx.modulator.stop();
            tx.resampler.reset();
        }
        if self.tx_output_started {
            if let Some(audio_out) = self.audio_out.as_mut() {
                audio_out.stop();
            }
            self.tx_output_started = false;
        }
    }

    /// Whether a transmission is queued or in progress, including its
    /// silent lead-in.
    pub fn is_transmitting(&self) -> bool {
        self.tx_active.load(Ordering::Acquire)
    }

    /// Whether tone audio is being synthesized right now.
    pub fn is_transmitting_audio(&self) -> bool {
        self.tx
            .lock()
            .map(|tx| tx.modulator.is_active())
            .unwrap_or(false)
    }

    /// Renders transmit audio into an output block; exposed so hosts
    /// without an `AudioOutput` capability can pull samples themselves.
    pub fn render_tx_audio(&self, block: &mut PlaybackBlock<'_>) -> usize {
        render_tx_shared(
            &self.tx,
            &self.tx_active,
            self.config.tx_output_gain,
            &*self.time,
            block,
        )
    }

    fn arm_transmit(&mut self, built: Vec<TxFrame>, settings: TxSettings) -> Result<()> {
        if let Ok(mut tx) = self.tx.lock() {
            tx.queue.clear();
            tx.queue.extend(built);
            tx.settings = settings;
            self.tx_active.store(true, Ordering::Release);
            tx.modulator.stop();
            tx.resampler.reset();
            let now_ms = self.time.now_ms();
            start_next_frame_locked(&mut tx, &self.tx_active, now_ms);
        }

        if let Err(e) = self.start_tx_output() {
            self.stop_transmit();
            return Err(e);
        }
        Ok(())
    }

    fn start_tx_output(&mut self) -> Result<()> {
        let Some(audio_out) = self.audio_out.as_mut() else {
            return Ok(());
        };
        if self.tx_output_started {
            return Ok(());
        }

        let params = AudioStreamParams {
            format: AudioFormat {
                sample_rate: self.config.tx_output_rate_hz,
                channels: 1,
                sample_type: SampleType::Int16,
            },
            frames_per_buffer: 0,
        };

        let tx = Arc::clone(&self.tx);
        let tx_active = Arc::clone(&self.tx_active);
        let time = Arc::clone(&self.time);
        let gain = self.config.tx_output_gain;
        let error_callbacks = Arc::clone(&self.callbacks);

        let ok = audio_out.start(
            &params,
            Box::new(move |block| render_tx_shared(&tx, &tx_active, gain, &*time, block)),
            Box::new(move |message| emit_error(&error_callbacks, message)),
        );
        if !ok {
            emit_error(&self.callbacks, "failed to start audio output");
            return Err(CoreError::AudioOutputStart);
        }
        self.tx_output_started = true;
        Ok(())
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
    }
}

fn effective_sample_rate(config: &EngineConfig) -> i32 {
    if config.sample_rate_hz > 0 {
        config.sample_rate_hz
    } else {
        RX_SAMPLE_RATE as i32
    }
}

fn utc_hhmmss(now_ms: i64) -> i32 {
    let secs = now_ms.div_euclid(1000).rem_euclid(86_400);
    let (hh, mm, ss) = (secs / 3600, secs % 3600 / 60, secs % 60);
    (hh * 10_000 + mm * 100 + ss) as i32
}

fn submit_capture_shared(
    config: &EngineConfig,
    rx: &Mutex<RxState>,
    callbacks: &SharedCallbacks,
    worker: &DecodeWorker,
    time: &dyn TimeSource,
    block: &CaptureBlock<'_>,
) -> Result<()> {
    let Samples::Int16(data) = block.samples else {
        emit_error(callbacks, "unsupported sample format");
        return Err(CoreError::UnsupportedSampleFormat);
    };

    let want = effective_sample_rate(config);
    if config.sample_rate_hz > 0 && block.format.sample_rate != want {
        emit_error(callbacks, "unexpected sample rate");
        return Err(CoreError::UnexpectedSampleRate {
            got: block.format.sample_rate.max(0) as usize,
            want: want as usize,
        });
    }

    let channels = block.format.channels.max(1) as usize;
    let frames = data.len() / channels;
    if frames == 0 {
        return Ok(());
    }

    {
        let Ok(mut state) = rx.lock() else {
            return Ok(());
        };
        let state = &mut *state;

        // Stereo captures keep the first channel.
        let kin = state.snapshot.params.kin as usize;
        for i in 0..frames {
            state.snapshot.samples[(kin + i) % RING_SAMPLES] = data[i * channels];
        }
        state.snapshot.params.kin = ((kin + frames) % RING_SAMPLES) as i32;
        state.total_samples += frames as i64;

        state.capture_count += 1;
        if state.capture_count % 100 == 0 {
            let sum_squares: f64 = (0..frames)
                .map(|i| f64::from(data[i * channels]))
                .map(|v| v * v)
                .sum();
            let rms = (sum_squares / frames as f64).sqrt();
            log::debug!(
                "capture: frames={} rms={:.1} total={} kin={}",
                frames,
                rms,
                state.total_samples,
                state.snapshot.params.kin,
            );
        }
    }

    let spectrum = compute_spectrum(data, frames, channels, block.format.sample_rate);
    if !spectrum.bins.is_empty() {
        emit_event(callbacks, &Event::Spectrum(spectrum));
    }

    schedule_decodes(rx, worker, time);
    Ok(())
}

/// Runs every schedule's ready check against the current write cursor;
/// when one or more windows complete, snapshots the ring and parameters
/// once and hands the merged pass to the worker.
fn schedule_decodes(rx: &Mutex<RxState>, worker: &DecodeWorker, time: &dyn TimeSource) {
    let Ok(mut state) = rx.lock() else {
        return;
    };
    let state = &mut *state;

    let k = state.snapshot.params.kin;
    let k0 = state.k0;
    state.snapshot.params.nsubmodes = 0;

    let mut any = false;
    for sch in &mut state.schedules {
        let Some(window) = sch.is_decode_ready(k, k0) else {
            continue;
        };
        let wrapped_start = window.start.rem_euclid(RING_SAMPLES as i32);
        state
            .snapshot
            .params
            .set_window(sch.submode().id, wrapped_start, window.size);
        any = true;
        log::debug!(
            "decode window ready: submode={} start={} wrapped={} size={} k={} k0={}",
            sch.submode().name,
            window.start,
            wrapped_start,
            window.size,
            k,
            k0,
        );
    }
    state.k0 = k;

    if !any {
        return;
    }

    state.snapshot.params.utc = utc_hhmmss(time.now_ms());
    state.snapshot.params.newdat = true;
    state.snapshot.params.sync_stats = false;
    worker.enqueue(state.snapshot.clone());
}

fn render_tx_shared(
    tx: &Mutex<TxState>,
    tx_active: &AtomicBool,
    gain: f32,
    time: &dyn TimeSource,
    block: &mut PlaybackBlock<'_>,
) -> usize {
    let channels = block.format.channels.max(1) as usize;
    let frames = match &block.samples {
        PlaybackSamples::Int16(buf) => buf.len() / channels,
        PlaybackSamples::Float32(buf) => buf.len() / channels,
    };
    if frames == 0 {
        return 0;
    }

    let output_rate = block.format.sample_rate;
    let Ok(mut state) = tx.lock() else {
        return 0;
    };
    let state = &mut *state;

    if output_rate <= 0 {
        match &mut block.samples {
            PlaybackSamples::Int16(buf) => buf.fill(0),
            PlaybackSamples::Float32(buf) => buf.fill(0.0),
        }
        return frames * channels;
    }

    if !state.format_logged {
        log::info!(
            "tx output format: rate={} Hz channels={} type={:?}",
            output_rate,
            block.format.channels,
            block.format.sample_type,
        );
        state.format_logged = true;
    }

    if state.resampler.input_rate() != RX_SAMPLE_RATE as i32
        || state.resampler.output_rate() != output_rate
    {
        state.resampler.configure(RX_SAMPLE_RATE as i32, output_rate);
    }

    if state.float_buffer.len() < frames {
        state.float_buffer.resize(frames, 0.0);
    }

    // The resampler pulls base-rate samples from the modulator; both live
    // in this state, so lift them out for the duration of the pull.
    let mut resampler = std::mem::take(&mut state.resampler);
    let mut float_buffer = std::mem::take(&mut state.float_buffer);
    let now_ms = time.now_ms();
    resampler.process(&mut float_buffer[..frames], || {
        next_tx_sample_locked(state, tx_active, now_ms)
    });
    state.resampler = resampler;
    state.float_buffer = float_buffer;

    let gain = gain.clamp(0.0, 1.0);
    if gain != 1.0 {
        for v in &mut state.float_buffer[..frames] {
            *v *= gain;
        }
    }

    state.render_count += 1;
    if state.render_count % 1000 == 0 {
        let sum_squares: f64 = state.float_buffer[..frames]
            .iter()
            .map(|&v| f64::from(v) * f64::from(v))
            .sum();
        let rms = (sum_squares / frames as f64).sqrt();
        log::debug!(
            "tx audio: frames={} rms={:.4} active={} tuning={} queue={}",
            frames,
            rms,
            tx_active.load(Ordering::Acquire),
            state.settings.tuning,
            state.queue.len(),
        );
    }

    match &mut block.samples {
        PlaybackSamples::Float32(buf) => {
            for i in 0..frames {
                let v = state.float_buffer[i];
                for ch in 0..channels {
                    buf[i * channels + ch] = v;
                }
            }
        }
        PlaybackSamples::Int16(buf) => {
            for i in 0..frames {
                let v = state.float_buffer[i].clamp(-1.0, 1.0);
                let sample = (v * 32767.0).round() as i16;
                for ch in 0..channels {
                    buf[i * channels + ch] = sample;
                }
            }
        }
    }
    frames * channels
}

fn next_tx_sample_locked(state: &mut TxState, tx_active: &AtomicBool, now_ms: i64) -> f32 {
    if !tx_active.load(Ordering::Acquire) {
        return 0.0;
    }

    if state.modulator.is_idle() {
        if !state.queue.is_empty() {
            start_next_frame_locked(state, tx_active, now_ms);
        } else if !state.settings.tuning {
            tx_active.store(false, Ordering::Release);
            return 0.0;
        }
    }

    state.modulator.next_sample()
}

fn start_next_frame_locked(state: &mut TxState, tx_active: &AtomicBool, now_ms: i64) {
    let Some(frame) = state.queue.pop_front() else {
        return;
    };
    let Ok(sm) = submode::from_wire(state.settings.submode) else {
        state.queue.clear();
        tx_active.store(false, Ordering::Release);
        return;
    };

    log::debug!("tx frame {} at {:.1} Hz", frame.frame, state.settings.audio_frequency_hz);
    start_modulator(&mut state.modulator, &frame, sm, &state.settings, now_ms);
}

fn start_modulator(
    modulator: &mut Modulator,
    frame: &TxFrame,
    sm: Submode,
    settings: &TxSettings,
    now_ms: i64,
) {
    modulator.start(
        frame.tones,
        sm.symbol_samples as i32,
        sm.start_delay_ms as i32,
        sm.period_ms() as i32,
        settings.audio_frequency_hz,
        settings.tx_delay_s,
        settings.tuning,
        now_ms,
    );
}
