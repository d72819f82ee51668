// Engine orchestration against mock capabilities: capture staging into
// the ring, decode dispatch, and the transmit render path.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use tonelink_core::decode_worker::{DecodeParams, DecodeSnapshot, Demodulator};
use tonelink_core::engine::{TxFrameRequest, TxMessageRequest};
use tonelink_core::event::Event;
use tonelink_core::platform::{
    AudioFormat, CaptureBlock, PlaybackBlock, PlaybackSamples, SampleType, Samples, TimeSource,
};
use tonelink_core::submode::SubmodeId;
use tonelink_core::{CoreError, Engine, EngineCallbacks, EngineConfig, EngineDeps};

struct FixedTime(i64);

impl TimeSource for FixedTime {
    fn now_ms(&self) -> i64 {
        self.0
    }
}

struct RecordingDemodulator {
    sender: mpsc::Sender<DecodeParams>,
}

impl Demodulator for RecordingDemodulator {
    fn decode(&mut self, snapshot: &DecodeSnapshot, _emit: &mut dyn FnMut(Event)) -> usize {
        let _ = self.sender.send(snapshot.params.clone());
        0
    }
}

fn capture(data: &[i16]) -> CaptureBlock<'_> {
    CaptureBlock {
        samples: Samples::Int16(data),
        format: AudioFormat {
            sample_rate: 12_000,
            channels: 1,
            sample_type: SampleType::Int16,
        },
    }
}

#[test]
fn capture_accumulation_dispatches_one_decode_pass() {
    let (sender, receiver) = mpsc::channel();
    let spectra = Arc::new(AtomicUsize::new(0));
    let spectra_seen = Arc::clone(&spectra);

    let config = EngineConfig {
        submodes: SubmodeId::A.mask_bit(),
        ..EngineConfig::default()
    };
    let callbacks = EngineCallbacks {
        on_event: Some(Box::new(move |event| {
            if matches!(event, Event::Spectrum(_)) {
                spectra_seen.fetch_add(1, Ordering::SeqCst);
            }
        })),
        on_error: None,
    };
    let deps = EngineDeps {
        time: Arc::new(FixedTime(0)),
        demodulator: Box::new(RecordingDemodulator { sender }),
        ..EngineDeps::default()
    };
    let engine = Engine::new(config, callbacks, deps);

    // Mode A needs 79 * 1920 samples plus one second of guard; feed
    // tenth-of-a-second blocks until the window completes.
    let block = vec![100i16; 1200];
    for _ in 0..140 {
        engine.submit_capture(&capture(&block)).unwrap();
    }

    let params = receiver.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(params.nsubmodes, SubmodeId::A.mask_bit());
    assert_eq!(params.kpos[SubmodeId::A as usize], 0);
    assert!(params.ksz[SubmodeId::A as usize] >= 79 * 1920 + 12_000);
    assert!(params.newdat);

    // Every block is large enough to produce a spectrum event.
    assert!(spectra.load(Ordering::SeqCst) >= 140);
}

#[test]
fn capture_rejects_wrong_format_and_rate() {
    let errors = Arc::new(Mutex::new(Vec::new()));
    let errors_seen = Arc::clone(&errors);

    let config = EngineConfig {
        sample_rate_hz: 12_000,
        ..EngineConfig::default()
    };
    let callbacks = EngineCallbacks {
        on_event: None,
        on_error: Some(Box::new(move |message| {
            errors_seen.lock().unwrap().push(message.to_string());
        })),
    };
    let engine = Engine::new(config, callbacks, EngineDeps::default());

    let floats = vec![0.0f32; 128];
    let err = engine
        .submit_capture(&CaptureBlock {
            samples: Samples::Float32(&floats),
            format: AudioFormat {
                sample_rate: 12_000,
                channels: 1,
                sample_type: SampleType::Float32,
            },
        })
        .unwrap_err();
    assert!(matches!(err, CoreError::UnsupportedSampleFormat));

    let ints = vec![0i16; 128];
    let err = engine
        .submit_capture(&CaptureBlock {
            samples: Samples::Int16(&ints),
            format: AudioFormat {
                sample_rate: 48_000,
                channels: 1,
                sample_type: SampleType::Int16,
            },
        })
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::UnexpectedSampleRate { got: 48_000, want: 12_000 }
    ));

    assert_eq!(errors.lock().unwrap().len(), 2);
}

#[test]
fn transmit_message_renders_tone_audio() {
    // 500 ms into a 15 s period: mode A transmits immediately.
    let deps = EngineDeps {
        time: Arc::new(FixedTime(500)),
        ..EngineDeps::default()
    };
    let mut engine = Engine::new(EngineConfig::default(), EngineCallbacks::default(), deps);

    let info = engine
        .transmit_message(&TxMessageRequest {
            text: "VE7ABC SNR?".into(),
            my_call: "KN4CRD".into(),
            my_grid: "EM73".into(),
            selected_call: String::new(),
            submode: 0,
            audio_frequency_hz: 1500.0,
            tx_delay_s: 0.0,
            force_identify: false,
            force_data: false,
        })
        .unwrap();
    assert_eq!(info.dir_to, "VE7ABC");
    assert!(engine.is_transmitting());

    let mut buf = vec![0i16; 4096];
    let written = engine.render_tx_audio(&mut PlaybackBlock {
        samples: PlaybackSamples::Int16(&mut buf),
        format: AudioFormat {
            sample_rate: 12_000,
            channels: 1,
            sample_type: SampleType::Int16,
        },
    });
    assert_eq!(written, 4096);
    assert!(engine.is_transmitting_audio());
    assert!(buf.iter().any(|&s| s != 0), "rendered silence");

    engine.stop_transmit();
    assert!(!engine.is_transmitting());
}

#[test]
fn empty_message_is_rejected() {
    let mut engine = Engine::new(
        EngineConfig::default(),
        EngineCallbacks::default(),
        EngineDeps::default(),
    );
    let err = engine
        .transmit_message(&TxMessageRequest {
            text: String::new(),
            my_call: "KN4CRD".into(),
            my_grid: "EM73".into(),
            selected_call: String::new(),
            submode: 0,
            audio_frequency_hz: 1500.0,
            tx_delay_s: 0.0,
            force_identify: false,
            force_data: false,
        })
        .unwrap_err();
    assert!(matches!(err, CoreError::EmptyMessage));
    assert!(!engine.is_transmitting());
}

#[test]
fn transmit_frame_requires_full_frame() {
    let mut engine = Engine::new(
        EngineConfig::default(),
        EngineCallbacks::default(),
        EngineDeps::default(),
    );
    let err = engine
        .transmit_frame(&TxFrameRequest {
            frame: "SHORT".into(),
            flags: 0,
            submode: 0,
            audio_frequency_hz: 1500.0,
            tx_delay_s: 0.0,
        })
        .unwrap_err();
    assert!(matches!(err, CoreError::ShortFrame(5)));
}

#[test]
fn tune_holds_a_tone_until_stopped() {
    let deps = EngineDeps {
        time: Arc::new(FixedTime(7_123)),
        ..EngineDeps::default()
    };
    let mut engine = Engine::new(EngineConfig::default(), EngineCallbacks::default(), deps);

    engine.start_tune(1500.0, 0, 0.0).unwrap();
    assert!(engine.is_transmitting());

    let mut buf = vec![0.0f32; 2048];
    engine.render_tx_audio(&mut PlaybackBlock {
        samples: PlaybackSamples::Float32(&mut buf),
        format: AudioFormat {
            sample_rate: 12_000,
            channels: 1,
            sample_type: SampleType::Float32,
        },
    });
    assert!(buf.iter().any(|&s| s.abs() > 0.1));
    assert!(engine.is_transmitting_audio());

    engine.stop_transmit();
    assert!(!engine.is_transmitting());
    assert!(!engine.is_transmitting_audio());
}

#[test]
fn unknown_submode_selector_is_an_error() {
    let mut engine = Engine::new(
        EngineConfig::default(),
        EngineCallbacks::default(),
        EngineDeps::default(),
    );
    let err = engine.start_tune(1500.0, 3, 0.0).unwrap_err();
    assert!(matches!(err, CoreError::UnknownSubmode(3)));
}
