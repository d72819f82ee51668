//! Background decode dispatch.
//!
//! Decode passes run on a single worker thread fed through a one-slot
//! mailbox: a new snapshot replaces any snapshot still waiting, so the
//! demodulator always works on the freshest capture and can never build
//! a backlog across periods.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use crate::event::Event;
use crate::submode::SubmodeId;
use crate::RING_SAMPLES;

/// Decode pass parameters, snapshotted together with the capture ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeParams {
    /// UTC as HHMMSS, for decode timestamps.
    pub utc: i32,
    /// QSO center frequency in Hz.
    pub nfqso: i32,
    /// Low edge of the search range in Hz.
    pub nfa: i32,
    /// High edge of the search range in Hz.
    pub nfb: i32,
    pub newdat: bool,
    pub sync_stats: bool,
    /// Ring write cursor at snapshot time.
    pub kin: i32,
    /// Window position per submode, indexed by `SubmodeId`.
    pub kpos: [i32; SubmodeId::COUNT],
    /// Window size per submode, indexed by `SubmodeId`.
    pub ksz: [i32; SubmodeId::COUNT],
    /// Mask of submodes with a window in this pass.
    pub nsubmodes: u32,
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self {
            utc: 0,
            nfqso: 0,
            nfa: 0,
            nfb: 0,
            newdat: false,
            sync_stats: false,
            kin: 0,
            kpos: [0; SubmodeId::COUNT],
            ksz: [0; SubmodeId::COUNT],
            nsubmodes: 0,
        }
    }
}

impl DecodeParams {
    pub fn set_window(&mut self, id: SubmodeId, start: i32, size: i32) {
        self.kpos[id as usize] = start;
        self.ksz[id as usize] = size;
        self.nsubmodes |= id.mask_bit();
    }
}

/// Everything a decode pass needs, detached from the live capture state.
#[derive(Debug, Clone)]
pub struct DecodeSnapshot {
    pub params: DecodeParams,
    /// Full copy of the capture ring, `RING_SAMPLES` long.
    pub samples: Vec<i16>,
}

impl Default for DecodeSnapshot {
    fn default() -> Self {
        Self {
            params: DecodeParams::default(),
            samples: vec![0; RING_SAMPLES],
        }
    }
}

/// The demodulator collaborator. Implementations search the windows named
/// in the snapshot and emit sync/decode events; the return value is the
/// number of decoded transmissions.
pub trait Demodulator: Send {
    fn decode(&mut self, snapshot: &DecodeSnapshot, emit: &mut dyn FnMut(Event)) -> usize;
}

/// Placeholder demodulator for hosts that only transmit or monitor the
/// spectrum. Every pass decodes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDemodulator;

impl Demodulator for NullDemodulator {
    fn decode(&mut self, _snapshot: &DecodeSnapshot, _emit: &mut dyn FnMut(Event)) -> usize {
        0
    }
}

struct Mailbox {
    pending: Option<DecodeSnapshot>,
    stop: bool,
}

/// Owns the worker thread. Dropping stops and joins it.
pub struct DecodeWorker {
    shared: Arc<(Mutex<Mailbox>, Condvar)>,
    thread: Option<JoinHandle<()>>,
}

impl DecodeWorker {
    pub fn spawn<F>(mut demodulator: Box<dyn Demodulator>, mut on_event: F) -> Self
    where
        F: FnMut(Event) + Send + 'static,
    {
        let shared = Arc::new((
            Mutex::new(Mailbox {
                pending: None,
                stop: false,
            }),
            Condvar::new(),
        ));

        let worker_shared = Arc::clone(&shared);
        let thread = thread::spawn(move || {
            let (mailbox, cv) = &*worker_shared;
            loop {
                let task = {
                    let mut guard = match mailbox.lock() {
                        Ok(guard) => guard,
                        Err(_) => return,
                    };
                    loop {
                        if guard.stop {
                            return;
                        }
                        if let Some(task) = guard.pending.take() {
                            break task;
                        }
                        guard = match cv.wait(guard) {
                            Ok(guard) => guard,
                            Err(_) => return,
                        };
                    }
                };

                log::debug!(
                    "decode pass: submodes=0x{:x} range={}-{} Hz nfqso={} Hz",
                    task.params.nsubmodes,
                    task.params.nfa,
                    task.params.nfb,
                    task.params.nfqso,
                );
                let decoded = demodulator.decode(&task, &mut on_event);
                log::debug!("decode pass finished: {decoded} decodes");
            }
        });

        Self {
            shared,
            thread: Some(thread),
        }
    }

    /// Replaces any snapshot still waiting in the mailbox.
    pub fn enqueue(&self, snapshot: DecodeSnapshot) {
        let (mailbox, cv) = &*self.shared;
        if let Ok(mut guard) = mailbox.lock() {
            guard.pending = Some(snapshot);
        }
        cv.notify_one();
    }

    pub fn stop(&mut self) {
        let (mailbox, cv) = &*self.shared;
        if let Ok(mut guard) = mailbox.lock() {
            guard.stop = true;
        }
        cv.notify_one();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for DecodeWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
