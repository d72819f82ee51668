use thiserror::Error;

/// Failures surfaced by the engine and DSP layers.
///
/// Text and frame recognition failures are deliberately not represented
/// here: a pack or unpack that does not match its grammar returns an empty
/// result and the caller falls through to the next frame kind.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unsupported sample format")]
    UnsupportedSampleFormat,

    #[error("unexpected sample rate: got {got} Hz, want {want} Hz")]
    UnexpectedSampleRate { got: usize, want: usize },

    #[error("unknown submode selector {0}")]
    UnknownSubmode(u32),

    #[error("message produced no frames")]
    EmptyMessage,

    #[error("frame too short: {0} symbols")]
    ShortFrame(usize),

    #[error("audio input failed to start")]
    AudioInputStart,

    #[error("audio output failed to start")]
    AudioOutputStart,

    #[error("resampler unconfigured or invalid rates {input}/{output}")]
    ResamplerRates { input: usize, output: usize },
}

pub type Result<T> = std::result::Result<T, CoreError>;
