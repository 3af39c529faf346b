//! Multi-tap DTMF text codec
//!
//! Encodes text as telephone keypad presses (a letter is one key pressed a
//! fixed number of times) rendered as dual-tone bursts, and decodes such a
//! signal back into text with a windowed tone detector followed by a
//! press-counting state machine.

pub mod error;
pub mod dtmf;
pub mod encoder;
pub mod preprocess;
pub mod detector;
pub mod goertzel;
pub mod spectral;
pub mod segmenter;
pub mod config;
pub mod decoder;

pub use config::{DecoderConfig, GoertzelConfig, SpectralConfig};
pub use decoder::Decoder;
pub use detector::ToneDetector;
pub use dtmf::{FrequencyPair, Key, SymbolMapping, ToneTable};
pub use encoder::Encoder;
pub use error::{DtmfError, Result};
pub use goertzel::GoertzelDetector;
pub use segmenter::Segmenter;
pub use spectral::SpectralDetector;

// Timing configuration
pub const SAMPLE_RATE: usize = 44100;
pub const TONE_DURATION_MS: usize = 200;
pub const REPEAT_GAP_MS: usize = 50;
pub const SYMBOL_PAUSE_MS: usize = 200;

pub const TONE_SAMPLES: usize = (SAMPLE_RATE * TONE_DURATION_MS) / 1000; // 8820
pub const REPEAT_GAP_SAMPLES: usize = (SAMPLE_RATE * REPEAT_GAP_MS) / 1000; // 2205
pub const SYMBOL_PAUSE_SAMPLES: usize = (SAMPLE_RATE * SYMBOL_PAUSE_MS) / 1000; // 8820

/// Detection window length, one inter-repeat gap worth of samples
pub const WINDOW_SAMPLES: usize = REPEAT_GAP_SAMPLES;

/// Per-sine amplitude (two sines, peak stays within [-1, 1])
pub const TONE_AMPLITUDE: f32 = 0.5;

/// Emitted for a confirmed (key, presses) pair with no symbol
pub const UNKNOWN_SYMBOL: char = '~';

/// Convert a duration in milliseconds to a sample count at `SAMPLE_RATE`
pub const fn ms_to_samples(ms: usize) -> usize {
    (SAMPLE_RATE * ms) / 1000
}
