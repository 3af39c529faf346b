//! Keypad tone table and burst synthesizer
//!
//! Frequency design (standard DTMF grid, 4 rows × 3 columns):
//! - Low frequencies (rows): 697, 770, 852, 941 Hz
//! - High frequencies (columns): 1209, 1336, 1477 Hz
//! - Keys 1-12 are numbered row-major
//!
//! Symbol parameters (at 44.1kHz sample rate):
//! - 8820 samples = 200ms per press
//! - 2205 samples = 50ms of silence between repeated presses of one key
//! - A symbol is its key pressed `presses` times

use once_cell::sync::OnceCell;
use std::f64::consts::PI;
use std::fmt;

use crate::{REPEAT_GAP_SAMPLES, SAMPLE_RATE, TONE_AMPLITUDE, TONE_SAMPLES};

/// Low frequency band (4 frequencies)
pub const DTMF_LOW_FREQS: [f32; 4] = [697.0, 770.0, 852.0, 941.0];

/// High frequency band (3 frequencies)
pub const DTMF_HIGH_FREQS: [f32; 3] = [1209.0, 1336.0, 1477.0];

/// Total number of keys (4 × 3 = 12)
pub const DTMF_NUM_KEYS: usize = 12;

/// Longest press sequence used by any symbol
pub const MAX_PRESSES: u8 = 5;

/// One keypad key, numbered 1 to 12
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(u8);

impl Key {
    pub fn new(number: u8) -> Option<Self> {
        if (1..=DTMF_NUM_KEYS as u8).contains(&number) {
            Some(Self(number))
        } else {
            None
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        if index < DTMF_NUM_KEYS {
            Some(Self(index as u8 + 1))
        } else {
            None
        }
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Zero-based position in `KEY_FREQUENCIES`
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    pub fn frequencies(self) -> FrequencyPair {
        KEY_FREQUENCIES[self.index()]
    }

    pub fn all() -> impl Iterator<Item = Key> {
        (1..=DTMF_NUM_KEYS as u8).map(Key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key {}", self.0)
    }
}

/// The two tones defining a key
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyPair {
    pub low: f32,
    pub high: f32,
}

const fn pair(row: usize, column: usize) -> FrequencyPair {
    FrequencyPair {
        low: DTMF_LOW_FREQS[row],
        high: DTMF_HIGH_FREQS[column],
    }
}

/// Frequency pair of every key, indexed by `Key::index`
pub const KEY_FREQUENCIES: [FrequencyPair; DTMF_NUM_KEYS] = [
    pair(0, 0),
    pair(0, 1),
    pair(0, 2),
    pair(1, 0),
    pair(1, 1),
    pair(1, 2),
    pair(2, 0),
    pair(2, 1),
    pair(2, 2),
    pair(3, 0),
    pair(3, 1),
    pair(3, 2),
];

/// `symbol` is typed by pressing `key` `presses` times
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolMapping {
    pub symbol: char,
    pub key: Key,
    pub presses: u8,
}

const fn mapping(symbol: char, key: u8, presses: u8) -> SymbolMapping {
    SymbolMapping {
        symbol,
        key: Key(key),
        presses,
    }
}

/// Multi-tap symbol table, canonical uppercase.
///
/// Key 12 accepts any press count as `*`; encoding `*` uses the first entry.
pub static SYMBOL_MAPPINGS: [SymbolMapping; 47] = [
    mapping('1', 1, 1),
    mapping('2', 2, 1),
    mapping('A', 2, 2),
    mapping('B', 2, 3),
    mapping('C', 2, 4),
    mapping('3', 3, 1),
    mapping('D', 3, 2),
    mapping('E', 3, 3),
    mapping('F', 3, 4),
    mapping('4', 4, 1),
    mapping('G', 4, 2),
    mapping('H', 4, 3),
    mapping('I', 4, 4),
    mapping('5', 5, 1),
    mapping('J', 5, 2),
    mapping('K', 5, 3),
    mapping('L', 5, 4),
    mapping('6', 6, 1),
    mapping('M', 6, 2),
    mapping('N', 6, 3),
    mapping('O', 6, 4),
    mapping('7', 7, 1),
    mapping('P', 7, 2),
    mapping('Q', 7, 3),
    mapping('R', 7, 4),
    mapping('S', 7, 5),
    mapping('8', 8, 1),
    mapping('T', 8, 2),
    mapping('U', 8, 3),
    mapping('V', 8, 4),
    mapping('9', 9, 1),
    mapping('W', 9, 2),
    mapping('X', 9, 3),
    mapping('Y', 9, 4),
    mapping('Z', 9, 5),
    mapping('#', 10, 1),
    mapping('.', 10, 2),
    mapping('!', 10, 3),
    mapping('?', 10, 4),
    mapping(',', 10, 5),
    mapping('0', 11, 1),
    mapping(' ', 11, 2),
    mapping('*', 12, 1),
    mapping('*', 12, 2),
    mapping('*', 12, 3),
    mapping('*', 12, 4),
    mapping('*', 12, 5),
];

/// Number of samples in a burst of `presses` tones with gaps between them
pub const fn burst_len(presses: usize) -> usize {
    if presses == 0 {
        return 0;
    }
    presses * TONE_SAMPLES + (presses - 1) * REPEAT_GAP_SAMPLES
}

/// Generate one press of a key: `amplitude * (sin(2π·low·t) + sin(2π·high·t))`
pub fn generate_tone(frequencies: FrequencyPair) -> Vec<f32> {
    let sample_rate = SAMPLE_RATE as f64;
    let low = frequencies.low as f64;
    let high = frequencies.high as f64;

    (0..TONE_SAMPLES)
        .map(|n| {
            let t = n as f64 / sample_rate;
            let low_tone = (2.0 * PI * low * t).sin();
            let high_tone = (2.0 * PI * high * t).sin();
            (TONE_AMPLITUDE as f64 * (low_tone + high_tone)) as f32
        })
        .collect()
}

/// Repeat `tone` `presses` times with a silent gap between repeats (none after the last)
pub fn build_symbol_tone(tone: &[f32], presses: u8) -> Vec<f32> {
    let presses = presses as usize;
    let mut samples = Vec::with_capacity(presses * tone.len() + presses.saturating_sub(1) * REPEAT_GAP_SAMPLES);

    for press in 0..presses {
        samples.extend_from_slice(tone);
        if press + 1 < presses {
            samples.resize(samples.len() + REPEAT_GAP_SAMPLES, 0.0);
        }
    }

    samples
}

static GLOBAL_TABLE: OnceCell<ToneTable> = OnceCell::new();

/// Precomputed key tones and per-symbol bursts.
///
/// Read-only once built. Every burst of a key is assembled from that key's
/// single tone buffer.
#[derive(Debug)]
pub struct ToneTable {
    key_tones: Vec<Vec<f32>>,
    bursts: Vec<Vec<f32>>,
}

impl ToneTable {
    pub fn build() -> Self {
        let key_tones: Vec<Vec<f32>> = KEY_FREQUENCIES.iter().map(|&pair| generate_tone(pair)).collect();

        let bursts = SYMBOL_MAPPINGS
            .iter()
            .map(|mapping| build_symbol_tone(&key_tones[mapping.key.index()], mapping.presses))
            .collect();

        log::debug!(
            "Tone table built: {} key tones, {} symbol bursts",
            key_tones.len(),
            SYMBOL_MAPPINGS.len()
        );

        Self { key_tones, bursts }
    }

    /// Process-wide table, built on first use
    pub fn global() -> &'static ToneTable {
        GLOBAL_TABLE.get_or_init(ToneTable::build)
    }

    pub fn mappings(&self) -> &'static [SymbolMapping] {
        &SYMBOL_MAPPINGS
    }

    /// Canonical mapping of an (already uppercased) symbol
    pub fn mapping_for(&self, symbol: char) -> Option<&'static SymbolMapping> {
        SYMBOL_MAPPINGS.iter().find(|m| m.symbol == symbol)
    }

    /// Reverse lookup used by the decoder
    pub fn symbol_for(&self, key: Key, presses: usize) -> Option<char> {
        self.position(key, presses).map(|i| SYMBOL_MAPPINGS[i].symbol)
    }

    pub fn key_tone(&self, key: Key) -> &[f32] {
        &self.key_tones[key.index()]
    }

    /// Full press burst of a mapping, `None` if the mapping is not in the table
    pub fn burst(&self, mapping: &SymbolMapping) -> Option<&[f32]> {
        self.position(mapping.key, mapping.presses as usize)
            .map(|i| self.bursts[i].as_slice())
    }

    fn position(&self, key: Key, presses: usize) -> Option<usize> {
        SYMBOL_MAPPINGS
            .iter()
            .position(|m| m.key == key && m.presses as usize == presses)
    }
}
