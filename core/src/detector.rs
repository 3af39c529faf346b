use crate::dtmf::{Key, DTMF_HIGH_FREQS, DTMF_LOW_FREQS, DTMF_NUM_KEYS};
use crate::error::Result;

/// Classifies one analysis window as a key or as "no tone".
///
/// Implementations hold no mutable state, so windows can be classified in
/// any order (or concurrently) with identical results.
pub trait ToneDetector: Send + Sync {
    fn detect(&self, window: &[f32]) -> Result<Option<Key>>;
}

/// Per-key evidence: magnitude at the key's low and high frequency
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyScore {
    pub key: Key,
    pub low: f32,
    pub high: f32,
}

impl KeyScore {
    /// Combined magnitude used to rank keys
    pub fn magnitude(&self) -> f32 {
        self.low + self.high
    }

    /// Weaker component over stronger component, 0.0 when both are zero
    pub fn balance(&self) -> f32 {
        let strong = self.low.max(self.high);
        if strong <= 0.0 {
            return 0.0;
        }
        self.low.min(self.high) / strong
    }
}

/// Combine per-frequency magnitudes into one score per key.
///
/// `low` and `high` are indexed like `DTMF_LOW_FREQS` and `DTMF_HIGH_FREQS`.
pub fn score_keys(
    low: &[f32; DTMF_LOW_FREQS.len()],
    high: &[f32; DTMF_HIGH_FREQS.len()],
) -> Vec<KeyScore> {
    (0..DTMF_NUM_KEYS)
        .filter_map(Key::from_index)
        .map(|key| {
            let row = key.index() / DTMF_HIGH_FREQS.len();
            let col = key.index() % DTMF_HIGH_FREQS.len();
            KeyScore {
                key,
                low: low[row],
                high: high[col],
            }
        })
        .collect()
}

/// Highest combined magnitude; the lowest-numbered key wins ties
pub fn pick_strongest(scores: &[KeyScore]) -> Option<KeyScore> {
    let mut best: Option<KeyScore> = None;
    for score in scores {
        match best {
            Some(current) if score.magnitude() <= current.magnitude() => {}
            _ => best = Some(*score),
        }
    }
    best
}
