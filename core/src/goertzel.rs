//! Correlator-bank tone detector
//!
//! One Goertzel resonator per DTMF frequency over a Hamming-windowed copy
//! of the analysis window. The seven frequency magnitudes are computed once
//! and combined per key.

use std::borrow::Cow;
use std::f64::consts::PI;

use crate::config::GoertzelConfig;
use crate::detector::{pick_strongest, score_keys, KeyScore, ToneDetector};
use crate::dtmf::{Key, DTMF_HIGH_FREQS, DTMF_LOW_FREQS};
use crate::error::Result;
use crate::{SAMPLE_RATE, WINDOW_SAMPLES};

/// Hamming window `0.54 - 0.46 cos(2πi / (len - 1))`
pub fn hamming_window(len: usize) -> Vec<f32> {
    if len < 2 {
        return vec![1.0; len];
    }
    let denom = (len - 1) as f64;
    (0..len)
        .map(|i| (0.54 - 0.46 * (2.0 * PI * i as f64 / denom).cos()) as f32)
        .collect()
}

/// Magnitude of the nearest DFT bin to `freq` for a block of `samples.len()` samples
pub fn goertzel_magnitude(samples: &[f32], freq: f32) -> f32 {
    let n = samples.len();
    if n == 0 {
        return 0.0;
    }

    let k = (0.5 + n as f64 * freq as f64 / SAMPLE_RATE as f64) as usize;
    let omega = 2.0 * PI * k as f64 / n as f64;
    let coeff = 2.0 * omega.cos();

    let mut q1 = 0.0f64;
    let mut q2 = 0.0f64;

    for &sample in samples {
        let q0 = coeff * q1 - q2 + sample as f64;
        q2 = q1;
        q1 = q0;
    }

    let real = q1 - q2 * omega.cos();
    let imag = q2 * omega.sin();
    (real * real + imag * imag).sqrt() as f32
}

pub struct GoertzelDetector {
    config: GoertzelConfig,
    // Precomputed for the standard window length
    window: Vec<f32>,
}

impl GoertzelDetector {
    pub fn new() -> Self {
        Self::build(GoertzelConfig::default())
    }

    /// Also rejects windows where one of the two tones is missing or much weaker
    pub fn strict() -> Self {
        Self::build(GoertzelConfig::strict())
    }

    pub fn with_config(config: GoertzelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: GoertzelConfig) -> Self {
        Self {
            config,
            window: hamming_window(WINDOW_SAMPLES),
        }
    }

    pub fn config(&self) -> &GoertzelConfig {
        &self.config
    }

    /// Score every key for one window
    pub fn score(&self, samples: &[f32]) -> Vec<KeyScore> {
        let taper: Cow<[f32]> = if samples.len() == self.window.len() {
            Cow::Borrowed(&self.window)
        } else {
            Cow::Owned(hamming_window(samples.len()))
        };

        let windowed: Vec<f32> = samples.iter().zip(taper.iter()).map(|(&s, &w)| s * w).collect();

        let mut low = [0.0f32; DTMF_LOW_FREQS.len()];
        for (magnitude, &freq) in low.iter_mut().zip(DTMF_LOW_FREQS.iter()) {
            *magnitude = goertzel_magnitude(&windowed, freq);
        }

        let mut high = [0.0f32; DTMF_HIGH_FREQS.len()];
        for (magnitude, &freq) in high.iter_mut().zip(DTMF_HIGH_FREQS.iter()) {
            *magnitude = goertzel_magnitude(&windowed, freq);
        }

        score_keys(&low, &high)
    }

    fn accept(&self, best: &KeyScore) -> bool {
        if best.magnitude() < self.config.min_magnitude {
            return false;
        }

        if self.config.check_balance {
            let weaker = best.low.min(best.high);
            if weaker < self.config.min_tone_magnitude || best.balance() <= self.config.min_balance {
                log::trace!(
                    "Rejected {} as unbalanced (low {:.1}, high {:.1})",
                    best.key,
                    best.low,
                    best.high
                );
                return false;
            }
        }

        true
    }
}

impl ToneDetector for GoertzelDetector {
    fn detect(&self, window: &[f32]) -> Result<Option<Key>> {
        if window.is_empty() {
            return Ok(None);
        }

        let best = match pick_strongest(&self.score(window)) {
            Some(best) => best,
            None => return Ok(None),
        };

        Ok(self.accept(&best).then_some(best.key))
    }
}

impl Default for GoertzelDetector {
    fn default() -> Self {
        Self::new()
    }
}
