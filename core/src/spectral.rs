//! FFT-based tone detector
//!
//! Hann-windows the analysis window, zero-pads it to the transform size and
//! sums spectrum magnitudes around each DTMF frequency's bin.

use std::borrow::Cow;
use std::f64::consts::PI;
use std::sync::Arc;

use realfft::{RealFftPlanner, RealToComplex};

use crate::config::SpectralConfig;
use crate::detector::{pick_strongest, score_keys, KeyScore, ToneDetector};
use crate::dtmf::{Key, DTMF_HIGH_FREQS, DTMF_LOW_FREQS};
use crate::error::{DtmfError, Result};
use crate::{SAMPLE_RATE, WINDOW_SAMPLES};

/// Hann window `0.5 (1 - cos(2πi / (len - 1)))`
pub fn hann_window(len: usize) -> Vec<f32> {
    if len < 2 {
        return vec![1.0; len];
    }
    let denom = (len - 1) as f64;
    (0..len)
        .map(|i| (0.5 * (1.0 - (2.0 * PI * i as f64 / denom).cos())) as f32)
        .collect()
}

/// Spectrum bin holding `freq` for a transform of `fft_size` points (truncating)
pub fn frequency_bin(freq: f32, fft_size: usize) -> usize {
    (freq as f64 * fft_size as f64 / SAMPLE_RATE as f64) as usize
}

pub struct SpectralDetector {
    config: SpectralConfig,
    fft: Arc<dyn RealToComplex<f32>>,
    // Precomputed for the standard window length
    window: Vec<f32>,
}

impl SpectralDetector {
    pub fn new() -> Self {
        Self::build(SpectralConfig::default())
    }

    pub fn with_config(config: SpectralConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SpectralConfig) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(config.fft_size);
        let window = hann_window(WINDOW_SAMPLES.min(config.fft_size));

        log::debug!(
            "Spectral detector: {}-point FFT, {:.2} Hz per bin",
            config.fft_size,
            SAMPLE_RATE as f32 / config.fft_size as f32
        );

        Self { config, fft, window }
    }

    pub fn config(&self) -> &SpectralConfig {
        &self.config
    }

    /// Score every key for one window
    pub fn score(&self, samples: &[f32]) -> Result<Vec<KeyScore>> {
        let fft_size = self.config.fft_size;
        let n = samples.len().min(fft_size);

        let taper: Cow<[f32]> = if n == self.window.len() {
            Cow::Borrowed(&self.window)
        } else {
            Cow::Owned(hann_window(n))
        };

        // Zero-padded input
        let mut input = self.fft.make_input_vec();
        for ((dst, &sample), &weight) in input.iter_mut().zip(&samples[..n]).zip(taper.iter()) {
            *dst = sample * weight;
        }

        let mut spectrum = self.fft.make_output_vec();
        debug_assert_eq!(input.len(), fft_size, "FFT input buffer size mismatch");
        self.fft
            .process(&mut input, &mut spectrum)
            .map_err(|e| DtmfError::FftError(format!("FFT forward process failed: {:?}", e)))?;

        let magnitudes: Vec<f32> = spectrum.iter().map(|c| c.norm()).collect();
        let band = |freq: f32| -> f32 {
            let center = frequency_bin(freq, fft_size);
            let first = center.saturating_sub(self.config.neighbor_bins);
            let last = (center + self.config.neighbor_bins).min(magnitudes.len() - 1);
            magnitudes[first..=last].iter().sum()
        };

        let mut low = [0.0f32; DTMF_LOW_FREQS.len()];
        for (magnitude, &freq) in low.iter_mut().zip(DTMF_LOW_FREQS.iter()) {
            *magnitude = band(freq);
        }

        let mut high = [0.0f32; DTMF_HIGH_FREQS.len()];
        for (magnitude, &freq) in high.iter_mut().zip(DTMF_HIGH_FREQS.iter()) {
            *magnitude = band(freq);
        }

        Ok(score_keys(&low, &high))
    }
}

impl ToneDetector for SpectralDetector {
    fn detect(&self, window: &[f32]) -> Result<Option<Key>> {
        if window.is_empty() {
            return Ok(None);
        }

        let best = match pick_strongest(&self.score(window)?) {
            Some(best) => best,
            None => return Ok(None),
        };

        if best.magnitude() < self.config.min_magnitude {
            return Ok(None);
        }
        Ok(Some(best.key))
    }
}

impl Default for SpectralDetector {
    fn default() -> Self {
        Self::new()
    }
}
